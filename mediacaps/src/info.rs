//! Per-codec-component facade grouping capabilities by media type.

use std::collections::BTreeMap;

use crate::caps::CodecCapabilities;
use mediacaps_core::{CapsError, Result};

/// The capabilities of one physical or logical codec component, keyed by
/// media type. Immutable after construction; lookups hand out deep copies
/// so callers cannot corrupt the canonical entries.
#[derive(Debug, Clone)]
pub struct CodecInfo {
    name: String,
    is_encoder: bool,
    caps: BTreeMap<String, CodecCapabilities>,
}

impl CodecInfo {
    /// Group `caps` under the component `name`. Media types are matched
    /// case-insensitively; a later entry for the same type replaces an
    /// earlier one.
    pub fn new(name: &str, is_encoder: bool, caps: Vec<CodecCapabilities>) -> Self {
        let caps = caps
            .into_iter()
            .map(|c| (c.mime_type().to_ascii_lowercase(), c))
            .collect();
        Self {
            name: name.to_string(),
            is_encoder,
            caps,
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the component is an encoder.
    pub fn is_encoder(&self) -> bool {
        self.is_encoder
    }

    /// Media types the component supports, ascending.
    pub fn supported_types(&self) -> Vec<&str> {
        self.caps.keys().map(|k| k.as_str()).collect()
    }

    /// A deep copy of the capabilities for `mime_type`, or
    /// [`CapsError::NotFound`] when the component does not support it.
    pub fn capabilities_for_type(&self, mime_type: &str) -> Result<CodecCapabilities> {
        self.caps
            .get(&mime_type.to_ascii_lowercase())
            .map(CodecCapabilities::dup)
            .ok_or_else(|| CapsError::NotFound(mime_type.to_string()))
    }

    /// A facade keeping only the entries that require no non-default
    /// feature. `None` when nothing qualifies.
    pub fn regular_subset(&self) -> Option<Self> {
        let caps: BTreeMap<String, CodecCapabilities> = self
            .caps
            .iter()
            .filter(|(_, c)| c.is_regular())
            .map(|(k, c)| (k.clone(), c.dup()))
            .collect();
        if caps.is_empty() {
            return None;
        }
        Some(Self {
            name: self.name.clone(),
            is_encoder: self.is_encoder,
            caps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime;
    use crate::profile::{avc, ProfileLevel};
    use mediacaps_core::FormatMap;

    fn avc_caps(attrs: &FormatMap) -> CodecCapabilities {
        let pls = vec![ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31)];
        CodecCapabilities::new(mime::VIDEO_AVC, false, pls, vec![], attrs).unwrap()
    }

    fn aac_caps() -> CodecCapabilities {
        CodecCapabilities::new(mime::AUDIO_AAC, false, vec![], vec![], &FormatMap::new()).unwrap()
    }

    #[test]
    fn lookup_is_case_insensitive_and_missing_types_fail() {
        let info = CodecInfo::new("c2.android.avc.decoder", false, vec![avc_caps(&FormatMap::new())]);
        assert!(info.capabilities_for_type("Video/AVC").is_ok());
        assert!(matches!(
            info.capabilities_for_type(mime::VIDEO_HEVC),
            Err(CapsError::NotFound(_))
        ));
    }

    #[test]
    fn lookup_returns_isolated_copies() {
        let info = CodecInfo::new("c2.android.avc.decoder", false, vec![avc_caps(&FormatMap::new())]);
        let mut copy = info.capabilities_for_type(mime::VIDEO_AVC).unwrap();
        copy.profile_levels_mut().clear();
        let again = info.capabilities_for_type(mime::VIDEO_AVC).unwrap();
        assert_eq!(again.profile_levels().len(), 1);
    }

    #[test]
    fn regular_subset_drops_entries_requiring_non_default_features() {
        let mut secure = FormatMap::new();
        secure.set_int("feature-secure-playback", 1);
        let info = CodecInfo::new(
            "c2.android.avc.decoder",
            false,
            vec![avc_caps(&secure), aac_caps()],
        );
        let regular = info.regular_subset().unwrap();
        assert_eq!(regular.supported_types(), vec![mime::AUDIO_AAC]);
    }

    #[test]
    fn regular_subset_is_idempotent_and_none_when_empty() {
        let mut secure = FormatMap::new();
        secure.set_int("feature-secure-playback", 1);
        let all_secure = CodecInfo::new("c2.secure.decoder", false, vec![avc_caps(&secure)]);
        assert!(all_secure.regular_subset().is_none());

        let info = CodecInfo::new("c2.android.avc.decoder", false, vec![aac_caps()]);
        let once = info.regular_subset().unwrap();
        let twice = once.regular_subset().unwrap();
        assert_eq!(once.supported_types(), twice.supported_types());
    }

    #[test]
    fn required_default_features_stay_regular() {
        let mut adaptive = FormatMap::new();
        adaptive.set_int("feature-adaptive-playback", 1);
        let info = CodecInfo::new("c2.android.avc.decoder", false, vec![avc_caps(&adaptive)]);
        assert!(info.regular_subset().is_some());
    }

    #[test]
    fn supported_types_are_sorted() {
        let info = CodecInfo::new(
            "omx.test",
            false,
            vec![avc_caps(&FormatMap::new()), aac_caps()],
        );
        assert_eq!(
            info.supported_types(),
            vec![mime::AUDIO_AAC, mime::VIDEO_AVC]
        );
    }
}
