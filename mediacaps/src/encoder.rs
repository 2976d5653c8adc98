//! Encoder-specific capability aggregation: complexity and quality tuning
//! ranges plus the supported bitrate-control modes.

use crate::mime;
use mediacaps_core::format::{self, keys};
use mediacaps_core::{CapsError, FormatMap, Range, Result};

bitflags::bitflags! {
    /// Set of supported bitrate-control modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct BitrateModes: u32 {
        const CQ = 1 << 0;
        const VBR = 1 << 1;
        const CBR = 1 << 2;
        const CBR_FD = 1 << 3;
    }
}

/// A bitrate-control mode an encoder can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BitrateMode {
    /// Constant quality, bitrate varies freely.
    ConstantQuality,
    /// Variable bitrate around a target average.
    Variable,
    /// Constant bitrate.
    Constant,
    /// Constant bitrate, dropping frames to hold it.
    ConstantWithFrameDrops,
}

impl BitrateMode {
    /// Numeric encoding used by candidate formats under the
    /// `bitrate-mode` key.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::ConstantQuality),
            1 => Some(Self::Variable),
            2 => Some(Self::Constant),
            3 => Some(Self::ConstantWithFrameDrops),
            _ => None,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "CQ" => Some(Self::ConstantQuality),
            "VBR" => Some(Self::Variable),
            "CBR" => Some(Self::Constant),
            "CBR-FD" => Some(Self::ConstantWithFrameDrops),
            _ => None,
        }
    }

    fn flag(self) -> BitrateModes {
        match self {
            Self::ConstantQuality => BitrateModes::CQ,
            Self::Variable => BitrateModes::VBR,
            Self::Constant => BitrateModes::CBR,
            Self::ConstantWithFrameDrops => BitrateModes::CBR_FD,
        }
    }
}

/// Tuning ranges and bitrate-control modes for one encoder and media type.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct EncoderCapabilities {
    complexity_range: Range<i32>,
    quality_range: Range<i32>,
    bitrate_control: BitrateModes,
    default_complexity: i32,
    default_quality: i32,
    quality_scale: Option<String>,
}

impl EncoderCapabilities {
    /// Build the encoder capabilities for `mime_type` from the raw
    /// attribute map.
    pub(crate) fn new(mime_type: &str, attrs: &FormatMap) -> Result<Self> {
        let mut caps = Self {
            complexity_range: Range::new_unchecked(0, 0),
            quality_range: Range::new_unchecked(0, 0),
            bitrate_control: BitrateModes::VBR,
            default_complexity: 0,
            default_quality: 0,
            quality_scale: None,
        };
        caps.apply_format_limits(mime_type);
        caps.parse_from_info(attrs)?;
        Ok(caps)
    }

    /// Supported values for the complexity tuning key.
    pub fn complexity_range(&self) -> Range<i32> {
        self.complexity_range
    }

    /// Supported values for the quality tuning key.
    pub fn quality_range(&self) -> Range<i32> {
        self.quality_range
    }

    /// Default complexity when the format does not specify one.
    pub fn default_complexity(&self) -> i32 {
        self.default_complexity
    }

    /// Default quality when the format does not specify one.
    pub fn default_quality(&self) -> i32 {
        self.default_quality
    }

    /// Name of the scale the quality values are expressed in, when the
    /// codec declares one.
    pub fn quality_scale(&self) -> Option<&str> {
        self.quality_scale.as_deref()
    }

    /// Whether the encoder supports the given bitrate-control mode.
    pub fn is_bitrate_mode_supported(&self, mode: BitrateMode) -> bool {
        self.bitrate_control.contains(mode.flag())
    }

    /// Validate the encoder keys of a candidate format. Fails with
    /// [`CapsError::InvalidArgument`] when a codec-specific alias key
    /// conflicts with its generic counterpart.
    pub fn supports_format(&self, mime_type: &str, format: &FormatMap) -> Result<bool> {
        if let Some(value) = format.get_int(keys::BITRATE_MODE) {
            match BitrateMode::from_value(value) {
                Some(mode) if self.is_bitrate_mode_supported(mode) => {}
                _ => return Ok(false),
            }
        }

        let mut complexity = format.get_int(keys::COMPLEXITY);
        if mime::equals(mime_type, mime::AUDIO_FLAC) {
            let flac_level = format.get_int(keys::FLAC_COMPRESSION_LEVEL);
            match (complexity, flac_level) {
                (Some(c), Some(f)) if c != f => {
                    return Err(CapsError::InvalidArgument(format!(
                        "conflicting complexity {c} and flac-compression-level {f}"
                    )));
                }
                (None, Some(f)) => complexity = Some(f),
                _ => {}
            }
        }
        if let Some(c) = complexity {
            if !self.complexity_range.contains(c.clamp(i32::MIN as i64, i32::MAX as i64) as i32) {
                return Ok(false);
            }
        }

        if mime::equals(mime_type, mime::AUDIO_AAC) {
            let profile = format.get_int(keys::PROFILE);
            let aac_profile = format.get_int(keys::AAC_PROFILE);
            if let (Some(p), Some(a)) = (profile, aac_profile) {
                if p != a {
                    return Err(CapsError::InvalidArgument(format!(
                        "conflicting profile {p} and aac-profile {a}"
                    )));
                }
            }
        }

        if let Some(q) = format.get_int(keys::QUALITY) {
            if !self.quality_range.contains(q.clamp(i32::MIN as i64, i32::MAX as i64) as i32) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn apply_format_limits(&mut self, mime_type: &str) {
        if mime::equals(mime_type, mime::AUDIO_FLAC) {
            self.complexity_range = Range::new_unchecked(0, 8);
            self.default_complexity = 5;
            self.bitrate_control = BitrateModes::CQ;
        } else if mime::equals(mime_type, mime::AUDIO_AMR_NB)
            || mime::equals(mime_type, mime::AUDIO_AMR_WB)
            || mime::equals(mime_type, mime::AUDIO_G711_ALAW)
            || mime::equals(mime_type, mime::AUDIO_G711_MLAW)
            || mime::equals(mime_type, mime::AUDIO_GSM)
        {
            self.bitrate_control = BitrateModes::CBR;
        }
    }

    fn parse_from_info(&mut self, attrs: &FormatMap) -> Result<()> {
        if let Some(s) = attrs.get_str(keys::COMPLEXITY_RANGE) {
            self.complexity_range = format::parse_int_range(keys::COMPLEXITY_RANGE, s)?;
        }
        if let Some(s) = attrs.get_str(keys::QUALITY_RANGE) {
            self.quality_range = format::parse_int_range(keys::QUALITY_RANGE, s)?;
        }
        if let Some(s) = attrs.get_str(keys::FEATURE_BITRATE_CONTROL) {
            let mut modes = BitrateModes::empty();
            for token in s.split(',') {
                match BitrateMode::from_token(token) {
                    Some(mode) => modes |= mode.flag(),
                    None => tracing::warn!(token, "unrecognized bitrate-control mode"),
                }
            }
            if !modes.is_empty() {
                self.bitrate_control = modes;
            }
        }
        if let Some(v) = attrs.get_int(keys::COMPLEXITY_DEFAULT) {
            self.default_complexity = self.complexity_range.clamp(v as i32);
        }
        if let Some(v) = attrs.get_int(keys::QUALITY_DEFAULT) {
            self.default_quality = self.quality_range.clamp(v as i32);
        }
        if let Some(s) = attrs.get_str(keys::QUALITY_SCALE) {
            self.quality_scale = Some(s.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_vbr() {
        let caps = EncoderCapabilities::new(mime::VIDEO_AVC, &FormatMap::new()).unwrap();
        assert!(caps.is_bitrate_mode_supported(BitrateMode::Variable));
        assert!(!caps.is_bitrate_mode_supported(BitrateMode::Constant));
    }

    #[test]
    fn flac_is_constant_quality_with_compression_levels() {
        let caps = EncoderCapabilities::new(mime::AUDIO_FLAC, &FormatMap::new()).unwrap();
        assert!(caps.is_bitrate_mode_supported(BitrateMode::ConstantQuality));
        assert!(!caps.is_bitrate_mode_supported(BitrateMode::Variable));
        assert_eq!(caps.complexity_range(), Range::new(0, 8).unwrap());
        assert_eq!(caps.default_complexity(), 5);
    }

    #[test]
    fn amr_is_constant_bitrate_only() {
        let caps = EncoderCapabilities::new(mime::AUDIO_AMR_NB, &FormatMap::new()).unwrap();
        assert!(caps.is_bitrate_mode_supported(BitrateMode::Constant));
        assert!(!caps.is_bitrate_mode_supported(BitrateMode::Variable));
    }

    #[test]
    fn declared_modes_replace_the_default() {
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::FEATURE_BITRATE_CONTROL, "VBR,CBR,cbr-fd,bogus");
        let caps = EncoderCapabilities::new(mime::VIDEO_AVC, &attrs).unwrap();
        assert!(caps.is_bitrate_mode_supported(BitrateMode::Constant));
        assert!(caps.is_bitrate_mode_supported(BitrateMode::ConstantWithFrameDrops));
        assert!(!caps.is_bitrate_mode_supported(BitrateMode::ConstantQuality));
    }

    #[test]
    fn flac_alias_must_agree_with_complexity() {
        let caps = EncoderCapabilities::new(mime::AUDIO_FLAC, &FormatMap::new()).unwrap();
        let mut format = FormatMap::new();
        format.set_int(keys::FLAC_COMPRESSION_LEVEL, 5);
        assert!(caps.supports_format(mime::AUDIO_FLAC, &format).unwrap());
        format.set_int(keys::COMPLEXITY, 5);
        assert!(caps.supports_format(mime::AUDIO_FLAC, &format).unwrap());
        format.set_int(keys::COMPLEXITY, 3);
        assert!(matches!(
            caps.supports_format(mime::AUDIO_FLAC, &format),
            Err(CapsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn aac_alias_must_agree_with_profile() {
        let caps = EncoderCapabilities::new(mime::AUDIO_AAC, &FormatMap::new()).unwrap();
        let mut format = FormatMap::new();
        format.set_int(keys::PROFILE, 2).set_int(keys::AAC_PROFILE, 5);
        assert!(caps.supports_format(mime::AUDIO_AAC, &format).is_err());
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::QUALITY_RANGE, "0-100").set_int(keys::QUALITY_DEFAULT, 80);
        let caps = EncoderCapabilities::new(mime::AUDIO_VORBIS, &attrs).unwrap();
        assert_eq!(caps.default_quality(), 80);
        let mut format = FormatMap::new();
        format.set_int(keys::QUALITY, 50);
        assert!(caps.supports_format(mime::AUDIO_VORBIS, &format).unwrap());
        format.set_int(keys::QUALITY, 120);
        assert!(!caps.supports_format(mime::AUDIO_VORBIS, &format).unwrap());
    }
}
