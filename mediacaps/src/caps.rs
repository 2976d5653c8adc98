//! Per-(codec, media type) capability aggregate and format matcher.
//!
//! A [`CodecCapabilities`] owns exactly one of audio or video capabilities
//! (by media-type family) plus encoder capabilities when the codec is an
//! encoder, together with the declared profile/level list, color formats,
//! feature flags and the diagnostic flags accumulated during construction.
//! [`CodecCapabilities::supports_format`] is the negotiation entry point:
//! unsupported configurations come back as `false`, errors are reserved
//! for malformed queries.

use crate::audio::AudioCapabilities;
use crate::encoder::EncoderCapabilities;
use crate::mime;
use crate::profile::ProfileLevel;
use crate::video::VideoCapabilities;
use mediacaps_core::format::keys;
use mediacaps_core::{FormatMap, Range, Result};

pub use crate::levels::ErrorFlags;

const DEFAULT_MAX_SUPPORTED_INSTANCES: i64 = 32;
const MAX_SUPPORTED_INSTANCES_LIMIT: Range<i64> = Range::new_unchecked(1, 256);

/// A named codec feature a component can support and possibly require.
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    /// Name as it appears after the `feature-` key prefix.
    pub name: &'static str,
    /// Whether a codec requiring this feature still counts as a regular
    /// codec.
    pub default: bool,
    value: u32,
}

impl Feature {
    const fn new(name: &'static str, bit: u32, default: bool) -> Self {
        Self {
            name,
            default,
            value: 1 << bit,
        }
    }
}

/// Features meaningful for decoders.
pub const DECODER_FEATURES: &[Feature] = &[
    Feature::new("adaptive-playback", 0, true),
    Feature::new("secure-playback", 1, false),
    Feature::new("tunneled-playback", 2, false),
    Feature::new("dynamic-timestamp", 3, false),
    Feature::new("frame-parsing", 4, false),
    Feature::new("multiple-frames", 5, false),
    Feature::new("partial-frame", 6, false),
    Feature::new("low-latency", 7, false),
];

/// Features meaningful for encoders.
pub const ENCODER_FEATURES: &[Feature] = &[
    Feature::new("intra-refresh", 0, false),
    Feature::new("qp-bounds", 1, false),
    Feature::new("dynamic-timestamp", 2, false),
    Feature::new("multiple-frames", 3, false),
];

/// Whether the effective bitrate of a candidate format, the larger of its
/// average and max bitrate keys, lies in `bitrate_range`. Formats without
/// a positive bitrate pass.
pub(crate) fn supports_bitrate(bitrate_range: &Range<i32>, format: &FormatMap) -> bool {
    let bitrate = format.get_int(keys::BITRATE);
    let max_bitrate = format.get_int(keys::MAX_BITRATE);
    let effective = match (bitrate, max_bitrate) {
        (Some(b), Some(m)) => Some(b.max(m)),
        (b, m) => b.or(m),
    };
    match effective {
        Some(b) if b > 0 => bitrate_range.contains(b.min(i32::MAX as i64) as i32),
        _ => true,
    }
}

/// The aggregated capabilities of one codec for one media type.
#[derive(Debug, Clone)]
pub struct CodecCapabilities {
    mime_type: String,
    is_encoder: bool,
    profile_levels: Vec<ProfileLevel>,
    color_formats: Vec<i32>,
    flags_supported: u32,
    flags_required: u32,
    errors: ErrorFlags,
    max_supported_instances: i32,
    audio_caps: Option<AudioCapabilities>,
    video_caps: Option<VideoCapabilities>,
    encoder_caps: Option<EncoderCapabilities>,
}

impl CodecCapabilities {
    /// Aggregate the capabilities for `mime_type` from the declared
    /// profile/level list, color formats and raw attribute map.
    /// Unrecognized or unsupported declarations are absorbed into internal
    /// diagnostics; only malformed attribute values fail.
    pub fn new(
        mime_type: &str,
        is_encoder: bool,
        profile_levels: Vec<ProfileLevel>,
        color_formats: Vec<i32>,
        attrs: &FormatMap,
    ) -> Result<Self> {
        let mut errors = ErrorFlags::empty();
        let mut audio_caps = None;
        let mut video_caps = None;
        if mime::is_video(mime_type) {
            let (caps, flags) = VideoCapabilities::new(mime_type, &profile_levels, attrs)?;
            video_caps = Some(caps);
            errors |= flags;
        } else if mime::is_audio(mime_type) {
            let (caps, flags) = AudioCapabilities::new(mime_type, attrs)?;
            audio_caps = Some(caps);
            errors |= flags;
        }
        let encoder_caps = if is_encoder {
            Some(EncoderCapabilities::new(mime_type, attrs)?)
        } else {
            None
        };

        let mut flags_supported = 0u32;
        let mut flags_required = 0u32;
        for feat in valid_features(is_encoder) {
            let key = format!("{}{}", keys::FEATURE_PREFIX, feat.name);
            if let Some(value) = attrs.get_int(&key) {
                flags_supported |= feat.value;
                if value > 0 {
                    flags_required |= feat.value;
                }
            }
        }

        let max_supported_instances = MAX_SUPPORTED_INSTANCES_LIMIT.clamp(
            attrs
                .get_int(keys::MAX_CONCURRENT_INSTANCES)
                .unwrap_or(DEFAULT_MAX_SUPPORTED_INSTANCES),
        ) as i32;

        Ok(Self {
            mime_type: mime_type.to_string(),
            is_encoder,
            profile_levels,
            color_formats,
            flags_supported,
            flags_required,
            errors,
            max_supported_instances,
            audio_caps,
            video_caps,
            encoder_caps,
        })
    }

    /// Capabilities validated for a single (profile, level) pair. `None`
    /// when the pair is not fully recognized and supported for
    /// `mime_type`.
    pub fn create_from_profile_level(
        mime_type: &str,
        profile: i32,
        level: i32,
    ) -> Option<Self> {
        let pl = ProfileLevel::new(profile, level);
        match Self::new(mime_type, true, vec![pl], Vec::new(), &FormatMap::new()) {
            Ok(caps) if caps.errors.is_empty() => Some(caps),
            _ => None,
        }
    }

    /// Media type these capabilities describe.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the codec is an encoder.
    pub fn is_encoder(&self) -> bool {
        self.is_encoder
    }

    /// Declared profile/level pairs.
    pub fn profile_levels(&self) -> &[ProfileLevel] {
        &self.profile_levels
    }

    /// Mutable access to the profile/level pairs. Mutate only a private
    /// copy obtained via [`dup`](Self::dup); the canonical instance held by
    /// a [`CodecInfo`](crate::CodecInfo) is never handed out mutably.
    pub fn profile_levels_mut(&mut self) -> &mut Vec<ProfileLevel> {
        &mut self.profile_levels
    }

    /// Supported color formats.
    pub fn color_formats(&self) -> &[i32] {
        &self.color_formats
    }

    /// Mutable access to the color formats; same contract as
    /// [`profile_levels_mut`](Self::profile_levels_mut).
    pub fn color_formats_mut(&mut self) -> &mut Vec<i32> {
        &mut self.color_formats
    }

    /// Video capabilities, for video media types.
    pub fn video_capabilities(&self) -> Option<&VideoCapabilities> {
        self.video_caps.as_ref()
    }

    /// Audio capabilities, for audio media types.
    pub fn audio_capabilities(&self) -> Option<&AudioCapabilities> {
        self.audio_caps.as_ref()
    }

    /// Encoder capabilities, for encoders.
    pub fn encoder_capabilities(&self) -> Option<&EncoderCapabilities> {
        self.encoder_caps.as_ref()
    }

    /// Maximum number of concurrent codec instances.
    pub fn max_supported_instances(&self) -> i32 {
        self.max_supported_instances
    }

    pub(crate) fn error_flags(&self) -> ErrorFlags {
        self.errors
    }

    /// The feature table that applies to this codec kind,
    /// [`DECODER_FEATURES`] or [`ENCODER_FEATURES`].
    pub fn valid_features(&self) -> &'static [Feature] {
        valid_features(self.is_encoder)
    }

    /// Whether the codec supports the named feature.
    pub fn is_feature_supported(&self, name: &str) -> bool {
        self.feature_bit(name)
            .is_some_and(|bit| self.flags_supported & bit != 0)
    }

    /// Whether the codec cannot be used without the named feature.
    pub fn is_feature_required(&self, name: &str) -> bool {
        self.feature_bit(name)
            .is_some_and(|bit| self.flags_required & bit != 0)
    }

    /// Whether every feature the codec requires is a default feature.
    pub(crate) fn is_regular(&self) -> bool {
        valid_features(self.is_encoder)
            .iter()
            .all(|feat| feat.default || self.flags_required & feat.value == 0)
    }

    /// Deep copy whose mutable arrays the caller may freely edit.
    pub fn dup(&self) -> Self {
        self.clone()
    }

    fn feature_bit(&self, name: &str) -> Option<u32> {
        valid_features(self.is_encoder)
            .iter()
            .find(|feat| feat.name == name)
            .map(|feat| feat.value)
    }

    /// Whether the declared profile/level list covers `profile` at
    /// `level`. Level implication is monotonic except for the documented
    /// exceptions: H.263 level 45 implies only level 10, MPEG-4 level 1
    /// implies only level 0, and HEVC high-tier levels are satisfied only
    /// by other high-tier declarations.
    pub fn supports_profile_level(&self, profile: i32, level: Option<i32>) -> bool {
        for pl in &self.profile_levels {
            if pl.profile != profile {
                continue;
            }
            // AAC profiles are not leveled
            let Some(level) = level else { return true };
            if mime::equals(&self.mime_type, mime::AUDIO_AAC) {
                return true;
            }
            if mime::equals(&self.mime_type, mime::VIDEO_H263)
                && pl.level != level
                && pl.level == crate::profile::h263::LEVEL_45
                && level > crate::profile::h263::LEVEL_10
            {
                continue;
            }
            if mime::equals(&self.mime_type, mime::VIDEO_MPEG4)
                && pl.level != level
                && pl.level == crate::profile::mpeg4::LEVEL_1
                && level > crate::profile::mpeg4::LEVEL_0
            {
                continue;
            }
            if mime::equals(&self.mime_type, mime::VIDEO_HEVC) {
                let supports_high_tier = crate::levels::hevc::is_high_tier(pl.level);
                let checking_high_tier = crate::levels::hevc::is_high_tier(level);
                if checking_high_tier && !supports_high_tier {
                    continue;
                }
            }
            if pl.level >= level {
                return true;
            }
        }
        false
    }

    /// Whether the codec supports a candidate format. Unsupported
    /// configurations return `Ok(false)`; errors are reserved for
    /// malformed queries such as conflicting alias keys.
    pub fn supports_format(&self, format: &FormatMap) -> Result<bool> {
        if let Some(format_mime) = format.get_str(keys::MIME) {
            if !mime::equals(format_mime, &self.mime_type) {
                return Ok(false);
            }
        }
        if self.errors.contains(ErrorFlags::NONE_SUPPORTED) {
            // nothing the codec declared was recognized as supported and no
            // override widened the limits
            return Ok(false);
        }

        for key in format.keys() {
            let Some(name) = key.strip_prefix(keys::FEATURE_PREFIX) else {
                continue;
            };
            let Some(value) = format.get_int(key) else {
                continue;
            };
            if value > 0 && !self.is_feature_supported(name) {
                return Ok(false);
            }
            if value == 0 && self.is_feature_required(name) {
                return Ok(false);
            }
        }

        let profile = format.get_int(keys::PROFILE).map(|v| v as i32);
        let level = format.get_int(keys::LEVEL).map(|v| v as i32);
        if let Some(profile) = profile {
            if !self.supports_profile_level(profile, level) {
                return Ok(false);
            }
            // validate against the most permissive level the codec declares
            // for this profile, so a profile claim cannot smuggle in a
            // resolution or bitrate that level cannot sustain
            let mut max_level = 0;
            for pl in &self.profile_levels {
                if pl.profile == profile && pl.level > max_level {
                    // level 45 only implies level 10
                    if !mime::equals(&self.mime_type, mime::VIDEO_H263)
                        || pl.level != crate::profile::h263::LEVEL_45
                        || max_level == crate::profile::h263::LEVEL_10
                    {
                        max_level = pl.level;
                    }
                }
            }
            if let Some(level_caps) =
                Self::create_from_profile_level(&self.mime_type, profile, max_level)
            {
                // strip the profile key so the recursion terminates
                if !level_caps.supports_format(&format.without(keys::PROFILE))? {
                    return Ok(false);
                }
            }
        }

        if let Some(audio) = &self.audio_caps {
            if !audio.supports_format(format) {
                return Ok(false);
            }
        }
        if let Some(video) = &self.video_caps {
            if !video.supports_format(format) {
                return Ok(false);
            }
        }
        if let Some(encoder) = &self.encoder_caps {
            if !encoder.supports_format(&self.mime_type, format)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn valid_features(is_encoder: bool) -> &'static [Feature] {
    if is_encoder {
        ENCODER_FEATURES
    } else {
        DECODER_FEATURES
    }
}
