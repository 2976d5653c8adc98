//! Per-standard profile/level performance tables.
//!
//! Each codec standard defines, per (profile, level) pair, the maximum
//! block count, block throughput, bitrate and frame dimensions a conformant
//! decoder must sustain. The tables here are pure data; evaluation is a
//! lookup-and-accumulate fold over a codec's declared pairs that yields the
//! componentwise maxima together with diagnostic [`ErrorFlags`].
//!
//! Anomalies are never fatal: an unrecognized or unsupported entry is
//! recorded in the flags and evaluation continues, so codecs declaring
//! exotic profiles still produce usable capability objects. The aggregator
//! consults the flags to decide whether device-supplied overrides replace
//! or merely narrow the table-derived limits.

pub(crate) mod avc;
pub(crate) mod h263;
pub(crate) mod hevc;
pub(crate) mod mpeg2;
pub(crate) mod mpeg4;
pub(crate) mod vp8;
pub(crate) mod vp9;

use crate::mime;
use crate::profile::ProfileLevel;
use mediacaps_core::FormatMap;

bitflags::bitflags! {
    /// Non-fatal diagnostics accumulated while evaluating a codec's
    /// declared profile/level list. Recorded, never thrown; consulted by
    /// the override-precedence step of capability aggregation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ErrorFlags: u32 {
        /// A declared profile or level value is not in the standard table.
        const UNRECOGNIZED = 1 << 0;
        /// A declared profile is recognized but the platform declines to
        /// support it.
        const UNSUPPORTED = 1 << 1;
        /// No declared profile/level pair was actually supported.
        const NONE_SUPPORTED = 1 << 2;
    }
}

/// How the standard constrains the frame-rate range.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FrameRateRule {
    /// Narrow the platform range to `[min, max]`.
    Intersect { min: i32, max: i32 },
    /// Replace the platform range with `[min, max]`.
    Replace { min: i32, max: i32 },
}

/// Standard-derived performance limits, prior to merging with device
/// overrides. Block counts are expressed in `block_width x block_height`
/// units.
#[derive(Debug, Clone)]
pub(crate) struct StandardLimits {
    pub block_width: i32,
    pub block_height: i32,
    pub width_alignment: i32,
    pub height_alignment: i32,
    pub min_horizontal_blocks: i32,
    pub min_vertical_blocks: i32,
    pub max_horizontal_blocks: i32,
    pub max_vertical_blocks: i32,
    pub max_blocks: i64,
    pub max_blocks_per_second: i64,
    pub max_bitrate_bps: i64,
    pub frame_rate: Option<FrameRateRule>,
    /// Device-supplied overrides may replace (not just narrow) the limits.
    /// Raised by H.263 non-strict profile/level declarations.
    pub allow_mb_override: bool,
    pub errors: ErrorFlags,
}

impl StandardLimits {
    /// Limits in macroblock units with no minimum-size or frame-rate rule.
    pub(crate) fn macroblocks(
        max_length_in_blocks: i32,
        max_blocks: i64,
        max_blocks_per_second: i64,
        max_bitrate_bps: i64,
        errors: ErrorFlags,
    ) -> Self {
        Self {
            block_width: 16,
            block_height: 16,
            width_alignment: 1,
            height_alignment: 1,
            min_horizontal_blocks: 1,
            min_vertical_blocks: 1,
            max_horizontal_blocks: max_length_in_blocks,
            max_vertical_blocks: max_length_in_blocks,
            max_blocks,
            max_blocks_per_second,
            max_bitrate_bps,
            frame_rate: None,
            allow_mb_override: false,
            errors,
        }
    }
}

/// Seed flags for a declared list: an empty list has nothing to support,
/// a non-empty one is pessimistically unsupported until an entry clears it.
pub(crate) fn seed_flags(declared: &[ProfileLevel]) -> ErrorFlags {
    if declared.is_empty() {
        ErrorFlags::empty()
    } else {
        ErrorFlags::NONE_SUPPORTED
    }
}

/// Evaluate the standard table for `mime` over the declared profile/level
/// list. Returns `None` for media types without a known table; the
/// aggregator then records [`ErrorFlags::UNSUPPORTED`] and keeps platform
/// limits.
pub(crate) fn evaluate(
    mime_type: &str,
    declared: &[ProfileLevel],
    attrs: &FormatMap,
) -> Option<StandardLimits> {
    if mime::equals(mime_type, mime::VIDEO_AVC) {
        Some(avc::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_HEVC) {
        Some(hevc::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_MPEG2) {
        Some(mpeg2::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_MPEG4) {
        Some(mpeg4::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_H263) {
        Some(h263::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_VP8) {
        Some(vp8::limits(declared))
    } else if mime::equals(mime_type, mime::VIDEO_VP9) {
        Some(vp9::limits(declared, attrs))
    } else {
        None
    }
}
