//! H.263 level table (ITU-T H.263 Annex X).
//!
//! The lower levels (10 through 40, and 45 under the Baseline and Backward
//! Compatible profiles) are strict: they enumerate the sQCIF/QCIF/CIF
//! grid, so the derived ranges pin a minimum size and a 16-pixel grid.
//! Non-strict levels permit custom frame sizes; declaring one raises the
//! allow-macroblock-override flag so device-supplied size ranges can
//! replace the table-derived limits. Level 45 implying only Level 10 is
//! handled by the support check.

use super::{seed_flags, ErrorFlags, FrameRateRule, StandardLimits};
use crate::profile::{h263::*, ProfileLevel};

/// Per-level row: max frame rate, frame width/height in macroblocks, max
/// bitrate in units of 64 kbps.
struct Entry {
    level: i32,
    frame_rate: i32,
    width_mbs: i32,
    height_mbs: i32,
    bitrate_units: i64,
    strictness: Strictness,
}

#[derive(Clone, Copy, PartialEq)]
enum Strictness {
    /// Only the enumerated picture formats are allowed.
    Strict,
    /// Strict only under Baseline / Backward Compatible profiles.
    StrictForBaseline,
    /// Custom picture formats are allowed.
    Custom,
}

#[rustfmt::skip]
const ENTRIES: &[Entry] = &[
    Entry { level: LEVEL_10, frame_rate: 15, width_mbs: 11, height_mbs:  9, bitrate_units:   1, strictness: Strictness::Strict },
    Entry { level: LEVEL_20, frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_units:   2, strictness: Strictness::Strict },
    Entry { level: LEVEL_30, frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_units:   6, strictness: Strictness::Strict },
    Entry { level: LEVEL_40, frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_units:  32, strictness: Strictness::Strict },
    Entry { level: LEVEL_45, frame_rate: 15, width_mbs: 11, height_mbs:  9, bitrate_units:   2, strictness: Strictness::StrictForBaseline },
    Entry { level: LEVEL_50, frame_rate: 60, width_mbs: 22, height_mbs: 18, bitrate_units:  64, strictness: Strictness::Custom },
    Entry { level: LEVEL_60, frame_rate: 60, width_mbs: 45, height_mbs: 18, bitrate_units: 128, strictness: Strictness::Custom },
    Entry { level: LEVEL_70, frame_rate: 60, width_mbs: 45, height_mbs: 36, bitrate_units: 256, strictness: Strictness::Custom },
];

const RECOGNIZED_PROFILES: &[i32] = &[
    PROFILE_BASELINE,
    PROFILE_H320_CODING,
    PROFILE_BACKWARD_COMPATIBLE,
    PROFILE_ISWV2,
    PROFILE_ISWV3,
    PROFILE_HIGH_COMPRESSION,
    PROFILE_INTERNET,
    PROFILE_INTERLACE,
    PROFILE_HIGH_LATENCY,
];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // QCIF floor
    let mut max_width_mbs: i32 = 11;
    let mut max_height_mbs: i32 = 9;
    // sQCIF is the smallest enumerated format (128x96)
    let mut min_width_mbs: i32 = 8;
    let mut min_height_mbs: i32 = 6;
    let mut max_rate: i32 = 15;
    let mut max_blocks: i64 = 11 * 9;
    let mut max_blocks_per_second: i64 = 15 * 11 * 9;
    let mut max_bps: i64 = 64_000;
    let mut allow_mb_override = false;

    for pl in declared {
        if !RECOGNIZED_PROFILES.contains(&pl.profile) {
            tracing::warn!(profile = pl.profile, "unrecognized H.263 profile");
            errors |= ErrorFlags::UNRECOGNIZED;
        }
        match ENTRIES.iter().find(|e| e.level == pl.level) {
            Some(e) => {
                errors.remove(ErrorFlags::NONE_SUPPORTED);
                let strict = match e.strictness {
                    Strictness::Strict => true,
                    Strictness::StrictForBaseline => {
                        pl.profile == PROFILE_BASELINE
                            || pl.profile == PROFILE_BACKWARD_COMPATIBLE
                    }
                    Strictness::Custom => false,
                };
                if !strict {
                    // custom frame sizes allowed: drop the grid minimum and
                    // let device overrides replace the derived limits
                    min_width_mbs = 1;
                    min_height_mbs = 1;
                    allow_mb_override = true;
                }
                let blocks = (e.width_mbs as i64) * (e.height_mbs as i64);
                max_blocks = max_blocks.max(blocks);
                max_blocks_per_second = max_blocks_per_second.max(e.frame_rate as i64 * blocks);
                max_bps = max_bps.max(e.bitrate_units * 64_000);
                max_width_mbs = max_width_mbs.max(e.width_mbs);
                max_height_mbs = max_height_mbs.max(e.height_mbs);
                max_rate = max_rate.max(e.frame_rate);
            }
            None => {
                tracing::warn!(level = pl.level, "unrecognized H.263 level");
                errors |= ErrorFlags::UNRECOGNIZED;
            }
        }
    }

    let alignment = if allow_mb_override { 4 } else { 16 };
    StandardLimits {
        block_width: 16,
        block_height: 16,
        width_alignment: alignment,
        height_alignment: alignment,
        min_horizontal_blocks: min_width_mbs,
        min_vertical_blocks: min_height_mbs,
        max_horizontal_blocks: max_width_mbs,
        max_vertical_blocks: max_height_mbs,
        max_blocks,
        max_blocks_per_second,
        max_bitrate_bps: max_bps,
        frame_rate: Some(FrameRateRule::Replace { min: 1, max: max_rate }),
        allow_mb_override,
        errors,
    }
}
