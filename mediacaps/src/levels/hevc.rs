//! H.265 / HEVC level table (ITU-T H.265 Tables A-6/A-7).
//!
//! Levels carry a tier axis: a Main and a High row exist per level, with
//! distinct bitrate ceilings from level 4 up (below that the standard
//! defines no High-tier ceilings and the rows coincide). Tier
//! compatibility is enforced by the support check, not here; this table
//! only folds throughput maxima.

use super::{seed_flags, ErrorFlags, StandardLimits};
use crate::profile::{hevc::*, ProfileLevel};
use mediacaps_core::range::{div_up, div_up_i64};

/// Per-level limits: max frame rate at max luma size, max luma picture
/// size in samples, max bitrate in kbps.
struct LevelLimit {
    level: i32,
    frame_rate: i64,
    luma_samples: i64,
    bitrate_kbps: i64,
}

#[rustfmt::skip]
const LEVEL_LIMITS: &[LevelLimit] = &[
    LevelLimit { level: MAIN_TIER_LEVEL_1,  frame_rate:  15, luma_samples:     36_864, bitrate_kbps:     128 },
    LevelLimit { level: HIGH_TIER_LEVEL_1,  frame_rate:  15, luma_samples:     36_864, bitrate_kbps:     128 },
    LevelLimit { level: MAIN_TIER_LEVEL_2,  frame_rate:  30, luma_samples:    122_880, bitrate_kbps:   1_500 },
    LevelLimit { level: HIGH_TIER_LEVEL_2,  frame_rate:  30, luma_samples:    122_880, bitrate_kbps:   1_500 },
    LevelLimit { level: MAIN_TIER_LEVEL_21, frame_rate:  30, luma_samples:    245_760, bitrate_kbps:   3_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_21, frame_rate:  30, luma_samples:    245_760, bitrate_kbps:   3_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_3,  frame_rate:  30, luma_samples:    552_960, bitrate_kbps:   6_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_3,  frame_rate:  30, luma_samples:    552_960, bitrate_kbps:   6_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_31, frame_rate:  30, luma_samples:    983_040, bitrate_kbps:  10_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_31, frame_rate:  30, luma_samples:    983_040, bitrate_kbps:  10_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_4,  frame_rate:  30, luma_samples:  2_228_224, bitrate_kbps:  12_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_4,  frame_rate:  30, luma_samples:  2_228_224, bitrate_kbps:  30_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_41, frame_rate:  60, luma_samples:  2_228_224, bitrate_kbps:  20_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_41, frame_rate:  60, luma_samples:  2_228_224, bitrate_kbps:  50_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_5,  frame_rate:  60, luma_samples:  8_912_896, bitrate_kbps:  25_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_5,  frame_rate:  60, luma_samples:  8_912_896, bitrate_kbps: 100_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_51, frame_rate: 120, luma_samples:  8_912_896, bitrate_kbps:  40_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_51, frame_rate: 120, luma_samples:  8_912_896, bitrate_kbps: 160_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_52, frame_rate: 240, luma_samples:  8_912_896, bitrate_kbps:  60_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_52, frame_rate: 240, luma_samples:  8_912_896, bitrate_kbps: 240_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_6,  frame_rate: 120, luma_samples: 35_651_584, bitrate_kbps:  60_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_6,  frame_rate: 120, luma_samples: 35_651_584, bitrate_kbps: 240_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_61, frame_rate: 240, luma_samples: 35_651_584, bitrate_kbps: 120_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_61, frame_rate: 240, luma_samples: 35_651_584, bitrate_kbps: 480_000 },
    LevelLimit { level: MAIN_TIER_LEVEL_62, frame_rate: 480, luma_samples: 35_651_584, bitrate_kbps: 240_000 },
    LevelLimit { level: HIGH_TIER_LEVEL_62, frame_rate: 480, luma_samples: 35_651_584, bitrate_kbps: 800_000 },
];

const RECOGNIZED_PROFILES: &[i32] = &[
    PROFILE_MAIN,
    PROFILE_MAIN_10,
    PROFILE_MAIN_STILL,
    PROFILE_MAIN_10_HDR10,
    PROFILE_MAIN_10_HDR10_PLUS,
];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // level 1 floor
    let mut max_luma_samples: i64 = 36_864;
    let mut max_samples_per_second: i64 = 15 * 36_864;
    let mut max_bps: i64 = 128_000;

    for pl in declared {
        let mut supported = true;
        match LEVEL_LIMITS.iter().find(|l| l.level == pl.level) {
            Some(l) => {
                max_samples_per_second = max_samples_per_second.max(l.frame_rate * l.luma_samples);
                max_luma_samples = max_luma_samples.max(l.luma_samples);
                max_bps = max_bps.max(l.bitrate_kbps * 1_000);
            }
            None => {
                tracing::warn!(level = pl.level, "unrecognized HEVC level");
                errors |= ErrorFlags::UNRECOGNIZED;
                supported = false;
            }
        }
        if !RECOGNIZED_PROFILES.contains(&pl.profile) {
            tracing::warn!(profile = pl.profile, "unrecognized HEVC profile");
            errors |= ErrorFlags::UNRECOGNIZED;
            supported = false;
        }
        if supported {
            errors.remove(ErrorFlags::NONE_SUPPORTED);
        }
    }

    // coding tree blocks are at least 8x8, so express limits in 8x8 units
    let max_blocks = div_up_i64(max_luma_samples, 8 * 8);
    let max_blocks_per_second = div_up_i64(max_samples_per_second, 8 * 8);
    let max_length_in_blocks = div_up(((8.0 * max_luma_samples as f64).sqrt()) as i32, 8);

    StandardLimits {
        block_width: 8,
        block_height: 8,
        width_alignment: 1,
        height_alignment: 1,
        min_horizontal_blocks: 1,
        min_vertical_blocks: 1,
        max_horizontal_blocks: max_length_in_blocks,
        max_vertical_blocks: max_length_in_blocks,
        max_blocks,
        max_blocks_per_second,
        max_bitrate_bps: max_bps,
        frame_rate: None,
        allow_mb_override: false,
        errors,
    }
}

/// Whether a level constant names a High-tier level.
pub fn is_high_tier(level: i32) -> bool {
    (level & HIGH_TIER_LEVELS) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_tier_level_41_limits() {
        let lim = limits(&[ProfileLevel::new(PROFILE_MAIN, MAIN_TIER_LEVEL_41)]);
        assert_eq!(lim.max_blocks, div_up_i64(2_228_224, 64));
        assert_eq!(lim.max_bitrate_bps, 20_000_000);
        assert!(lim.errors.is_empty());
    }

    #[test]
    fn high_tier_raises_bitrate_ceiling() {
        let main = limits(&[ProfileLevel::new(PROFILE_MAIN, MAIN_TIER_LEVEL_5)]);
        let high = limits(&[ProfileLevel::new(PROFILE_MAIN, HIGH_TIER_LEVEL_5)]);
        assert_eq!(main.max_bitrate_bps, 25_000_000);
        assert_eq!(high.max_bitrate_bps, 100_000_000);
    }

    #[test]
    fn tier_classification() {
        assert!(is_high_tier(HIGH_TIER_LEVEL_41));
        assert!(!is_high_tier(MAIN_TIER_LEVEL_41));
    }

    #[test]
    fn unknown_profile_is_recorded_not_fatal() {
        let lim = limits(&[ProfileLevel::new(0x4000, MAIN_TIER_LEVEL_3)]);
        assert!(lim.errors.contains(ErrorFlags::UNRECOGNIZED));
        assert!(lim.errors.contains(ErrorFlags::NONE_SUPPORTED));
    }
}
