//! H.264 / AVC level table (ITU-T H.264 Table A-1).

use super::{seed_flags, ErrorFlags, StandardLimits};
use crate::profile::{avc::*, ProfileLevel};

/// Per-level limits: max macroblocks per second, max frame size in
/// macroblocks, max video bitrate in kbps (scaled per profile below).
struct LevelLimit {
    level: i32,
    mbps: i64,
    frame_blocks: i64,
    bitrate_kbps: i64,
}

#[rustfmt::skip]
const LEVEL_LIMITS: &[LevelLimit] = &[
    LevelLimit { level: LEVEL_1,  mbps:     1_485, frame_blocks:      99, bitrate_kbps:      64 },
    LevelLimit { level: LEVEL_1B, mbps:     1_485, frame_blocks:      99, bitrate_kbps:     128 },
    LevelLimit { level: LEVEL_11, mbps:     3_000, frame_blocks:     396, bitrate_kbps:     192 },
    LevelLimit { level: LEVEL_12, mbps:     6_000, frame_blocks:     396, bitrate_kbps:     384 },
    LevelLimit { level: LEVEL_13, mbps:    11_880, frame_blocks:     396, bitrate_kbps:     768 },
    LevelLimit { level: LEVEL_2,  mbps:    11_880, frame_blocks:     396, bitrate_kbps:   2_000 },
    LevelLimit { level: LEVEL_21, mbps:    19_800, frame_blocks:     792, bitrate_kbps:   4_000 },
    LevelLimit { level: LEVEL_22, mbps:    20_250, frame_blocks:   1_620, bitrate_kbps:   4_000 },
    LevelLimit { level: LEVEL_3,  mbps:    40_500, frame_blocks:   1_620, bitrate_kbps:  10_000 },
    LevelLimit { level: LEVEL_31, mbps:   108_000, frame_blocks:   3_600, bitrate_kbps:  14_000 },
    LevelLimit { level: LEVEL_32, mbps:   216_000, frame_blocks:   5_120, bitrate_kbps:  20_000 },
    LevelLimit { level: LEVEL_4,  mbps:   245_760, frame_blocks:   8_192, bitrate_kbps:  20_000 },
    LevelLimit { level: LEVEL_41, mbps:   245_760, frame_blocks:   8_192, bitrate_kbps:  50_000 },
    LevelLimit { level: LEVEL_42, mbps:   522_240, frame_blocks:   8_704, bitrate_kbps:  50_000 },
    LevelLimit { level: LEVEL_5,  mbps:   589_824, frame_blocks:  22_080, bitrate_kbps: 135_000 },
    LevelLimit { level: LEVEL_51, mbps:   983_040, frame_blocks:  36_864, bitrate_kbps: 240_000 },
    LevelLimit { level: LEVEL_52, mbps: 2_073_600, frame_blocks:  36_864, bitrate_kbps: 240_000 },
    LevelLimit { level: LEVEL_6,  mbps: 4_177_920, frame_blocks: 139_264, bitrate_kbps: 240_000 },
    LevelLimit { level: LEVEL_61, mbps: 8_355_840, frame_blocks: 139_264, bitrate_kbps: 480_000 },
    LevelLimit { level: LEVEL_62, mbps: 16_711_680, frame_blocks: 139_264, bitrate_kbps: 800_000 },
];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // seed with Level 1 so an all-unrecognized list still yields a floor
    let mut max_blocks: i64 = 99;
    let mut max_blocks_per_second: i64 = 1_485;
    let mut max_bps: i64 = 64_000;

    for pl in declared {
        let (mut mbps, mut fs, mut br) = (0i64, 0i64, 0i64);
        let mut supported = true;

        match LEVEL_LIMITS.iter().find(|l| l.level == pl.level) {
            Some(l) => {
                mbps = l.mbps;
                fs = l.frame_blocks;
                br = l.bitrate_kbps;
            }
            None => {
                tracing::warn!(level = pl.level, "unrecognized AVC level");
                errors |= ErrorFlags::UNRECOGNIZED;
            }
        }

        // the per-profile bitrate multiplier folds the cpbBrVclFactor scale
        // into bits per second
        match pl.profile {
            PROFILE_HIGH | PROFILE_CONSTRAINED_HIGH => br *= 1_250,
            PROFILE_HIGH_10 => br *= 3_000,
            PROFILE_EXTENDED | PROFILE_HIGH_422 | PROFILE_HIGH_444 => {
                tracing::warn!(profile = pl.profile, "unsupported AVC profile");
                errors |= ErrorFlags::UNSUPPORTED;
                supported = false;
                br *= 1_000;
            }
            PROFILE_BASELINE | PROFILE_CONSTRAINED_BASELINE | PROFILE_MAIN => br *= 1_000,
            _ => {
                tracing::warn!(profile = pl.profile, "unrecognized AVC profile");
                errors |= ErrorFlags::UNRECOGNIZED;
                br *= 1_000;
            }
        }

        if supported {
            errors.remove(ErrorFlags::NONE_SUPPORTED);
        }
        max_blocks_per_second = max_blocks_per_second.max(mbps);
        max_blocks = max_blocks.max(fs);
        max_bps = max_bps.max(br);
    }

    // a frame may stretch one dimension up to sqrt(8 * max frame size)
    let max_length_in_blocks = ((8.0 * max_blocks as f64).sqrt()) as i32;
    StandardLimits::macroblocks(
        max_length_in_blocks,
        max_blocks,
        max_blocks_per_second,
        max_bps,
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_level31_limits() {
        let lim = limits(&[ProfileLevel::new(PROFILE_BASELINE, LEVEL_31)]);
        assert_eq!(lim.max_blocks, 3_600);
        assert_eq!(lim.max_blocks_per_second, 108_000);
        assert_eq!(lim.max_bitrate_bps, 14_000_000);
        assert!(lim.errors.is_empty());
    }

    #[test]
    fn high_profile_bitrate_multiplier() {
        let lim = limits(&[ProfileLevel::new(PROFILE_HIGH, LEVEL_41)]);
        assert_eq!(lim.max_bitrate_bps, 62_500_000);
    }

    #[test]
    fn extended_profile_flags_unsupported() {
        let lim = limits(&[ProfileLevel::new(PROFILE_EXTENDED, LEVEL_3)]);
        assert!(lim.errors.contains(ErrorFlags::UNSUPPORTED));
        assert!(lim.errors.contains(ErrorFlags::NONE_SUPPORTED));
    }

    #[test]
    fn componentwise_maximum_across_entries() {
        let lim = limits(&[
            ProfileLevel::new(PROFILE_BASELINE, LEVEL_52),
            ProfileLevel::new(PROFILE_HIGH, LEVEL_4),
        ]);
        // blocks from 5.2, bitrate from High at 4.0 (20000 * 1250)
        assert_eq!(lim.max_blocks, 36_864);
        assert_eq!(lim.max_bitrate_bps, 240_000_000);
        assert_eq!(lim.max_blocks_per_second, 2_073_600);
    }
}
