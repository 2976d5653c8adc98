//! MPEG-4 part 2 profile/level table (ISO/IEC 14496-2 Annex N).
//!
//! Only the Simple and Advanced Simple profiles have supported rows; the
//! remaining profiles (including the studio ones) are recognized but
//! unsupported. Level 1 implying only Level 0 (not 0b) is handled by the
//! support check, not here.

use super::{seed_flags, ErrorFlags, FrameRateRule, StandardLimits};
use crate::profile::{mpeg4::*, ProfileLevel};

struct Entry {
    profile: i32,
    level: i32,
    frame_rate: i32,
    width_mbs: i32,
    height_mbs: i32,
    bitrate_kbps: i64,
}

#[rustfmt::skip]
const ENTRIES: &[Entry] = &[
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_0,  frame_rate: 15, width_mbs: 11, height_mbs:  9, bitrate_kbps:     64 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_0B, frame_rate: 15, width_mbs: 11, height_mbs:  9, bitrate_kbps:    128 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_1,  frame_rate: 30, width_mbs: 11, height_mbs:  9, bitrate_kbps:     64 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_2,  frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_kbps:    128 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_3,  frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_kbps:    384 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_4A, frame_rate: 30, width_mbs: 40, height_mbs: 30, bitrate_kbps:  4_000 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_5,  frame_rate: 30, width_mbs: 45, height_mbs: 36, bitrate_kbps:  8_000 },
    Entry { profile: PROFILE_SIMPLE,          level: LEVEL_6,  frame_rate: 30, width_mbs: 80, height_mbs: 45, bitrate_kbps: 12_000 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_0,  frame_rate: 30, width_mbs: 11, height_mbs:  9, bitrate_kbps:    128 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_1,  frame_rate: 30, width_mbs: 11, height_mbs:  9, bitrate_kbps:    128 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_2,  frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_kbps:    384 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_3,  frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_kbps:    768 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_3B, frame_rate: 30, width_mbs: 22, height_mbs: 18, bitrate_kbps:  1_500 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_4,  frame_rate: 30, width_mbs: 44, height_mbs: 36, bitrate_kbps:  3_000 },
    Entry { profile: PROFILE_ADVANCED_SIMPLE, level: LEVEL_5,  frame_rate: 30, width_mbs: 45, height_mbs: 36, bitrate_kbps:  8_000 },
];

const UNSUPPORTED_PROFILES: &[i32] = &[
    PROFILE_MAIN,
    PROFILE_CORE,
    PROFILE_SIMPLE_SCALABLE,
    PROFILE_NBIT,
    PROFILE_SCALABLE_TEXTURE,
    PROFILE_SIMPLE_FACE,
    PROFILE_SIMPLE_FBA,
    PROFILE_BASIC_ANIMATED,
    PROFILE_HYBRID,
    PROFILE_ADVANCED_REALTIME,
    PROFILE_CORE_SCALABLE,
    PROFILE_ADVANCED_CODING,
    PROFILE_ADVANCED_CORE,
    PROFILE_ADVANCED_SCALABLE,
];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // Simple profile level 0 floor
    let mut max_width_mbs: i32 = 11;
    let mut max_height_mbs: i32 = 9;
    let mut max_rate: i32 = 15;
    let mut max_blocks: i64 = 11 * 9;
    let mut max_blocks_per_second: i64 = 15 * 11 * 9;
    let mut max_bps: i64 = 64_000;

    for pl in declared {
        if let Some(e) = ENTRIES
            .iter()
            .find(|e| e.profile == pl.profile && e.level == pl.level)
        {
            errors.remove(ErrorFlags::NONE_SUPPORTED);
            let blocks = (e.width_mbs as i64) * (e.height_mbs as i64);
            max_blocks = max_blocks.max(blocks);
            max_blocks_per_second = max_blocks_per_second.max(e.frame_rate as i64 * blocks);
            max_bps = max_bps.max(e.bitrate_kbps * 1_000);
            max_width_mbs = max_width_mbs.max(e.width_mbs);
            max_height_mbs = max_height_mbs.max(e.height_mbs);
            max_rate = max_rate.max(e.frame_rate);
        } else if UNSUPPORTED_PROFILES.contains(&pl.profile) {
            tracing::warn!(profile = pl.profile, "unsupported MPEG-4 profile");
            errors |= ErrorFlags::UNSUPPORTED;
        } else {
            tracing::warn!(
                profile = pl.profile,
                level = pl.level,
                "unrecognized MPEG-4 profile/level"
            );
            errors |= ErrorFlags::UNRECOGNIZED;
        }
    }

    StandardLimits {
        max_horizontal_blocks: max_width_mbs,
        max_vertical_blocks: max_height_mbs,
        frame_rate: Some(FrameRateRule::Intersect { min: 12, max: max_rate }),
        ..StandardLimits::macroblocks(0, max_blocks, max_blocks_per_second, max_bps, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_level3_limits() {
        let lim = limits(&[ProfileLevel::new(PROFILE_SIMPLE, LEVEL_3)]);
        assert_eq!(lim.max_blocks, 22 * 18);
        assert_eq!(lim.max_bitrate_bps, 384_000);
        assert!(lim.errors.is_empty());
    }

    #[test]
    fn advanced_simple_level3b() {
        let lim = limits(&[ProfileLevel::new(PROFILE_ADVANCED_SIMPLE, LEVEL_3B)]);
        assert_eq!(lim.max_bitrate_bps, 1_500_000);
    }

    #[test]
    fn main_profile_is_unsupported() {
        let lim = limits(&[ProfileLevel::new(PROFILE_MAIN, LEVEL_2)]);
        assert!(lim.errors.contains(ErrorFlags::UNSUPPORTED));
    }
}
