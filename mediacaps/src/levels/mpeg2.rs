//! MPEG-2 profile/level table (ISO/IEC 13818-2 Table 8-13).

use super::{seed_flags, ErrorFlags, FrameRateRule, StandardLimits};
use crate::profile::{mpeg2::*, ProfileLevel};

/// Per (profile, level): max frame rate, frame width/height in
/// macroblocks, max bitrate in kbps.
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
    Entry { profile: PROFILE_SIMPLE, level: LEVEL_ML,  frame_rate: 30, width_mbs:  45, height_mbs: 36, bitrate_kbps: 15_000 },
    Entry { profile: PROFILE_MAIN,   level: LEVEL_LL,  frame_rate: 30, width_mbs:  22, height_mbs: 18, bitrate_kbps:  4_000 },
    Entry { profile: PROFILE_MAIN,   level: LEVEL_ML,  frame_rate: 30, width_mbs:  45, height_mbs: 36, bitrate_kbps: 15_000 },
    Entry { profile: PROFILE_MAIN,   level: LEVEL_H14, frame_rate: 60, width_mbs:  90, height_mbs: 68, bitrate_kbps: 60_000 },
    Entry { profile: PROFILE_MAIN,   level: LEVEL_HL,  frame_rate: 60, width_mbs: 120, height_mbs: 68, bitrate_kbps: 80_000 },
    Entry { profile: PROFILE_MAIN,   level: LEVEL_HP,  frame_rate: 60, width_mbs: 120, height_mbs: 68, bitrate_kbps: 80_000 },
];

/// Recognized but not supported: scalable and studio-oriented profiles.
const UNSUPPORTED_PROFILES: &[i32] = &[PROFILE_422, PROFILE_SNR, PROFILE_SPATIAL, PROFILE_HIGH];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // LL floor
    let mut max_width_mbs: i32 = 22;
    let mut max_height_mbs: i32 = 18;
    let mut max_rate: i32 = 30;
    let mut max_blocks: i64 = 22 * 18;
    let mut max_blocks_per_second: i64 = 30 * 22 * 18;
    let mut max_bps: i64 = 4_000_000;

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
            tracing::warn!(profile = pl.profile, "unsupported MPEG-2 profile");
            errors |= ErrorFlags::UNSUPPORTED;
        } else {
            tracing::warn!(
                profile = pl.profile,
                level = pl.level,
                "unrecognized MPEG-2 profile/level"
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
    fn main_profile_main_level() {
        let lim = limits(&[ProfileLevel::new(PROFILE_MAIN, LEVEL_ML)]);
        assert_eq!(lim.max_horizontal_blocks, 45);
        assert_eq!(lim.max_vertical_blocks, 36);
        assert_eq!(lim.max_bitrate_bps, 15_000_000);
        assert!(lim.errors.is_empty());
    }

    #[test]
    fn high_profile_is_unsupported() {
        let lim = limits(&[ProfileLevel::new(PROFILE_HIGH, LEVEL_HL)]);
        assert!(lim.errors.contains(ErrorFlags::UNSUPPORTED));
        assert!(lim.errors.contains(ErrorFlags::NONE_SUPPORTED));
    }

    #[test]
    fn simple_profile_only_defines_main_level() {
        let lim = limits(&[ProfileLevel::new(PROFILE_SIMPLE, LEVEL_HL)]);
        assert!(lim.errors.contains(ErrorFlags::UNRECOGNIZED));
    }
}
