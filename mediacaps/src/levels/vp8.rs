//! VP8 limits. VP8 defines no performance levels; declared version
//! constants are verified for hygiene, and throughput is bounded only by
//! platform limits with a nominal bitrate ceiling.

use super::{seed_flags, ErrorFlags, StandardLimits};
use crate::profile::{vp8::*, ProfileLevel};

const RECOGNIZED_LEVELS: &[i32] = &[
    LEVEL_VERSION_0,
    LEVEL_VERSION_1,
    LEVEL_VERSION_2,
    LEVEL_VERSION_3,
];

pub(crate) fn limits(declared: &[ProfileLevel]) -> StandardLimits {
    let mut errors = seed_flags(declared);
    for pl in declared {
        if !RECOGNIZED_LEVELS.contains(&pl.level) {
            tracing::warn!(level = pl.level, "unrecognized VP8 version");
            errors |= ErrorFlags::UNRECOGNIZED;
        }
        if pl.profile != PROFILE_MAIN {
            tracing::warn!(profile = pl.profile, "unrecognized VP8 profile");
            errors |= ErrorFlags::UNRECOGNIZED;
        }
        // version constants are not indicative of capability
        errors.remove(ErrorFlags::NONE_SUPPORTED);
    }

    StandardLimits::macroblocks(
        32_768 / 16,
        i32::MAX as i64,
        i32::MAX as i64,
        100_000_000,
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_do_not_limit_throughput() {
        let lim = limits(&[ProfileLevel::new(PROFILE_MAIN, LEVEL_VERSION_0)]);
        assert_eq!(lim.max_blocks, i32::MAX as i64);
        assert_eq!(lim.max_bitrate_bps, 100_000_000);
        assert!(lim.errors.is_empty());
    }

    #[test]
    fn unknown_version_is_recorded() {
        let lim = limits(&[ProfileLevel::new(PROFILE_MAIN, 0x100)]);
        assert!(lim.errors.contains(ErrorFlags::UNRECOGNIZED));
    }
}
