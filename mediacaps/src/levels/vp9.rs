//! VP9 level table (VP9 Bitstream & Decoding Process Specification,
//! Annex A).
//!
//! VP9 codecs frequently omit the profile/level list. When the list is
//! empty the level is inferred from the auxiliary block-size, block-count,
//! block-rate, size and bitrate hints: the walk returns the coarsest level
//! whose thresholds are not exceeded, defaulting to the highest tier only
//! when every threshold is exceeded.

use super::{seed_flags, ErrorFlags, StandardLimits};
use crate::profile::{vp9::*, ProfileLevel};
use mediacaps_core::format::{self, keys};
use mediacaps_core::range::{div_up, div_up_i64};
use mediacaps_core::FormatMap;

/// Per-level row: max luma sample rate, max luma picture size, max
/// bitrate in kbps, max dimension.
struct LevelLimit {
    level: i32,
    sample_rate: i64,
    picture_size: i64,
    bitrate_kbps: i64,
    dimension: i32,
}

#[rustfmt::skip]
const LEVEL_LIMITS: &[LevelLimit] = &[
    LevelLimit { level: LEVEL_1,  sample_rate:       829_440, picture_size:     36_864, bitrate_kbps:     200, dimension:    512 },
    LevelLimit { level: LEVEL_11, sample_rate:     2_764_800, picture_size:     73_728, bitrate_kbps:     800, dimension:    768 },
    LevelLimit { level: LEVEL_2,  sample_rate:     4_608_000, picture_size:    122_880, bitrate_kbps:   1_800, dimension:    960 },
    LevelLimit { level: LEVEL_21, sample_rate:     9_216_000, picture_size:    245_760, bitrate_kbps:   3_600, dimension:  1_344 },
    LevelLimit { level: LEVEL_3,  sample_rate:    20_736_000, picture_size:    552_960, bitrate_kbps:   7_200, dimension:  2_048 },
    LevelLimit { level: LEVEL_31, sample_rate:    36_864_000, picture_size:    983_040, bitrate_kbps:  12_000, dimension:  2_752 },
    LevelLimit { level: LEVEL_4,  sample_rate:    83_558_400, picture_size:  2_228_224, bitrate_kbps:  18_000, dimension:  4_160 },
    LevelLimit { level: LEVEL_41, sample_rate:   160_432_128, picture_size:  2_228_224, bitrate_kbps:  30_000, dimension:  4_160 },
    LevelLimit { level: LEVEL_5,  sample_rate:   311_951_360, picture_size:  8_912_896, bitrate_kbps:  60_000, dimension:  8_384 },
    LevelLimit { level: LEVEL_51, sample_rate:   588_251_136, picture_size:  8_912_896, bitrate_kbps: 120_000, dimension:  8_384 },
    LevelLimit { level: LEVEL_6,  sample_rate: 1_176_502_272, picture_size: 35_651_584, bitrate_kbps: 180_000, dimension: 16_832 },
    LevelLimit { level: LEVEL_61, sample_rate: 2_353_004_544, picture_size: 35_651_584, bitrate_kbps: 240_000, dimension: 16_832 },
    LevelLimit { level: LEVEL_62, sample_rate: 4_706_009_088, picture_size: 35_651_584, bitrate_kbps: 480_000, dimension: 16_832 },
];

const RECOGNIZED_PROFILES: &[i32] = &[
    PROFILE_0,
    PROFILE_1,
    PROFILE_2,
    PROFILE_3,
    PROFILE_2_HDR,
    PROFILE_3_HDR,
    PROFILE_2_HDR10_PLUS,
    PROFILE_3_HDR10_PLUS,
];

/// Infer the level matching a codec's declared throughput hints. Returns
/// the first level whose thresholds cover every hint; hints the codec did
/// not supply count as zero (always covered).
pub(crate) fn equiv_level(attrs: &FormatMap) -> i32 {
    let (bw, bh) = attrs
        .get_str(keys::BLOCK_SIZE)
        .and_then(|s| format::parse_size(keys::BLOCK_SIZE, s).ok())
        .unwrap_or((8, 8));
    let block_samples = (bw as i64) * (bh as i64);

    let picture_size = attrs
        .get_str(keys::BLOCK_COUNT_RANGE)
        .and_then(|s| format::parse_int_range(keys::BLOCK_COUNT_RANGE, s).ok())
        .map_or(0, |r| block_samples * r.upper() as i64);
    let sample_rate = attrs
        .get_str(keys::BLOCKS_PER_SECOND_RANGE)
        .and_then(|s| format::parse_long_range(keys::BLOCKS_PER_SECOND_RANGE, s).ok())
        .map_or(0, |r| block_samples * r.upper());
    let dimension = attrs
        .get_str(keys::SIZE_RANGE)
        .and_then(|s| format::parse_size_range(keys::SIZE_RANGE, s).ok())
        .map_or(0, |(w, h)| w.upper().max(h.upper()));
    let bitrate_kbps = attrs
        .get_str(keys::BITRATE_RANGE)
        .and_then(|s| format::parse_int_range(keys::BITRATE_RANGE, s).ok())
        .map_or(0, |r| div_up(r.upper(), 1_000) as i64);

    for row in LEVEL_LIMITS {
        if sample_rate <= row.sample_rate
            && picture_size <= row.picture_size
            && bitrate_kbps <= row.bitrate_kbps
            && dimension <= row.dimension
        {
            return row.level;
        }
    }
    LEVEL_62
}

pub(crate) fn limits(declared: &[ProfileLevel], attrs: &FormatMap) -> StandardLimits {
    let mut errors = seed_flags(declared);
    // level 1 floor
    let mut max_sample_rate: i64 = 829_440;
    let mut max_picture_size: i64 = 36_864;
    let mut max_bps: i64 = 200_000;
    let mut max_dimension: i32 = 512;

    if declared.is_empty() {
        let level = equiv_level(attrs);
        tracing::debug!(level, "inferred VP9 level from declared limits");
        if let Some(row) = LEVEL_LIMITS.iter().find(|l| l.level == level) {
            max_sample_rate = row.sample_rate;
            max_picture_size = row.picture_size;
            max_bps = row.bitrate_kbps * 1_000;
            max_dimension = row.dimension;
        }
    } else {
        for pl in declared {
            match LEVEL_LIMITS.iter().find(|l| l.level == pl.level) {
                Some(row) => {
                    errors.remove(ErrorFlags::NONE_SUPPORTED);
                    max_sample_rate = max_sample_rate.max(row.sample_rate);
                    max_picture_size = max_picture_size.max(row.picture_size);
                    max_bps = max_bps.max(row.bitrate_kbps * 1_000);
                    max_dimension = max_dimension.max(row.dimension);
                }
                None => {
                    tracing::warn!(level = pl.level, "unrecognized VP9 level");
                    errors |= ErrorFlags::UNRECOGNIZED;
                }
            }
            if !RECOGNIZED_PROFILES.contains(&pl.profile) {
                tracing::warn!(profile = pl.profile, "unrecognized VP9 profile");
                errors |= ErrorFlags::UNRECOGNIZED;
            }
        }
    }

    // superblocks subdivide to 8x8, so express limits in 8x8 units
    let max_blocks = div_up_i64(max_picture_size, 8 * 8);
    let max_blocks_per_second = div_up_i64(max_sample_rate, 8 * 8);
    let max_length_in_blocks = div_up(max_dimension, 8);

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
