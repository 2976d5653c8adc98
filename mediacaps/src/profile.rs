//! Standards-defined profile and level constants.
//!
//! The values are opaque bitmasks scoped to one codec standard; they are
//! reproduced verbatim from the relevant ITU/ISO/VPx specifications and the
//! conventional platform encoding, and must not be reinterpreted across
//! standards.

use serde::{Deserialize, Serialize};

/// A (profile, level) pair declared by a codec for one standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileLevel {
    /// Standard-specific profile constant.
    pub profile: i32,
    /// Standard-specific level constant.
    pub level: i32,
}

impl ProfileLevel {
    /// Convenience constructor.
    pub fn new(profile: i32, level: i32) -> Self {
        Self { profile, level }
    }
}

/// H.264 / AVC constants.
pub mod avc {
    pub const PROFILE_BASELINE: i32 = 0x01;
    pub const PROFILE_MAIN: i32 = 0x02;
    pub const PROFILE_EXTENDED: i32 = 0x04;
    pub const PROFILE_HIGH: i32 = 0x08;
    pub const PROFILE_HIGH_10: i32 = 0x10;
    pub const PROFILE_HIGH_422: i32 = 0x20;
    pub const PROFILE_HIGH_444: i32 = 0x40;
    pub const PROFILE_CONSTRAINED_BASELINE: i32 = 0x10000;
    pub const PROFILE_CONSTRAINED_HIGH: i32 = 0x80000;

    pub const LEVEL_1: i32 = 0x01;
    pub const LEVEL_1B: i32 = 0x02;
    pub const LEVEL_11: i32 = 0x04;
    pub const LEVEL_12: i32 = 0x08;
    pub const LEVEL_13: i32 = 0x10;
    pub const LEVEL_2: i32 = 0x20;
    pub const LEVEL_21: i32 = 0x40;
    pub const LEVEL_22: i32 = 0x80;
    pub const LEVEL_3: i32 = 0x100;
    pub const LEVEL_31: i32 = 0x200;
    pub const LEVEL_32: i32 = 0x400;
    pub const LEVEL_4: i32 = 0x800;
    pub const LEVEL_41: i32 = 0x1000;
    pub const LEVEL_42: i32 = 0x2000;
    pub const LEVEL_5: i32 = 0x4000;
    pub const LEVEL_51: i32 = 0x8000;
    pub const LEVEL_52: i32 = 0x10000;
    pub const LEVEL_6: i32 = 0x20000;
    pub const LEVEL_61: i32 = 0x40000;
    pub const LEVEL_62: i32 = 0x80000;
}

/// H.265 / HEVC constants.
pub mod hevc {
    pub const PROFILE_MAIN: i32 = 0x01;
    pub const PROFILE_MAIN_10: i32 = 0x02;
    pub const PROFILE_MAIN_STILL: i32 = 0x04;
    pub const PROFILE_MAIN_10_HDR10: i32 = 0x1000;
    pub const PROFILE_MAIN_10_HDR10_PLUS: i32 = 0x2000;

    pub const MAIN_TIER_LEVEL_1: i32 = 0x1;
    pub const HIGH_TIER_LEVEL_1: i32 = 0x2;
    pub const MAIN_TIER_LEVEL_2: i32 = 0x4;
    pub const HIGH_TIER_LEVEL_2: i32 = 0x8;
    pub const MAIN_TIER_LEVEL_21: i32 = 0x10;
    pub const HIGH_TIER_LEVEL_21: i32 = 0x20;
    pub const MAIN_TIER_LEVEL_3: i32 = 0x40;
    pub const HIGH_TIER_LEVEL_3: i32 = 0x80;
    pub const MAIN_TIER_LEVEL_31: i32 = 0x100;
    pub const HIGH_TIER_LEVEL_31: i32 = 0x200;
    pub const MAIN_TIER_LEVEL_4: i32 = 0x400;
    pub const HIGH_TIER_LEVEL_4: i32 = 0x800;
    pub const MAIN_TIER_LEVEL_41: i32 = 0x1000;
    pub const HIGH_TIER_LEVEL_41: i32 = 0x2000;
    pub const MAIN_TIER_LEVEL_5: i32 = 0x4000;
    pub const HIGH_TIER_LEVEL_5: i32 = 0x8000;
    pub const MAIN_TIER_LEVEL_51: i32 = 0x10000;
    pub const HIGH_TIER_LEVEL_51: i32 = 0x20000;
    pub const MAIN_TIER_LEVEL_52: i32 = 0x40000;
    pub const HIGH_TIER_LEVEL_52: i32 = 0x80000;
    pub const MAIN_TIER_LEVEL_6: i32 = 0x100000;
    pub const HIGH_TIER_LEVEL_6: i32 = 0x200000;
    pub const MAIN_TIER_LEVEL_61: i32 = 0x400000;
    pub const HIGH_TIER_LEVEL_61: i32 = 0x800000;
    pub const MAIN_TIER_LEVEL_62: i32 = 0x1000000;
    pub const HIGH_TIER_LEVEL_62: i32 = 0x2000000;

    /// Mask of every high-tier level bit.
    pub const HIGH_TIER_LEVELS: i32 = HIGH_TIER_LEVEL_1
        | HIGH_TIER_LEVEL_2
        | HIGH_TIER_LEVEL_21
        | HIGH_TIER_LEVEL_3
        | HIGH_TIER_LEVEL_31
        | HIGH_TIER_LEVEL_4
        | HIGH_TIER_LEVEL_41
        | HIGH_TIER_LEVEL_5
        | HIGH_TIER_LEVEL_51
        | HIGH_TIER_LEVEL_52
        | HIGH_TIER_LEVEL_6
        | HIGH_TIER_LEVEL_61
        | HIGH_TIER_LEVEL_62;
}

/// MPEG-2 constants.
pub mod mpeg2 {
    pub const PROFILE_SIMPLE: i32 = 0;
    pub const PROFILE_MAIN: i32 = 1;
    pub const PROFILE_422: i32 = 2;
    pub const PROFILE_SNR: i32 = 3;
    pub const PROFILE_SPATIAL: i32 = 4;
    pub const PROFILE_HIGH: i32 = 5;

    pub const LEVEL_LL: i32 = 0;
    pub const LEVEL_ML: i32 = 1;
    pub const LEVEL_H14: i32 = 2;
    pub const LEVEL_HL: i32 = 3;
    pub const LEVEL_HP: i32 = 4;
}

/// MPEG-4 part 2 constants.
pub mod mpeg4 {
    pub const PROFILE_SIMPLE: i32 = 0x01;
    pub const PROFILE_SIMPLE_SCALABLE: i32 = 0x02;
    pub const PROFILE_CORE: i32 = 0x04;
    pub const PROFILE_MAIN: i32 = 0x08;
    pub const PROFILE_NBIT: i32 = 0x10;
    pub const PROFILE_SCALABLE_TEXTURE: i32 = 0x20;
    pub const PROFILE_SIMPLE_FACE: i32 = 0x40;
    pub const PROFILE_SIMPLE_FBA: i32 = 0x80;
    pub const PROFILE_BASIC_ANIMATED: i32 = 0x100;
    pub const PROFILE_HYBRID: i32 = 0x200;
    pub const PROFILE_ADVANCED_REALTIME: i32 = 0x400;
    pub const PROFILE_CORE_SCALABLE: i32 = 0x800;
    pub const PROFILE_ADVANCED_CODING: i32 = 0x1000;
    pub const PROFILE_ADVANCED_CORE: i32 = 0x2000;
    pub const PROFILE_ADVANCED_SCALABLE: i32 = 0x4000;
    pub const PROFILE_ADVANCED_SIMPLE: i32 = 0x8000;

    pub const LEVEL_0: i32 = 0x01;
    pub const LEVEL_0B: i32 = 0x02;
    pub const LEVEL_1: i32 = 0x04;
    pub const LEVEL_2: i32 = 0x08;
    pub const LEVEL_3: i32 = 0x10;
    pub const LEVEL_3B: i32 = 0x18;
    pub const LEVEL_4: i32 = 0x20;
    pub const LEVEL_4A: i32 = 0x40;
    pub const LEVEL_5: i32 = 0x80;
    pub const LEVEL_6: i32 = 0x100;
}

/// H.263 constants.
pub mod h263 {
    pub const PROFILE_BASELINE: i32 = 0x01;
    pub const PROFILE_H320_CODING: i32 = 0x02;
    pub const PROFILE_BACKWARD_COMPATIBLE: i32 = 0x04;
    pub const PROFILE_ISWV2: i32 = 0x08;
    pub const PROFILE_ISWV3: i32 = 0x10;
    pub const PROFILE_HIGH_COMPRESSION: i32 = 0x20;
    pub const PROFILE_INTERNET: i32 = 0x40;
    pub const PROFILE_INTERLACE: i32 = 0x80;
    pub const PROFILE_HIGH_LATENCY: i32 = 0x100;

    pub const LEVEL_10: i32 = 0x01;
    pub const LEVEL_20: i32 = 0x02;
    pub const LEVEL_30: i32 = 0x04;
    pub const LEVEL_40: i32 = 0x08;
    pub const LEVEL_45: i32 = 0x10;
    pub const LEVEL_50: i32 = 0x20;
    pub const LEVEL_60: i32 = 0x40;
    pub const LEVEL_70: i32 = 0x80;
}

/// VP8 constants. VP8 has no levels in the bitstream specification; the
/// version constants are carried for declaration hygiene only.
pub mod vp8 {
    pub const PROFILE_MAIN: i32 = 0x01;

    pub const LEVEL_VERSION_0: i32 = 0x01;
    pub const LEVEL_VERSION_1: i32 = 0x02;
    pub const LEVEL_VERSION_2: i32 = 0x04;
    pub const LEVEL_VERSION_3: i32 = 0x08;
}

/// VP9 constants.
pub mod vp9 {
    pub const PROFILE_0: i32 = 0x01;
    pub const PROFILE_1: i32 = 0x02;
    pub const PROFILE_2: i32 = 0x04;
    pub const PROFILE_3: i32 = 0x08;
    pub const PROFILE_2_HDR: i32 = 0x1000;
    pub const PROFILE_3_HDR: i32 = 0x2000;
    pub const PROFILE_2_HDR10_PLUS: i32 = 0x4000;
    pub const PROFILE_3_HDR10_PLUS: i32 = 0x8000;

    pub const LEVEL_1: i32 = 0x1;
    pub const LEVEL_11: i32 = 0x2;
    pub const LEVEL_2: i32 = 0x4;
    pub const LEVEL_21: i32 = 0x8;
    pub const LEVEL_3: i32 = 0x10;
    pub const LEVEL_31: i32 = 0x20;
    pub const LEVEL_4: i32 = 0x40;
    pub const LEVEL_41: i32 = 0x80;
    pub const LEVEL_5: i32 = 0x100;
    pub const LEVEL_51: i32 = 0x200;
    pub const LEVEL_6: i32 = 0x400;
    pub const LEVEL_61: i32 = 0x800;
    pub const LEVEL_62: i32 = 0x1000;
}

/// AAC audio object types, used as profiles.
pub mod aac {
    pub const OBJECT_MAIN: i32 = 1;
    pub const OBJECT_LC: i32 = 2;
    pub const OBJECT_SSR: i32 = 3;
    pub const OBJECT_LTP: i32 = 4;
    pub const OBJECT_HE: i32 = 5;
    pub const OBJECT_SCALABLE: i32 = 6;
    pub const OBJECT_ERLC: i32 = 17;
    pub const OBJECT_LD: i32 = 23;
    pub const OBJECT_HE_PS: i32 = 29;
    pub const OBJECT_ELD: i32 = 39;
    pub const OBJECT_XHE: i32 = 42;
}
