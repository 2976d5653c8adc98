//! String-keyed attribute and format maps.
//!
//! Codec capability metadata arrives as a flat map of string keys to string
//! or integer values ("size-range" -> "64x64-1920x1088"), and format
//! queries use the same shape ("width" -> 1280). [`FormatMap`] is the
//! shared container; the free functions parse the value syntaxes:
//!
//! - Sizes: `WxH` (also `W*H`)
//! - Integer ranges: `lo-hi` or a single value
//! - Rational ranges: `n:d-n:d` (also `n/d`)
//! - Size ranges: `WxH-WxH` or a single size
//! - Range lists: comma-separated `lo-hi` tokens

use crate::error::{CapsError, Result};
use crate::range::Range;
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value in a [`FormatMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
}

/// A flat string-keyed map describing a codec's declared capabilities or a
/// candidate format to validate. Unrecognized keys are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMap {
    entries: BTreeMap<String, Value>,
}

impl FormatMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an integer value.
    pub fn set_int(&mut self, key: &str, value: i64) -> &mut Self {
        self.entries.insert(key.to_string(), Value::Int(value));
        self
    }

    /// Set a string value.
    pub fn set_str(&mut self, key: &str, value: &str) -> &mut Self {
        self.entries
            .insert(key.to_string(), Value::Str(value.to_string()));
        self
    }

    /// Get an integer value. Integer-shaped strings are accepted too, since
    /// enumeration layers routinely deliver numbers as text.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            Value::Int(v) => Some(*v),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            Value::Str(s) => Some(s),
            Value::Int(_) => None,
        }
    }

    /// Whether the map contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Copy of this map with `key` removed. Used by the format matcher to
    /// strip the profile key before the second validation pass.
    pub fn without(&self, key: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(key);
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recognized keys for capability attribute maps and candidate formats.
pub mod keys {
    /// Media type, e.g. `video/avc`.
    pub const MIME: &str = "mime";

    // candidate-format keys
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const FRAME_RATE: &str = "frame-rate";
    pub const BITRATE: &str = "bitrate";
    pub const MAX_BITRATE: &str = "max-bitrate";
    pub const SAMPLE_RATE: &str = "sample-rate";
    pub const CHANNEL_COUNT: &str = "channel-count";
    pub const PROFILE: &str = "profile";
    pub const LEVEL: &str = "level";
    pub const COMPLEXITY: &str = "complexity";
    pub const QUALITY: &str = "quality";
    pub const BITRATE_MODE: &str = "bitrate-mode";
    /// AAC alias for [`PROFILE`]; must agree with it when both are given.
    pub const AAC_PROFILE: &str = "aac-profile";
    /// FLAC alias for [`COMPLEXITY`]; must agree with it when both are given.
    pub const FLAC_COMPRESSION_LEVEL: &str = "flac-compression-level";

    // capability attribute keys
    pub const BLOCK_SIZE: &str = "block-size";
    pub const ALIGNMENT: &str = "alignment";
    pub const BLOCK_COUNT_RANGE: &str = "block-count-range";
    pub const BLOCKS_PER_SECOND_RANGE: &str = "blocks-per-second-range";
    pub const SIZE_RANGE: &str = "size-range";
    pub const BLOCK_ASPECT_RATIO_RANGE: &str = "block-aspect-ratio-range";
    pub const PIXEL_ASPECT_RATIO_RANGE: &str = "pixel-aspect-ratio-range";
    pub const FRAME_RATE_RANGE: &str = "frame-rate-range";
    pub const BITRATE_RANGE: &str = "bitrate-range";
    pub const SAMPLE_RATE_RANGES: &str = "sample-rate-ranges";
    pub const MAX_CHANNEL_COUNT: &str = "max-channel-count";
    pub const COMPLEXITY_RANGE: &str = "complexity-range";
    pub const QUALITY_RANGE: &str = "quality-range";
    pub const COMPLEXITY_DEFAULT: &str = "complexity-default";
    pub const QUALITY_DEFAULT: &str = "quality-default";
    pub const QUALITY_SCALE: &str = "quality-scale";
    pub const FEATURE_BITRATE_CONTROL: &str = "feature-bitrate-control";
    pub const FEATURE_CAN_SWAP_WIDTH_HEIGHT: &str = "feature-can-swap-width-height";
    pub const MAX_CONCURRENT_INSTANCES: &str = "max-concurrent-instances";
    /// Prefix of per-feature flags, `feature-<name>`.
    pub const FEATURE_PREFIX: &str = "feature-";
    /// Prefix of measured frame-rate keys,
    /// `measured-frame-rate-WIDTHxHEIGHT-range`.
    pub const MEASURED_FRAME_RATE_PREFIX: &str = "measured-frame-rate-";
    /// Suffix of measured frame-rate keys.
    pub const MEASURED_FRAME_RATE_SUFFIX: &str = "-range";
}

fn invalid(key: &str, value: &str, reason: &str) -> CapsError {
    CapsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a `WxH` size token (also accepts `W*H`). Dimensions must be
/// positive; the lower end of a size range is the one place zero is
/// meaningful, handled by [`parse_size_range`].
pub fn parse_size(key: &str, s: &str) -> Result<(i32, i32)> {
    let (w, h) = parse_size_lenient(key, s)?;
    if w == 0 || h == 0 {
        return Err(invalid(key, s, "dimensions must be positive"));
    }
    Ok((w, h))
}

/// Parse a `WxH` size token, allowing zero dimensions.
fn parse_size_lenient(key: &str, s: &str) -> Result<(i32, i32)> {
    let s = s.trim();
    let (w, h) = s
        .split_once(['x', 'X', '*'])
        .ok_or_else(|| invalid(key, s, "expected WxH"))?;
    let w: i32 = w
        .trim()
        .parse()
        .map_err(|_| invalid(key, s, "width is not an integer"))?;
    let h: i32 = h
        .trim()
        .parse()
        .map_err(|_| invalid(key, s, "height is not an integer"))?;
    if w < 0 || h < 0 {
        return Err(invalid(key, s, "dimensions must be non-negative"));
    }
    Ok((w, h))
}

/// Parse an integer range token: `lo-hi` or a single value.
pub fn parse_int_range(key: &str, s: &str) -> Result<Range<i32>> {
    let r = parse_long_range(key, s)?;
    let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    Range::new(clamp(r.lower()), clamp(r.upper()))
}

/// Parse a 64-bit integer range token: `lo-hi` or a single value.
pub fn parse_long_range(key: &str, s: &str) -> Result<Range<i64>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(key, s, "empty range"));
    }
    // split on the dash separating the bounds, not a leading sign
    let (lo, hi) = match s[1..].find('-') {
        Some(idx) => (&s[..idx + 1], &s[idx + 2..]),
        None => (s, s),
    };
    let lo: i64 = lo
        .trim()
        .parse()
        .map_err(|_| invalid(key, s, "lower bound is not an integer"))?;
    let hi: i64 = hi
        .trim()
        .parse()
        .map_err(|_| invalid(key, s, "upper bound is not an integer"))?;
    Range::new(lo, hi)
}

fn parse_rational(key: &str, s: &str) -> Result<Rational> {
    let s = s.trim();
    if let Some((num, den)) = s.split_once([':', '/']) {
        let num: i64 = num
            .trim()
            .parse()
            .map_err(|_| invalid(key, s, "numerator is not an integer"))?;
        let den: i64 = den
            .trim()
            .parse()
            .map_err(|_| invalid(key, s, "denominator is not an integer"))?;
        if den == 0 {
            return Err(invalid(key, s, "denominator is zero"));
        }
        Ok(Rational::new(num, den))
    } else {
        let v: i64 = s
            .parse()
            .map_err(|_| invalid(key, s, "not a rational"))?;
        Ok(Rational::from_int(v))
    }
}

/// Parse a rational range token: `n:d-n:d`, `n/d-n/d` or a single rational.
pub fn parse_rational_range(key: &str, s: &str) -> Result<Range<Rational>> {
    let s = s.trim();
    let (lo, hi) = match s.split_once('-') {
        Some((lo, hi)) => (lo, hi),
        None => (s, s),
    };
    Range::new(parse_rational(key, lo)?, parse_rational(key, hi)?)
}

/// Parse a size range token `WxH-WxH` (or a single `WxH`) into separate
/// width and height ranges. The lower size may be `0x0`, the conventional
/// spelling for "no minimum".
pub fn parse_size_range(key: &str, s: &str) -> Result<(Range<i32>, Range<i32>)> {
    let s = s.trim();
    let ((w0, h0), (w1, h1)) = match s.split_once('-') {
        Some((lo, hi)) => (parse_size_lenient(key, lo)?, parse_size(key, hi)?),
        None => {
            let size = parse_size(key, s)?;
            (size, size)
        }
    };
    Ok((Range::new(w0, w1)?, Range::new(h0, h1)?))
}

/// Parse a comma-separated list of `lo-hi` tokens into sorted, merged,
/// disjoint ranges.
pub fn parse_int_ranges(key: &str, s: &str) -> Result<Vec<Range<i32>>> {
    let mut ranges = Vec::new();
    for token in s.split(',') {
        ranges.push(parse_int_range(key, token)?);
    }
    ranges.sort_by_key(|r| r.lower());
    // merge overlapping or adjacent ranges
    let mut merged: Vec<Range<i32>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if r.lower() <= last.upper().saturating_add(1) => {
                *last = last.extend(&r);
            }
            _ => merged.push(r),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_typed_getters() {
        let mut map = FormatMap::new();
        map.set_int("width", 1920).set_str("mime", "video/avc");
        assert_eq!(map.get_int("width"), Some(1920));
        assert_eq!(map.get_str("mime"), Some("video/avc"));
        assert_eq!(map.get_str("width"), None);
        assert_eq!(map.get_int("height"), None);
    }

    #[test]
    fn map_int_shaped_strings_coerce() {
        let mut map = FormatMap::new();
        map.set_str("max-channel-count", "6");
        assert_eq!(map.get_int("max-channel-count"), Some(6));
    }

    #[test]
    fn without_leaves_original_untouched() {
        let mut map = FormatMap::new();
        map.set_int("profile", 1).set_int("width", 640);
        let stripped = map.without("profile");
        assert!(!stripped.contains_key("profile"));
        assert!(map.contains_key("profile"));
    }

    #[test]
    fn parse_size_variants() {
        assert_eq!(parse_size("block-size", "16x16").unwrap(), (16, 16));
        assert_eq!(parse_size("block-size", "64*32").unwrap(), (64, 32));
        assert!(parse_size("block-size", "16").is_err());
        assert!(parse_size("block-size", "0x16").is_err());
    }

    #[test]
    fn parse_int_range_variants() {
        let r = parse_int_range("bitrate-range", "4000-20000000").unwrap();
        assert_eq!((r.lower(), r.upper()), (4000, 20_000_000));
        let single = parse_int_range("bitrate-range", "48000").unwrap();
        assert_eq!((single.lower(), single.upper()), (48000, 48000));
        assert!(parse_int_range("bitrate-range", "hi-lo").is_err());
    }

    #[test]
    fn parse_rational_range_variants() {
        let r = parse_rational_range("block-aspect-ratio-range", "1:4-16:1").unwrap();
        assert_eq!(r.lower(), Rational::new(1, 4));
        assert_eq!(r.upper(), Rational::new(16, 1));
    }

    #[test]
    fn parse_size_range_splits_axes() {
        let (w, h) = parse_size_range("size-range", "64x64-1920x1088").unwrap();
        assert_eq!((w.lower(), w.upper()), (64, 1920));
        assert_eq!((h.lower(), h.upper()), (64, 1088));
    }

    #[test]
    fn parse_size_range_accepts_a_zero_lower_size() {
        let (w, h) = parse_size_range("size-range", "0x0-4096x2304").unwrap();
        assert_eq!((w.lower(), w.upper()), (0, 4096));
        assert_eq!((h.lower(), h.upper()), (0, 2304));
        // zero stays invalid for the upper size and for single sizes
        assert!(parse_size_range("size-range", "64x64-0x0").is_err());
        assert!(parse_size_range("size-range", "0x0").is_err());
    }

    #[test]
    fn parse_int_ranges_merges_and_sorts() {
        let list = parse_int_ranges("sample-rate-ranges", "44100,8000-16000,16000-22050").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!((list[0].lower(), list[0].upper()), (8000, 22050));
        assert_eq!((list[1].lower(), list[1].upper()), (44100, 44100));
    }
}
