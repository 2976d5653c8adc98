//! Audio capability aggregation.
//!
//! Audio limits are simpler than video: a bitrate range, a sorted list of
//! disjoint sample-rate ranges (collapsed to a discrete list when every
//! range is a single point) and a maximum input channel count. Per-format
//! defaults come from the relevant audio standards; the attribute map can
//! narrow them.

use crate::caps::supports_bitrate;
use crate::levels::ErrorFlags;
use crate::mime;
use mediacaps_core::format::{self, keys};
use mediacaps_core::{FormatMap, Range, Result};

const MAX_INPUT_CHANNEL_COUNT: i32 = 30;

/// Supported sample rates, channel counts and bitrates for one audio codec
/// and media type. Immutable once built.
#[derive(Debug, Clone)]
pub struct AudioCapabilities {
    bitrate_range: Range<i32>,
    /// Sorted, disjoint. Empty when the declared rates and the platform
    /// defaults do not overlap at all.
    sample_rate_ranges: Vec<Range<i32>>,
    /// Present only when every sample-rate range is a single point.
    sample_rates: Option<Vec<i32>>,
    max_input_channel_count: i32,
}

impl AudioCapabilities {
    /// Build the capabilities for `mime_type` from the raw attribute map.
    pub(crate) fn new(mime_type: &str, attrs: &FormatMap) -> Result<(Self, ErrorFlags)> {
        let mut caps = Self {
            bitrate_range: Range::new_unchecked(0, i32::MAX),
            sample_rate_ranges: vec![Range::new_unchecked(8_000, 96_000)],
            sample_rates: None,
            max_input_channel_count: MAX_INPUT_CHANNEL_COUNT,
        };
        let errors = caps.apply_format_limits(mime_type);
        caps.parse_from_info(attrs)?;
        Ok((caps, errors))
    }

    /// Supported bitrates in bits per second.
    pub fn bitrate_range(&self) -> Range<i32> {
        self.bitrate_range
    }

    /// Discrete supported sample rates, ascending, when the codec supports
    /// only specific rates. `None` for continuous-rate codecs.
    pub fn supported_sample_rates(&self) -> Option<&[i32]> {
        self.sample_rates.as_deref()
    }

    /// Supported sample-rate ranges, sorted ascending and disjoint.
    pub fn supported_sample_rate_ranges(&self) -> &[Range<i32>] {
        &self.sample_rate_ranges
    }

    /// Maximum number of input channels.
    pub fn max_input_channel_count(&self) -> i32 {
        self.max_input_channel_count
    }

    /// Whether `sample_rate` falls in one of the supported ranges.
    pub fn is_sample_rate_supported(&self, sample_rate: i32) -> bool {
        self.sample_rate_ranges
            .binary_search_by(|r| {
                if r.upper() < sample_rate {
                    std::cmp::Ordering::Less
                } else if r.lower() > sample_rate {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Validate the audio keys of a candidate format: sample rate, channel
    /// count and effective bitrate.
    pub fn supports_format(&self, format: &FormatMap) -> bool {
        if let Some(rate) = format.get_int(keys::SAMPLE_RATE) {
            if !self.is_sample_rate_supported(rate as i32) {
                return false;
            }
        }
        if let Some(channels) = format.get_int(keys::CHANNEL_COUNT) {
            if channels < 1 || channels > self.max_input_channel_count as i64 {
                return false;
            }
        }
        supports_bitrate(&self.bitrate_range, format)
    }

    fn apply_format_limits(&mut self, mime_type: &str) -> ErrorFlags {
        let mut rates: Option<&[i32]> = None;
        let mut rate_ranges: Option<Vec<Range<i32>>> = None;
        let mut bitrates: Option<Range<i32>> = None;
        let mut max_channels = 0;
        let mut errors = ErrorFlags::empty();

        if mime::equals(mime_type, mime::AUDIO_MPEG) {
            rates = Some(&[
                8_000, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000,
            ]);
            bitrates = Some(Range::new_unchecked(8_000, 320_000));
            max_channels = 2;
        } else if mime::equals(mime_type, mime::AUDIO_AMR_NB) {
            rates = Some(&[8_000]);
            bitrates = Some(Range::new_unchecked(4_750, 12_200));
            max_channels = 1;
        } else if mime::equals(mime_type, mime::AUDIO_AMR_WB) {
            rates = Some(&[16_000]);
            bitrates = Some(Range::new_unchecked(6_600, 23_850));
            max_channels = 1;
        } else if mime::equals(mime_type, mime::AUDIO_AAC) {
            rates = Some(&[
                7_350, 8_000, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000,
                64_000, 88_200, 96_000,
            ]);
            bitrates = Some(Range::new_unchecked(8_000, 510_000));
            max_channels = 48;
        } else if mime::equals(mime_type, mime::AUDIO_VORBIS) {
            rate_ranges = Some(vec![Range::new_unchecked(8_000, 192_000)]);
            bitrates = Some(Range::new_unchecked(32_000, 500_000));
            max_channels = 255;
        } else if mime::equals(mime_type, mime::AUDIO_OPUS) {
            rates = Some(&[8_000, 12_000, 16_000, 24_000, 48_000]);
            bitrates = Some(Range::new_unchecked(6_000, 510_000));
            max_channels = 255;
        } else if mime::equals(mime_type, mime::AUDIO_RAW) {
            rate_ranges = Some(vec![Range::new_unchecked(1, 96_000)]);
            bitrates = Some(Range::new_unchecked(1, 10_000_000));
            max_channels = 8;
        } else if mime::equals(mime_type, mime::AUDIO_FLAC) {
            // lossless, so no meaningful bitrate bound
            rate_ranges = Some(vec![Range::new_unchecked(1, 655_350)]);
            max_channels = 255;
        } else if mime::equals(mime_type, mime::AUDIO_G711_ALAW)
            || mime::equals(mime_type, mime::AUDIO_G711_MLAW)
        {
            rates = Some(&[8_000]);
            bitrates = Some(Range::new_unchecked(64_000, 64_000));
            max_channels = 1;
        } else if mime::equals(mime_type, mime::AUDIO_GSM) {
            rates = Some(&[8_000]);
            bitrates = Some(Range::new_unchecked(13_000, 13_000));
            max_channels = 1;
        } else {
            tracing::warn!(mime = mime_type, "no audio defaults for media type");
            errors |= ErrorFlags::UNSUPPORTED;
        }

        if let Some(rates) = rates {
            self.limit_sample_rates_to_points(rates);
        } else if let Some(ranges) = rate_ranges {
            self.limit_sample_rates(&ranges);
        }
        // the per-format ceiling replaces the platform seed outright; some
        // standards allow more channels than the generic 30
        if max_channels > 0 {
            self.max_input_channel_count = max_channels;
        }
        self.limit_bitrates(bitrates);
        errors
    }

    fn parse_from_info(&mut self, attrs: &FormatMap) -> Result<()> {
        let mut bitrates = Range::new_unchecked(1, i32::MAX);
        if let Some(s) = attrs.get_str(keys::SAMPLE_RATE_RANGES) {
            let ranges = format::parse_int_ranges(keys::SAMPLE_RATE_RANGES, s)?;
            self.limit_sample_rates(&ranges);
        }
        // device-supplied channel counts can only narrow the codec ceiling
        if let Some(count) = attrs.get_int(keys::MAX_CHANNEL_COUNT) {
            self.max_input_channel_count =
                count.clamp(1, self.max_input_channel_count as i64) as i32;
        }
        if let Some(s) = attrs.get_str(keys::BITRATE_RANGE) {
            bitrates = bitrates.intersect(&format::parse_int_range(keys::BITRATE_RANGE, s)?)?;
        }
        self.limit_bitrates(Some(bitrates));
        Ok(())
    }

    fn limit_bitrates(&mut self, bitrates: Option<Range<i32>>) {
        if let Some(bitrates) = bitrates {
            if let Ok(narrowed) = self.bitrate_range.intersect(&bitrates) {
                self.bitrate_range = narrowed;
            } else {
                tracing::warn!(%bitrates, "bitrate limits do not overlap current range");
            }
        }
    }

    fn limit_sample_rates_to_points(&mut self, rates: &[i32]) {
        let mut sorted = rates.to_vec();
        sorted.sort_unstable();
        let ranges: Vec<Range<i32>> = sorted
            .iter()
            .map(|&r| Range::new_unchecked(r, r))
            .collect();
        self.limit_sample_rates(&ranges);
    }

    /// Narrow the supported sample rates to `ranges` (sorted, disjoint) and
    /// rebuild the discrete list when every surviving range is a point.
    fn limit_sample_rates(&mut self, ranges: &[Range<i32>]) {
        self.sample_rate_ranges = intersect_sorted_ranges(&self.sample_rate_ranges, ranges);
        if self.sample_rate_ranges.is_empty() {
            tracing::warn!("no supported sample rates remain");
        }
        if self
            .sample_rate_ranges
            .iter()
            .all(|r| r.lower() == r.upper())
        {
            self.sample_rates = Some(self.sample_rate_ranges.iter().map(|r| r.lower()).collect());
        } else {
            self.sample_rates = None;
        }
    }
}

/// Intersect two sorted, disjoint range lists into a sorted, disjoint
/// result.
fn intersect_sorted_ranges(a: &[Range<i32>], b: &[Range<i32>]) -> Vec<Range<i32>> {
    let mut out = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < a.len() && j < b.len() {
        if let Ok(r) = a[i].intersect(&b[j]) {
            out.push(r);
        }
        if a[i].upper() < b[j].upper() {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}
