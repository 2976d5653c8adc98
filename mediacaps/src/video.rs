//! Video capability aggregation.
//!
//! A [`VideoCapabilities`] is built in three passes: generous platform-wide
//! seeds, standard-table limits folded in via the level tables, then
//! device-supplied override ranges from the attribute map. The override
//! pass is asymmetric: when the declared profile list contained entries the
//! tables call unsupported (or an H.263 custom-size level), overrides
//! replace the table-derived ranges clipped only to platform bounds;
//! otherwise they can only narrow them. A final recomputation step keeps
//! pixel ranges, block ranges, rates and aspect ratios mutually consistent.

use std::collections::BTreeMap;

use crate::caps::supports_bitrate;
use crate::levels::{self, ErrorFlags, FrameRateRule};
use crate::profile::ProfileLevel;
use mediacaps_core::format::{self, keys};
use mediacaps_core::range::{div_up, div_up_i64};
use mediacaps_core::{CapsError, FormatMap, Range, Rational, Result};

const SIZE_RANGE: Range<i32> = Range::new_unchecked(1, 32_768);
const FRAME_RATE_RANGE: Range<i32> = Range::new_unchecked(0, 960);
const BITRATE_RANGE: Range<i32> = Range::new_unchecked(0, 500_000_000);
const POSITIVE_I32: Range<i32> = Range::new_unchecked(1, i32::MAX);
const POSITIVE_I64: Range<i64> = Range::new_unchecked(1, i64::MAX);
const POSITIVE_RATIONALS: Range<Rational> = Range::new_unchecked(
    Rational::new_raw(1, i32::MAX as i64),
    Rational::new_raw(i32::MAX as i64, 1),
);

/// Supported resolutions, frame rates and bitrates for one video codec and
/// media type. Immutable once built.
#[derive(Debug, Clone)]
pub struct VideoCapabilities {
    width_range: Range<i32>,
    height_range: Range<i32>,
    block_count_range: Range<i32>,
    horizontal_block_range: Range<i32>,
    vertical_block_range: Range<i32>,
    blocks_per_second_range: Range<i64>,
    frame_rate_range: Range<i32>,
    bitrate_range: Range<i32>,
    aspect_ratio_range: Range<Rational>,
    block_aspect_ratio_range: Range<Rational>,
    block_width: i32,
    block_height: i32,
    width_alignment: i32,
    height_alignment: i32,
    smaller_dimension_upper_limit: i32,
    measured_frame_rates: BTreeMap<(i32, i32), Range<i64>>,
    allow_mb_override: bool,
}

impl VideoCapabilities {
    /// Build the capabilities for `mime_type` from the declared
    /// profile/level list and the raw attribute map. Diagnostics
    /// accumulated along the way are returned alongside the object for the
    /// aggregate to merge.
    pub(crate) fn new(
        mime_type: &str,
        declared: &[ProfileLevel],
        attrs: &FormatMap,
    ) -> Result<(Self, ErrorFlags)> {
        let mut caps = Self::with_platform_limits();
        let mut errors = caps.apply_level_limits(mime_type, declared, attrs)?;
        caps.parse_from_info(attrs, &mut errors)?;
        Ok((caps, errors))
    }

    fn with_platform_limits() -> Self {
        Self {
            width_range: SIZE_RANGE,
            height_range: SIZE_RANGE,
            block_count_range: POSITIVE_I32,
            horizontal_block_range: POSITIVE_I32,
            vertical_block_range: POSITIVE_I32,
            blocks_per_second_range: POSITIVE_I64,
            frame_rate_range: FRAME_RATE_RANGE,
            bitrate_range: BITRATE_RANGE,
            aspect_ratio_range: POSITIVE_RATIONALS,
            block_aspect_ratio_range: POSITIVE_RATIONALS,
            block_width: 2,
            block_height: 2,
            width_alignment: 2,
            height_alignment: 2,
            smaller_dimension_upper_limit: SIZE_RANGE.upper(),
            measured_frame_rates: BTreeMap::new(),
            allow_mb_override: false,
        }
    }

    /// Supported frame widths.
    pub fn supported_widths(&self) -> Range<i32> {
        self.width_range
    }

    /// Supported frame heights.
    pub fn supported_heights(&self) -> Range<i32> {
        self.height_range
    }

    /// Supported bitrates in bits per second.
    pub fn bitrate_range(&self) -> Range<i32> {
        self.bitrate_range
    }

    /// Supported frame rates in frames per second. This is the
    /// standards-derived range independent of resolution; use
    /// [`supported_frame_rates_for`](Self::supported_frame_rates_for) for a
    /// per-resolution bound.
    pub fn supported_frame_rates(&self) -> Range<i32> {
        self.frame_rate_range
    }

    /// Supported block counts per frame.
    pub fn block_count_range(&self) -> Range<i32> {
        self.block_count_range
    }

    /// Supported block throughput per second.
    pub fn blocks_per_second_range(&self) -> Range<i64> {
        self.blocks_per_second_range
    }

    /// Supported frame width to height ratios.
    pub fn aspect_ratio_range(&self) -> Range<Rational> {
        self.aspect_ratio_range
    }

    /// Supported frame width to height ratios in block units.
    pub fn block_aspect_ratio_range(&self) -> Range<Rational> {
        self.block_aspect_ratio_range
    }

    /// Block dimensions used to express count and rate limits.
    pub fn block_size(&self) -> (i32, i32) {
        (self.block_width, self.block_height)
    }

    /// Required width and height alignment in pixels.
    pub fn alignment(&self) -> (i32, i32) {
        (self.width_alignment, self.height_alignment)
    }

    /// Upper limit on the smaller of width and height. Tighter than the
    /// per-axis ranges for codecs whose landscape and portrait maxima
    /// differ.
    pub fn smaller_dimension_upper_limit(&self) -> i32 {
        self.smaller_dimension_upper_limit
    }

    /// Empirically measured achievable frame-rate ranges keyed by
    /// resolution.
    pub fn measured_frame_rates(&self) -> &BTreeMap<(i32, i32), Range<i64>> {
        &self.measured_frame_rates
    }

    /// Whether `width` x `height` is a supported frame size, optionally at
    /// `rate` frames per second.
    pub fn supports(&self, width: i32, height: i32, rate: Option<f64>) -> bool {
        self.supports_dims(Some(width), Some(height), rate)
    }

    fn supports_dims(&self, width: Option<i32>, height: Option<i32>, rate: Option<f64>) -> bool {
        if let Some(w) = width {
            if !self.width_range.contains(w) || w % self.width_alignment != 0 {
                return false;
            }
        }
        if let Some(h) = height {
            if !self.height_range.contains(h) || h % self.height_alignment != 0 {
                return false;
            }
        }
        if let Some(r) = rate {
            let rounded = Range::new_unchecked(r.floor() as i32, r.ceil() as i32);
            if !self.frame_rate_range.contains_range(&rounded) {
                return false;
            }
        }
        if let (Some(w), Some(h)) = (width, height) {
            if w.min(h) > self.smaller_dimension_upper_limit {
                return false;
            }
            let width_in_blocks = div_up(w, self.block_width);
            let height_in_blocks = div_up(h, self.block_height);
            let block_count = width_in_blocks.saturating_mul(height_in_blocks);
            if !self.block_count_range.contains(block_count)
                || !self
                    .block_aspect_ratio_range
                    .contains(Rational::new(width_in_blocks as i64, height_in_blocks as i64))
                || !self
                    .aspect_ratio_range
                    .contains(Rational::new(w as i64, h as i64))
            {
                return false;
            }
            if let Some(r) = rate {
                let blocks_per_second = (block_count as f64 * r) as i64;
                if !self.blocks_per_second_range.contains(blocks_per_second) {
                    return false;
                }
            }
        }
        true
    }

    /// Validate the video keys of a candidate format: dimensions, frame
    /// rate and effective bitrate.
    pub fn supports_format(&self, format: &FormatMap) -> bool {
        let width = format.get_int(keys::WIDTH).map(|v| v as i32);
        let height = format.get_int(keys::HEIGHT).map(|v| v as i32);
        let rate = format.get_int(keys::FRAME_RATE).map(|v| v as f64);
        self.supports_dims(width, height, rate) && supports_bitrate(&self.bitrate_range, format)
    }

    /// Widths supported at the given `height`, or [`CapsError::InvalidArgument`]
    /// when the height itself is unsupported.
    pub fn supported_widths_for(&self, height: i32) -> Result<Range<i32>> {
        if !self.height_range.contains(height) || height % self.height_alignment != 0 {
            return Err(CapsError::InvalidArgument(format!(
                "unsupported height {height}"
            )));
        }
        let height_in_blocks = div_up(height, self.block_height) as i64;
        let ratio = self.block_aspect_ratio_range;
        let min_blocks = i64::max(
            div_up_i64(self.block_count_range.lower() as i64, height_in_blocks),
            div_up_i64(ratio.lower().num * height_in_blocks, ratio.lower().den),
        );
        let max_blocks = i64::min(
            self.block_count_range.upper() as i64 / height_in_blocks,
            ratio.upper().num * height_in_blocks / ratio.upper().den,
        );
        let mut range = self.width_range.intersect_bounds(
            clamp_i32(min_blocks.saturating_sub(1).saturating_mul(self.block_width as i64))
                .saturating_add(self.width_alignment),
            clamp_i32(max_blocks.saturating_mul(self.block_width as i64)),
        )?;
        if height > self.smaller_dimension_upper_limit {
            range = range.intersect_bounds(1, self.smaller_dimension_upper_limit)?;
        }
        let aspect = self.aspect_ratio_range;
        range.intersect_bounds(
            clamp_i32(div_up_i64(aspect.lower().num * height as i64, aspect.lower().den)),
            clamp_i32(aspect.upper().num * height as i64 / aspect.upper().den),
        )
    }

    /// Heights supported at the given `width`, or [`CapsError::InvalidArgument`]
    /// when the width itself is unsupported.
    pub fn supported_heights_for(&self, width: i32) -> Result<Range<i32>> {
        if !self.width_range.contains(width) || width % self.width_alignment != 0 {
            return Err(CapsError::InvalidArgument(format!(
                "unsupported width {width}"
            )));
        }
        let width_in_blocks = div_up(width, self.block_width) as i64;
        let ratio = self.block_aspect_ratio_range;
        let min_blocks = i64::max(
            div_up_i64(self.block_count_range.lower() as i64, width_in_blocks),
            div_up_i64(width_in_blocks * ratio.upper().den, ratio.upper().num),
        );
        let max_blocks = i64::min(
            self.block_count_range.upper() as i64 / width_in_blocks,
            width_in_blocks * ratio.lower().den / ratio.lower().num,
        );
        let mut range = self.height_range.intersect_bounds(
            clamp_i32(min_blocks.saturating_sub(1).saturating_mul(self.block_height as i64))
                .saturating_add(self.height_alignment),
            clamp_i32(max_blocks.saturating_mul(self.block_height as i64)),
        )?;
        if width > self.smaller_dimension_upper_limit {
            range = range.intersect_bounds(1, self.smaller_dimension_upper_limit)?;
        }
        let aspect = self.aspect_ratio_range;
        range.intersect_bounds(
            clamp_i32(div_up_i64(width as i64 * aspect.upper().den, aspect.upper().num)),
            clamp_i32(width as i64 * aspect.lower().den / aspect.lower().num),
        )
    }

    /// Frame rates supported at the given frame size, as an exact rational
    /// range, or [`CapsError::InvalidArgument`] when the size is
    /// unsupported.
    pub fn supported_frame_rates_for(&self, width: i32, height: i32) -> Result<Range<Rational>> {
        if !self.supports_dims(Some(width), Some(height), None) {
            return Err(CapsError::InvalidArgument(format!(
                "unsupported size {width}x{height}"
            )));
        }
        let block_count = self.block_count(width, height);
        let lower = Rational::new(self.blocks_per_second_range.lower(), block_count)
            .max(Rational::from_int(self.frame_rate_range.lower() as i64));
        let upper = Rational::new(self.blocks_per_second_range.upper(), block_count)
            .min(Rational::from_int(self.frame_rate_range.upper() as i64));
        Range::new(lower, upper)
    }

    /// Empirically achievable frame rates at the given frame size, scaled
    /// from the measurement bucket closest in block count. `None` when the
    /// codec published no measurements.
    pub fn achievable_frame_rates_for(&self, width: i32, height: i32) -> Option<Range<Rational>> {
        if self.measured_frame_rates.is_empty() {
            tracing::debug!("codec published no measured frame rates");
            return None;
        }
        let target = self.block_count(width, height).max(1);
        let mut closest: Option<((i32, i32), Range<i64>)> = None;
        let mut best_diff = i64::MAX;
        for (&size, &rates) in &self.measured_frame_rates {
            let diff = (self.block_count(size.0, size.1) - target).abs();
            // ties go to the larger bucket
            if diff <= best_diff {
                best_diff = diff;
                closest = Some((size, rates));
            }
        }
        let (size, rates) = closest?;
        let measured = self.block_count(size.0, size.1);
        Range::new(
            Rational::new(rates.lower() * measured, target),
            Rational::new(rates.upper() * measured, target),
        )
        .ok()
    }

    fn block_count(&self, width: i32, height: i32) -> i64 {
        div_up(width, self.block_width) as i64 * div_up(height, self.block_height) as i64
    }

    fn apply_level_limits(
        &mut self,
        mime_type: &str,
        declared: &[ProfileLevel],
        attrs: &FormatMap,
    ) -> Result<ErrorFlags> {
        match levels::evaluate(mime_type, declared, attrs) {
            Some(lim) => {
                self.allow_mb_override = lim.allow_mb_override;
                self.apply_macro_block_limits(
                    lim.min_horizontal_blocks,
                    lim.min_vertical_blocks,
                    lim.max_horizontal_blocks,
                    lim.max_vertical_blocks,
                    lim.max_blocks,
                    lim.max_blocks_per_second,
                    lim.block_width,
                    lim.block_height,
                    lim.width_alignment,
                    lim.height_alignment,
                )?;
                self.bitrate_range =
                    Range::new(1, lim.max_bitrate_bps.min(i32::MAX as i64) as i32)?;
                match lim.frame_rate {
                    Some(FrameRateRule::Replace { min, max }) => {
                        self.frame_rate_range = Range::new(min, max)?;
                    }
                    Some(FrameRateRule::Intersect { min, max }) => {
                        self.frame_rate_range = self.frame_rate_range.intersect_bounds(min, max)?;
                    }
                    None => {}
                }
                Ok(lim.errors)
            }
            None => {
                tracing::warn!(mime = mime_type, "no level table for media type");
                // minimal bitrate floor; expected to be overridden by the
                // attribute map under the replace rule
                self.bitrate_range = Range::new_unchecked(1, 64_000);
                Ok(ErrorFlags::UNSUPPORTED)
            }
        }
    }

    /// Fold device-supplied override ranges from the attribute map into the
    /// table-derived limits, applying the replace-versus-narrow precedence
    /// rule, then recompute the derived fields.
    fn parse_from_info(&mut self, attrs: &FormatMap, errors: &mut ErrorFlags) -> Result<()> {
        let mut block_size = (self.block_width, self.block_height);
        let mut alignment = (self.width_alignment, self.height_alignment);
        if let Some(s) = attrs.get_str(keys::BLOCK_SIZE) {
            block_size = format::parse_size(keys::BLOCK_SIZE, s)?;
        }
        if let Some(s) = attrs.get_str(keys::ALIGNMENT) {
            alignment = format::parse_size(keys::ALIGNMENT, s)?;
        }
        let counts = match attrs.get_str(keys::BLOCK_COUNT_RANGE) {
            Some(s) => Some(format::parse_int_range(keys::BLOCK_COUNT_RANGE, s)?),
            None => None,
        };
        let block_rates = match attrs.get_str(keys::BLOCKS_PER_SECOND_RANGE) {
            Some(s) => Some(format::parse_long_range(keys::BLOCKS_PER_SECOND_RANGE, s)?),
            None => None,
        };
        self.measured_frame_rates = parse_measured_frame_rates(attrs);

        let mut widths = None;
        let mut heights = None;
        if let Some(s) = attrs.get_str(keys::SIZE_RANGE) {
            let (w, h) = format::parse_size_range(keys::SIZE_RANGE, s)?;
            widths = Some(w);
            heights = Some(h);
        }
        if attrs.contains_key(keys::FEATURE_CAN_SWAP_WIDTH_HEIGHT) {
            match (widths, heights) {
                (Some(w), Some(h)) => {
                    self.smaller_dimension_upper_limit = w.upper().min(h.upper());
                    let both = w.extend(&h);
                    widths = Some(both);
                    heights = Some(both);
                }
                _ => {
                    tracing::warn!("can-swap-width-height without a size range");
                    self.smaller_dimension_upper_limit =
                        self.width_range.upper().min(self.height_range.upper());
                    let both = self.width_range.extend(&self.height_range);
                    self.width_range = both;
                    self.height_range = both;
                }
            }
        }

        let ratios = match attrs.get_str(keys::PIXEL_ASPECT_RATIO_RANGE) {
            Some(s) => Some(format::parse_rational_range(keys::PIXEL_ASPECT_RATIO_RANGE, s)?),
            None => None,
        };
        let block_ratios = match attrs.get_str(keys::BLOCK_ASPECT_RATIO_RANGE) {
            Some(s) => Some(format::parse_rational_range(keys::BLOCK_ASPECT_RATIO_RANGE, s)?),
            None => None,
        };
        let frame_rates = match attrs.get_str(keys::FRAME_RATE_RANGE) {
            Some(s) => {
                let parsed = format::parse_int_range(keys::FRAME_RATE_RANGE, s)?;
                match parsed.intersect(&FRAME_RATE_RANGE) {
                    Ok(r) => Some(r),
                    Err(_) => {
                        tracing::warn!(%parsed, "frame rate range is out of platform limits");
                        None
                    }
                }
            }
            None => None,
        };
        let bit_rates = match attrs.get_str(keys::BITRATE_RANGE) {
            Some(s) => {
                let parsed = format::parse_int_range(keys::BITRATE_RANGE, s)?;
                match parsed.intersect(&BITRATE_RANGE) {
                    Ok(r) => Some(r),
                    Err(_) => {
                        tracing::warn!(%parsed, "bitrate range is out of platform limits");
                        None
                    }
                }
            }
            None => None,
        };

        // raises the block size and alignment floors, validating that the
        // supplied values are powers of two
        self.apply_macro_block_limits(
            1,
            1,
            i32::MAX,
            i32::MAX,
            i32::MAX as i64,
            i64::MAX,
            block_size.0,
            block_size.1,
            alignment.0,
            alignment.1,
        )?;

        if errors.contains(ErrorFlags::UNSUPPORTED) || self.allow_mb_override {
            // the codec supports profiles the tables cannot bound; take the
            // supplied values clipped only to platform limits
            let mut overridden = false;
            if let Some(w) = widths {
                self.width_range = SIZE_RANGE.intersect(&w)?;
                overridden = true;
            }
            if let Some(h) = heights {
                self.height_range = SIZE_RANGE.intersect(&h)?;
                overridden = true;
            }
            let factor = self.block_width * self.block_height / (block_size.0 * block_size.1);
            if let Some(c) = counts {
                self.block_count_range = POSITIVE_I32.intersect(&c.factor_down(factor)?)?;
                overridden = true;
            }
            if let Some(r) = block_rates {
                self.blocks_per_second_range =
                    POSITIVE_I64.intersect(&r.factor_down(factor as i64)?)?;
                overridden = true;
            }
            if let Some(r) = block_ratios {
                self.block_aspect_ratio_range = POSITIVE_RATIONALS.intersect(&r.scale(
                    (self.block_height / block_size.1) as i64,
                    (self.block_width / block_size.0) as i64,
                ))?;
                overridden = true;
            }
            if let Some(r) = ratios {
                self.aspect_ratio_range = POSITIVE_RATIONALS.intersect(&r)?;
                overridden = true;
            }
            if let Some(f) = frame_rates {
                self.frame_rate_range = FRAME_RATE_RANGE.intersect(&f)?;
                overridden = true;
            }
            if let Some(b) = bit_rates {
                // bitrate replacement keys off the unsupported flag alone,
                // not the macroblock-override flag
                if errors.contains(ErrorFlags::UNSUPPORTED) {
                    self.bitrate_range = BITRATE_RANGE.intersect(&b)?;
                } else {
                    self.bitrate_range = self.bitrate_range.intersect(&b)?;
                }
                overridden = true;
            }
            if overridden {
                // the supplied ranges now govern support, so the declared
                // list having no supported entry is no longer disqualifying
                errors.remove(ErrorFlags::NONE_SUPPORTED);
            }
        } else {
            // well-behaved declaration; supplied values can only narrow the
            // table-derived limits
            if let Some(w) = widths {
                self.width_range = self.width_range.intersect(&w)?;
            }
            if let Some(h) = heights {
                self.height_range = self.height_range.intersect(&h)?;
            }
            let factor = self.block_width * self.block_height / (block_size.0 * block_size.1);
            if let Some(c) = counts {
                self.block_count_range = self.block_count_range.intersect(&c.factor_down(factor)?)?;
            }
            if let Some(r) = block_rates {
                self.blocks_per_second_range = self
                    .blocks_per_second_range
                    .intersect(&r.factor_down(factor as i64)?)?;
            }
            if let Some(r) = block_ratios {
                self.block_aspect_ratio_range = self.block_aspect_ratio_range.intersect(&r.scale(
                    (self.block_height / block_size.1) as i64,
                    (self.block_width / block_size.0) as i64,
                ))?;
            }
            if let Some(r) = ratios {
                self.aspect_ratio_range = self.aspect_ratio_range.intersect(&r)?;
            }
            if let Some(f) = frame_rates {
                self.frame_rate_range = self.frame_rate_range.intersect(&f)?;
            }
            if let Some(b) = bit_rates {
                self.bitrate_range = self.bitrate_range.intersect(&b)?;
            }
        }
        self.update_limits()
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_macro_block_limits(
        &mut self,
        min_horizontal_blocks: i32,
        min_vertical_blocks: i32,
        max_horizontal_blocks: i32,
        max_vertical_blocks: i32,
        max_blocks: i64,
        max_blocks_per_second: i64,
        block_width: i32,
        block_height: i32,
        width_alignment: i32,
        height_alignment: i32,
    ) -> Result<()> {
        self.apply_alignment(width_alignment, height_alignment)?;
        self.apply_block_limits(
            block_width,
            block_height,
            Range::new(1, max_blocks.min(i32::MAX as i64) as i32)?,
            Range::new(1, max_blocks_per_second)?,
            Range::new(
                Rational::new(1, max_vertical_blocks as i64),
                Rational::new(max_horizontal_blocks as i64, 1),
            )?,
        )?;
        let width_factor = self.block_width / block_width;
        let height_factor = self.block_height / block_height;
        self.horizontal_block_range = self.horizontal_block_range.intersect_bounds(
            div_up(min_horizontal_blocks, width_factor),
            max_horizontal_blocks / width_factor,
        )?;
        self.vertical_block_range = self.vertical_block_range.intersect_bounds(
            div_up(min_vertical_blocks, height_factor),
            max_vertical_blocks / height_factor,
        )?;
        Ok(())
    }

    /// Raise the pixel alignment floors, growing the block size when an
    /// alignment exceeds it, and snap the pixel ranges to the new grid.
    fn apply_alignment(&mut self, width_alignment: i32, height_alignment: i32) -> Result<()> {
        check_power_of_two("width alignment", width_alignment)?;
        check_power_of_two("height alignment", height_alignment)?;
        if width_alignment > self.block_width || height_alignment > self.block_height {
            // alignment must stay within the block size
            self.apply_block_limits(
                width_alignment.max(self.block_width),
                height_alignment.max(self.block_height),
                POSITIVE_I32,
                POSITIVE_I64,
                POSITIVE_RATIONALS,
            )?;
        }
        self.width_alignment = width_alignment.max(self.width_alignment);
        self.height_alignment = height_alignment.max(self.height_alignment);
        self.width_range = self.width_range.align(self.width_alignment)?;
        self.height_range = self.height_range.align(self.height_alignment)?;
        Ok(())
    }

    /// Intersect block-unit limits expressed in `block_width` x
    /// `block_height` units, first rescaling both the current limits and
    /// the incoming ones to the larger of the two block sizes.
    fn apply_block_limits(
        &mut self,
        block_width: i32,
        block_height: i32,
        counts: Range<i32>,
        rates: Range<i64>,
        ratios: Range<Rational>,
    ) -> Result<()> {
        check_power_of_two("block width", block_width)?;
        check_power_of_two("block height", block_height)?;
        let new_block_width = block_width.max(self.block_width);
        let new_block_height = block_height.max(self.block_height);

        // rescale the accumulated limits to the new block size
        let factor = new_block_width * new_block_height / self.block_width / self.block_height;
        if factor != 1 {
            self.block_count_range = self.block_count_range.factor_down(factor)?;
            self.blocks_per_second_range = self.blocks_per_second_range.factor_down(factor as i64)?;
            self.block_aspect_ratio_range = self.block_aspect_ratio_range.scale(
                (new_block_height / self.block_height) as i64,
                (new_block_width / self.block_width) as i64,
            );
            self.horizontal_block_range = self
                .horizontal_block_range
                .factor_down(new_block_width / self.block_width)?;
            self.vertical_block_range = self
                .vertical_block_range
                .factor_down(new_block_height / self.block_height)?;
        }

        // rescale the incoming limits likewise
        let factor = new_block_width * new_block_height / block_width / block_height;
        let (counts, rates, ratios) = if factor != 1 {
            (
                counts.factor_down(factor)?,
                rates.factor_down(factor as i64)?,
                ratios.scale(
                    (new_block_height / block_height) as i64,
                    (new_block_width / block_width) as i64,
                ),
            )
        } else {
            (counts, rates, ratios)
        };

        self.block_count_range = self.block_count_range.intersect(&counts)?;
        self.blocks_per_second_range = self.blocks_per_second_range.intersect(&rates)?;
        self.block_aspect_ratio_range = self.block_aspect_ratio_range.intersect(&ratios)?;
        self.block_width = new_block_width;
        self.block_height = new_block_height;
        Ok(())
    }

    /// Recompute the derived fields so pixel ranges, block ranges, rates
    /// and aspect ratios are mutually consistent, picking the tightest
    /// bound on each conversion path.
    fn update_limits(&mut self) -> Result<()> {
        // pixels -> blocks
        self.horizontal_block_range = self
            .horizontal_block_range
            .intersect(&self.width_range.factor_down(self.block_width)?)?;
        self.horizontal_block_range = self.horizontal_block_range.intersect_bounds(
            self.block_count_range.lower() / self.vertical_block_range.upper(),
            self.block_count_range.upper() / self.vertical_block_range.lower(),
        )?;
        self.vertical_block_range = self
            .vertical_block_range
            .intersect(&self.height_range.factor_down(self.block_height)?)?;
        self.vertical_block_range = self.vertical_block_range.intersect_bounds(
            self.block_count_range.lower() / self.horizontal_block_range.upper(),
            self.block_count_range.upper() / self.horizontal_block_range.lower(),
        )?;
        self.block_count_range = self.block_count_range.intersect_bounds(
            self.horizontal_block_range
                .lower()
                .saturating_mul(self.vertical_block_range.lower()),
            self.horizontal_block_range
                .upper()
                .saturating_mul(self.vertical_block_range.upper()),
        )?;
        self.block_aspect_ratio_range = self.block_aspect_ratio_range.intersect_bounds(
            Rational::new(
                self.horizontal_block_range.lower() as i64,
                self.vertical_block_range.upper() as i64,
            ),
            Rational::new(
                self.horizontal_block_range.upper() as i64,
                self.vertical_block_range.lower() as i64,
            ),
        )?;
        // blocks -> pixels
        self.width_range = self.width_range.intersect_bounds(
            (self.horizontal_block_range.lower() - 1)
                .saturating_mul(self.block_width)
                .saturating_add(self.width_alignment),
            self.horizontal_block_range.upper().saturating_mul(self.block_width),
        )?;
        self.height_range = self.height_range.intersect_bounds(
            (self.vertical_block_range.lower() - 1)
                .saturating_mul(self.block_height)
                .saturating_add(self.height_alignment),
            self.vertical_block_range.upper().saturating_mul(self.block_height),
        )?;
        self.aspect_ratio_range = self.aspect_ratio_range.intersect_bounds(
            Rational::new(self.width_range.lower() as i64, self.height_range.upper() as i64),
            Rational::new(self.width_range.upper() as i64, self.height_range.lower() as i64),
        )?;
        self.smaller_dimension_upper_limit = self
            .smaller_dimension_upper_limit
            .min(self.width_range.upper())
            .min(self.height_range.upper());
        // blocks -> rate
        self.blocks_per_second_range = self.blocks_per_second_range.intersect_bounds(
            self.block_count_range.lower() as i64 * self.frame_rate_range.lower() as i64,
            self.block_count_range.upper() as i64 * self.frame_rate_range.upper() as i64,
        )?;
        self.frame_rate_range = self.frame_rate_range.intersect_bounds(
            clamp_i32(self.blocks_per_second_range.lower() / self.block_count_range.upper() as i64),
            clamp_i32(self.blocks_per_second_range.upper() / self.block_count_range.lower() as i64),
        )?;
        Ok(())
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn check_power_of_two(what: &str, value: i32) -> Result<()> {
    if value <= 0 || !(value as u32).is_power_of_two() {
        return Err(CapsError::InvalidArgument(format!(
            "{what} {value} is not a positive power of two"
        )));
    }
    Ok(())
}

/// Collect `measured-frame-rate-WIDTHxHEIGHT-range` entries. Malformed
/// entries are logged and skipped.
fn parse_measured_frame_rates(attrs: &FormatMap) -> BTreeMap<(i32, i32), Range<i64>> {
    let mut rates = BTreeMap::new();
    for key in attrs.keys() {
        let Some(middle) = key
            .strip_prefix(keys::MEASURED_FRAME_RATE_PREFIX)
            .and_then(|rest| rest.strip_suffix(keys::MEASURED_FRAME_RATE_SUFFIX))
        else {
            continue;
        };
        let size = match format::parse_size(key, middle) {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(key, %err, "ignoring malformed measured frame rate key");
                continue;
            }
        };
        let Some(value) = attrs.get_str(key) else {
            continue;
        };
        match format::parse_long_range(key, value) {
            Ok(range) => {
                rates.insert(size, range);
            }
            Err(err) => {
                tracing::warn!(key, %err, "ignoring malformed measured frame rate value");
            }
        }
    }
    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime;
    use crate::profile::{avc, h263};
    use mediacaps_core::format::keys;

    fn avc_baseline_31() -> VideoCapabilities {
        let declared = [ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31)];
        let (caps, errors) =
            VideoCapabilities::new(mime::VIDEO_AVC, &declared, &FormatMap::new()).unwrap();
        assert!(errors.is_empty());
        caps
    }

    #[test]
    fn avc_baseline_31_derived_ranges() {
        let caps = avc_baseline_31();
        // level 3.1: 3600 macroblocks, 108000 MB/s, 14 Mbps at 1000x scale
        assert_eq!(caps.block_count_range().upper(), 3600);
        assert_eq!(caps.blocks_per_second_range().upper(), 108_000);
        assert_eq!(caps.bitrate_range().upper(), 14_000_000);
        assert_eq!(caps.supported_widths().upper(), 169 * 16);
    }

    #[test]
    fn avc_baseline_31_supports_dvd_like_stream() {
        let caps = avc_baseline_31();
        assert!(caps.supports(720, 480, Some(30.0)));
        let mut format = FormatMap::new();
        format
            .set_int(keys::WIDTH, 720)
            .set_int(keys::HEIGHT, 480)
            .set_int(keys::FRAME_RATE, 30)
            .set_int(keys::BITRATE, 2_000_000);
        assert!(caps.supports_format(&format));
        format.set_int(keys::BITRATE, 50_000_000);
        assert!(!caps.supports_format(&format));
    }

    #[test]
    fn alignment_is_enforced() {
        let caps = avc_baseline_31();
        assert!(!caps.supports(721, 480, None));
    }

    #[test]
    fn h263_level45_baseline_is_pinned_to_the_qcif_grid() {
        let declared = [ProfileLevel::new(h263::PROFILE_BASELINE, h263::LEVEL_45)];
        let (caps, errors) =
            VideoCapabilities::new(mime::VIDEO_H263, &declared, &FormatMap::new()).unwrap();
        assert!(errors.is_empty());
        assert!(caps.supports(176, 144, Some(15.0)));
        assert!(caps.supports(128, 96, None));
        assert!(!caps.supports(352, 288, None));
        assert!(!caps.supports(176, 144, Some(30.0)));
    }

    #[test]
    fn unsupported_profile_lets_bitrate_override_replace() {
        let declared = [ProfileLevel::new(avc::PROFILE_EXTENDED, avc::LEVEL_1)];
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::BITRATE_RANGE, "1-200000000");
        let (caps, errors) =
            VideoCapabilities::new(mime::VIDEO_AVC, &declared, &attrs).unwrap();
        // exceeds the table-derived 64 Mbps ceiling
        assert_eq!(caps.bitrate_range().upper(), 200_000_000);
        assert!(errors.contains(ErrorFlags::UNSUPPORTED));
        assert!(!errors.contains(ErrorFlags::NONE_SUPPORTED));
    }

    #[test]
    fn unknown_video_type_takes_supplied_limits() {
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::SIZE_RANGE, "64x64-4096x4096");
        let (caps, errors) = VideoCapabilities::new("video/av01", &[], &attrs).unwrap();
        assert!(errors.contains(ErrorFlags::UNSUPPORTED));
        assert_eq!(caps.supported_widths().upper(), 4096);
    }

    #[test]
    fn zero_lower_size_range_constructs() {
        // "0x0-WxH" is the conventional spelling for an unbounded minimum
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::SIZE_RANGE, "0x0-4096x2304");
        let (caps, errors) = VideoCapabilities::new(mime::VIDEO_VP9, &[], &attrs).unwrap();
        assert!(errors.is_empty());
        assert!(caps.supported_widths().lower() >= 1);
        assert!(caps.supports(1920, 1080, None));
        assert!(!caps.supports(4104, 2304, None));
    }

    #[test]
    fn recognized_profile_overrides_only_narrow() {
        let declared = [ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31)];
        let mut attrs = FormatMap::new();
        attrs.set_str(keys::SIZE_RANGE, "64x64-8192x8192");
        let (caps, _) = VideoCapabilities::new(mime::VIDEO_AVC, &declared, &attrs).unwrap();
        // level 3.1 caps the dimension below the supplied 8192
        assert_eq!(caps.supported_widths().upper(), 169 * 16);
    }

    #[test]
    fn widths_and_heights_are_mutual_inverses() {
        let caps = avc_baseline_31();
        let widths = caps.supported_widths_for(480).unwrap();
        for width in [widths.lower(), widths.upper()] {
            let heights = caps.supported_heights_for(width).unwrap();
            assert!(
                heights.contains(480),
                "height 480 not in {heights} for width {width}"
            );
        }
    }

    #[test]
    fn measured_frame_rates_scale_by_block_count() {
        let declared = [ProfileLevel::new(avc::PROFILE_BASELINE, avc::LEVEL_31)];
        let mut attrs = FormatMap::new();
        attrs.set_str("measured-frame-rate-1280x720-range", "30-60");
        let (caps, _) = VideoCapabilities::new(mime::VIDEO_AVC, &declared, &attrs).unwrap();
        let rates = caps.achievable_frame_rates_for(1280, 720).unwrap();
        assert_eq!(rates.lower(), Rational::from_int(30));
        assert_eq!(rates.upper(), Rational::from_int(60));
        // half the blocks doubles the estimate
        let rates = caps.achievable_frame_rates_for(640, 720).unwrap();
        assert_eq!(rates.lower(), Rational::from_int(60));
    }

    #[test]
    fn can_swap_width_height_extends_both_axes() {
        let mut attrs = FormatMap::new();
        attrs
            .set_str(keys::SIZE_RANGE, "64x64-1920x1088")
            .set_int(keys::FEATURE_CAN_SWAP_WIDTH_HEIGHT, 1);
        let (caps, _) = VideoCapabilities::new("video/av01", &[], &attrs).unwrap();
        assert_eq!(caps.supported_widths().upper(), 1920);
        assert_eq!(caps.supported_heights().upper(), 1920);
        assert_eq!(caps.smaller_dimension_upper_limit(), 1088);
    }
}
