//! Closed-interval range algebra.
//!
//! Capability limits are expressed as immutable closed intervals
//! `[lower, upper]` over integers or [`Rational`]s. The aggregation code
//! combines standard-derived and device-supplied intervals with
//! [`Range::intersect`] and [`Range::extend`], and converts between pixel
//! and block units with [`Range::factor`] / [`Range::factor_down`].

use crate::error::{CapsError, Result};
use crate::rational::Rational;
use std::fmt;

/// An immutable closed interval `[lower, upper]`.
///
/// Invariant: `lower <= upper`, established at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range<T> {
    lower: T,
    upper: T,
}

impl<T: Copy + Ord + fmt::Display> Range<T> {
    /// Create a new range, failing with [`CapsError::InvalidRange`] if
    /// `lower > upper`.
    pub fn new(lower: T, upper: T) -> Result<Self> {
        if lower > upper {
            return Err(CapsError::InvalidRange {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
        Ok(Self { lower, upper })
    }

    /// Lower bound.
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Whether `value` lies within the interval.
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Whether `other` lies entirely within the interval.
    pub fn contains_range(&self, other: &Self) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }

    /// Intersect with another range, failing with
    /// [`CapsError::EmptyIntersection`] when the two do not overlap.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        let lower = self.lower.max(other.lower);
        let upper = self.upper.min(other.upper);
        if lower > upper {
            return Err(CapsError::EmptyIntersection {
                a: format!("{}, {}", self.lower, self.upper),
                b: format!("{}, {}", other.lower, other.upper),
            });
        }
        Ok(Self { lower, upper })
    }

    /// Intersect with the interval `[lower, upper]`.
    pub fn intersect_bounds(&self, lower: T, upper: T) -> Result<Self> {
        self.intersect(&Self::new(lower, upper)?)
    }

    /// Smallest range covering both inputs: `[min lowers, max uppers]`.
    ///
    /// This is a bound union, not a set union; the result may cover values
    /// that neither input contains.
    pub fn extend(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Clamp `value` into the interval.
    pub fn clamp(&self, value: T) -> T {
        if value < self.lower {
            self.lower
        } else if value > self.upper {
            self.upper
        } else {
            value
        }
    }
}

impl<T: Copy> Range<T> {
    /// Create a range without checking the ordering invariant. Usable in
    /// `const` platform-limit tables; the caller must ensure
    /// `lower <= upper`.
    pub const fn new_unchecked(lower: T, upper: T) -> Self {
        Self { lower, upper }
    }
}

impl Range<i32> {
    /// Multiply both bounds by `factor`, saturating at the type limits.
    pub fn factor(&self, factor: i32) -> Self {
        Self {
            lower: self.lower.saturating_mul(factor),
            upper: self.upper.saturating_mul(factor),
        }
    }

    /// Divide both bounds by `factor`, rounding the lower bound up and the
    /// upper bound down. Converts a count in fine units to coarse units
    /// (e.g. 8x8-block counts to 16x16-block counts with `factor = 4`).
    pub fn factor_down(&self, factor: i32) -> Result<Self> {
        if factor == 1 {
            return Ok(*self);
        }
        Self::new(div_up(self.lower, factor), self.upper / factor)
    }

    /// Round the lower bound up and the upper bound down to the nearest
    /// multiple of `alignment` (a positive power of two), failing if this
    /// empties the range.
    pub fn align(&self, alignment: i32) -> Result<Self> {
        if alignment <= 0 || !(alignment as u32).is_power_of_two() {
            return Err(CapsError::InvalidArgument(format!(
                "alignment {alignment} is not a positive power of two"
            )));
        }
        Self::new(
            div_up(self.lower, alignment).saturating_mul(alignment),
            (self.upper / alignment).saturating_mul(alignment),
        )
    }
}

impl Range<i64> {
    /// Multiply both bounds by `factor`, saturating at the type limits.
    pub fn factor(&self, factor: i64) -> Self {
        Self {
            lower: self.lower.saturating_mul(factor),
            upper: self.upper.saturating_mul(factor),
        }
    }

    /// Divide both bounds by `factor`, rounding the lower bound up and the
    /// upper bound down.
    pub fn factor_down(&self, factor: i64) -> Result<Self> {
        if factor == 1 {
            return Ok(*self);
        }
        Self::new(div_up_i64(self.lower, factor), self.upper / factor)
    }
}

impl Range<Rational> {
    /// Rescale both bounds by the ratio `num / den`. Used when block
    /// dimensions change and block-aspect bounds must follow.
    pub fn scale(&self, num: i64, den: i64) -> Self {
        if num == den {
            return *self;
        }
        Self {
            lower: self.lower.scale(num, den),
            upper: self.upper.scale(num, den),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Quotient of `num / den`, rounded up. Both arguments must be positive.
pub fn div_up(num: i32, den: i32) -> i32 {
    (num + den - 1) / den
}

/// Quotient of `num / den`, rounded up, for 64-bit counts.
pub fn div_up_i64(num: i64, den: i64) -> i64 {
    (num + den - 1) / den
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(matches!(
            Range::new(5, 3),
            Err(CapsError::InvalidRange { .. })
        ));
    }

    #[test]
    fn contains_is_closed_at_both_ends() {
        let r = Range::new(2, 8).unwrap();
        assert!(r.contains(2));
        assert!(r.contains(8));
        assert!(!r.contains(1));
        assert!(!r.contains(9));
    }

    #[test]
    fn intersect_overlapping() {
        let a = Range::new(1, 10).unwrap();
        let b = Range::new(5, 20).unwrap();
        assert_eq!(a.intersect(&b).unwrap(), Range::new(5, 10).unwrap());
    }

    #[test]
    fn intersect_disjoint_fails() {
        let a = Range::new(1, 4).unwrap();
        let b = Range::new(5, 9).unwrap();
        assert!(matches!(
            a.intersect(&b),
            Err(CapsError::EmptyIntersection { .. })
        ));
    }

    #[test]
    fn extend_takes_bound_union() {
        let a = Range::new(1, 4).unwrap();
        let b = Range::new(10, 20).unwrap();
        assert_eq!(a.extend(&b), Range::new(1, 20).unwrap());
    }

    #[test]
    fn clamp_snaps_to_bounds() {
        let r = Range::new(10, 20).unwrap();
        assert_eq!(r.clamp(5), 10);
        assert_eq!(r.clamp(25), 20);
        assert_eq!(r.clamp(15), 15);
    }

    #[test]
    fn factor_round_trips_when_divisible() {
        let r = Range::<i32>::new(3, 7).unwrap();
        assert_eq!(r.factor(4).factor_down(4).unwrap(), r);
    }

    #[test]
    fn align_rounds_inward() {
        let r = Range::new(3, 21).unwrap();
        assert_eq!(r.align(4).unwrap(), Range::new(4, 20).unwrap());
    }

    #[test]
    fn align_failing_when_emptied() {
        let r = Range::new(5, 7).unwrap();
        assert!(r.align(8).is_err());
    }

    #[test]
    fn align_rejects_non_power_of_two() {
        let r = Range::new(0, 100).unwrap();
        assert!(matches!(
            r.align(6),
            Err(CapsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rational_scale() {
        let r = Range::new(Rational::new(1, 2), Rational::new(2, 1)).unwrap();
        let s = r.scale(2, 1);
        assert_eq!(s.lower(), Rational::new(1, 1));
        assert_eq!(s.upper(), Rational::new(4, 1));
    }
}
