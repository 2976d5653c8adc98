//! Property-based tests for the range algebra.
//!
//! Uses proptest to verify the algebraic laws the capability aggregation
//! code relies on: intersection behaves like a lattice meet, unit
//! conversions round-trip, and clamping stays inside the interval.

use proptest::prelude::*;
use mediacaps_core::{Range, Rational};

/// Strategy producing a valid `Range<i32>` with ordered bounds.
fn int_range() -> impl Strategy<Value = Range<i32>> {
    (-100_000i32..100_000, -100_000i32..100_000)
        .prop_map(|(a, b)| Range::new(a.min(b), a.max(b)).unwrap())
}

/// Strategy producing a positive `Range<i32>`, as used for block counts.
fn positive_range() -> impl Strategy<Value = Range<i32>> {
    (1i32..50_000, 1i32..50_000).prop_map(|(a, b)| Range::new(a.min(b), a.max(b)).unwrap())
}

proptest! {
    /// Intersection is commutative, including which side fails.
    #[test]
    fn intersect_is_commutative(a in int_range(), b in int_range()) {
        match (a.intersect(&b), b.intersect(&a)) {
            (Ok(x), Ok(y)) => prop_assert_eq!(x, y),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "one direction intersected, the other did not"),
        }
    }

    /// Intersection is associative whenever all pairwise meets exist.
    #[test]
    fn intersect_is_associative(a in int_range(), b in int_range(), c in int_range()) {
        let left = a.intersect(&b).and_then(|ab| ab.intersect(&c));
        let right = b.intersect(&c).and_then(|bc| a.intersect(&bc));
        if let (Ok(x), Ok(y)) = (left, right) {
            prop_assert_eq!(x, y);
        }
    }

    /// Intersecting a range with itself yields itself.
    #[test]
    fn intersect_is_idempotent(a in int_range()) {
        prop_assert_eq!(a.intersect(&a).unwrap(), a);
    }

    /// The meet is contained in both operands, and every value it
    /// contains is contained in both.
    #[test]
    fn intersect_is_a_lower_bound(a in int_range(), b in int_range(), v in -100_000i32..100_000) {
        if let Ok(meet) = a.intersect(&b) {
            prop_assert!(a.contains_range(&meet));
            prop_assert!(b.contains_range(&meet));
            prop_assert_eq!(meet.contains(v), a.contains(v) && b.contains(v));
        } else {
            // Disjoint operands share no value.
            prop_assert!(!(a.contains(v) && b.contains(v)));
        }
    }

    /// `extend` covers both operands.
    #[test]
    fn extend_is_an_upper_bound(a in int_range(), b in int_range()) {
        let join = a.extend(&b);
        prop_assert!(join.contains_range(&a));
        prop_assert!(join.contains_range(&b));
    }

    /// Both endpoints are members; values beyond either endpoint are not.
    #[test]
    fn contains_is_closed(a in int_range()) {
        prop_assert!(a.contains(a.lower()));
        prop_assert!(a.contains(a.upper()));
        if a.lower() > i32::MIN {
            prop_assert!(!a.contains(a.lower() - 1));
        }
        if a.upper() < i32::MAX {
            prop_assert!(!a.contains(a.upper() + 1));
        }
    }

    /// Scaling up then dividing back down restores the original range.
    #[test]
    fn factor_round_trips(a in positive_range(), k in 1i32..64) {
        prop_assert_eq!(a.factor(k).factor_down(k).unwrap(), a);
    }

    /// Dividing down never widens: the result, scaled back up, fits
    /// inside the original.
    #[test]
    fn factor_down_shrinks_inward(a in positive_range(), k in 1i32..64) {
        if let Ok(down) = a.factor_down(k) {
            prop_assert!(a.contains_range(&down.factor(k)));
        }
    }

    /// Clamped values are members, and members clamp to themselves.
    #[test]
    fn clamp_lands_inside(a in int_range(), v in -200_000i32..200_000) {
        let clamped = a.clamp(v);
        prop_assert!(a.contains(clamped));
        if a.contains(v) {
            prop_assert_eq!(clamped, v);
        }
    }

    /// Aligned bounds are multiples of the alignment and stay inside the
    /// original range.
    #[test]
    fn align_rounds_inward(a in positive_range(), exp in 0u32..8) {
        let alignment = 1i32 << exp;
        if let Ok(aligned) = a.align(alignment) {
            prop_assert_eq!(aligned.lower() % alignment, 0);
            prop_assert_eq!(aligned.upper() % alignment, 0);
            prop_assert!(a.contains_range(&aligned));
        }
    }

    /// Rational ordering agrees with exact cross-multiplication.
    #[test]
    fn rational_ordering_is_exact(
        an in 1i64..1_000_000, ad in 1i64..1_000_000,
        bn in 1i64..1_000_000, bd in 1i64..1_000_000,
    ) {
        let a = Rational::new(an, ad);
        let b = Rational::new(bn, bd);
        let exact = (an as i128 * bd as i128).cmp(&(bn as i128 * ad as i128));
        prop_assert_eq!(a.cmp(&b), exact);
    }

    /// Scaling a rational range by `k/k` is the identity.
    #[test]
    fn rational_scale_by_one_is_identity(
        n in 1i64..10_000, d in 1i64..10_000, k in 1i64..1_000,
    ) {
        let r = Range::new(Rational::new(n, d), Rational::new(n + 1, d)).unwrap();
        prop_assert_eq!(r.scale(k, k), r);
    }
}
