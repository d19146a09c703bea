//! One- and two-dimensional numeric ranges.
//!
//! - [`Interval`] — a `(low, high)` range with inclusive or exclusive
//!   endpoints.
//! - [`BoundingBox`] — a pair of intervals used for containment checks on
//!   points and for aspect-ratio adjustments of plot areas.

use crate::error::{MorphError, Result};
use glam::DVec2;
use std::fmt;

/// A numeric range `low < high`.
///
/// Membership uses `<` on both ends for exclusive intervals and `<=` for
/// inclusive ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    low: f64,
    high: f64,
    inclusive: bool,
}

impl Interval {
    /// Creates a new interval.
    ///
    /// ### Errors
    /// [`MorphError::InvalidBounds`] if either bound is not finite or if
    /// `low >= high`.
    pub fn new(low: f64, high: f64, inclusive: bool) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(MorphError::InvalidBounds(format!(
                "bounds must be finite, got ({low}, {high})"
            )));
        }
        if low >= high {
            return Err(MorphError::InvalidBounds(format!(
                "right bound must be strictly greater than left bound, got ({low}, {high})"
            )));
        }
        Ok(Self {
            low,
            high,
            inclusive,
        })
    }

    /// Exclusive interval `(low, high)`.
    pub fn exclusive(low: f64, high: f64) -> Result<Self> {
        Self::new(low, high, false)
    }

    /// Inclusive interval `[low, high]`.
    pub fn inclusive(low: f64, high: f64) -> Result<Self> {
        Self::new(low, high, true)
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    /// Returns `true` if `value` lies inside the interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        if self.inclusive {
            self.low <= value && value <= self.high
        } else {
            self.low < value && value < self.high
        }
    }

    /// Width of the interval.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Midpoint of the interval.
    #[inline]
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Changes the range by `value`, applying half of it to each end.
    ///
    /// Positive values grow the interval, negative values shrink it. The
    /// center is unchanged.
    ///
    /// ### Errors
    /// [`MorphError::InvalidBounds`] if `value` is zero or not finite, or
    /// if shrinking would collapse the interval.
    pub fn adjust_bounds(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value == 0.0 {
            return Err(MorphError::InvalidBounds(format!(
                "adjustment must be a non-zero finite value, got {value}"
            )));
        }
        let offset = value / 2.0;
        let (low, high) = (self.low - offset, self.high + offset);
        if low >= high {
            return Err(MorphError::InvalidBounds(format!(
                "adjusting by {value} would collapse the interval ({}, {})",
                self.low, self.high
            )));
        }
        self.low = low;
        self.high = high;
        Ok(())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inclusive {
            write!(f, "[{}, {}]", self.low, self.high)
        } else {
            write!(f, "({}, {})", self.low, self.high)
        }
    }
}

/// Two-dimensional bounds made of an x and a y [`Interval`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
}

impl BoundingBox {
    pub fn new(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    /// Tight exclusive bounds around `points`.
    ///
    /// ### Errors
    /// [`MorphError::InvalidBounds`] if `points` is empty or spans zero
    /// width on either axis.
    pub fn around(points: &[DVec2]) -> Result<Self> {
        let first = points
            .first()
            .ok_or_else(|| MorphError::InvalidBounds("cannot bound an empty point set".into()))?;
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Ok(Self {
            x: Interval::exclusive(min.x, max.x)?,
            y: Interval::exclusive(min.y, max.y)?,
        })
    }

    /// Returns `true` if the point lies inside both intervals.
    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    /// Grows (or shrinks) each axis by the given total amount.
    ///
    /// `None` or `Some(0.0)` leaves that axis unchanged.
    pub fn adjust_bounds(&mut self, x: Option<f64>, y: Option<f64>) -> Result<()> {
        if let Some(dx) = x.filter(|v| *v != 0.0) {
            self.x.adjust_bounds(dx)?;
        }
        if let Some(dy) = y.filter(|v| *v != 0.0) {
            self.y.adjust_bounds(dy)?;
        }
        Ok(())
    }

    /// Ranges of the x and y intervals.
    #[inline]
    pub fn range(&self) -> DVec2 {
        DVec2::new(self.x.range(), self.y.range())
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x.center(), self.y.center())
    }

    /// `x.range / y.range`.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.x.range() / self.y.range()
    }

    /// Makes the aspect ratio 1:1.
    ///
    /// With `shrink == false` the narrower axis is grown to match the wider
    /// one; with `shrink == true` the wider axis is shrunk instead. Centers
    /// are preserved either way.
    pub fn align_aspect_ratio(&mut self, shrink: bool) -> Result<()> {
        let range = self.range();
        let diff = range.x - range.y;
        if diff == 0.0 {
            return Ok(());
        }
        match (diff > 0.0, shrink) {
            (true, false) => self.adjust_bounds(None, Some(diff)),
            (false, false) => self.adjust_bounds(Some(-diff), None),
            (true, true) => self.adjust_bounds(Some(-diff), None),
            (false, true) => self.adjust_bounds(None, Some(diff)),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_rejects_inverted_or_empty_bounds() {
        assert!(Interval::exclusive(1.0, 1.0).is_err());
        assert!(Interval::exclusive(2.0, 1.0).is_err());
        assert!(Interval::exclusive(f64::NAN, 1.0).is_err());
        assert!(Interval::exclusive(0.0, 1.0).is_ok());
    }

    #[test]
    fn interval_membership_respects_inclusivity() {
        let open = Interval::exclusive(0.0, 10.0).unwrap();
        let closed = Interval::inclusive(0.0, 10.0).unwrap();

        assert!(!open.contains(0.0));
        assert!(!open.contains(10.0));
        assert!(open.contains(5.0));

        assert!(closed.contains(0.0));
        assert!(closed.contains(10.0));
        assert!(!closed.contains(10.5));
    }

    #[test]
    fn adjust_bounds_changes_range_and_keeps_center() {
        for value in [4.0, -2.5, 0.75, 100.0] {
            let mut interval = Interval::exclusive(10.0, 20.0).unwrap();
            interval.adjust_bounds(value).unwrap();
            assert!((interval.range() - (10.0 + value)).abs() < 1e-12);
            assert!((interval.center() - 15.0).abs() < 1e-12);
            assert!(interval.low() < interval.high());
        }
    }

    #[test]
    fn adjust_bounds_rejects_zero_and_collapse() {
        let mut interval = Interval::exclusive(0.0, 1.0).unwrap();
        assert!(interval.adjust_bounds(0.0).is_err());
        assert!(interval.adjust_bounds(-1.0).is_err());
        assert!(interval.adjust_bounds(-3.0).is_err());
        // Failed adjustments leave the interval untouched.
        assert_eq!(interval, Interval::exclusive(0.0, 1.0).unwrap());
    }

    #[test]
    fn bounding_box_contains_requires_both_axes() {
        let bbox = BoundingBox::new(
            Interval::exclusive(0.0, 10.0).unwrap(),
            Interval::inclusive(-5.0, 5.0).unwrap(),
        );
        assert!(bbox.contains(DVec2::new(1.0, 5.0)));
        assert!(!bbox.contains(DVec2::new(0.0, 0.0)));
        assert!(!bbox.contains(DVec2::new(1.0, 5.1)));
    }

    #[test]
    fn around_fits_points_tightly() {
        let points = [
            DVec2::new(10.0, 50.0),
            DVec2::new(20.0, 50.0),
            DVec2::new(30.0, 80.0),
        ];
        let bbox = BoundingBox::around(&points).unwrap();
        assert_eq!(bbox.x.low(), 10.0);
        assert_eq!(bbox.x.high(), 30.0);
        assert_eq!(bbox.y.low(), 50.0);
        assert_eq!(bbox.y.high(), 80.0);
        assert!(!bbox.x.is_inclusive());
    }

    #[test]
    fn around_rejects_flat_point_sets() {
        let points = [DVec2::new(1.0, 0.0), DVec2::new(1.0, 2.0)];
        assert!(BoundingBox::around(&points).is_err());
        assert!(BoundingBox::around(&[]).is_err());
    }

    #[test]
    fn align_aspect_ratio_grows_or_shrinks() {
        let wide = BoundingBox::new(
            Interval::exclusive(0.0, 40.0).unwrap(),
            Interval::exclusive(0.0, 10.0).unwrap(),
        );

        let mut grown = wide;
        grown.align_aspect_ratio(false).unwrap();
        assert!((grown.aspect_ratio() - 1.0).abs() < 1e-12);
        assert!((grown.y.range() - 40.0).abs() < 1e-12);
        assert_eq!(grown.center(), wide.center());

        let mut shrunk = wide;
        shrunk.align_aspect_ratio(true).unwrap();
        assert!((shrunk.aspect_ratio() - 1.0).abs() < 1e-12);
        assert!((shrunk.x.range() - 10.0).abs() < 1e-12);
        assert_eq!(shrunk.center(), wide.center());

        let tall = BoundingBox::new(
            Interval::exclusive(-1.0, 1.0).unwrap(),
            Interval::exclusive(3.0, 9.0).unwrap(),
        );
        for shrink in [false, true] {
            let mut b = tall;
            b.align_aspect_ratio(shrink).unwrap();
            assert!((b.aspect_ratio() - 1.0).abs() < 1e-12);
        }
    }
}
