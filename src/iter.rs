//! Bidirectional cursors over a scale.
//!
//! Each iterator owns a private copy of the scale it was created from, so
//! moving it never affects the scale or other iterators.

use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::Result;
use crate::instant::{Instant, ZonedInstant};
use crate::scale::Scale;

/// Forward cursor. `next()` yields the current instant, then steps forward.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleIter {
    scale: Scale,
}

impl ScaleIter {
    pub fn new(scale: Scale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn into_scale(self) -> Scale {
        self.scale
    }

    pub fn current(&self) -> Instant {
        self.scale.current_instant()
    }

    pub fn current_zoned(&self) -> ZonedInstant {
        self.scale.current_zoned_instant()
    }

    pub fn label(&self) -> String {
        self.scale.label()
    }

    pub fn step_forward(&mut self) -> &mut Self {
        self.scale.advance(1);
        self
    }

    pub fn step_back(&mut self) -> &mut Self {
        self.scale.advance(-1);
        self
    }

    pub fn advance_by(&mut self, n: i64) -> &mut Self {
        self.scale.advance(n);
        self
    }

    /// Copy moved `n` steps.
    pub fn offset(&self, n: i64) -> Self {
        Self::new(self.scale.shifted_by(n))
    }

    /// Steps from `other` to `self`.
    pub fn distance(&self, other: &ScaleIter) -> Result<i64> {
        self.scale.difference(&other.scale)
    }
}

impl Iterator for ScaleIter {
    type Item = Instant;

    fn next(&mut self) -> Option<Instant> {
        let current = self.current();
        self.scale.advance(1);
        Some(current)
    }
}

impl AddAssign<i64> for ScaleIter {
    fn add_assign(&mut self, n: i64) {
        self.scale.advance(n);
    }
}

impl SubAssign<i64> for ScaleIter {
    fn sub_assign(&mut self, n: i64) {
        self.scale.advance(n.saturating_neg());
    }
}

impl Add<i64> for ScaleIter {
    type Output = ScaleIter;

    fn add(mut self, n: i64) -> ScaleIter {
        self += n;
        self
    }
}

impl Sub<i64> for ScaleIter {
    type Output = ScaleIter;

    fn sub(mut self, n: i64) -> ScaleIter {
        self -= n;
        self
    }
}

/// Backward cursor: every direction of [`ScaleIter`] inverted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseScaleIter {
    inner: ScaleIter,
}

impl ReverseScaleIter {
    pub fn new(scale: Scale) -> Self {
        Self {
            inner: ScaleIter::new(scale),
        }
    }

    pub fn scale(&self) -> &Scale {
        self.inner.scale()
    }

    /// Forward cursor at the same position.
    pub fn base(&self) -> &ScaleIter {
        &self.inner
    }

    pub fn current(&self) -> Instant {
        self.inner.current()
    }

    pub fn current_zoned(&self) -> ZonedInstant {
        self.inner.current_zoned()
    }

    pub fn label(&self) -> String {
        self.inner.label()
    }

    /// Moves one position back in time.
    pub fn step_forward(&mut self) -> &mut Self {
        self.inner.step_back();
        self
    }

    /// Moves one position forward in time.
    pub fn step_back(&mut self) -> &mut Self {
        self.inner.step_forward();
        self
    }

    pub fn advance_by(&mut self, n: i64) -> &mut Self {
        self.inner.advance_by(n.saturating_neg());
        self
    }

    pub fn offset(&self, n: i64) -> Self {
        Self {
            inner: self.inner.offset(n.saturating_neg()),
        }
    }

    /// Reverse steps from `other` to `self`.
    pub fn distance(&self, other: &ReverseScaleIter) -> Result<i64> {
        self.inner.distance(&other.inner).map(|d| -d)
    }
}

impl Iterator for ReverseScaleIter {
    type Item = Instant;

    fn next(&mut self) -> Option<Instant> {
        let current = self.current();
        self.inner.step_back();
        Some(current)
    }
}

impl AddAssign<i64> for ReverseScaleIter {
    fn add_assign(&mut self, n: i64) {
        self.inner -= n;
    }
}

impl SubAssign<i64> for ReverseScaleIter {
    fn sub_assign(&mut self, n: i64) {
        self.inner += n;
    }
}

impl Add<i64> for ReverseScaleIter {
    type Output = ReverseScaleIter;

    fn add(mut self, n: i64) -> ReverseScaleIter {
        self += n;
        self
    }
}

impl Sub<i64> for ReverseScaleIter {
    type Output = ReverseScaleIter;

    fn sub(mut self, n: i64) -> ReverseScaleIter {
        self -= n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{Period, UniformGrid};

    fn hours() -> Scale {
        UniformGrid::new(Instant::from_ymd(2000, 1, 1).unwrap(), Period::Hours, 1)
            .unwrap()
            .into()
    }

    #[test]
    fn test_forward_steps() {
        let mut it = hours().iter();
        it.step_forward().step_forward();
        assert_eq!(it.current(), Instant::from_ymd_hms(2000, 1, 1, 2, 0, 0).unwrap());
        it -= 3;
        assert_eq!(it.current(), Instant::from_ymd_hms(1999, 12, 31, 23, 0, 0).unwrap());
        let ahead = it.clone() + 5;
        assert_eq!(ahead.distance(&it).unwrap(), 5);
        assert_eq!(it.distance(&ahead).unwrap(), -5);
    }

    #[test]
    fn test_iterator_yields_then_steps() {
        let collected: Vec<_> = hours().iter().take(3).collect();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0], Instant::from_ymd(2000, 1, 1).unwrap());
        assert_eq!(collected[2], Instant::from_ymd_hms(2000, 1, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_reverse_inverts_direction() {
        let mut rev = hours().rev_iter();
        rev.step_forward();
        assert_eq!(rev.current(), Instant::from_ymd_hms(1999, 12, 31, 23, 0, 0).unwrap());
        rev.step_back();
        rev += 2;
        assert_eq!(rev.current(), Instant::from_ymd_hms(1999, 12, 31, 22, 0, 0).unwrap());

        let start = hours().rev_iter();
        assert_eq!(rev.distance(&start).unwrap(), 2);
        assert_eq!((start.clone() + 2), rev);
        assert_eq!(start.offset(2), rev);
    }

    #[test]
    fn test_iterators_are_independent() {
        let scale = hours();
        let mut a = scale.iter();
        let b = a.clone();
        a.advance_by(10);
        assert_eq!(b.current(), scale.current_instant());
        assert_ne!(a, b);
    }
}
