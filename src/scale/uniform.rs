use crate::error::{Error, Result};
use crate::instant::Instant;
use crate::label::Labeler;

use super::period::Period;
use super::check_frequency;

/// Grid of evenly spaced instants: `anchor + position × unit × frequency`.
///
/// Only units of constant length are accepted; months and years belong on a
/// [`CalendarGrid`](super::CalendarGrid).
#[derive(Debug, Clone)]
pub struct UniformGrid {
    anchor: Instant,
    unit: Period,
    unit_micros: i64,
    frequency: i64,
    position: i64,
    labeler: Labeler,
}

impl UniformGrid {
    /// Grid positioned on its anchor.
    pub fn new(anchor: Instant, unit: Period, frequency: i64) -> Result<Self> {
        check_frequency(frequency)?;
        if anchor.is_special() {
            return Err(Error::config("anchor is outside the supported range"));
        }
        let unit_micros = unit.fixed_micros().ok_or_else(|| {
            Error::config(format!("{} have no fixed length for a uniform grid", unit))
        })?;
        Ok(Self {
            anchor,
            unit,
            unit_micros,
            frequency,
            position: 0,
            labeler: unit.default_labeler(),
        })
    }

    /// Grid positioned on the step containing `target`.
    ///
    /// Without an explicit anchor the target itself becomes the anchor.
    pub fn at(target: Instant, anchor: Option<Instant>, unit: Period, frequency: i64) -> Result<Self> {
        let grid = Self::new(anchor.unwrap_or(target), unit, frequency)?;
        grid.rebased(target)
    }

    pub fn with_labeler(mut self, labeler: Labeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn anchor(&self) -> Instant {
        self.anchor
    }

    pub fn unit(&self) -> Period {
        self.unit
    }

    pub fn frequency(&self) -> i64 {
        self.frequency
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn labeler(&self) -> Labeler {
        self.labeler
    }

    /// Microseconds between consecutive positions.
    pub fn step_micros(&self) -> i128 {
        i128::from(self.unit_micros) * i128::from(self.frequency)
    }

    pub fn instant(&self) -> Instant {
        self.anchor
            .offset_by(i128::from(self.position).saturating_mul(self.step_micros()))
    }

    pub(crate) fn reference(&self) -> Self {
        Self {
            position: 0,
            ..self.clone()
        }
    }

    pub(crate) fn rebased(&self, target: Instant) -> Result<Self> {
        if target.is_special() {
            return Err(Error::config("target is outside the supported range"));
        }
        let position = target
            .micros_since(self.anchor)
            .div_euclid(self.step_micros())
            .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        Ok(Self {
            position,
            ..self.clone()
        })
    }

    pub(crate) fn advance(&mut self, n: i64) {
        self.position = self.position.saturating_add(n);
    }
}

impl PartialEq for UniformGrid {
    fn eq(&self, other: &Self) -> bool {
        self.anchor == other.anchor
            && self.unit == other.unit
            && self.frequency == other.frequency
            && self.position == other.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn y2k() -> Instant {
        Instant::from_ymd(2000, 1, 1).unwrap()
    }

    #[test]
    fn test_step_forward_one_day() {
        let mut grid = UniformGrid::new(y2k(), Period::Days, 1).unwrap();
        grid.advance(1);
        assert_eq!(grid.instant(), Instant::from_ymd(2000, 1, 2).unwrap());
        grid.advance(-2);
        assert_eq!(grid.instant(), Instant::from_ymd(1999, 12, 31).unwrap());
    }

    #[test]
    fn test_frequency_multiplies_step() {
        let mut grid = UniformGrid::new(y2k(), Period::Minutes, 15).unwrap();
        grid.advance(3);
        assert_eq!(grid.instant(), y2k() + Duration::minutes(45));
    }

    #[test]
    fn test_at_uses_floor() {
        let target = y2k() + Duration::hours(30);
        let grid = UniformGrid::at(target, Some(y2k()), Period::Days, 1).unwrap();
        assert_eq!(grid.position(), 1);
        assert!(grid.instant() <= target);

        // One microsecond before the anchor belongs to the previous day.
        let before = y2k() - Duration::microseconds(1);
        let grid = UniformGrid::at(before, Some(y2k()), Period::Days, 1).unwrap();
        assert_eq!(grid.position(), -1);
        assert_eq!(grid.instant(), Instant::from_ymd(1999, 12, 31).unwrap());

        let grid = UniformGrid::at(y2k() - Duration::days(1), Some(y2k()), Period::Days, 1).unwrap();
        assert_eq!(grid.position(), -1);
    }

    #[test]
    fn test_at_without_anchor() {
        let target = y2k() + Duration::seconds(5);
        let grid = UniformGrid::at(target, None, Period::Seconds, 1).unwrap();
        assert_eq!(grid.position(), 0);
        assert_eq!(grid.anchor(), target);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(UniformGrid::new(y2k(), Period::Days, 0).is_err());
        assert!(UniformGrid::new(y2k(), Period::Days, -1).is_err());
        assert!(UniformGrid::new(y2k(), Period::Months, 1).is_err());
        assert!(UniformGrid::new(Instant::from_micros(i64::MAX), Period::Days, 1).is_err());
        let grid = UniformGrid::new(y2k(), Period::Days, 1).unwrap();
        assert!(grid.rebased(Instant::from_micros(i64::MIN)).is_err());
    }

    #[test]
    fn test_equality_ignores_nothing_but_labeler() {
        let a = UniformGrid::new(y2k(), Period::Days, 1).unwrap();
        let b = a.clone().with_labeler(Labeler::Weekday);
        assert_eq!(a, b);
        let mut c = a.clone();
        c.advance(1);
        assert_ne!(a, c);
        let d = UniformGrid::new(y2k(), Period::Days, 2).unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn test_far_positions_saturate() {
        let mut grid = UniformGrid::new(y2k(), Period::Weeks, 1_000).unwrap();
        grid.advance(i64::MAX / 2);
        assert_eq!(grid.instant(), Instant::MAX);
    }
}
