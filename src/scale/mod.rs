//! Discrete time scales.
//!
//! A scale is a cursor over an infinite, ordered sequence of instants: an
//! anchor fixes position 0 and every signed position maps to one instant.
//! Leaf grids ([`UniformGrid`], [`CalendarGrid`]) compute instants directly;
//! wrapper grids ([`FilteredGrid`], [`HolidayGrid`]) restrict a base scale to
//! a subset of its positions and renumber what is left.
//!
//! All variants share the [`Scale`] contract, so wrappers nest freely:
//!
//! ```
//! use std::sync::Arc;
//! use timescales::holidays::HolidaySet;
//! use timescales::scale::{FilteredGrid, HolidayGrid, Period, Scale, UniformGrid, Weekdays};
//! use timescales::Instant;
//!
//! let anchor = Instant::from_ymd(1999, 12, 31).unwrap();
//! let days = UniformGrid::new(anchor, Period::Days, 1).unwrap();
//! let weekdays = FilteredGrid::new(days.into(), Arc::new(Weekdays), 1).unwrap();
//! let holidays = HolidaySet::parse("20000103\n").unwrap();
//! let business = HolidayGrid::new(weekdays.into(), Some(Arc::new(holidays)), 1).unwrap();
//!
//! let next: Vec<_> = Scale::from(business).next_instants(2).collect();
//! assert_eq!(next[1], Instant::from_ymd(2000, 1, 4).unwrap());
//! ```

mod calendar;
mod filtered;
mod holiday;
pub mod period;
mod selector;
mod uniform;

use std::fmt;
use std::iter::Take;

use time::{Date, Duration};

use crate::error::{Error, Result};
use crate::instant::{Instant, ZonedInstant};
use crate::iter::{ReverseScaleIter, ScaleIter};
use crate::label::Labeler;

pub use calendar::CalendarGrid;
pub use filtered::FilteredGrid;
pub use holiday::HolidayGrid;
pub use period::{Period, PeriodCalculator};
pub use selector::{Selector, Weekdays, WeekendDays};
pub use uniform::UniformGrid;

/// Any composable time scale.
#[derive(Debug, Clone)]
pub enum Scale {
    Uniform(UniformGrid),
    Calendar(CalendarGrid),
    Filtered(FilteredGrid),
    Holiday(HolidayGrid),
}

impl Scale {
    pub fn current_instant(&self) -> Instant {
        match self {
            Scale::Uniform(grid) => grid.instant(),
            Scale::Calendar(grid) => grid.instant(),
            Scale::Filtered(grid) => grid.base().current_instant(),
            Scale::Holiday(grid) => grid.base().current_instant(),
        }
    }

    pub fn current_zoned_instant(&self) -> ZonedInstant {
        match self {
            Scale::Uniform(grid) => ZonedInstant::utc(grid.instant()),
            Scale::Calendar(grid) => grid.zoned_instant(),
            Scale::Filtered(grid) => grid.base().current_zoned_instant(),
            Scale::Holiday(grid) => grid.base().current_zoned_instant(),
        }
    }

    /// Calendar date of the current position: the UTC date for uniform
    /// grids and the local date for zoned ones.
    pub fn current_date(&self) -> Date {
        match self {
            Scale::Uniform(grid) => grid.instant().utc_date(),
            Scale::Calendar(grid) => grid.zoned_instant().local_date(),
            Scale::Filtered(grid) => grid.base().current_date(),
            Scale::Holiday(grid) => grid.base().current_date(),
        }
    }

    pub fn position(&self) -> i64 {
        match self {
            Scale::Uniform(grid) => grid.position(),
            Scale::Calendar(grid) => grid.position(),
            Scale::Filtered(grid) => grid.position(),
            Scale::Holiday(grid) => grid.position(),
        }
    }

    pub fn labeler(&self) -> Labeler {
        match self {
            Scale::Uniform(grid) => grid.labeler(),
            Scale::Calendar(grid) => grid.labeler(),
            Scale::Filtered(grid) => grid.labeler(),
            Scale::Holiday(grid) => grid.labeler(),
        }
    }

    /// Kind of the scale, e.g. `filtered(weekdays, uniform(days))`.
    ///
    /// Scales can be differenced only when their descriptions match.
    pub fn describe(&self) -> String {
        match self {
            Scale::Uniform(grid) => format!("uniform({})", grid.unit()),
            Scale::Calendar(grid) => format!("calendar({})", grid.period()),
            Scale::Filtered(grid) => {
                format!("filtered({}, {})", grid.selector().name(), grid.base().describe())
            }
            Scale::Holiday(grid) => format!("holiday({})", grid.base().describe()),
        }
    }

    /// Same configuration at position 0.
    pub fn reference(&self) -> Scale {
        match self {
            Scale::Uniform(grid) => Scale::Uniform(grid.reference()),
            Scale::Calendar(grid) => Scale::Calendar(grid.reference()),
            Scale::Filtered(grid) => Scale::Filtered(grid.reference()),
            Scale::Holiday(grid) => Scale::Holiday(grid.reference()),
        }
    }

    /// Copy moved `n` positions.
    pub fn shifted_by(&self, n: i64) -> Scale {
        let mut shifted = self.clone();
        shifted.advance(n);
        shifted
    }

    /// Copy positioned at the last position whose instant is not after `at`.
    pub fn shifted_to(&self, at: impl Into<Instant>) -> Result<Scale> {
        let at = at.into();
        Ok(match self {
            Scale::Uniform(grid) => Scale::Uniform(grid.rebased(at)?),
            Scale::Calendar(grid) => Scale::Calendar(grid.rebased(at)?),
            Scale::Filtered(grid) => Scale::Filtered(grid.rebased(at)?),
            Scale::Holiday(grid) => Scale::Holiday(grid.rebased(at)?),
        })
    }

    /// Signed number of positions from `other` to `self`, measured in this
    /// scale's configuration.
    pub fn difference(&self, other: &Scale) -> Result<i64> {
        let (left, right) = (self.describe(), other.describe());
        if left != right {
            return Err(Error::TypeMismatch { left, right });
        }
        let rebased = self.shifted_to(other.current_instant())?;
        Ok(self.position() - rebased.position())
    }

    /// Label of the interval covered by the current position.
    pub fn label(&self) -> String {
        let start = self.current_zoned_instant();
        let end = self.shifted_by(1).current_zoned_instant() - Duration::microseconds(1);
        self.labeler().label(&start, &end)
    }

    /// The `n` instants from the current position onward.
    pub fn instants(&self, n: usize) -> Vec<Instant> {
        self.next_instants(n).collect()
    }

    pub fn zoned_instants(&self, n: usize) -> Vec<ZonedInstant> {
        let mut cursor = self.clone();
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(cursor.current_zoned_instant());
            cursor.advance(1);
        }
        out
    }

    pub fn iter(&self) -> ScaleIter {
        ScaleIter::new(self.clone())
    }

    pub fn iter_at(&self, n: i64) -> ScaleIter {
        ScaleIter::new(self.shifted_by(n))
    }

    pub fn iter_from(&self, at: impl Into<Instant>) -> Result<ScaleIter> {
        Ok(ScaleIter::new(self.shifted_to(at)?))
    }

    /// Iterator `n` steps past the current position.
    pub fn end(&self, n: i64) -> ScaleIter {
        self.iter_at(n)
    }

    pub fn rev_iter(&self) -> ReverseScaleIter {
        ReverseScaleIter::new(self.clone())
    }

    /// Reverse iterator `n` reverse steps (that is, `n` positions back)
    /// from the current position.
    pub fn rev_iter_at(&self, n: i64) -> ReverseScaleIter {
        ReverseScaleIter::new(self.shifted_by(n.saturating_neg()))
    }

    pub fn rev_iter_from(&self, at: impl Into<Instant>) -> Result<ReverseScaleIter> {
        Ok(ReverseScaleIter::new(self.shifted_to(at)?))
    }

    pub fn rend(&self, n: i64) -> ReverseScaleIter {
        self.rev_iter_at(n)
    }

    /// Current instant followed by the next `n - 1`.
    pub fn next_instants(&self, n: usize) -> Take<ScaleIter> {
        self.iter().take(n)
    }

    /// Current instant followed by the previous `n - 1`, latest first.
    pub fn previous_instants(&self, n: usize) -> Take<ReverseScaleIter> {
        self.rev_iter().take(n)
    }

    pub(crate) fn advance(&mut self, n: i64) {
        match self {
            Scale::Uniform(grid) => grid.advance(n),
            Scale::Calendar(grid) => grid.advance(n),
            Scale::Filtered(grid) => grid.advance(n),
            Scale::Holiday(grid) => grid.advance(n),
        }
    }
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scale::Uniform(a), Scale::Uniform(b)) => a == b,
            (Scale::Calendar(a), Scale::Calendar(b)) => a == b,
            (Scale::Filtered(a), Scale::Filtered(b)) => a == b,
            (Scale::Holiday(a), Scale::Holiday(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<UniformGrid> for Scale {
    fn from(grid: UniformGrid) -> Self {
        Scale::Uniform(grid)
    }
}

impl From<CalendarGrid> for Scale {
    fn from(grid: CalendarGrid) -> Self {
        Scale::Calendar(grid)
    }
}

impl From<FilteredGrid> for Scale {
    fn from(grid: FilteredGrid) -> Self {
        Scale::Filtered(grid)
    }
}

impl From<HolidayGrid> for Scale {
    fn from(grid: HolidayGrid) -> Self {
        Scale::Holiday(grid)
    }
}

pub(crate) fn check_frequency(frequency: i64) -> Result<()> {
    if frequency <= 0 {
        return Err(Error::config(format!(
            "frequency must be positive, got {}",
            frequency
        )));
    }
    Ok(())
}

/// Position-skipping walks shared by the wrapper grids.
///
/// A walk fails with a configuration error when the base runs into the edge
/// of the supported range before reaching a valid position.
pub(crate) mod walk {
    use super::{Scale, Selector};
    use crate::error::{Error, Result};
    use crate::instant::Instant;

    /// Validity test for positions a selector keeps.
    pub(crate) fn selected<'a>(selector: &'a dyn Selector) -> impl Fn(&Scale) -> bool + 'a {
        move |scale: &Scale| selector.is_valid_date(scale.current_date())
    }

    /// Move the base one position in `direction`.
    pub(crate) fn nudge(grid: &mut Scale, direction: i64) -> Result<()> {
        let before = grid.current_instant();
        grid.advance(direction);
        let after = grid.current_instant();
        if after == before || after <= Instant::MIN || after >= Instant::MAX {
            return Err(Error::config(format!(
                "no valid position of {} between {} and the edge of the supported range",
                grid.describe(),
                before
            )));
        }
        Ok(())
    }

    /// Step back one base position at a time until `is_valid` holds.
    pub(crate) fn snap_back(grid: &mut Scale, is_valid: &dyn Fn(&Scale) -> bool) -> Result<()> {
        while !is_valid(grid) {
            nudge(grid, -1)?;
        }
        Ok(())
    }

    /// Step forward one base position at a time until `is_valid` holds.
    pub(crate) fn snap_forward(
        grid: &mut Scale,
        is_valid: &dyn Fn(&Scale) -> bool,
    ) -> Result<()> {
        while !is_valid(grid) {
            nudge(grid, 1)?;
        }
        Ok(())
    }

    /// Move exactly `n` valid positions, skipping invalid ones.
    pub(crate) fn step(grid: &mut Scale, n: i64, is_valid: &dyn Fn(&Scale) -> bool) -> Result<()> {
        if n > 0 {
            for _ in 0..n {
                nudge(grid, 1)?;
                snap_forward(grid, is_valid)?;
            }
        } else {
            for _ in n..0 {
                nudge(grid, -1)?;
                snap_back(grid, is_valid)?;
            }
        }
        Ok(())
    }

    /// Valid steps from `origin` to the base position `goal`.
    ///
    /// Linear in the distance. `goal` must itself be a valid position.
    pub(crate) fn count(
        origin: &Scale,
        goal: i64,
        is_valid: &dyn Fn(&Scale) -> bool,
    ) -> Result<i64> {
        let mut cursor = origin.clone();
        let mut count = 0i64;
        while cursor.position() < goal {
            step(&mut cursor, 1, is_valid)?;
            count += 1;
        }
        while cursor.position() > goal {
            step(&mut cursor, -1, is_valid)?;
            count -= 1;
        }
        log::trace!(
            "walked {} valid steps from {} to base position {}",
            count,
            origin.current_instant(),
            goal
        );
        Ok(count)
    }

    /// Position and aligned base for a wrapper with `frequency`.
    ///
    /// `count` valid steps separate `base` from the origin; the base is
    /// pulled back to the last multiple of `frequency`.
    pub(crate) fn align(
        base: &mut Scale,
        count: i64,
        frequency: i64,
        is_valid: &dyn Fn(&Scale) -> bool,
    ) -> Result<i64> {
        let remainder = count.rem_euclid(frequency);
        if remainder != 0 {
            step(base, -remainder, is_valid)?;
        }
        Ok(count.div_euclid(frequency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn day_grid(y: i32, m: u8, d: u8) -> Scale {
        UniformGrid::new(Instant::from_ymd(y, m, d).unwrap(), Period::Days, 1)
            .unwrap()
            .into()
    }

    #[test]
    fn test_clone_keeps_instant() {
        let scale = day_grid(2000, 1, 1).shifted_by(17);
        assert_eq!(scale.clone().current_instant(), scale.current_instant());
        assert_eq!(scale.clone(), scale);
    }

    #[test]
    fn test_shift_and_difference() {
        let scale = day_grid(2000, 1, 1);
        for n in [-400, -7, -1, 0, 1, 3, 365] {
            assert_eq!(scale.shifted_by(n).difference(&scale).unwrap(), n);
        }
        let p = scale.shifted_by(40);
        let q = scale.shifted_by(-3);
        assert_eq!(p.difference(&q).unwrap(), 43);
    }

    #[test]
    fn test_shifted_to_current_is_identity() {
        let scale = day_grid(2000, 1, 1).shifted_by(12);
        assert_eq!(scale.shifted_to(scale.current_instant()).unwrap(), scale);
    }

    #[test]
    fn test_kind_mismatch() {
        let days = day_grid(2000, 1, 1);
        let hours: Scale = UniformGrid::new(Instant::from_ymd(2000, 1, 1).unwrap(), Period::Hours, 1)
            .unwrap()
            .into();
        assert_ne!(days, hours);
        match days.difference(&hours) {
            Err(Error::TypeMismatch { left, right }) => {
                assert_eq!(left, "uniform(days)");
                assert_eq!(right, "uniform(hours)");
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }

        let weekdays: Scale = FilteredGrid::new(days.clone(), Arc::new(Weekdays), 1)
            .unwrap()
            .into();
        assert_ne!(weekdays, days);
        assert!(weekdays.difference(&days).is_err());
        assert_eq!(weekdays.describe(), "filtered(weekdays, uniform(days))");
    }

    #[test]
    fn test_label_and_display() {
        let scale = day_grid(2000, 9, 1);
        assert_eq!(scale.label(), "20000901");
        assert_eq!(scale.to_string(), "20000901");
    }

    #[test]
    fn test_instants_and_previous() {
        let scale = day_grid(2000, 1, 10);
        let forward = scale.instants(3);
        assert_eq!(forward[2], Instant::from_ymd(2000, 1, 12).unwrap());
        let backward: Vec<_> = scale.previous_instants(3).collect();
        assert_eq!(backward[0], Instant::from_ymd(2000, 1, 10).unwrap());
        assert_eq!(backward[2], Instant::from_ymd(2000, 1, 8).unwrap());
        let zoned = scale.zoned_instants(2);
        assert_eq!(zoned[1].instant(), forward[1]);
    }

    #[test]
    fn test_frequency_must_be_positive() {
        assert!(check_frequency(1).is_ok());
        assert!(check_frequency(0).is_err());
        assert!(check_frequency(-3).is_err());
    }
}
