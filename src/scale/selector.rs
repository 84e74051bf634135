use std::fmt;

use time::{Date, Weekday};

use super::{walk, Scale};
use crate::error::Result;

/// Policy deciding which positions of a base scale a [`FilteredGrid`] keeps.
///
/// Validity is judged on the base's current date, so a selector works over
/// any base resolution. A selector that rejects every date reachable from
/// the anchor makes the filtered grid fail to build.
///
/// [`FilteredGrid`]: super::FilteredGrid
pub trait Selector: fmt::Debug + Send + Sync {
    /// Identifier used in scale descriptions and equality.
    fn name(&self) -> &str;

    fn is_valid_date(&self, date: Date) -> bool;
}

/// Step `grid` back until `selector` accepts its current position.
pub(crate) fn snap_to_previous_valid(selector: &dyn Selector, grid: &mut Scale) -> Result<()> {
    walk::snap_back(grid, &walk::selected(selector))
}

/// Move `grid` by exactly `n` positions `selector` accepts.
pub(crate) fn advance(selector: &dyn Selector, grid: &mut Scale, n: i64) -> Result<()> {
    walk::step(grid, n, &walk::selected(selector))
}

/// Accepted positions between the snapped `origin` and `grid`.
///
/// Walks one position at a time; cost grows with the distance.
pub(crate) fn position_for(selector: &dyn Selector, origin: &Scale, grid: &Scale) -> Result<i64> {
    walk::count(origin, grid.position(), &walk::selected(selector))
}

/// Monday through Friday.
#[derive(Debug, Clone, Copy, Default)]
pub struct Weekdays;

impl Selector for Weekdays {
    fn name(&self) -> &str {
        "weekdays"
    }

    fn is_valid_date(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}

/// Saturday and Sunday.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendDays;

impl Selector for WeekendDays {
    fn name(&self) -> &str {
        "weekend_days"
    }

    fn is_valid_date(&self, date: Date) -> bool {
        matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
    }
}
