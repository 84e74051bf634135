use std::sync::Arc;

use crate::error::Result;
use crate::instant::Instant;
use crate::label::Labeler;

use super::selector::{self as selection, Selector};
use super::{check_frequency, walk, Scale};

/// A base scale restricted to the positions a [`Selector`] accepts.
///
/// Position 0 is the selector-snapped reference of the base. Each step moves
/// `frequency` accepted base positions.
///
/// Rebasing (and so `difference` and `shifted_to`) walks from the reference
/// to the target one base position at a time. The cost is linear in the
/// distance; keep anchors near the range being iterated.
///
/// Construction and rebasing fail when the selector accepts no base position
/// between the anchor and the edge of the supported range.
#[derive(Debug, Clone)]
pub struct FilteredGrid {
    base: Box<Scale>,
    origin: Box<Scale>,
    selector: Arc<dyn Selector>,
    frequency: i64,
    position: i64,
    labeler: Labeler,
}

impl FilteredGrid {
    /// Wrap `base`, snapping it back to the closest accepted position.
    pub fn new(base: Scale, selector: Arc<dyn Selector>, frequency: i64) -> Result<Self> {
        check_frequency(frequency)?;
        let labeler = base.labeler();
        Self::positioned(base, selector, frequency, labeler)
    }

    pub fn with_labeler(mut self, labeler: Labeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn base(&self) -> &Scale {
        &self.base
    }

    pub fn selector(&self) -> &Arc<dyn Selector> {
        &self.selector
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

    fn positioned(
        mut base: Scale,
        selector: Arc<dyn Selector>,
        frequency: i64,
        labeler: Labeler,
    ) -> Result<Self> {
        let mut origin = base.reference();
        selection::snap_to_previous_valid(selector.as_ref(), &mut origin)?;
        selection::snap_to_previous_valid(selector.as_ref(), &mut base)?;
        let count = selection::position_for(selector.as_ref(), &origin, &base)?;
        let position = walk::align(
            &mut base,
            count,
            frequency,
            &walk::selected(selector.as_ref()),
        )?;
        Ok(Self {
            base: Box::new(base),
            origin: Box::new(origin),
            selector,
            frequency,
            position,
            labeler,
        })
    }

    pub(crate) fn reference(&self) -> Self {
        Self {
            base: self.origin.clone(),
            position: 0,
            ..self.clone()
        }
    }

    pub(crate) fn rebased(&self, target: Instant) -> Result<Self> {
        let base = self.base.shifted_to(target)?;
        Self::positioned(
            base,
            Arc::clone(&self.selector),
            self.frequency,
            self.labeler,
        )
    }

    /// Move `n` steps. A walk that runs off the supported range leaves the
    /// base pinned at the edge.
    pub(crate) fn advance(&mut self, n: i64) {
        let steps = n.saturating_mul(self.frequency);
        if let Err(err) = selection::advance(self.selector.as_ref(), &mut self.base, steps) {
            log::warn!("filtered grid stopped early: {}", err);
        }
        self.position = self.position.saturating_add(n);
    }
}

impl PartialEq for FilteredGrid {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency
            && self.selector.name() == other.selector.name()
            && self.position == other.position
            && self.base == other.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scale::{Period, UniformGrid, Weekdays, WeekendDays};

    fn days_from(y: i32, m: u8, d: u8) -> Scale {
        UniformGrid::new(Instant::from_ymd(y, m, d).unwrap(), Period::Days, 1)
            .unwrap()
            .into()
    }

    fn weekdays(base: Scale, frequency: i64) -> FilteredGrid {
        FilteredGrid::new(base, Arc::new(Weekdays), frequency).unwrap()
    }

    #[test]
    fn test_friday_to_monday() {
        let mut grid = weekdays(days_from(2000, 9, 1), 1);
        assert_eq!(grid.position(), 0);
        grid.advance(1);
        assert_eq!(grid.base().current_instant(), Instant::from_ymd(2000, 9, 4).unwrap());
        assert_eq!(grid.position(), 1);
    }

    #[test]
    fn test_construction_snaps_back() {
        // Anchored on Sunday 2000-09-03.
        let grid = weekdays(days_from(2000, 9, 3), 1);
        assert_eq!(grid.base().current_instant(), Instant::from_ymd(2000, 9, 1).unwrap());
        assert_eq!(grid.position(), 0);
    }

    #[test]
    fn test_rebase_counts_from_reference() {
        let grid = weekdays(days_from(2000, 9, 1), 1);
        let monday_next_week = grid.rebased(Instant::from_ymd(2000, 9, 11).unwrap()).unwrap();
        assert_eq!(monday_next_week.position(), 6);
        let saturday = grid.rebased(Instant::from_ymd(2000, 9, 9).unwrap()).unwrap();
        assert_eq!(saturday.position(), 5);
        assert_eq!(saturday.base().current_instant(), Instant::from_ymd(2000, 9, 8).unwrap());
        let before = grid.rebased(Instant::from_ymd(2000, 8, 28).unwrap()).unwrap();
        assert_eq!(before.position(), -4);
    }

    #[test]
    fn test_frequency_aligns_to_groups() {
        let grid = weekdays(days_from(2000, 9, 1), 2);
        // Valid days from Fri 09-01: Mon 09-04 is 1, Tue 09-05 is 2, Wed 09-06 is 3.
        let wednesday = grid.rebased(Instant::from_ymd(2000, 9, 6).unwrap()).unwrap();
        assert_eq!(wednesday.position(), 1);
        assert_eq!(wednesday.base().current_instant(), Instant::from_ymd(2000, 9, 5).unwrap());

        let mut stepped = grid.clone();
        stepped.advance(1);
        assert_eq!(stepped, wednesday);
    }

    #[test]
    fn test_reference_and_equality() {
        let grid = weekdays(days_from(2000, 9, 1), 1);
        let mut moved = grid.clone();
        moved.advance(7);
        assert_ne!(moved, grid);
        assert_eq!(moved.reference(), grid);

        let weekend = FilteredGrid::new(days_from(2000, 9, 1), Arc::new(WeekendDays), 1).unwrap();
        assert_ne!(weekend, grid);
    }

    #[test]
    fn test_weekdays_of_saturday_weeks_rejected() {
        // 2000-01-01 is a Saturday; every weekly position is a Saturday.
        let weeks: Scale = UniformGrid::new(Instant::from_ymd(2000, 1, 1).unwrap(), Period::Weeks, 1)
            .unwrap()
            .into();
        match FilteredGrid::new(weeks.clone(), Arc::new(Weekdays), 1) {
            Err(Error::Configuration(_)) => {}
            other => panic!("expected configuration error, got {:?}", other),
        }
        let weekend = FilteredGrid::new(weeks, Arc::new(WeekendDays), 1).unwrap();
        assert_eq!(weekend.base().current_instant(), Instant::from_ymd(2000, 1, 1).unwrap());
    }

    #[test]
    fn test_nonpositive_frequency_rejected() {
        assert!(FilteredGrid::new(days_from(2000, 9, 1), Arc::new(Weekdays), 0).is_err());
    }
}
