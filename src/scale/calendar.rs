use crate::error::{Error, Result};
use crate::instant::{Instant, ZonedInstant};
use crate::label::Labeler;
use crate::zone::Zone;

use super::check_frequency;
use super::period::{Period, PeriodCalculator};

/// Grid stepping in local calendar units of a zone.
///
/// Days and longer periods are added to the anchor's local date, keeping its
/// wall-clock time, so a daily grid stays at 09:00 local across a DST change
/// and a monthly grid anchored on the 31st lands on each month's last day
/// when the month is shorter.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    anchor: ZonedInstant,
    period: Period,
    frequency: i64,
    position: i64,
    labeler: Labeler,
}

impl CalendarGrid {
    pub fn new(anchor: ZonedInstant, period: Period, frequency: i64) -> Result<Self> {
        check_frequency(frequency)?;
        if anchor.is_special() {
            return Err(Error::config("anchor is outside the supported range"));
        }
        Ok(Self {
            anchor,
            period,
            frequency,
            position: 0,
            labeler: period.default_labeler(),
        })
    }

    /// Grid in `zone` positioned on the last step not after `target`.
    ///
    /// Without an explicit anchor the target itself becomes the anchor.
    pub fn at(
        target: impl Into<Instant>,
        anchor: Option<Instant>,
        zone: Zone,
        period: Period,
        frequency: i64,
    ) -> Result<Self> {
        let target = target.into();
        let anchor = ZonedInstant::new(anchor.unwrap_or(target), zone);
        Self::new(anchor, period, frequency)?.rebased(target)
    }

    pub fn with_labeler(mut self, labeler: Labeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn anchor(&self) -> &ZonedInstant {
        &self.anchor
    }

    pub fn period(&self) -> Period {
        self.period
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

    pub fn instant(&self) -> Instant {
        let periods = self.position.saturating_mul(self.frequency);
        self.period.instant_at(&self.anchor, periods)
    }

    pub fn zoned_instant(&self) -> ZonedInstant {
        self.anchor.with_instant(self.instant())
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
        let periods = self.period.position_for(&self.anchor, target);
        Ok(Self {
            position: periods.div_euclid(self.frequency),
            ..self.clone()
        })
    }

    pub(crate) fn advance(&mut self, n: i64) {
        self.position = self.position.saturating_add(n);
    }
}

impl PartialEq for CalendarGrid {
    fn eq(&self, other: &Self) -> bool {
        self.anchor == other.anchor
            && self.period == other.period
            && self.frequency == other.frequency
            && self.position == other.position
    }
}
