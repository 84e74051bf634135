use std::sync::Arc;

use crate::error::Result;
use crate::holidays::HolidayCalendar;
use crate::instant::Instant;
use crate::label::Labeler;

use super::{check_frequency, walk, Scale};

/// A base scale with holiday positions skipped.
///
/// Without a calendar the grid behaves exactly like its base. Moving
/// backwards lands on the previous non-holiday, moving forwards on the next.
/// Like [`FilteredGrid`](super::FilteredGrid), rebasing walks from the
/// reference and costs time linear in the distance. A calendar that leaves
/// no open base position between the anchor and the edge of the supported
/// range is a configuration error.
#[derive(Debug, Clone)]
pub struct HolidayGrid {
    base: Box<Scale>,
    origin: Box<Scale>,
    holidays: Option<Arc<dyn HolidayCalendar>>,
    frequency: i64,
    position: i64,
    labeler: Labeler,
}

impl HolidayGrid {
    pub fn new(
        base: Scale,
        holidays: Option<Arc<dyn HolidayCalendar>>,
        frequency: i64,
    ) -> Result<Self> {
        check_frequency(frequency)?;
        let labeler = base.labeler();
        Self::positioned(base, holidays, frequency, labeler)
    }

    pub fn with_labeler(mut self, labeler: Labeler) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn base(&self) -> &Scale {
        &self.base
    }

    pub fn holidays(&self) -> Option<&Arc<dyn HolidayCalendar>> {
        self.holidays.as_ref()
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
        holidays: Option<Arc<dyn HolidayCalendar>>,
        frequency: i64,
        labeler: Labeler,
    ) -> Result<Self> {
        let mut origin = base.reference();
        let position = {
            let calendar = holidays.as_deref();
            back_to_non_holiday(calendar, &mut origin)?;
            back_to_non_holiday(calendar, &mut base)?;
            let is_open = open_positions(calendar);
            let count = match calendar {
                None => base.position(),
                Some(_) => walk::count(&origin, base.position(), &is_open)?,
            };
            walk::align(&mut base, count, frequency, &is_open)?
        };
        Ok(Self {
            base: Box::new(base),
            origin: Box::new(origin),
            holidays,
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
            self.holidays.clone(),
            self.frequency,
            self.labeler,
        )
    }

    /// Move `n` steps. Backwards lands on the previous non-holiday, forwards
    /// on the next; a walk off the supported range stops at the edge.
    pub(crate) fn advance(&mut self, n: i64) {
        let calendar = self.holidays.as_deref();
        let steps = n.saturating_mul(self.frequency);
        let walked = if steps > 0 {
            (0..steps).try_for_each(|_| {
                walk::nudge(&mut self.base, 1)?;
                advance_to_non_holiday(calendar, &mut self.base)
            })
        } else {
            (steps..0).try_for_each(|_| {
                walk::nudge(&mut self.base, -1)?;
                back_to_non_holiday(calendar, &mut self.base)
            })
        };
        if let Err(err) = walked {
            log::warn!("holiday grid stopped early: {}", err);
        }
        self.position = self.position.saturating_add(n);
    }
}

/// Step back while the base sits on a holiday.
fn back_to_non_holiday(holidays: Option<&dyn HolidayCalendar>, grid: &mut Scale) -> Result<()> {
    walk::snap_back(grid, &open_positions(holidays))
}

/// Step forward while the base sits on a holiday.
fn advance_to_non_holiday(
    holidays: Option<&dyn HolidayCalendar>,
    grid: &mut Scale,
) -> Result<()> {
    walk::snap_forward(grid, &open_positions(holidays))
}

fn open_positions<'a>(holidays: Option<&'a dyn HolidayCalendar>) -> impl Fn(&Scale) -> bool + 'a {
    move |scale: &Scale| !is_holiday(holidays, scale)
}

fn is_holiday(holidays: Option<&dyn HolidayCalendar>, scale: &Scale) -> bool {
    holidays.map_or(false, |calendar| calendar.is_holiday(scale.current_date()))
}

impl PartialEq for HolidayGrid {
    fn eq(&self, other: &Self) -> bool {
        let same_calendar = match (&self.holidays, &other.holidays) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const (),
            _ => false,
        };
        same_calendar
            && self.frequency == other.frequency
            && self.position == other.position
            && self.base == other.base
    }
}
