//! Composable discrete time scales.
//!
//! Uniform and calendar grids map integer positions to instants; filtered
//! and holiday grids restrict any scale to weekdays, weekends or business
//! days. Every scale can be iterated in both directions and differenced
//! against another scale of the same kind.

pub mod error;
pub mod holidays;
pub mod instant;
pub mod iter;
pub mod label;
pub mod scale;
pub mod zone;

#[cfg(feature = "config")]
pub mod config;

pub use error::{Error, Result};
pub use holidays::{CallbackHolidays, CompositeHolidays, HolidayCalendar, HolidaySet, NoHolidays};
pub use instant::{Instant, ZonedInstant};
pub use iter::{ReverseScaleIter, ScaleIter};
pub use label::Labeler;
pub use scale::{
    CalendarGrid, FilteredGrid, HolidayGrid, Period, PeriodCalculator, Scale, Selector,
    UniformGrid, Weekdays, WeekendDays,
};
pub use zone::{TimeZone, Transition, Zone};

#[cfg(feature = "config")]
pub use config::{HolidaySource, ScaleConfig, SelectorKind};
