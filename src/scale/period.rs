//! Period units and the arithmetic that steps a zoned anchor by them.

use std::fmt;
use std::str::FromStr;

use time::{Date, Month, PrimitiveDateTime};

use crate::error::{Error, Result};
use crate::instant::{
    Instant, ZonedInstant, MICROS_PER_DAY, MICROS_PER_HOUR, MICROS_PER_MINUTE, MICROS_PER_SECOND,
};
use crate::label::Labeler;

/// Base unit of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Period {
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Period {
    /// Length in microseconds for units of constant duration.
    ///
    /// Months and years have no fixed length and return `None`.
    pub fn fixed_micros(self) -> Option<i64> {
        match self {
            Period::Microseconds => Some(1),
            Period::Milliseconds => Some(1_000),
            Period::Seconds => Some(MICROS_PER_SECOND),
            Period::Minutes => Some(MICROS_PER_MINUTE),
            Period::Hours => Some(MICROS_PER_HOUR),
            Period::Days => Some(MICROS_PER_DAY),
            Period::Weeks => Some(7 * MICROS_PER_DAY),
            Period::Months | Period::Years => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::Microseconds => "microseconds",
            Period::Milliseconds => "milliseconds",
            Period::Seconds => "seconds",
            Period::Minutes => "minutes",
            Period::Hours => "hours",
            Period::Days => "days",
            Period::Weeks => "weeks",
            Period::Months => "months",
            Period::Years => "years",
        }
    }

    /// Labeler matching the unit's natural resolution.
    pub fn default_labeler(self) -> Labeler {
        match self {
            Period::Microseconds => Labeler::Microseconds,
            Period::Milliseconds => Labeler::Milliseconds,
            Period::Seconds => Labeler::Seconds,
            Period::Minutes => Labeler::Minutes,
            Period::Hours => Labeler::Hours,
            Period::Days => Labeler::Date,
            Period::Weeks => Labeler::Weeks,
            Period::Months => Labeler::Months,
            Period::Years => Labeler::Years,
        }
    }

    fn step(self) -> Step {
        match self {
            Period::Days => Step::Days(DayStep { days: 1 }),
            Period::Weeks => Step::Days(DayStep { days: 7 }),
            Period::Months => Step::Months(MonthStep { months: 1 }),
            Period::Years => Step::Months(MonthStep { months: 12 }),
            fixed => Step::Fixed(FixedStep {
                micros: fixed.fixed_micros().unwrap_or(1),
            }),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "us" | "micro" | "microsecond" | "microseconds" => Ok(Period::Microseconds),
            "ms" | "milli" | "millisecond" | "milliseconds" => Ok(Period::Milliseconds),
            "s" | "second" | "seconds" => Ok(Period::Seconds),
            "m" | "minute" | "minutes" => Ok(Period::Minutes),
            "h" | "hour" | "hours" => Ok(Period::Hours),
            "d" | "day" | "days" => Ok(Period::Days),
            "w" | "week" | "weeks" => Ok(Period::Weeks),
            "month" | "months" => Ok(Period::Months),
            "y" | "year" | "years" => Ok(Period::Years),
            other => Err(Error::config(format!("unknown period: {}", other))),
        }
    }
}

/// Maps whole periods from a zoned anchor to instants and back.
pub trait PeriodCalculator {
    /// Instant `periods` whole periods away from `anchor`.
    fn instant_at(&self, anchor: &ZonedInstant, periods: i64) -> Instant;

    /// Largest `p` with `instant_at(anchor, p) <= target`.
    fn position_for(&self, anchor: &ZonedInstant, target: Instant) -> i64;
}

impl PeriodCalculator for Period {
    fn instant_at(&self, anchor: &ZonedInstant, periods: i64) -> Instant {
        match self.step() {
            Step::Fixed(step) => step.instant_at(anchor, periods),
            Step::Days(step) => step.instant_at(anchor, periods),
            Step::Months(step) => step.instant_at(anchor, periods),
        }
    }

    fn position_for(&self, anchor: &ZonedInstant, target: Instant) -> i64 {
        match self.step() {
            Step::Fixed(step) => step.position_for(anchor, target),
            Step::Days(step) => step.position_for(anchor, target),
            Step::Months(step) => step.position_for(anchor, target),
        }
    }
}

enum Step {
    Fixed(FixedStep),
    Days(DayStep),
    Months(MonthStep),
}

/// Constant-duration steps; local time plays no part.
#[derive(Debug, Clone, Copy)]
pub struct FixedStep {
    pub micros: i64,
}

impl PeriodCalculator for FixedStep {
    fn instant_at(&self, anchor: &ZonedInstant, periods: i64) -> Instant {
        anchor
            .instant()
            .offset_by(i128::from(periods) * i128::from(self.micros))
    }

    fn position_for(&self, anchor: &ZonedInstant, target: Instant) -> i64 {
        floor_div(target.micros_since(anchor.instant()), self.micros)
    }
}

/// Whole local days, keeping the anchor's wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct DayStep {
    pub days: i64,
}

impl PeriodCalculator for DayStep {
    fn instant_at(&self, anchor: &ZonedInstant, periods: i64) -> Instant {
        let local = anchor.local();
        let julian = i64::from(local.date().to_julian_day())
            .saturating_add(periods.saturating_mul(self.days));
        match date_from_julian(julian) {
            Ok(date) => anchor.zone().resolve_local(PrimitiveDateTime::new(date, local.time())),
            Err(edge) => edge,
        }
    }

    fn position_for(&self, anchor: &ZonedInstant, target: Instant) -> i64 {
        let from = anchor.local_date().to_julian_day();
        let to = anchor.zone().to_local(target).date().to_julian_day();
        let guess = (i64::from(to) - i64::from(from)).div_euclid(self.days);
        settle(self, anchor, target, guess)
    }
}

/// Whole local months with the day of month clamped to the target month.
#[derive(Debug, Clone, Copy)]
pub struct MonthStep {
    pub months: i64,
}

impl PeriodCalculator for MonthStep {
    fn instant_at(&self, anchor: &ZonedInstant, periods: i64) -> Instant {
        let local = anchor.local();
        let start = i64::from(local.year()) * 12 + i64::from(u8::from(local.month())) - 1;
        let total = start.saturating_add(periods.saturating_mul(self.months));
        let year = total.div_euclid(12);
        let month = (total.rem_euclid(12) + 1) as u8;
        if year < i64::from(MIN_YEAR) {
            return Instant::MIN;
        }
        if year > i64::from(MAX_YEAR) {
            return Instant::MAX;
        }
        let year = year as i32;
        let day = local.day().min(days_in_month(year, month));
        let date = Month::try_from(month)
            .ok()
            .and_then(|month| Date::from_calendar_date(year, month, day).ok());
        match date {
            Some(date) => anchor.zone().resolve_local(PrimitiveDateTime::new(date, local.time())),
            None => Instant::MAX,
        }
    }

    fn position_for(&self, anchor: &ZonedInstant, target: Instant) -> i64 {
        let from = anchor.local();
        let to = anchor.zone().to_local(target);
        let months = 12 * (i64::from(to.year()) - i64::from(from.year()))
            + i64::from(u8::from(to.month()))
            - i64::from(u8::from(from.month()));
        settle(self, anchor, target, months.div_euclid(self.months))
    }
}

const MIN_YEAR: i32 = -9999;
const MAX_YEAR: i32 = 9999;

/// One corrective step from a field-arithmetic estimate.
fn settle<C: PeriodCalculator + ?Sized>(
    calc: &C,
    anchor: &ZonedInstant,
    target: Instant,
    guess: i64,
) -> i64 {
    if calc.instant_at(anchor, guess) > target {
        guess - 1
    } else if calc.instant_at(anchor, guess.saturating_add(1)) <= target {
        guess + 1
    } else {
        guess
    }
}

/// Floor division of a microsecond span, saturated to `i64`.
pub(crate) fn floor_div(span: i128, divisor: i64) -> i64 {
    let quotient = span.div_euclid(i128::from(divisor));
    quotient.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn date_from_julian(julian: i64) -> std::result::Result<Date, Instant> {
    let min = i64::from(Date::MIN.to_julian_day());
    let max = i64::from(Date::MAX.to_julian_day());
    if julian < min {
        return Err(Instant::MIN);
    }
    if julian > max {
        return Err(Instant::MAX);
    }
    Date::from_julian_day(julian as i32).map_err(|_| Instant::MAX)
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub(crate) fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
