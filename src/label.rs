//! Interval labels.
//!
//! A labeler turns the interval covered by one scale position into a short
//! string in the interval's local time. Zones other than UTC get a `+HHMM`
//! suffix.

use time::PrimitiveDateTime;

use crate::instant::ZonedInstant;

/// Formatting for the interval `[start, end]` of one scale position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Labeler {
    /// `2000`
    Years,
    /// `Sep 2000`
    Months,
    /// ISO week of the ISO year, `2000W35`
    Weeks,
    /// `20000901`
    Date,
    /// `Fri, 2000-Sep-01`
    Weekday,
    /// `20000901T220000`
    Hours,
    /// `20000901T220100`
    Minutes,
    /// `20000901T220145`
    Seconds,
    /// `20000901T220145.009000`
    Milliseconds,
    /// `20000901T220145.009865`
    Microseconds,
}

impl Labeler {
    pub fn label(&self, start: &ZonedInstant, _end: &ZonedInstant) -> String {
        let local = start.local();
        let text = match self {
            Labeler::Years => format!("{:04}", local.year()),
            Labeler::Months => format!("{} {:04}", month_abbrev(&local), local.year()),
            Labeler::Weeks => {
                let (year, week, _) = local.date().to_iso_week_date();
                format!("{:04}W{:02}", year, week)
            }
            Labeler::Date => compact_date(&local),
            Labeler::Weekday => {
                let weekday = local.weekday().to_string();
                format!(
                    "{}, {:04}-{}-{:02}",
                    &weekday[..3],
                    local.year(),
                    month_abbrev(&local),
                    local.day()
                )
            }
            Labeler::Hours => compact_time(&local, local.hour(), 0, 0),
            Labeler::Minutes => compact_time(&local, local.hour(), local.minute(), 0),
            Labeler::Seconds => compact_time(&local, local.hour(), local.minute(), local.second()),
            Labeler::Milliseconds => format!(
                "{}.{:06}",
                compact_time(&local, local.hour(), local.minute(), local.second()),
                local.millisecond() as u32 * 1_000
            ),
            Labeler::Microseconds => format!(
                "{}.{:06}",
                compact_time(&local, local.hour(), local.minute(), local.second()),
                local.microsecond()
            ),
        };

        if start.zone().is_utc() {
            text
        } else {
            let (hours, minutes, _) = start.offset().as_hms();
            let sign = if start.offset().is_negative() { '-' } else { '+' };
            format!(
                "{}{}{:02}{:02}",
                text,
                sign,
                hours.unsigned_abs(),
                minutes.unsigned_abs()
            )
        }
    }
}

fn month_abbrev(local: &PrimitiveDateTime) -> String {
    local.month().to_string().chars().take(3).collect()
}

fn compact_date(local: &PrimitiveDateTime) -> String {
    format!(
        "{:04}{:02}{:02}",
        local.year(),
        u8::from(local.month()),
        local.day()
    )
}

fn compact_time(local: &PrimitiveDateTime, hour: u8, minute: u8, second: u8) -> String {
    format!("{}T{:02}{:02}{:02}", compact_date(local), hour, minute, second)
}
