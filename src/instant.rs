//! Absolute instants and zone-attached instants.
//!
//! An [`Instant`] is a count of microseconds since the Unix epoch. The
//! supported calendar range is years -9999 through 9999; values outside it
//! are *special* and are rejected wherever a scale needs a real time.

use std::fmt;
use std::ops::{Add, Sub};

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::{Error, Result};
use crate::zone::Zone;

pub(crate) const MICROS_PER_SECOND: i64 = 1_000_000;
pub(crate) const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
pub(crate) const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;
pub(crate) const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;
/// -9999-01-01T00:00:00
const MIN_MICROS: i64 = -377_705_116_800_000_000;
/// 9999-12-31T23:59:59.999999
const MAX_MICROS: i64 = 253_402_300_799_999_999;

/// UTC timestamp with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(i64);

impl Instant {
    pub const UNIX_EPOCH: Instant = Instant(0);
    /// Earliest supported instant.
    pub const MIN: Instant = Instant(MIN_MICROS);
    /// Latest supported instant.
    pub const MAX: Instant = Instant(MAX_MICROS);

    pub const fn from_micros(micros: i64) -> Self {
        Instant(micros)
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// True when the instant lies outside the supported calendar range.
    pub fn is_special(self) -> bool {
        self.0 < MIN_MICROS || self.0 > MAX_MICROS
    }

    /// Interpret calendar fields as UTC.
    pub fn from_utc(dt: PrimitiveDateTime) -> Self {
        let days = i64::from(dt.date().to_julian_day()) - UNIX_EPOCH_JULIAN_DAY;
        let time = dt.time();
        let tod = i64::from(time.hour()) * MICROS_PER_HOUR
            + i64::from(time.minute()) * MICROS_PER_MINUTE
            + i64::from(time.second()) * MICROS_PER_SECOND
            + i64::from(time.microsecond());
        Instant(days * MICROS_PER_DAY + tod)
    }

    /// Midnight UTC at the start of `date`.
    pub fn from_date(date: Date) -> Self {
        Self::from_utc(date.midnight())
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self> {
        Self::from_ymd_hms_micro(year, month, day, 0, 0, 0, 0)
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self> {
        Self::from_ymd_hms_micro(year, month, day, hour, minute, second, 0)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_ymd_hms_micro(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        micro: u32,
    ) -> Result<Self> {
        let date = calendar_date(year, month, day)?;
        let time = Time::from_hms_micro(hour, minute, second, micro)
            .map_err(|err| Error::config(format!("invalid time of day: {err}")))?;
        Ok(Self::from_utc(PrimitiveDateTime::new(date, time)))
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS` or
    /// `YYYY-MM-DDTHH:MM:SS.ffffff` (a space may replace `T`, a trailing
    /// `Z` is accepted) as UTC.
    pub fn parse(s: &str) -> Result<Self> {
        parse_local(s).map(Self::from_utc)
    }

    /// UTC calendar fields. Special instants are clamped to the supported range.
    pub fn to_utc(self) -> PrimitiveDateTime {
        let micros = self.0.clamp(MIN_MICROS, MAX_MICROS);
        let days = micros.div_euclid(MICROS_PER_DAY);
        let tod = micros.rem_euclid(MICROS_PER_DAY);
        PrimitiveDateTime::new(julian_date(days + UNIX_EPOCH_JULIAN_DAY), time_of_day(tod))
    }

    pub fn utc_date(self) -> Date {
        self.to_utc().date()
    }

    pub fn to_offset_date_time(self) -> OffsetDateTime {
        self.to_utc().assume_utc()
    }

    /// Shift by `micros`, saturating at the supported range.
    pub(crate) fn offset_by(self, micros: i128) -> Self {
        let shifted = i128::from(self.0).saturating_add(micros);
        // Bounded by the clamp, so the narrowing cannot truncate.
        Instant(shifted.clamp(i128::from(MIN_MICROS), i128::from(MAX_MICROS)) as i64)
    }

    /// Signed microseconds from `earlier` to `self`.
    pub fn micros_since(self, earlier: Instant) -> i128 {
        i128::from(self.0) - i128::from(earlier.0)
    }
}

impl From<OffsetDateTime> for Instant {
    fn from(value: OffsetDateTime) -> Self {
        let micros = value.unix_timestamp_nanos().div_euclid(1_000);
        Instant::UNIX_EPOCH.offset_by(micros)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        self.offset_by(rhs.whole_microseconds())
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        self.offset_by(-rhs.whole_microseconds())
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        Duration::microseconds(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, self.to_utc())?;
        write!(f, "Z")
    }
}

/// An instant paired with the zone used to project it onto local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonedInstant {
    instant: Instant,
    zone: Zone,
}

impl ZonedInstant {
    pub fn new(instant: Instant, zone: Zone) -> Self {
        Self { instant, zone }
    }

    pub fn utc(instant: Instant) -> Self {
        Self::new(instant, Zone::utc())
    }

    /// Resolve local wall-clock fields in `zone` to an absolute instant.
    pub fn from_local(local: PrimitiveDateTime, zone: Zone) -> Self {
        let instant = zone.resolve_local(local);
        Self::new(instant, zone)
    }

    /// Parse local wall-clock text (see [`Instant::parse`]) in `zone`.
    pub fn parse(s: &str, zone: Zone) -> Result<Self> {
        parse_local(s).map(|local| Self::from_local(local, zone))
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn offset(&self) -> UtcOffset {
        self.zone.offset_at(self.instant)
    }

    pub fn local(&self) -> PrimitiveDateTime {
        self.zone.to_local(self.instant)
    }

    pub fn local_date(&self) -> Date {
        self.local().date()
    }

    pub fn is_special(&self) -> bool {
        self.instant.is_special()
    }

    /// Same zone, different instant.
    pub fn with_instant(&self, instant: Instant) -> Self {
        Self::new(instant, self.zone.clone())
    }
}

impl From<ZonedInstant> for Instant {
    fn from(value: ZonedInstant) -> Self {
        value.instant
    }
}

impl From<&ZonedInstant> for Instant {
    fn from(value: &ZonedInstant) -> Self {
        value.instant
    }
}

impl Add<Duration> for ZonedInstant {
    type Output = ZonedInstant;

    fn add(self, rhs: Duration) -> ZonedInstant {
        let instant = self.instant + rhs;
        Self { instant, ..self }
    }
}

impl Sub<Duration> for ZonedInstant {
    type Output = ZonedInstant;

    fn sub(self, rhs: Duration) -> ZonedInstant {
        let instant = self.instant - rhs;
        Self { instant, ..self }
    }
}

impl fmt::Display for ZonedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, self.local())?;
        let offset = self.offset();
        let (hours, minutes, _) = offset.as_hms();
        let sign = if offset.is_negative() { '-' } else { '+' };
        write!(
            f,
            "{}{:02}:{:02}",
            sign,
            hours.unsigned_abs(),
            minutes.unsigned_abs()
        )
    }
}

pub(crate) fn calendar_date(year: i32, month: u8, day: u8) -> Result<Date> {
    let month = Month::try_from(month)
        .map_err(|_| Error::config(format!("invalid month: {month}")))?;
    Date::from_calendar_date(year, month, day)
        .map_err(|err| Error::config(format!("invalid date {year}-{month}-{day}: {err}")))
}

fn julian_date(julian_day: i64) -> Date {
    i32::try_from(julian_day)
        .ok()
        .and_then(|jd| Date::from_julian_day(jd).ok())
        .unwrap_or(if julian_day < UNIX_EPOCH_JULIAN_DAY {
            Date::MIN
        } else {
            Date::MAX
        })
}

fn time_of_day(micros: i64) -> Time {
    let hour = (micros / MICROS_PER_HOUR) as u8;
    let minute = ((micros / MICROS_PER_MINUTE) % 60) as u8;
    let second = ((micros / MICROS_PER_SECOND) % 60) as u8;
    let micro = (micros % MICROS_PER_SECOND) as u32;
    Time::from_hms_micro(hour, minute, second, micro).unwrap_or(Time::MIDNIGHT)
}

fn write_fields(f: &mut fmt::Formatter<'_>, dt: PrimitiveDateTime) -> fmt::Result {
    write!(
        f,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    )?;
    if dt.microsecond() != 0 {
        write!(f, ".{:06}", dt.microsecond())?;
    }
    Ok(())
}

fn parse_local(s: &str) -> Result<PrimitiveDateTime> {
    let invalid = || Error::config(format!("invalid instant: '{s}'"));
    let text = s.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);

    let (date_part, time_part) = match text.split_once(|c: char| c == 'T' || c == ' ') {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };

    let mut fields = date_part.splitn(3, '-');
    let year: i32 = next_number(&mut fields).ok_or_else(invalid)?;
    let month: u8 = next_number(&mut fields).ok_or_else(invalid)?;
    let day: u8 = next_number(&mut fields).ok_or_else(invalid)?;
    let date = calendar_date(year, month, day)?;

    let time = match time_part {
        None => Time::MIDNIGHT,
        Some(time_part) => {
            let (hms, fraction) = match time_part.split_once('.') {
                Some((hms, fraction)) => (hms, Some(fraction)),
                None => (time_part, None),
            };
            let mut fields = hms.splitn(3, ':');
            let hour: u8 = next_number(&mut fields).ok_or_else(invalid)?;
            let minute: u8 = next_number(&mut fields).ok_or_else(invalid)?;
            let second: u8 = match fields.next() {
                Some(field) => field.parse().map_err(|_| invalid())?,
                None => 0,
            };
            let micro = match fraction {
                None => 0,
                Some(digits)
                    if !digits.is_empty()
                        && digits.len() <= 6
                        && digits.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    let value: u32 = digits.parse().map_err(|_| invalid())?;
                    value * 10u32.pow(6 - digits.len() as u32)
                }
                Some(_) => return Err(invalid()),
            };
            Time::from_hms_micro(hour, minute, second, micro).map_err(|_| invalid())?
        }
    };

    Ok(PrimitiveDateTime::new(date, time))
}

fn next_number<'a, T: std::str::FromStr>(fields: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    fields.next().and_then(|field| field.parse().ok())
}
