//! Timezone rules for zoned scales.
//!
//! A [`Zone`] is a cheap, shareable handle to any [`TimeZone`] implementation.
//! The crate ships fixed-offset zones and transition-table zones (enough to
//! describe DST); richer rule sources plug in through [`Zone::custom`].

use std::fmt;
use std::sync::Arc;

use time::{PrimitiveDateTime, UtcOffset};

use crate::error::{Error, Result};
use crate::instant::{Instant, MICROS_PER_SECOND};

/// Source of UTC offsets for a named zone.
pub trait TimeZone: fmt::Debug + Send + Sync {
    /// Identifier used for equality and display.
    fn name(&self) -> &str;

    /// Offset from UTC in force at `instant`.
    fn offset_at(&self, instant: Instant) -> UtcOffset;

    /// Short name of the offset in force, e.g. `CEST`.
    fn abbreviation_at(&self, _instant: Instant) -> Option<&str> {
        None
    }

    /// Whether daylight saving time is in force at `instant`.
    fn is_dst_at(&self, _instant: Instant) -> bool {
        false
    }
}

/// Zone with a single offset for all time.
#[derive(Debug, Clone)]
pub struct FixedOffset {
    name: String,
    offset: UtcOffset,
}

impl TimeZone for FixedOffset {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset_at(&self, _instant: Instant) -> UtcOffset {
        self.offset
    }
}

/// A change of offset taking effect at `starts_at` (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub starts_at: Instant,
    pub offset_seconds: i32,
    pub abbreviation: String,
    pub dst: bool,
}

impl Transition {
    pub fn new(
        starts_at: Instant,
        offset_seconds: i32,
        abbreviation: impl Into<String>,
        dst: bool,
    ) -> Self {
        Self {
            starts_at,
            offset_seconds,
            abbreviation: abbreviation.into(),
            dst,
        }
    }
}

/// Zone whose offset changes at listed instants.
///
/// Before the first transition the first transition's offset applies.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    name: String,
    transitions: Vec<(Transition, UtcOffset)>,
}

impl TransitionTable {
    fn active(&self, instant: Instant) -> Option<&(Transition, UtcOffset)> {
        let idx = self
            .transitions
            .partition_point(|(t, _)| t.starts_at <= instant);
        self.transitions.get(idx.saturating_sub(1))
    }
}

impl TimeZone for TransitionTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset_at(&self, instant: Instant) -> UtcOffset {
        self.active(instant)
            .map(|(_, offset)| *offset)
            .unwrap_or(UtcOffset::UTC)
    }

    fn abbreviation_at(&self, instant: Instant) -> Option<&str> {
        self.active(instant)
            .map(|(t, _)| t.abbreviation.as_str())
            .filter(|abbreviation| !abbreviation.is_empty())
    }

    fn is_dst_at(&self, instant: Instant) -> bool {
        self.active(instant).map_or(false, |(t, _)| t.dst)
    }
}

/// Shared handle to a timezone rule set. Zones compare equal by name.
#[derive(Debug, Clone)]
pub struct Zone(Arc<dyn TimeZone>);

impl Zone {
    pub fn utc() -> Self {
        Zone(Arc::new(FixedOffset {
            name: "UTC".to_string(),
            offset: UtcOffset::UTC,
        }))
    }

    /// Zone at a constant offset (seconds east of UTC).
    pub fn fixed(name: impl Into<String>, offset_seconds: i32) -> Result<Self> {
        let name = name.into();
        let offset = utc_offset(offset_seconds)?;
        Ok(Zone(Arc::new(FixedOffset { name, offset })))
    }

    /// Zone built from an explicit list of offset changes.
    pub fn with_transitions(
        name: impl Into<String>,
        transitions: Vec<Transition>,
    ) -> Result<Self> {
        if transitions.is_empty() {
            return Err(Error::config("a transition zone needs at least one transition"));
        }
        let mut table = transitions
            .into_iter()
            .map(|t| -> Result<(Transition, UtcOffset)> {
                let offset = utc_offset(t.offset_seconds)?;
                Ok((t, offset))
            })
            .collect::<Result<Vec<_>>>()?;
        table.sort_by_key(|(t, _)| t.starts_at);
        Ok(Zone(Arc::new(TransitionTable {
            name: name.into(),
            transitions: table,
        })))
    }

    /// Wrap a caller-supplied rule set.
    pub fn custom(zone: impl TimeZone + 'static) -> Self {
        Zone(Arc::new(zone))
    }

    /// Parse `UTC`, a known fixed-offset region name, or `+HHMM` / `-HHMM`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "UTC" | "Z" => Ok(Zone::utc()),
            "Asia/Shanghai" => Zone::fixed(s, 8 * 3600),
            "Asia/Tokyo" => Zone::fixed(s, 9 * 3600),
            _ => {
                let invalid = || Error::config(format!("unknown timezone: {}", s));
                let sign = match s.as_bytes().first() {
                    Some(b'+') => 1,
                    Some(b'-') => -1,
                    _ => return Err(invalid()),
                };
                let digits = &s[1..];
                if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let hours: i32 = digits[0..2].parse().map_err(|_| invalid())?;
                let minutes: i32 = digits[2..4].parse().map_err(|_| invalid())?;
                if minutes >= 60 {
                    return Err(invalid());
                }
                Zone::fixed(s, sign * (hours * 3600 + minutes * 60))
            }
        }
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn is_utc(&self) -> bool {
        self.name() == "UTC"
    }

    pub fn offset_at(&self, instant: Instant) -> UtcOffset {
        self.0.offset_at(instant)
    }

    pub fn abbreviation_at(&self, instant: Instant) -> Option<&str> {
        self.0.abbreviation_at(instant)
    }

    pub fn is_dst_at(&self, instant: Instant) -> bool {
        self.0.is_dst_at(instant)
    }

    /// Local wall-clock fields at `instant`.
    pub fn to_local(&self, instant: Instant) -> PrimitiveDateTime {
        let offset = self.offset_at(instant);
        instant.offset_by(offset_micros(offset)).to_utc()
    }

    /// Absolute instant for local wall-clock fields.
    ///
    /// The offset is looked up twice: once at the wall time read as UTC and
    /// once at the first estimate. Ambiguous times pick the later reading;
    /// times skipped by a forward jump land after the gap, shifted by its
    /// length.
    pub fn resolve_local(&self, local: PrimitiveDateTime) -> Instant {
        let wall = Instant::from_utc(local);
        let estimate = wall.offset_by(-offset_micros(self.offset_at(wall)));
        wall.offset_by(-offset_micros(self.offset_at(estimate)))
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Zone {}

impl Default for Zone {
    fn default() -> Self {
        Zone::utc()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn utc_offset(seconds: i32) -> Result<UtcOffset> {
    UtcOffset::from_whole_seconds(seconds)
        .map_err(|err| Error::config(format!("invalid offset {}s: {}", seconds, err)))
}

fn offset_micros(offset: UtcOffset) -> i128 {
    i128::from(offset.whole_seconds()) * i128::from(MICROS_PER_SECOND)
}
