//! Scale configuration.
//!
//! Describes a composed scale as data so it can be stored as JSON and built
//! on demand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::holidays::{HolidayCalendar, HolidaySet};
use crate::instant::{Instant, ZonedInstant};
use crate::scale::{
    CalendarGrid, FilteredGrid, HolidayGrid, Period, Scale, Selector, UniformGrid, Weekdays,
    WeekendDays,
};
use crate::zone::Zone;

/// Configuration for a scale.
///
/// The leaf grid is uniform when no zone is given and the period has a
/// fixed length; otherwise it is a calendar grid (in UTC when no zone is
/// given). The frequency applies to the outermost layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Base unit.
    /// Default: days
    pub period: Period,

    /// Base units per step.
    /// Default: 1
    pub frequency: i64,

    /// Instant of position 0, local to `zone` when one is set.
    /// Default: 1970-01-01
    pub anchor: String,

    /// Zone name or `+HHMM` offset.
    pub zone: Option<String>,

    /// Restrict the grid to a subset of days.
    pub selector: Option<SelectorKind>,

    /// Skip holidays.
    pub holidays: Option<HolidaySource>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            period: Period::Days,
            frequency: 1,
            anchor: "1970-01-01".to_string(),
            zone: None,
            selector: None,
            holidays: None,
        }
    }
}

/// Built-in selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Weekdays,
    WeekendDays,
}

impl SelectorKind {
    pub fn selector(self) -> Arc<dyn Selector> {
        match self {
            SelectorKind::Weekdays => Arc::new(Weekdays),
            SelectorKind::WeekendDays => Arc::new(WeekendDays),
        }
    }
}

/// Where holiday dates come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HolidaySource {
    /// `YYYYMMDD` lines in a file.
    File { path: PathBuf },
    /// `YYYYMMDD` dates inline.
    Dates { dates: Vec<String> },
}

impl HolidaySource {
    pub fn load(&self) -> Result<HolidaySet> {
        match self {
            HolidaySource::File { path } => HolidaySet::load(path),
            HolidaySource::Dates { dates } => HolidaySet::parse(&dates.join("\n")),
        }
    }
}

impl ScaleConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| Error::config(format!("invalid scale config: {}", err)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| Error::config(format!("cannot serialize scale config: {}", err)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn build(&self) -> Result<Scale> {
        let wrapped = self.selector.is_some() || self.holidays.is_some();
        let leaf_frequency = if wrapped { 1 } else { self.frequency };

        let mut scale = match (&self.zone, self.period.fixed_micros()) {
            (None, Some(_)) => {
                let anchor = Instant::parse(&self.anchor)?;
                Scale::from(UniformGrid::new(anchor, self.period, leaf_frequency)?)
            }
            (zone, _) => {
                let zone = match zone {
                    Some(name) => Zone::parse(name)?,
                    None => Zone::utc(),
                };
                let anchor = ZonedInstant::parse(&self.anchor, zone)?;
                Scale::from(CalendarGrid::new(anchor, self.period, leaf_frequency)?)
            }
        };

        if let Some(kind) = self.selector {
            let frequency = if self.holidays.is_some() { 1 } else { self.frequency };
            scale = FilteredGrid::new(scale, kind.selector(), frequency)?.into();
        }

        if let Some(source) = &self.holidays {
            let calendar: Arc<dyn HolidayCalendar> = Arc::new(source.load()?);
            scale = HolidayGrid::new(scale, Some(calendar), self.frequency)?.into();
        }

        log::debug!(
            "built {} scale anchored at {}",
            scale.describe(),
            scale.current_zoned_instant()
        );
        Ok(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_config_default() {
        let config = ScaleConfig::default();
        assert_eq!(config.period, Period::Days);
        assert_eq!(config.frequency, 1);
        assert_eq!(config.anchor, "1970-01-01");
        let scale = config.build().unwrap();
        assert_eq!(scale.current_instant(), Instant::UNIX_EPOCH);
        assert_eq!(scale.describe(), "uniform(days)");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ScaleConfig::from_json(r#"{ "period": "months", "anchor": "2000-09-01" }"#)
            .unwrap();
        assert_eq!(config.frequency, 1);
        let scale = config.build().unwrap();
        assert_eq!(scale.describe(), "calendar(months)");
        assert_eq!(
            scale.shifted_by(5).current_instant(),
            Instant::from_ymd(2001, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_business_days_from_json() {
        let json = r#"{
            "period": "days",
            "anchor": "1999-12-31",
            "selector": "weekdays",
            "holidays": { "type": "dates", "dates": ["20000101"] }
        }"#;
        let scale = ScaleConfig::from_json(json).unwrap().build().unwrap();
        assert_eq!(scale.describe(), "holiday(filtered(weekdays, uniform(days)))");
        assert_eq!(
            scale.shifted_by(1).current_instant(),
            Instant::from_ymd(2000, 1, 3).unwrap()
        );
    }

    #[test]
    fn test_zoned_config() {
        let config = ScaleConfig {
            period: Period::Hours,
            frequency: 6,
            anchor: "2000-01-01T00:00".to_string(),
            zone: Some("+0800".to_string()),
            ..ScaleConfig::default()
        };
        let scale = config.build().unwrap();
        assert_eq!(scale.describe(), "calendar(hours)");
        assert_eq!(
            scale.current_instant(),
            Instant::from_ymd_hms(1999, 12, 31, 16, 0, 0).unwrap()
        );
        assert_eq!(
            scale.shifted_by(1).current_instant(),
            Instant::from_ymd_hms(1999, 12, 31, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScaleConfig {
            selector: Some(SelectorKind::WeekendDays),
            holidays: Some(HolidaySource::File {
                path: PathBuf::from("/etc/holidays.txt"),
            }),
            ..ScaleConfig::default()
        };
        let json = config.to_json().unwrap();
        assert!(json.contains("\"weekend_days\""));
        assert!(json.contains("\"type\": \"file\""));
        assert_eq!(ScaleConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_unsatisfiable_selector_is_config_error() {
        // 2000-01-01 is a Saturday, so a weekly grid never hits a weekday.
        let config = ScaleConfig::from_json(
            r#"{ "period": "weeks", "anchor": "2000-01-01", "selector": "weekdays" }"#,
        )
        .unwrap();
        assert!(matches!(config.build(), Err(Error::Configuration(_))));

        let sunday = ScaleConfig {
            anchor: "2000-01-02".to_string(),
            selector: Some(SelectorKind::WeekendDays),
            ..config
        };
        assert!(sunday.build().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(ScaleConfig::from_json("{ \"period\": \"fortnights\" }").is_err());
        let zero = ScaleConfig {
            frequency: 0,
            ..ScaleConfig::default()
        };
        assert!(zero.build().is_err());
        let bad_anchor = ScaleConfig {
            anchor: "not a date".to_string(),
            ..ScaleConfig::default()
        };
        assert!(bad_anchor.build().is_err());
    }
}
