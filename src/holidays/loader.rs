//! Holiday lists in `YYYYMMDD` line format.
//!
//! ```text
//! # exchange closures
//! 20110101
//! 20110201   # trailing comments are fine
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use time::Date;

use super::HolidaySet;
use crate::error::{Error, Result};
use crate::instant::calendar_date;

impl HolidaySet {
    /// Parse holiday text. Any malformed line fails the whole parse.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_reader(mut reader: impl BufRead) -> Result<Self> {
        let mut dates = Vec::new();
        let mut buf = Vec::new();
        let mut line_no = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = std::str::from_utf8(&buf).map_err(|_| Error::Load {
                line: line_no,
                content: String::from_utf8_lossy(&buf).trim().to_string(),
            })?;
            if let Some(date) = parse_line(line_no, line)? {
                dates.push(date);
            }
        }
        Ok(Self::new(dates))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let set = Self::from_reader(BufReader::new(file))?;
        log::debug!("loaded {} holidays from {}", set.len(), path.display());
        Ok(set)
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<Option<Date>> {
    let content = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    }
    .trim();
    if content.is_empty() {
        return Ok(None);
    }

    let bad_line = || Error::Load {
        line: line_no,
        content: content.to_string(),
    };
    if content.len() != 8 || !content.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad_line());
    }
    let year: i32 = content[0..4].parse().map_err(|_| bad_line())?;
    let month: u8 = content[4..6].parse().map_err(|_| bad_line())?;
    let day: u8 = content[6..8].parse().map_err(|_| bad_line())?;
    calendar_date(year, month, day)
        .map(Some)
        .map_err(|_| bad_line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holidays::HolidayCalendar;
    use time::Month;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let set = HolidaySet::parse("20110101\n20110201\n20110301\n#\n\n20110401\n\n").unwrap();
        assert_eq!(set.len(), 4);
        assert!(set.is_holiday(Date::from_calendar_date(2011, Month::April, 1).unwrap()));
    }

    #[test]
    fn test_trailing_comment_and_whitespace() {
        let set = HolidaySet::parse("  20111225   # christmas\r\n").unwrap();
        assert_eq!(
            set.dates(),
            &[Date::from_calendar_date(2011, Month::December, 25).unwrap()]
        );
    }

    #[test]
    fn test_invalid_day_reports_line() {
        let err = HolidaySet::parse("20110101\n\n20110400\n").unwrap_err();
        match err {
            Error::Load { line, content } => {
                assert_eq!(line, 3);
                assert_eq!(content, "20110400");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert!(HolidaySet::parse("2011-01-01\n").is_err());
        assert!(HolidaySet::parse("201101011\n").is_err());
        assert!(HolidaySet::parse("20111301\n").is_err());
        assert!(HolidaySet::parse("20110229\n").is_err());
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let bytes: &[u8] = b"20110101\n2011\xff0102\n";
        match HolidaySet::from_reader(bytes).unwrap_err() {
            Error::Load { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "2011\u{fffd}0102");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = HolidaySet::load("/nonexistent/holidays.txt").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
