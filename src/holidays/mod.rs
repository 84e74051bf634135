//! Holiday predicates.
//!
//! A holiday calendar answers one question: is this date a holiday? Grids
//! share calendars through `Arc<dyn HolidayCalendar>`; calendars are never
//! mutated after construction.

mod loader;

use std::fmt;
use std::sync::Arc;

use time::Date;

/// Pure date predicate marking holidays.
pub trait HolidayCalendar: fmt::Debug + Send + Sync {
    fn is_holiday(&self, date: Date) -> bool;
}

/// Calendar without holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn is_holiday(&self, _date: Date) -> bool {
        false
    }
}

/// Fixed set of holiday dates, kept sorted for binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySet {
    dates: Vec<Date>,
}

impl HolidaySet {
    pub fn new(mut dates: Vec<Date>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<Date> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = Date>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: Date) -> bool {
        self.dates.binary_search(&date).is_ok()
    }
}

/// Holidays decided by a closure.
pub struct CallbackHolidays {
    callback: Box<dyn Fn(Date) -> bool + Send + Sync>,
}

impl CallbackHolidays {
    pub fn new(callback: impl Fn(Date) -> bool + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for CallbackHolidays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHolidays").finish_non_exhaustive()
    }
}

impl HolidayCalendar for CallbackHolidays {
    fn is_holiday(&self, date: Date) -> bool {
        (self.callback)(date)
    }
}

/// Union of several calendars: a date is a holiday if any member says so.
#[derive(Debug, Clone, Default)]
pub struct CompositeHolidays {
    members: Vec<Arc<dyn HolidayCalendar>>,
}

impl CompositeHolidays {
    pub fn new(members: Vec<Arc<dyn HolidayCalendar>>) -> Self {
        Self { members }
    }

    pub fn with(mut self, member: Arc<dyn HolidayCalendar>) -> Self {
        self.members.push(member);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl HolidayCalendar for CompositeHolidays {
    fn is_holiday(&self, date: Date) -> bool {
        self.members.iter().any(|member| member.is_holiday(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, Weekday};

    fn date(y: i32, m: Month, d: u8) -> Date {
        Date::from_calendar_date(y, m, d).unwrap()
    }

    #[test]
    fn test_no_holidays() {
        assert!(!NoHolidays.is_holiday(date(2000, Month::January, 1)));
    }

    #[test]
    fn test_set_sorts_and_dedups() {
        let set = HolidaySet::new(vec![
            date(2011, Month::March, 1),
            date(2011, Month::January, 1),
            date(2011, Month::March, 1),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.dates()[0], date(2011, Month::January, 1));
        assert!(set.is_holiday(date(2011, Month::March, 1)));
        assert!(!set.is_holiday(date(2011, Month::March, 2)));
    }

    #[test]
    fn test_callback() {
        let mondays = CallbackHolidays::new(|d| d.weekday() == Weekday::Monday);
        assert!(mondays.is_holiday(date(2000, Month::January, 3)));
        assert!(!mondays.is_holiday(date(2000, Month::January, 4)));
        assert_eq!(format!("{:?}", mondays), "CallbackHolidays { .. }");
    }

    #[test]
    fn test_composite_is_union() {
        let new_year: Arc<dyn HolidayCalendar> =
            Arc::new(HolidaySet::new(vec![date(2000, Month::January, 1)]));
        let fridays: Arc<dyn HolidayCalendar> =
            Arc::new(CallbackHolidays::new(|d| d.weekday() == Weekday::Friday));
        let union = CompositeHolidays::default().with(new_year).with(fridays);
        assert_eq!(union.len(), 2);
        assert!(union.is_holiday(date(2000, Month::January, 1)));
        assert!(union.is_holiday(date(2000, Month::January, 7)));
        assert!(!union.is_holiday(date(2000, Month::January, 5)));
        assert!(!CompositeHolidays::default().is_holiday(date(2000, Month::January, 1)));
    }
}
