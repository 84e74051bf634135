use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use time::{Date, Month};

use timescales::{Error, FilteredGrid, HolidayCalendar, HolidayGrid, HolidaySet, Instant, Period, Scale, UniformGrid, Weekdays};

#[test]
fn load_holiday_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("holidays.txt");
    fs::write(&path, "20110101\n20110201\n20110301\n#\n\n20110401\n\n").expect("write");

    let set = HolidaySet::load(&path).expect("load");
    assert_eq!(set.len(), 4);
    let april = Date::from_calendar_date(2011, Month::April, 1).expect("date");
    assert!(set.is_holiday(april));
}

#[test]
fn bad_line_fails_whole_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("holidays.txt");
    fs::write(&path, "20110101\n20110400\n20110501\n").expect("write");

    match HolidaySet::load(&path) {
        Err(Error::Load { line, content }) => {
            assert_eq!(line, 2);
            assert_eq!(content, "20110400");
        }
        other => panic!("expected load error, got {:?}", other),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = HolidaySet::load(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn loaded_file_drives_business_days() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("holidays.txt");
    fs::write(&path, "# new year\n20110103\n").expect("write");
    let calendar: Arc<dyn HolidayCalendar> = Arc::new(HolidaySet::load(&path).expect("load"));

    let anchor = Instant::from_ymd(2010, 12, 31).expect("anchor");
    let days = UniformGrid::new(anchor, Period::Days, 1).expect("uniform grid");
    let weekdays = FilteredGrid::new(days.into(), Arc::new(Weekdays), 1).expect("filtered grid");
    let scale: Scale = HolidayGrid::new(weekdays.into(), Some(calendar), 1)
        .expect("holiday grid")
        .into();

    assert_eq!(
        scale.shifted_by(1).current_instant(),
        Instant::from_ymd(2011, 1, 4).expect("instant")
    );
}
