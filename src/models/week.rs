//! Sunday-aligned scheduling weeks.
//!
//! The schedule week always runs Sunday through Saturday, and week membership
//! is decided on the branch-local YYYY-MM-DD calendar day. `NaiveDate`
//! ordering is identical to ordering the ISO date strings, so no UTC instant
//! ever enters these comparisons.

use chrono::{Datelike, Days, NaiveDate};

/// The Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date - Days::new(offset)
}

/// The (Sunday, Saturday) bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let sunday = week_start(date);
    (sunday, sunday + Days::new(6))
}

/// Whether `date` falls in the Sunday-aligned week starting at `start`.
pub fn in_week(date: NaiveDate, start: NaiveDate) -> bool {
    let (sunday, saturday) = week_bounds(start);
    date >= sunday && date <= saturday
}

/// All seven calendar days of the week containing `date`, Sunday first.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let sunday = week_start(date);
    std::array::from_fn(|i| sunday + Days::new(i as u64))
}
