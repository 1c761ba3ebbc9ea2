//! Calendar math for month grids.
//!
//! Weeks start on Monday. Grids are row-major: leading [`CalendarCell::Empty`]
//! cells pad the first week, followed by one cell per day of the month.
//! Invalid year/month input is the caller's responsibility.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// One cell of a month grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarCell {
    /// Padding before the first day
    Empty,
    /// Day of the month, starting at 1
    Day(u32),
}

/// Number of days in `month` (1-12) of `year`
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Leading blank cells before the 1st in a Monday-first week, in `0..=6`
#[must_use]
pub fn first_weekday_offset(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1).map_or(0, |first| {
        // Sunday-based weekday shifted so Monday is column 0
        (first.weekday().num_days_from_sunday() + 6) % 7
    })
}

/// Build the Monday-first grid for a month
#[must_use]
pub fn build_month_grid(year: i32, month: u32) -> Vec<CalendarCell> {
    let offset = first_weekday_offset(year, month);
    let days = days_in_month(year, month);

    let mut cells = Vec::with_capacity((offset + days) as usize);
    cells.extend((0..offset).map(|_| CalendarCell::Empty));
    cells.extend((1..=days).map(CalendarCell::Day));
    cells
}

/// A calendar month
///
/// Ordered chronologically. Navigation saturates at the ends of the
/// representable date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// The month containing `date`
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// Month from a year and a 1-based month number
    ///
    /// Returns `None` if `month` is not in `1..=12` or the year is out of range.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Calendar year
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// Month number, 1-12
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First day of the month
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Date of `day` in this month, if it exists
    #[must_use]
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first_day.with_day(day)
    }

    /// The following month (December wraps to January of the next year)
    #[must_use]
    pub fn next(self) -> Self {
        self.first_day
            .checked_add_months(Months::new(1))
            .map_or(self, |first_day| Self { first_day })
    }

    /// The preceding month (January wraps to December of the previous year)
    #[must_use]
    pub fn prev(self) -> Self {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map_or(self, |first_day| Self { first_day })
    }

    /// Number of days in this month
    #[must_use]
    pub fn days(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Monday-first grid for this month
    #[must_use]
    pub fn grid(&self) -> Vec<CalendarCell> {
        build_month_grid(self.year(), self.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format("%B %Y"))
    }
}
