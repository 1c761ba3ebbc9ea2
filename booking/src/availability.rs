//! Availability model: which days of a month are booked, plus month navigation.
//!
//! Bookings are compared at day granularity with a half-open rule: a booking
//! occupies its check-in day and every day before its check-out day. The
//! check-out day itself stays free for the next guest.

use crate::calendar::{CalendarCell, YearMonth};
use crate::types::{Booking, DateRange};
use chrono::NaiveDate;
use haven_core::environment::Clock;

/// Whether `day` is occupied by any of `bookings`
///
/// Bookings whose range is empty or inverted after truncation to days occupy
/// nothing.
#[must_use]
pub fn is_day_booked(day: NaiveDate, bookings: &[Booking]) -> bool {
    bookings
        .iter()
        .filter_map(Booking::stay)
        .any(|stay| stay.contains(day))
}

/// Whether `candidate` shares a night with any of `bookings`
#[must_use]
pub fn overlaps_any(candidate: &DateRange, bookings: &[Booking]) -> bool {
    bookings
        .iter()
        .filter_map(Booking::stay)
        .any(|stay| stay.overlaps(candidate))
}

/// A visible cell of the availability calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayCell {
    /// Padding before the first day; carries no status
    Empty,
    /// A day of the displayed month
    Day {
        /// Day of month, starting at 1
        day: u32,
        /// Occupied by a booking
        booked: bool,
    },
}

/// The month shown by an availability calendar
///
/// Bounded below by the month that was current when the view was created:
/// guests cannot page into the past.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarView {
    shown: YearMonth,
    current: YearMonth,
}

impl CalendarView {
    /// A view showing the month containing `today`
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        let current = YearMonth::from_date(today);
        Self {
            shown: current,
            current,
        }
    }

    /// A view showing the current real-world month
    #[must_use]
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    /// The displayed month
    #[must_use]
    pub const fn month(&self) -> YearMonth {
        self.shown
    }

    /// The real-world month as of the last `rebase`
    #[must_use]
    pub const fn current(&self) -> YearMonth {
        self.current
    }

    /// Move the current month to the one containing `today`
    ///
    /// A displayed month that is now in the past snaps forward to it.
    pub fn rebase(&mut self, today: NaiveDate) {
        self.current = YearMonth::from_date(today);
        if self.shown < self.current {
            self.shown = self.current;
        }
    }

    /// Whether `prev_month` would move
    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        self.shown > self.current
    }

    /// Whether the current month is displayed
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.shown == self.current
    }

    /// Show the previous month; no-op at the current month
    ///
    /// Returns whether the displayed month changed.
    pub fn prev_month(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.shown = self.shown.prev();
        true
    }

    /// Show the next month
    pub fn next_month(&mut self) {
        self.shown = self.shown.next();
    }

    /// Jump back to the current month; no-op when already there
    ///
    /// Returns whether the displayed month changed.
    pub fn today(&mut self) -> bool {
        if self.is_current() {
            return false;
        }
        self.shown = self.current;
        true
    }

    /// Availability grid of the displayed month
    #[must_use]
    pub fn grid(&self, bookings: &[Booking]) -> Vec<DayCell> {
        month_availability(self, bookings)
    }
}

/// Monday-first grid of the displayed month with each day's booked status
#[must_use]
pub fn month_availability(view: &CalendarView, bookings: &[Booking]) -> Vec<DayCell> {
    let month = view.month();
    let stays: Vec<DateRange> = bookings.iter().filter_map(Booking::stay).collect();

    month
        .grid()
        .into_iter()
        .map(|cell| match cell {
            CalendarCell::Empty => DayCell::Empty,
            CalendarCell::Day(day) => DayCell::Day {
                day,
                booked: month
                    .day(day)
                    .is_some_and(|date| stays.iter().any(|stay| stay.contains(date))),
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::VenueId;
    use haven_testing::test_clock;
    use proptest::prelude::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn booking(from: NaiveDate, to: NaiveDate) -> Booking {
        Booking::for_days(VenueId::new(), from, to, 1)
    }

    fn booked_days(grid: &[DayCell]) -> Vec<u32> {
        grid.iter()
            .filter_map(|cell| match cell {
                DayCell::Day { day, booked: true } => Some(*day),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_check_in_booked_check_out_free() {
        let bookings = vec![booking(day(6, 10), day(6, 12))];
        assert!(!is_day_booked(day(6, 9), &bookings));
        assert!(is_day_booked(day(6, 10), &bookings));
        assert!(is_day_booked(day(6, 11), &bookings));
        assert!(!is_day_booked(day(6, 12), &bookings));
    }

    #[test]
    fn test_inverted_booking_books_nothing() {
        let bookings = vec![booking(day(6, 12), day(6, 10)), booking(day(6, 5), day(6, 5))];
        assert!(!is_day_booked(day(6, 5), &bookings));
        assert!(!is_day_booked(day(6, 11), &bookings));
    }

    #[test]
    fn test_overlaps_any_respects_back_to_back() {
        let bookings = vec![booking(day(6, 10), day(6, 12))];
        let after = DateRange::new(day(6, 12), day(6, 14)).unwrap();
        let before = DateRange::new(day(6, 8), day(6, 10)).unwrap();
        let inside = DateRange::new(day(6, 11), day(6, 15)).unwrap();
        assert!(!overlaps_any(&after, &bookings));
        assert!(!overlaps_any(&before, &bookings));
        assert!(overlaps_any(&inside, &bookings));
    }

    #[test]
    fn test_grid_marks_booked_days_and_leaves_padding_blank() {
        let view = CalendarView::from_clock(&test_clock());
        let bookings = vec![
            booking(day(5, 30), day(6, 2)),
            booking(day(6, 29), day(7, 3)),
        ];
        let grid = month_availability(&view, &bookings);

        assert_eq!(grid.len(), 36);
        assert!(grid[..6].iter().all(|cell| *cell == DayCell::Empty));
        assert_eq!(booked_days(&grid), vec![1, 29, 30]);
    }

    #[test]
    fn test_prev_month_is_noop_at_current_month() {
        let mut view = CalendarView::from_clock(&test_clock());
        let current = view.month();

        assert!(!view.can_go_prev());
        assert!(!view.prev_month());
        assert_eq!(view.month(), current);

        view.next_month();
        assert!(view.can_go_prev());
        assert!(view.prev_month());
        assert!(view.is_current());
    }

    #[test]
    fn test_today_returns_to_current_month() {
        let mut view = CalendarView::new(day(12, 20));
        assert!(!view.today());

        view.next_month();
        assert_eq!((view.month().year(), view.month().month()), (2026, 1));
        assert!(view.today());
        assert_eq!(view.month(), view.current());
    }

    #[test]
    fn test_rebase_follows_the_clock_across_month_end() {
        let mut view = CalendarView::new(day(6, 30));
        view.rebase(day(7, 1));
        assert_eq!(view.current().month(), 7);
        assert!(view.is_current());
        assert!(!view.prev_month());

        view.next_month();
        view.next_month();
        view.rebase(day(7, 2));
        assert_eq!(view.month().month(), 9);
        assert!(view.today());
        assert_eq!(view.month().month(), 7);
    }

    #[test]
    fn test_twelve_next_months_is_same_month_next_year() {
        let mut view = CalendarView::new(day(6, 15));
        for _ in 0..12 {
            view.next_month();
        }
        assert_eq!((view.month().year(), view.month().month()), (2026, 6));
    }

    proptest! {
        #[test]
        fn prop_booked_iff_inside_some_half_open_range(
            ranges in prop::collection::vec((0i64..60, 0i64..10), 0..6),
            probe in 0i64..70,
        ) {
            let base = day(6, 1);
            let bookings: Vec<Booking> = ranges
                .iter()
                .map(|(start, len)| {
                    let from = base + chrono::Duration::days(*start);
                    booking(from, from + chrono::Duration::days(*len))
                })
                .collect();
            let probe = base + chrono::Duration::days(probe);

            let expected = bookings.iter().any(|b| {
                b.date_from.date_naive() <= probe && probe < b.date_to.date_naive()
            });
            prop_assert_eq!(is_day_booked(probe, &bookings), expected);
        }
    }
}
