//! # Haven Testing
//!
//! Testing utilities and helpers for the Haven booking client.
//!
//! This crate provides:
//! - Deterministic clocks for calendar and navigation tests
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for returned effects
//!
//! ## Example
//!
//! ```ignore
//! use haven_testing::{assertions, test_clock, ReducerTest};
//!
//! ReducerTest::new(SearchReducer)
//!     .with_env(test_environment())
//!     .given_state(SearchState::default())
//!     .when_action(SearchAction::QueryChanged("cabin".into()))
//!     .then_state(|state| assert_eq!(state.raw_query, "cabin"))
//!     .then_effects(assertions::assert_has_cancellable_effect)
//!     .run();
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use haven_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use haven_testing::mocks::FixedClock;
    /// use haven_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a fixed clock at noon UTC on the given date
        ///
        /// Returns `None` for an invalid calendar date.
        #[must_use]
        pub fn on_date(year: i32, month: u32, day: u32) -> Option<Self> {
            let time = NaiveDate::from_ymd_opt(year, month, day)?
                .and_hms_opt(12, 0, 0)?
                .and_utc();
            Some(Self::new(time))
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-15 12:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-15T12:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
