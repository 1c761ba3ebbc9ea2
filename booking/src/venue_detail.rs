//! Venue page: load one venue with its bookings and show its availability.

use crate::availability::{month_availability, CalendarView, DayCell};
use crate::environment::BookingEnvironment;
use crate::service::DataServiceError;
use crate::types::{Media, Venue, VenueId};
use chrono::NaiveDate;
use haven_core::{async_effect, effect::Effect, effect::EffectId, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Fetch of the displayed venue
pub const FETCH_VENUE: EffectId = EffectId::new("venue_detail.fetch");

/// Shown when the venue cannot be loaded
pub const LOAD_VENUE_FALLBACK: &str = "Could not load this venue right now";

/// State of the venue page
#[derive(Clone, Debug)]
pub struct VenueDetailState {
    /// Requested venue
    pub venue_id: Option<VenueId>,
    /// Loaded venue
    pub venue: Option<Venue>,
    /// Fetch in flight
    pub loading: bool,
    /// Message of the last failure
    pub error: Option<String>,
    /// Availability calendar
    pub calendar: CalendarView,
    request: u64,
}

impl VenueDetailState {
    /// Empty page whose calendar starts at the month of `today`
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            venue_id: None,
            venue: None,
            loading: false,
            error: None,
            calendar: CalendarView::new(today),
            request: 0,
        }
    }

    /// Availability grid of the displayed month
    #[must_use]
    pub fn availability(&self) -> Vec<DayCell> {
        let bookings = self.venue.as_ref().map_or(&[][..], |venue| &venue.bookings[..]);
        month_availability(&self.calendar, bookings)
    }

    /// Image to show first, if a venue is loaded
    #[must_use]
    pub fn hero_media(&self, placeholder_url: &str) -> Option<Media> {
        self.venue.as_ref().map(|venue| venue.hero_media(placeholder_url))
    }
}

/// Actions for the venue page
#[derive(Clone, Debug)]
pub enum VenueDetailAction {
    /// Show a venue
    Load(VenueId),
    /// Fetch result
    VenueLoaded {
        /// Request the fetch belongs to
        request: u64,
        /// Service result
        result: Result<Venue, DataServiceError>,
    },
    /// Calendar back one month
    PrevMonth,
    /// Calendar forward one month
    NextMonth,
    /// Calendar to the current month
    Today,
    /// The page unmounted
    Dismissed,
}

/// Reducer for the venue page
#[derive(Clone, Debug, Default)]
pub struct VenueDetailReducer;

impl VenueDetailReducer {
    /// Creates a new `VenueDetailReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for VenueDetailReducer {
    type State = VenueDetailState;
    type Action = VenueDetailAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            VenueDetailAction::Load(id) => {
                if state.venue_id != Some(id) {
                    state.venue = None;
                }
                state.venue_id = Some(id);
                state.loading = true;
                state.error = None;
                state.request += 1;
                tracing::debug!(venue_id = %id, request = state.request, "Loading venue");

                let request = state.request;
                let data = Arc::clone(&env.data);
                let fetch = async_effect! {
                    let result = data.get_venue(id).await;
                    Some(VenueDetailAction::VenueLoaded { request, result })
                };
                smallvec![fetch.cancellable(FETCH_VENUE, true)]
            },

            VenueDetailAction::VenueLoaded { request, result } => {
                if request != state.request {
                    tracing::trace!(request, current = state.request, "Stale venue dropped");
                    return SmallVec::new();
                }
                state.loading = false;
                match result {
                    Ok(venue) => {
                        tracing::debug!(venue_id = %venue.id, bookings = venue.bookings.len(), "Venue loaded");
                        state.venue = Some(venue);
                    },
                    Err(DataServiceError::Cancelled) => {
                        tracing::trace!(request, "Venue fetch cancelled");
                    },
                    Err(error) => {
                        tracing::warn!(venue_id = ?state.venue_id, %error, "Venue fetch failed");
                        state.error = Some(error.user_message(LOAD_VENUE_FALLBACK));
                    },
                }
                SmallVec::new()
            },

            VenueDetailAction::PrevMonth => {
                state.calendar.rebase(env.clock.today());
                state.calendar.prev_month();
                SmallVec::new()
            },

            VenueDetailAction::NextMonth => {
                state.calendar.rebase(env.clock.today());
                state.calendar.next_month();
                SmallVec::new()
            },

            VenueDetailAction::Today => {
                state.calendar.rebase(env.clock.today());
                state.calendar.today();
                SmallVec::new()
            },

            VenueDetailAction::Dismissed => {
                state.request += 1;
                state.loading = false;
                smallvec![Effect::Cancel(FETCH_VENUE)]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::memory::{InMemoryDataService, InMemorySessionProvider, RecordingPresenter};
    use crate::types::Booking;
    use haven_core::environment::Clock;
    use haven_testing::{assertions, test_clock, ReducerTest};

    fn env() -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(InMemoryDataService::new()),
            Arc::new(InMemorySessionProvider::default()),
            Arc::new(RecordingPresenter::new()),
            Config::default(),
        )
    }

    fn page() -> VenueDetailState {
        VenueDetailState::new(test_clock().today())
    }

    #[test]
    fn test_load_starts_cancellable_fetch() {
        let id = VenueId::new();
        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(page())
            .when_action(VenueDetailAction::Load(id))
            .then_state(move |state| {
                assert_eq!(state.venue_id, Some(id));
                assert!(state.loading);
                assert_eq!(state.request, 1);
            })
            .then_effects(|effects| assert!(assertions::starts_cancellable(effects, FETCH_VENUE)))
            .run();
    }

    #[test]
    fn test_loading_another_venue_clears_the_old_one() {
        let mut state = page();
        let old = Venue::new("Old", 2);
        state.venue_id = Some(old.id);
        state.venue = Some(old);

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::Load(VenueId::new()))
            .then_state(|state| assert!(state.venue.is_none()))
            .run();
    }

    #[test]
    fn test_superseded_result_is_ignored() {
        let mut state = page();
        state.request = 2;
        state.loading = true;

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::VenueLoaded {
                request: 1,
                result: Ok(Venue::new("Stale", 2)),
            })
            .then_state(|state| {
                assert!(state.venue.is_none());
                assert!(state.loading);
            })
            .run();
    }

    #[test]
    fn test_loaded_venue_drives_availability() {
        let today = test_clock().today();
        let venue = Venue::new("Cabin", 4);
        let booking = Booking::for_days(venue.id, today, today.succ_opt().unwrap(), 2);
        let venue = venue.with_bookings(vec![booking]);
        let mut state = page();
        state.request = 1;

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::VenueLoaded {
                request: 1,
                result: Ok(venue),
            })
            .then_state(|state| {
                assert!(!state.loading);
                let booked = state
                    .availability()
                    .into_iter()
                    .filter(|cell| matches!(cell, DayCell::Day { booked: true, .. }))
                    .count();
                assert_eq!(booked, 1);
                let hero = state.hero_media("https://img.example/none.png").unwrap();
                assert_eq!(hero.alt, "Cabin");
            })
            .run();
    }

    #[test]
    fn test_failure_uses_fallback_message() {
        let mut state = page();
        state.request = 1;

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::VenueLoaded {
                request: 1,
                result: Err(DataServiceError::Unavailable),
            })
            .then_state(|state| assert_eq!(state.error.as_deref(), Some(LOAD_VENUE_FALLBACK)))
            .run();
    }

    #[test]
    fn test_calendar_cannot_go_before_current_month() {
        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(page())
            .when_action(VenueDetailAction::PrevMonth)
            .then_state(|state| assert!(state.calendar.is_current()))
            .then_effects(assertions::assert_no_effects)
            .run();

        let mut ahead = page();
        ahead.calendar.next_month();
        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(ahead)
            .when_action(VenueDetailAction::Today)
            .then_state(|state| assert!(state.calendar.is_current()))
            .run();
    }

    #[test]
    fn test_navigation_tracks_the_clock_after_mount() {
        // Page opened in May, navigated after the clock moved into June
        let mut state = VenueDetailState::new(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
        assert!(state.calendar.is_current());

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state.clone())
            .when_action(VenueDetailAction::PrevMonth)
            .then_state(|state| {
                assert_eq!(state.calendar.month().month(), 6);
                assert!(state.calendar.is_current());
            })
            .run();

        state.calendar.next_month();
        state.calendar.next_month();
        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::Today)
            .then_state(|state| assert_eq!(state.calendar.month().month(), 6))
            .run();
    }

    #[test]
    fn test_dismissed_cancels_fetch() {
        let mut state = page();
        state.loading = true;
        state.request = 1;

        ReducerTest::new(VenueDetailReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(VenueDetailAction::Dismissed)
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.request, 2);
            })
            .then_effects(|effects| assertions::assert_cancels(effects, FETCH_VENUE))
            .run();
    }
}
