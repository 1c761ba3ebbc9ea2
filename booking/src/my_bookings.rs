//! The logged-in customer's upcoming and past bookings.

use crate::environment::BookingEnvironment;
use crate::presenter::{self, Route};
use crate::service::DataServiceError;
use crate::types::Booking;
use chrono::NaiveDate;
use haven_core::{async_effect, effect::Effect, effect::EffectId, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Fetch of the customer's bookings
pub const LOAD_BOOKINGS: EffectId = EffectId::new("my_bookings.load");

const LOAD_FALLBACK: &str = "Could not load bookings";

/// State of the bookings screen
#[derive(Clone, Debug, Default)]
pub struct MyBookingsState {
    /// Bookings, earliest check-in first
    pub bookings: Vec<Booking>,
    /// Fetch in flight
    pub loading: bool,
    /// Message of the last failure
    pub error: Option<String>,
    request: u64,
}

impl MyBookingsState {
    /// Bookings not yet checked out as of `today`, earliest check-in first
    ///
    /// A stay whose check-out day is `today` still counts.
    #[must_use]
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|booking| booking.date_to.date_naive() >= today)
            .collect()
    }
}

/// Actions for the bookings screen
#[derive(Clone, Debug)]
pub enum MyBookingsAction {
    /// Screen mounted or refresh requested
    Load,
    /// Fetch result
    Loaded {
        /// Request the fetch belongs to
        request: u64,
        /// Service result
        result: Result<Vec<Booking>, DataServiceError>,
    },
    /// Screen unmounted
    Dismissed,
}

/// Reducer for the bookings screen
#[derive(Clone, Debug, Default)]
pub struct MyBookingsReducer;

impl MyBookingsReducer {
    /// Creates a new `MyBookingsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for MyBookingsReducer {
    type State = MyBookingsState;
    type Action = MyBookingsAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            MyBookingsAction::Load => {
                let session = env.session.current();
                let Some((token, owner)) = session.credentials() else {
                    tracing::debug!("Bookings requested without a session");
                    return smallvec![presenter::navigate(&env.presenter, Route::Login)];
                };
                let (token, owner) = (token.clone(), owner.to_owned());

                state.loading = true;
                state.error = None;
                state.request += 1;
                let request = state.request;
                tracing::debug!(%owner, request, "Loading bookings");

                let data = Arc::clone(&env.data);
                let fetch = async_effect! {
                    let result = data.list_my_bookings(&token, &owner).await;
                    Some(MyBookingsAction::Loaded { request, result })
                };
                smallvec![fetch.cancellable(LOAD_BOOKINGS, true)]
            },

            MyBookingsAction::Loaded { request, result } => {
                if request != state.request {
                    return SmallVec::new();
                }
                state.loading = false;
                match result {
                    Ok(mut bookings) => {
                        bookings.sort_by_key(|booking| booking.date_from);
                        state.bookings = bookings;
                        tracing::debug!(
                            total = state.bookings.len(),
                            upcoming = state.upcoming(env.clock.today()).len(),
                            "Bookings loaded"
                        );
                        SmallVec::new()
                    },
                    Err(DataServiceError::Cancelled) => {
                        tracing::trace!(request, "Bookings fetch cancelled");
                        SmallVec::new()
                    },
                    Err(DataServiceError::NotAuthenticated) => {
                        tracing::debug!("Session rejected, sending to login");
                        smallvec![presenter::navigate(&env.presenter, Route::Login)]
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Bookings fetch failed");
                        state.error = Some(error.user_message(LOAD_FALLBACK));
                        SmallVec::new()
                    },
                }
            },

            MyBookingsAction::Dismissed => {
                state.request += 1;
                state.loading = false;
                smallvec![Effect::Cancel(LOAD_BOOKINGS)]
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
    use crate::session::{AuthToken, Session};
    use crate::types::VenueId;
    use haven_core::environment::Clock;
    use haven_testing::{assertions, test_clock, ReducerTest};

    fn env_with(session: Session) -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(InMemoryDataService::new()),
            Arc::new(InMemorySessionProvider::new(session)),
            Arc::new(RecordingPresenter::new()),
            Config::default(),
        )
    }

    fn customer() -> Session {
        Session::customer("kari", AuthToken::new("c-1"))
    }

    fn stay(day: u32) -> Booking {
        let from = NaiveDate::from_ymd_opt(2025, 7, day).unwrap();
        Booking::for_days(VenueId::new(), from, from.succ_opt().unwrap(), 1)
    }

    #[test]
    fn test_load_without_session_navigates_to_login() {
        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(Session::anonymous()))
            .given_state(MyBookingsState::default())
            .when_action(MyBookingsAction::Load)
            .then_state(|state| assert!(!state.loading))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_load_starts_cancellable_fetch() {
        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(MyBookingsState::default())
            .when_action(MyBookingsAction::Load)
            .then_state(|state| {
                assert!(state.loading);
                assert_eq!(state.request, 1);
            })
            .then_effects(|effects| assert!(assertions::starts_cancellable(effects, LOAD_BOOKINGS)))
            .run();
    }

    #[test]
    fn test_loaded_bookings_are_sorted_by_check_in() {
        let state = MyBookingsState {
            loading: true,
            request: 1,
            ..MyBookingsState::default()
        };

        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(state)
            .when_action(MyBookingsAction::Loaded {
                request: 1,
                result: Ok(vec![stay(20), stay(3), stay(11)]),
            })
            .then_state(|state| {
                let days: Vec<_> = state.bookings.iter().map(|b| b.date_from).collect();
                let mut sorted = days.clone();
                sorted.sort();
                assert_eq!(days, sorted);
                assert!(!state.loading);
            })
            .run();
    }

    #[test]
    fn test_upcoming_keeps_stays_checking_out_today() {
        let today = test_clock().today();
        let day = |d: u32| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        let state = MyBookingsState {
            bookings: vec![
                Booking::for_days(VenueId::new(), day(1), day(3), 1),
                Booking::for_days(VenueId::new(), day(13), today, 1),
                Booking::for_days(VenueId::new(), today, day(17), 1),
                Booking::for_days(VenueId::new(), day(20), day(22), 1),
            ],
            ..MyBookingsState::default()
        };

        let upcoming: Vec<_> = state.upcoming(today).iter().map(|b| b.date_from.date_naive()).collect();
        assert_eq!(upcoming, vec![day(13), today, day(20)]);
        assert!(state.upcoming(day(23)).is_empty());
    }

    #[test]
    fn test_rejected_session_navigates_instead_of_surfacing() {
        let state = MyBookingsState {
            request: 1,
            ..MyBookingsState::default()
        };

        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(state)
            .when_action(MyBookingsAction::Loaded {
                request: 1,
                result: Err(DataServiceError::NotAuthenticated),
            })
            .then_state(|state| assert!(state.error.is_none()))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_cancellation_is_silent_and_failures_fall_back() {
        let state = MyBookingsState {
            request: 1,
            ..MyBookingsState::default()
        };

        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(state.clone())
            .when_action(MyBookingsAction::Loaded {
                request: 1,
                result: Err(DataServiceError::Cancelled),
            })
            .then_state(|state| assert!(state.error.is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(state)
            .when_action(MyBookingsAction::Loaded {
                request: 1,
                result: Err(DataServiceError::Rejected(String::new())),
            })
            .then_state(|state| assert_eq!(state.error.as_deref(), Some(LOAD_FALLBACK)))
            .run();
    }

    #[test]
    fn test_dismissed_cancels_fetch() {
        ReducerTest::new(MyBookingsReducer::new())
            .with_env(env_with(customer()))
            .given_state(MyBookingsState::default())
            .when_action(MyBookingsAction::Dismissed)
            .then_effects(|effects| assertions::assert_cancels(effects, LOAD_BOOKINGS))
            .run();
    }
}
