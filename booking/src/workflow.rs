//! Reservation workflow: validate, authenticate, submit once.
//!
//! ```text
//! Idle ──Submit──▶ Validating ──invalid──▶ Failed
//!                      │
//!                      ├──no session──▶ Unauthenticated ──SessionChanged──▶ Validating
//!                      │
//!                      └──session──▶ Submitting ──▶ Succeeded | Failed
//! ```
//!
//! While `Submitting`, further submits are dropped, so a double click creates
//! one booking. The create call is never cancelled once sent and never retried.

use crate::environment::BookingEnvironment;
use crate::presenter::{self, Route};
use crate::service::DataServiceError;
use crate::session::Session;
use crate::types::{Booking, BookingId, Venue};
use crate::validator::{validate_reservation, ReservationRequest, ValidatedReservation, ValidationError};
use haven_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Shown when the service rejects a booking without a message
pub const CREATE_BOOKING_FALLBACK: &str = "Could not create booking";

/// Where a reservation attempt stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReservationStatus {
    /// Nothing submitted yet
    Idle,
    /// Checking the request locally
    Validating,
    /// Valid, waiting for the user to log in
    Unauthenticated {
        /// The request to resume with, unmodified
        pending: ReservationRequest,
    },
    /// Create call in flight
    Submitting,
    /// Booking created
    Succeeded {
        /// The new booking
        booking_id: BookingId,
    },
    /// Rejected locally or by the service
    Failed {
        /// User-facing message
        reason: String,
    },
}

/// State of the reservation workflow for one venue
#[derive(Clone, Debug)]
pub struct ReservationState {
    /// The venue being booked, with its known bookings
    pub venue: Venue,
    /// Current status
    pub status: ReservationStatus,
    /// The reservation last sent to the service
    pub submitted: Option<ValidatedReservation>,
}

impl ReservationState {
    /// Idle workflow for `venue`
    #[must_use]
    pub fn new(venue: Venue) -> Self {
        Self {
            venue,
            status: ReservationStatus::Idle,
            submitted: None,
        }
    }

    /// Nights and total for a confirmation screen, without submitting
    ///
    /// # Errors
    ///
    /// Returns the validation failure the request would hit on submit.
    pub fn summary(&self, request: &ReservationRequest) -> Result<ValidatedReservation, ValidationError> {
        validate_reservation(request, &self.venue, Some(&self.venue.bookings))
    }

    /// Whether a create call is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.status, ReservationStatus::Submitting)
    }
}

/// Actions for the reservation workflow
#[derive(Clone, Debug)]
pub enum ReservationAction {
    /// Guest pressed "book"
    Submit(ReservationRequest),
    /// The session changed
    SessionChanged(Session),
    /// The service created the booking
    BookingCreated(Booking),
    /// The service refused the booking
    BookingRejected(DataServiceError),
    /// Guest edited the form after a result
    Edited,
}

/// Reducer for the reservation workflow
#[derive(Clone, Debug, Default)]
pub struct ReservationReducer;

impl ReservationReducer {
    /// Creates a new `ReservationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn validate_and_submit(
        state: &mut ReservationState,
        request: ReservationRequest,
        session: &Session,
        env: &BookingEnvironment,
    ) -> SmallVec<[Effect<ReservationAction>; 4]> {
        state.status = ReservationStatus::Validating;

        let valid = match state.summary(&request) {
            Ok(valid) => valid,
            Err(error) => {
                tracing::debug!(venue_id = %state.venue.id, %error, "Reservation rejected locally");
                state.status = ReservationStatus::Failed {
                    reason: error.to_string(),
                };
                return SmallVec::new();
            },
        };

        let Some(token) = session.auth_token() else {
            tracing::debug!(venue_id = %state.venue.id, "Reservation needs a login");
            state.status = ReservationStatus::Unauthenticated { pending: request };
            return smallvec![presenter::navigate(&env.presenter, Route::Login)];
        };

        tracing::debug!(
            venue_id = %state.venue.id,
            nights = valid.nights,
            guests = valid.guests,
            "Submitting reservation"
        );
        state.status = ReservationStatus::Submitting;
        let booking = valid.to_new_booking();
        state.submitted = Some(valid);

        let data = Arc::clone(&env.data);
        let token = token.clone();
        smallvec![async_effect! {
            match data.create_booking(&token, booking).await {
                Ok(booking) => Some(ReservationAction::BookingCreated(booking)),
                Err(error) => Some(ReservationAction::BookingRejected(error)),
            }
        }]
    }
}

impl Reducer for ReservationReducer {
    type State = ReservationState;
    type Action = ReservationAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ReservationAction::Submit(request) => match state.status {
                ReservationStatus::Idle
                | ReservationStatus::Failed { .. }
                | ReservationStatus::Unauthenticated { .. } => {
                    let session = env.session.current();
                    Self::validate_and_submit(state, request, &session, env)
                },
                ReservationStatus::Validating
                | ReservationStatus::Submitting
                | ReservationStatus::Succeeded { .. } => {
                    tracing::debug!(status = ?state.status, "Submit ignored");
                    SmallVec::new()
                },
            },

            ReservationAction::SessionChanged(session) => {
                if !session.is_authenticated() {
                    return SmallVec::new();
                }
                let ReservationStatus::Unauthenticated { pending } = &state.status else {
                    return SmallVec::new();
                };
                let pending = pending.clone();
                tracing::debug!(venue_id = %state.venue.id, "Logged in, resuming reservation");
                Self::validate_and_submit(state, pending, &session, env)
            },

            ReservationAction::BookingCreated(booking) => {
                if !state.is_submitting() {
                    return SmallVec::new();
                }
                tracing::debug!(booking_id = %booking.id, "Booking created");
                state.status = ReservationStatus::Succeeded {
                    booking_id: booking.id,
                };
                state.venue.bookings.push(booking);
                smallvec![presenter::navigate(&env.presenter, Route::Bookings)]
            },

            ReservationAction::BookingRejected(error) => {
                if !state.is_submitting() {
                    return SmallVec::new();
                }
                tracing::warn!(venue_id = %state.venue.id, %error, "Booking rejected by service");
                state.status = ReservationStatus::Failed {
                    reason: error.user_message(CREATE_BOOKING_FALLBACK),
                };
                SmallVec::new()
            },

            ReservationAction::Edited => {
                if matches!(
                    state.status,
                    ReservationStatus::Failed { .. } | ReservationStatus::Succeeded { .. }
                ) {
                    state.status = ReservationStatus::Idle;
                }
                SmallVec::new()
            },
        }
    }
}
