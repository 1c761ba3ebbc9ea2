//! Reservation validation, run before any network effect.
//!
//! Checks are ordered and short-circuit on the first failure:
//!
//! 1. both dates present
//! 2. check-out strictly after check-in
//! 3. at least one guest
//! 4. no more guests than the venue allows
//! 5. no overlap with the venue's known bookings, when supplied
//!
//! The data service stays the final authority on availability; the overlap
//! check only catches conflicts the client already knows about.

use crate::availability::overlaps_any;
use crate::service::NewBooking;
use crate::types::{Booking, DateRange, Venue, VenueId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a guest asked for, as entered
///
/// Guests is signed so that zero and negative input can be rejected rather
/// than being unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Venue to book
    pub venue_id: VenueId,
    /// Check-in
    pub date_from: Option<NaiveDate>,
    /// Check-out, exclusive
    pub date_to: Option<NaiveDate>,
    /// Number of guests
    pub guests: i64,
}

impl ReservationRequest {
    /// Request with both dates filled in
    #[must_use]
    pub const fn new(venue_id: VenueId, date_from: NaiveDate, date_to: NaiveDate, guests: i64) -> Self {
        Self {
            venue_id,
            date_from: Some(date_from),
            date_to: Some(date_to),
            guests,
        }
    }
}

/// Why a reservation request was rejected locally
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Check-in or check-out missing
    #[error("Missing dates.")]
    MissingDates,

    /// Check-out on or before check-in
    #[error("Check-out must be after check-in.")]
    InvalidRange,

    /// Fewer than one guest
    #[error("Please choose at least one guest.")]
    InvalidGuestCount,

    /// More guests than the venue allows
    #[error("This venue allows at most {max} guests.")]
    GuestLimitExceeded {
        /// The venue's limit
        max: u32,
    },

    /// Overlaps a known booking
    #[error("The venue is already booked for some of the selected dates.")]
    DatesUnavailable,
}

/// A request that passed validation
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedReservation {
    /// Venue to book
    pub venue_id: VenueId,
    /// Check-in
    pub date_from: NaiveDate,
    /// Check-out, exclusive
    pub date_to: NaiveDate,
    /// Number of guests, in `1..=max_guests`
    pub guests: u32,
    /// Nights stayed, at least one
    pub nights: u32,
    /// `price * nights`, when the venue has a price
    pub total: Option<f64>,
}

impl ValidatedReservation {
    /// The booking to send to the data service
    #[must_use]
    pub const fn to_new_booking(&self) -> NewBooking {
        NewBooking {
            venue_id: self.venue_id,
            date_from: self.date_from,
            date_to: self.date_to,
            guests: self.guests,
        }
    }
}

/// Validate `request` against `venue` and, optionally, its known bookings
///
/// # Errors
///
/// Returns the first failed check as a [`ValidationError`].
pub fn validate_reservation(
    request: &ReservationRequest,
    venue: &Venue,
    existing: Option<&[Booking]>,
) -> Result<ValidatedReservation, ValidationError> {
    let (Some(date_from), Some(date_to)) = (request.date_from, request.date_to) else {
        return Err(ValidationError::MissingDates);
    };

    let stay = DateRange::new(date_from, date_to).map_err(|_| ValidationError::InvalidRange)?;

    if request.guests < 1 {
        return Err(ValidationError::InvalidGuestCount);
    }
    let max = venue.max_guests;
    let guests = u32::try_from(request.guests)
        .ok()
        .filter(|guests| *guests <= max)
        .ok_or(ValidationError::GuestLimitExceeded { max })?;

    if existing.is_some_and(|bookings| overlaps_any(&stay, bookings)) {
        return Err(ValidationError::DatesUnavailable);
    }

    let nights = stay.nights();
    Ok(ValidatedReservation {
        venue_id: request.venue_id,
        date_from,
        date_to,
        guests,
        nights,
        total: venue.price.map(|price| price * f64::from(nights)),
    })
}
