//! Venue/booking data service boundary.
//!
//! The service owns transport and persistence. Features only see this trait and
//! run its calls inside effects, so dropping an effect's future cancels the call.
//!
//! Note: methods return `Pin<Box<dyn Future>>` instead of `async fn` so the
//! trait stays dyn-compatible (`Arc<dyn DataService>`).

use crate::listings::VenueDraft;
use crate::session::AuthToken;
use crate::types::{Booking, Venue, VenueId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from the data service
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DataServiceError {
    /// The service refused the request; carries its message
    #[error("{0}")]
    Rejected(String),

    /// The request was cancelled before it completed
    #[error("request cancelled")]
    Cancelled,

    /// The request needs a logged-in session
    #[error("You must be logged in to do this action.")]
    NotAuthenticated,

    /// The service could not be reached
    #[error("service unavailable")]
    Unavailable,
}

impl DataServiceError {
    /// Message to show the user
    ///
    /// The service's own message wins; otherwise `fallback` is used.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(message) if !message.trim().is_empty() => message.clone(),
            Self::NotAuthenticated => self.to_string(),
            _ => fallback.to_owned(),
        }
    }

    /// Whether this is a cancellation, which is never surfaced
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// One page request of the venue listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueQuery {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Search text; empty lists every venue
    #[serde(default)]
    pub query: String,
}

impl VenueQuery {
    /// Whether this goes to the search endpoint
    ///
    /// Blank queries list all venues newest first instead.
    #[must_use]
    pub fn is_search(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// One page of venues
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenuePage {
    /// Venues on this page
    pub items: Vec<Venue>,
    /// Explicit end-of-data flag, when the service reports one
    #[serde(default)]
    pub is_last_page: Option<bool>,
}

/// A booking to create
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// Venue to book
    pub venue_id: VenueId,
    /// Check-in
    pub date_from: NaiveDate,
    /// Check-out, exclusive
    pub date_to: NaiveDate,
    /// Number of guests
    pub guests: u32,
}

/// Boxed future returned by [`DataService`] methods
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DataServiceError>> + Send + 'a>>;

/// Venue and booking data service
pub trait DataService: Send + Sync {
    /// List or search venues, one page at a time
    ///
    /// A blank `query` lists venues sorted by creation date, newest first;
    /// otherwise the service's search endpoint is used with `q = query`.
    fn list_venues(&self, query: VenueQuery) -> ServiceFuture<'_, VenuePage>;

    /// Fetch one venue with its bookings
    fn get_venue(&self, id: VenueId) -> ServiceFuture<'_, Venue>;

    /// Create a booking for the session's user
    fn create_booking<'a>(
        &'a self,
        token: &'a AuthToken,
        booking: NewBooking,
    ) -> ServiceFuture<'a, Booking>;

    /// Bookings made by `owner`, each with its venue embedded
    fn list_my_bookings<'a>(
        &'a self,
        token: &'a AuthToken,
        owner: &'a str,
    ) -> ServiceFuture<'a, Vec<Booking>>;

    /// Venues managed by `owner`
    fn list_my_venues<'a>(
        &'a self,
        token: &'a AuthToken,
        owner: &'a str,
    ) -> ServiceFuture<'a, Vec<Venue>>;

    /// Create a venue owned by the session's user
    fn create_venue<'a>(&'a self, token: &'a AuthToken, draft: VenueDraft) -> ServiceFuture<'a, Venue>;

    /// Replace a venue's editable fields
    fn update_venue<'a>(
        &'a self,
        token: &'a AuthToken,
        id: VenueId,
        draft: VenueDraft,
    ) -> ServiceFuture<'a, Venue>;

    /// Delete a venue
    fn delete_venue<'a>(&'a self, token: &'a AuthToken, id: VenueId) -> ServiceFuture<'a, ()>;
}
