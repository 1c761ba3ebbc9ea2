//! In-memory collaborators for tests and the demo binary.
//!
//! `InMemoryDataService` is deterministic: results depend only on the seeded
//! data and the calls made. Every call is recorded so tests can count them.
//! With a latency configured, responses are produced after a `tokio` sleep,
//! which paused-time tests can advance precisely.

use crate::listings::VenueDraft;
use crate::presenter::{Presenter, Route};
use crate::service::{DataService, DataServiceError, NewBooking, ServiceFuture, VenuePage, VenueQuery};
use crate::session::{AuthToken, Session, SessionProvider};
use crate::types::{Booking, DateRange, Venue, VenueId};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Data service
// ============================================================================

/// A call received by [`InMemoryDataService`]
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceCall {
    /// `list_venues`
    ListVenues(VenueQuery),
    /// `get_venue`
    GetVenue(VenueId),
    /// `create_booking`
    CreateBooking(NewBooking),
    /// `list_my_bookings` for an owner
    ListMyBookings(String),
    /// `list_my_venues` for an owner
    ListMyVenues(String),
    /// `create_venue` with the draft's name
    CreateVenue(String),
    /// `update_venue`
    UpdateVenue(VenueId),
    /// `delete_venue`
    DeleteVenue(VenueId),
}

#[derive(Default)]
struct Tables {
    venues: Vec<Venue>,
    bookings: Vec<Booking>,
    users: HashMap<String, String>,
    failures: VecDeque<DataServiceError>,
    calls: Vec<ServiceCall>,
}

impl Tables {
    fn user(&self, token: &AuthToken) -> Result<String, DataServiceError> {
        self.users
            .get(token.as_str())
            .cloned()
            .ok_or(DataServiceError::NotAuthenticated)
    }

    fn with_bookings(&self, venue: &Venue) -> Venue {
        let bookings = self
            .bookings
            .iter()
            .filter(|b| b.venue_id == venue.id)
            .cloned()
            .collect();
        venue.clone().with_bookings(bookings)
    }

    fn owned_venue(&mut self, user: &str, id: VenueId) -> Result<&mut Venue, DataServiceError> {
        let venue = self
            .venues
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| DataServiceError::Rejected("No venue with such ID".into()))?;
        if venue.owner.as_deref() == Some(user) {
            Ok(venue)
        } else {
            Err(DataServiceError::Rejected("You can only manage your own venues".into()))
        }
    }
}

/// Deterministic in-memory [`DataService`]
pub struct InMemoryDataService {
    store: Mutex<Tables>,
    latency: Duration,
    reports_last_page: bool,
}

impl Default for InMemoryDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDataService {
    /// Empty service that answers immediately and reports `is_last_page`
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Tables::default()),
            latency: Duration::ZERO,
            reports_last_page: true,
        }
    }

    /// Delay every response by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Leave `is_last_page` unset so clients infer end of data
    #[must_use]
    pub fn without_last_page_flag(mut self) -> Self {
        self.reports_last_page = false;
        self
    }

    /// Seed a venue; its embedded bookings are stored separately
    #[must_use]
    pub fn with_venue(self, venue: Venue) -> Self {
        self.add_venue(venue);
        self
    }

    /// Seed a venue at runtime
    pub fn add_venue(&self, mut venue: Venue) {
        let mut store = lock(&self.store);
        store.bookings.append(&mut venue.bookings);
        store.venues.push(venue);
    }

    /// Accept `token` as belonging to the profile `name`
    pub fn register_user(&self, token: &AuthToken, name: &str) {
        lock(&self.store)
            .users
            .insert(token.as_str().to_owned(), name.to_owned());
    }

    /// Fail the next call with `error`
    pub fn fail_next(&self, error: DataServiceError) {
        lock(&self.store).failures.push_back(error);
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.store).calls.clone()
    }

    /// The `list_venues` queries received so far
    #[must_use]
    pub fn venue_queries(&self) -> Vec<VenueQuery> {
        lock(&self.store)
            .calls
            .iter()
            .filter_map(|call| match call {
                ServiceCall::ListVenues(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `create_booking` calls received
    #[must_use]
    pub fn create_booking_calls(&self) -> usize {
        lock(&self.store)
            .calls
            .iter()
            .filter(|call| matches!(call, ServiceCall::CreateBooking(_)))
            .count()
    }

    /// All stored bookings
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        lock(&self.store).bookings.clone()
    }

    /// Record `call`, then answer with `op` after the configured latency
    ///
    /// `op` runs only once the latency has elapsed, so a cancelled call never
    /// mutates the store.
    fn respond<'a, T, F>(&'a self, call: ServiceCall, op: F) -> ServiceFuture<'a, T>
    where
        T: Send + 'a,
        F: FnOnce(&mut Tables) -> Result<T, DataServiceError> + Send + 'a,
    {
        let injected = {
            let mut store = lock(&self.store);
            store.calls.push(call);
            store.failures.pop_front()
        };
        let latency = self.latency;

        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            if let Some(error) = injected {
                return Err(error);
            }
            let mut store = lock(&self.store);
            op(&mut store)
        })
    }
}

impl DataService for InMemoryDataService {
    fn list_venues(&self, query: VenueQuery) -> ServiceFuture<'_, VenuePage> {
        let reports_last_page = self.reports_last_page;
        self.respond(ServiceCall::ListVenues(query.clone()), move |store| {
            let matches: Vec<&Venue> = if query.is_search() {
                let needle = query.query.trim().to_lowercase();
                store
                    .venues
                    .iter()
                    .filter(|v| {
                        v.name.to_lowercase().contains(&needle)
                            || v.description.to_lowercase().contains(&needle)
                    })
                    .collect()
            } else {
                let mut all: Vec<&Venue> = store.venues.iter().collect();
                all.sort_by(|a, b| b.created.cmp(&a.created));
                all
            };

            let limit = query.limit.max(1) as usize;
            let start = query.page.saturating_sub(1) as usize * limit;
            let total = matches.len();
            let items = matches
                .into_iter()
                .skip(start)
                .take(limit)
                .map(|v| store.with_bookings(v))
                .collect();

            Ok(VenuePage {
                items,
                is_last_page: reports_last_page.then_some(start + limit >= total),
            })
        })
    }

    fn get_venue(&self, id: VenueId) -> ServiceFuture<'_, Venue> {
        self.respond(ServiceCall::GetVenue(id), move |store| {
            store
                .venues
                .iter()
                .find(|v| v.id == id)
                .map(|v| store.with_bookings(v))
                .ok_or_else(|| DataServiceError::Rejected("No venue with such ID".into()))
        })
    }

    fn create_booking<'a>(
        &'a self,
        token: &'a AuthToken,
        booking: NewBooking,
    ) -> ServiceFuture<'a, Booking> {
        self.respond(ServiceCall::CreateBooking(booking.clone()), move |store| {
            let customer = store.user(token)?;
            let venue = store
                .venues
                .iter()
                .find(|v| v.id == booking.venue_id)
                .ok_or_else(|| DataServiceError::Rejected("No venue with such ID".into()))?;
            if booking.guests == 0 || booking.guests > venue.max_guests {
                return Err(DataServiceError::Rejected(format!(
                    "This venue accepts between 1 and {} guests",
                    venue.max_guests
                )));
            }
            let stay = DateRange::new(booking.date_from, booking.date_to)
                .map_err(|e| DataServiceError::Rejected(e.to_string()))?;
            let taken = store
                .bookings
                .iter()
                .filter(|b| b.venue_id == booking.venue_id)
                .filter_map(Booking::stay)
                .any(|existing| existing.overlaps(&stay));
            if taken {
                return Err(DataServiceError::Rejected(
                    "The venue is already booked for the selected dates".into(),
                ));
            }

            let mut created =
                Booking::for_days(booking.venue_id, stay.from(), stay.to(), booking.guests);
            created.customer = Some(customer);
            created.venue = Some(venue.summary());
            store.bookings.push(created.clone());
            Ok(created)
        })
    }

    fn list_my_bookings<'a>(
        &'a self,
        token: &'a AuthToken,
        owner: &'a str,
    ) -> ServiceFuture<'a, Vec<Booking>> {
        self.respond(ServiceCall::ListMyBookings(owner.to_owned()), move |store| {
            store.user(token)?;
            Ok(store
                .bookings
                .iter()
                .filter(|b| b.customer.as_deref() == Some(owner))
                .map(|b| {
                    let mut booking = b.clone();
                    if booking.venue.is_none() {
                        booking.venue = store
                            .venues
                            .iter()
                            .find(|v| v.id == b.venue_id)
                            .map(Venue::summary);
                    }
                    booking
                })
                .collect())
        })
    }

    fn list_my_venues<'a>(
        &'a self,
        token: &'a AuthToken,
        owner: &'a str,
    ) -> ServiceFuture<'a, Vec<Venue>> {
        self.respond(ServiceCall::ListMyVenues(owner.to_owned()), move |store| {
            store.user(token)?;
            Ok(store
                .venues
                .iter()
                .filter(|v| v.owner.as_deref() == Some(owner))
                .map(|v| store.with_bookings(v))
                .collect())
        })
    }

    fn create_venue<'a>(&'a self, token: &'a AuthToken, draft: VenueDraft) -> ServiceFuture<'a, Venue> {
        self.respond(ServiceCall::CreateVenue(draft.name.clone()), move |store| {
            let owner = store.user(token)?;
            draft
                .validate()
                .map_err(|e| DataServiceError::Rejected(e.to_string()))?;
            let venue = draft.into_venue(owner).created_at(Utc::now());
            store.venues.push(venue.clone());
            Ok(venue)
        })
    }

    fn update_venue<'a>(
        &'a self,
        token: &'a AuthToken,
        id: VenueId,
        draft: VenueDraft,
    ) -> ServiceFuture<'a, Venue> {
        self.respond(ServiceCall::UpdateVenue(id), move |store| {
            let owner = store.user(token)?;
            draft
                .validate()
                .map_err(|e| DataServiceError::Rejected(e.to_string()))?;
            let venue = store.owned_venue(&owner, id)?;
            draft.apply_to(venue);
            Ok(venue.clone())
        })
    }

    fn delete_venue<'a>(&'a self, token: &'a AuthToken, id: VenueId) -> ServiceFuture<'a, ()> {
        self.respond(ServiceCall::DeleteVenue(id), move |store| {
            let owner = store.user(token)?;
            store.owned_venue(&owner, id)?;
            store.venues.retain(|v| v.id != id);
            store.bookings.retain(|b| b.venue_id != id);
            Ok(())
        })
    }
}

// ============================================================================
// Session provider
// ============================================================================

/// Session provider backed by a `watch` channel
pub struct InMemorySessionProvider {
    sender: watch::Sender<Session>,
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new(Session::anonymous())
    }
}

impl InMemorySessionProvider {
    /// Provider starting with `session`
    #[must_use]
    pub fn new(session: Session) -> Self {
        let (sender, _) = watch::channel(session);
        Self { sender }
    }

    /// Replace the session and notify subscribers
    pub fn set(&self, session: Session) {
        self.sender.send_replace(session);
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn current(&self) -> Session {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }
}

// ============================================================================
// Presenter
// ============================================================================

/// Presenter that records every signal
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    routes: Mutex<Vec<Route>>,
    focus_restores: AtomicUsize,
}

impl RecordingPresenter {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every navigation so far, in order
    #[must_use]
    pub fn navigations(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }

    /// The most recent navigation
    #[must_use]
    pub fn last_route(&self) -> Option<Route> {
        lock(&self.routes).last().cloned()
    }

    /// How many times focus was restored
    #[must_use]
    pub fn focus_restores(&self) -> usize {
        self.focus_restores.load(Ordering::SeqCst)
    }
}

impl Presenter for RecordingPresenter {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }

    fn restore_focus(&self) {
        self.focus_restores.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn venue(name: &str, created_day: u32) -> Venue {
        Venue::new(name, 4)
            .with_price(100.0)
            .created_at(Utc.with_ymd_and_hms(2025, 1, created_day, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_paged() {
        let service = InMemoryDataService::new()
            .with_venue(venue("Old barn", 1))
            .with_venue(venue("New loft", 3))
            .with_venue(venue("Mid cabin", 2));

        let first = service
            .list_venues(VenueQuery { page: 1, limit: 2, query: String::new() })
            .await
            .unwrap();
        let names: Vec<_> = first.items.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["New loft", "Mid cabin"]);
        assert_eq!(first.is_last_page, Some(false));

        let second = service
            .list_venues(VenueQuery { page: 2, limit: 2, query: String::new() })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.is_last_page, Some(true));
        assert_eq!(service.venue_queries().len(), 2);
    }

    #[tokio::test]
    async fn test_search_matches_name_or_description() {
        let mut described = venue("Seaside", 1);
        described.description = "A small cabin by the sea".into();
        let service = InMemoryDataService::new()
            .without_last_page_flag()
            .with_venue(described)
            .with_venue(venue("Mountain Cabin", 2))
            .with_venue(venue("City flat", 3));

        let page = service
            .list_venues(VenueQuery { page: 1, limit: 24, query: " CABIN ".into() })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.is_last_page, None);
    }

    #[tokio::test]
    async fn test_create_booking_checks_token_and_overlap() {
        let cabin = venue("Cabin", 1);
        let id = cabin.id;
        let service = InMemoryDataService::new().with_venue(cabin);
        let token = AuthToken::new("t-1");
        let request = NewBooking { venue_id: id, date_from: day(6, 10), date_to: day(6, 12), guests: 2 };

        let err = service.create_booking(&token, request.clone()).await.unwrap_err();
        assert_eq!(err, DataServiceError::NotAuthenticated);

        service.register_user(&token, "kari");
        let booking = service.create_booking(&token, request.clone()).await.unwrap();
        assert_eq!(booking.customer.as_deref(), Some("kari"));

        let clash = service.create_booking(&token, request).await.unwrap_err();
        assert!(matches!(clash, DataServiceError::Rejected(_)));

        let back_to_back = NewBooking { venue_id: id, date_from: day(6, 12), date_to: day(6, 13), guests: 1 };
        assert!(service.create_booking(&token, back_to_back).await.is_ok());
        assert_eq!(service.create_booking_calls(), 4);

        let venue = service.get_venue(id).await.unwrap();
        assert_eq!(venue.bookings.len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_is_returned_once() {
        let service = InMemoryDataService::new();
        service.fail_next(DataServiceError::Unavailable);
        let query = VenueQuery { page: 1, limit: 24, query: String::new() };

        assert_eq!(service.list_venues(query.clone()).await, Err(DataServiceError::Unavailable));
        assert!(service.list_venues(query).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_call_never_mutates() {
        let cabin = venue("Cabin", 1);
        let id = cabin.id;
        let service = InMemoryDataService::new()
            .with_latency(Duration::from_millis(300))
            .with_venue(cabin);
        let token = AuthToken::new("t-1");
        service.register_user(&token, "kari");

        let pending = service.create_booking(
            &token,
            NewBooking { venue_id: id, date_from: day(6, 10), date_to: day(6, 12), guests: 2 },
        );
        drop(pending);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(service.create_booking_calls(), 1);
        assert!(service.bookings().is_empty());
    }

    #[test]
    fn test_session_provider_notifies_subscribers() {
        let provider = InMemorySessionProvider::default();
        let mut changes = provider.subscribe();
        assert!(!provider.current().is_authenticated());

        provider.set(Session::customer("kari", AuthToken::new("t")));
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_authenticated());
        assert!(provider.current().is_authenticated());
    }

    #[test]
    fn test_recording_presenter() {
        let presenter = RecordingPresenter::new();
        presenter.navigate(Route::Login);
        presenter.navigate(Route::Bookings);
        presenter.restore_focus();

        assert_eq!(presenter.navigations(), vec![Route::Login, Route::Bookings]);
        assert_eq!(presenter.last_route(), Some(Route::Bookings));
        assert_eq!(presenter.focus_restores(), 1);
    }
}
