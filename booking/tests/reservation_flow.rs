//! Integration tests for the reservation workflow and the customer's bookings

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{Duration as Days, NaiveDate};
use haven_booking::memory::{InMemoryDataService, InMemorySessionProvider, RecordingPresenter};
use haven_booking::my_bookings::{MyBookingsAction, MyBookingsReducer, MyBookingsState};
use haven_booking::presenter::Route;
use haven_booking::session::forward_session_changes;
use haven_booking::validator::ReservationRequest;
use haven_booking::venue_detail::{VenueDetailAction, VenueDetailReducer, VenueDetailState, FETCH_VENUE};
use haven_booking::workflow::{ReservationAction, ReservationReducer, ReservationState, ReservationStatus};
use haven_booking::{AuthToken, BookingEnvironment, Config, Session, SessionProvider, Venue};
use haven_core::environment::Clock;
use haven_runtime::Store;
use haven_testing::test_clock;
use std::sync::Arc;
use std::time::Duration;

struct World {
    data: Arc<InMemoryDataService>,
    sessions: Arc<InMemorySessionProvider>,
    presenter: Arc<RecordingPresenter>,
    env: BookingEnvironment,
    venue: Venue,
    token: AuthToken,
}

fn world(session: Session, latency: Duration) -> World {
    let venue = Venue::new("Fjord Cabin", 4).with_price(1000.0);
    let data = Arc::new(
        InMemoryDataService::new()
            .with_latency(latency)
            .with_venue(venue.clone()),
    );
    let token = AuthToken::new("c-1");
    data.register_user(&token, "kari");

    let sessions = Arc::new(InMemorySessionProvider::new(session));
    let presenter = Arc::new(RecordingPresenter::new());
    let env = BookingEnvironment::new(
        Arc::new(test_clock()),
        Arc::clone(&data) as _,
        Arc::clone(&sessions) as _,
        Arc::clone(&presenter) as _,
        Config::default(),
    );
    World {
        data,
        sessions,
        presenter,
        env,
        venue,
        token,
    }
}

fn stay(venue: &Venue, from_day: u32, nights: i64) -> ReservationRequest {
    let from = NaiveDate::from_ymd_opt(2025, 7, from_day).unwrap();
    ReservationRequest::new(venue.id, from, from + Days::days(nights), 2)
}

#[tokio::test(start_paused = true)]
async fn double_submit_creates_one_booking() {
    let w = world(Session::customer("kari", AuthToken::new("c-1")), Duration::from_millis(200));
    let store = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());

    store.send(ReservationAction::Submit(stay(&w.venue, 10, 2))).await.unwrap();
    store.send(ReservationAction::Submit(stay(&w.venue, 10, 2))).await.unwrap();
    assert!(store.state(ReservationState::is_submitting).await);

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(w.data.create_booking_calls(), 1);
    assert_eq!(w.data.bookings().len(), 1);
    let status = store.state(|s| s.status.clone()).await;
    assert!(matches!(status, ReservationStatus::Succeeded { .. }), "got {status:?}");
    assert_eq!(w.presenter.last_route(), Some(Route::Bookings));
}

#[tokio::test(start_paused = true)]
async fn login_resumes_the_pending_reservation() {
    let w = world(Session::anonymous(), Duration::from_millis(50));
    let store = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());
    let forwarder = forward_session_changes(store.clone(), w.sessions.subscribe(), ReservationAction::SessionChanged);

    store.send(ReservationAction::Submit(stay(&w.venue, 10, 3))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let status = store.state(|s| s.status.clone()).await;
    assert!(matches!(status, ReservationStatus::Unauthenticated { .. }), "got {status:?}");
    assert_eq!(w.presenter.last_route(), Some(Route::Login));
    assert_eq!(w.data.create_booking_calls(), 0);

    w.sessions.set(Session::customer("kari", w.token.clone()));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let status = store.state(|s| s.status.clone()).await;
    assert!(matches!(status, ReservationStatus::Succeeded { .. }), "got {status:?}");
    assert_eq!(w.presenter.navigations(), vec![Route::Login, Route::Bookings]);
    assert_eq!(store.state(|s| s.submitted.as_ref().map(|r| r.nights)).await, Some(3));

    forwarder.abort();
}

#[tokio::test(start_paused = true)]
async fn session_without_profile_name_can_book() {
    let mut nameless = Session::customer("kari", AuthToken::new("c-1"));
    nameless.name = None;
    let w = world(nameless.clone(), Duration::ZERO);
    let store = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());

    store.send(ReservationAction::Submit(stay(&w.venue, 10, 2))).await.unwrap();
    store.send(ReservationAction::SessionChanged(nameless)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let status = store.state(|s| s.status.clone()).await;
    assert!(matches!(status, ReservationStatus::Succeeded { .. }), "got {status:?}");
    assert_eq!(w.data.create_booking_calls(), 1);
    assert_eq!(w.presenter.navigations(), vec![Route::Bookings]);
}

#[tokio::test(start_paused = true)]
async fn service_conflict_surfaces_its_message() {
    let w = world(Session::customer("kari", AuthToken::new("c-1")), Duration::ZERO);

    // Another guest books the same nights after our venue page was loaded
    let other = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());
    other.send(ReservationAction::Submit(stay(&w.venue, 10, 2))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let store = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());
    store.send(ReservationAction::Submit(stay(&w.venue, 11, 2))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        store.state(|s| s.status.clone()).await,
        ReservationStatus::Failed {
            reason: "The venue is already booked for the selected dates".into(),
        }
    );

    // Editing the form allows another attempt
    store.send(ReservationAction::Edited).await.unwrap();
    store.send(ReservationAction::Submit(stay(&w.venue, 12, 2))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(matches!(
        store.state(|s| s.status.clone()).await,
        ReservationStatus::Succeeded { .. }
    ));
    assert_eq!(w.data.create_booking_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn my_bookings_lists_new_bookings_in_date_order() {
    let w = world(Session::customer("kari", AuthToken::new("c-1")), Duration::ZERO);
    let reservation = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());
    for from_day in [20, 5] {
        reservation.send(ReservationAction::Edited).await.unwrap();
        reservation
            .send(ReservationAction::Submit(stay(&w.venue, from_day, 2)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(w.data.bookings().len(), 2);

    let mine = Store::new(MyBookingsState::default(), MyBookingsReducer::new(), w.env.clone());
    mine.send(MyBookingsAction::Load).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let bookings = mine.state(|s| s.bookings.clone()).await;
    assert_eq!(bookings.len(), 2);
    assert!(bookings[0].date_from < bookings[1].date_from);
    assert!(bookings.iter().all(|b| b.venue.is_some()));
}

#[tokio::test(start_paused = true)]
async fn dismissed_venue_page_never_applies_its_fetch() {
    let w = world(Session::anonymous(), Duration::from_secs(1));
    let store = Store::new(
        VenueDetailState::new(test_clock().today()),
        VenueDetailReducer::new(),
        w.env.clone(),
    );

    store.send(VenueDetailAction::Load(w.venue.id)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.in_flight(FETCH_VENUE), 1);

    store.send(VenueDetailAction::Dismissed).await.unwrap();
    assert_eq!(store.in_flight(FETCH_VENUE), 0);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let (venue, loading, error) = store.state(|s| (s.venue.clone(), s.loading, s.error.clone())).await;
    assert!(venue.is_none());
    assert!(!loading);
    assert!(error.is_none());
}

#[tokio::test(start_paused = true)]
async fn venue_page_shows_loaded_bookings() {
    let w = world(Session::customer("kari", AuthToken::new("c-1")), Duration::ZERO);
    let today = test_clock().today();
    let reservation = Store::new(ReservationState::new(w.venue.clone()), ReservationReducer::new(), w.env.clone());
    let request = ReservationRequest::new(w.venue.id, today, today + Days::days(2), 1);
    reservation.send(ReservationAction::Submit(request)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let page = Store::new(VenueDetailState::new(today), VenueDetailReducer::new(), w.env.clone());
    page.send(VenueDetailAction::Load(w.venue.id)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let booked = page
        .state(|s| {
            s.availability()
                .into_iter()
                .filter(|cell| matches!(cell, haven_booking::availability::DayCell::Day { booked: true, .. }))
                .count()
        })
        .await;
    assert_eq!(booked, 2);
}
