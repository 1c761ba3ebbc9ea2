//! Haven booking client demo.
//!
//! Runs the search and reservation features against the in-memory data
//! service and logs what a UI would render.
//!
//! # Usage
//!
//! ```bash
//! HAVEN_LOG_LEVEL=debug cargo run --bin haven-demo
//! ```

use chrono::{Duration as Days, Utc};
use haven_booking::memory::{InMemoryDataService, InMemorySessionProvider, RecordingPresenter};
use haven_booking::search::{SearchAction, SearchReducer, SearchState};
use haven_booking::session::forward_session_changes;
use haven_booking::types::{Location, Media};
use haven_booking::validator::ReservationRequest;
use haven_booking::workflow::{ReservationAction, ReservationReducer, ReservationState, ReservationStatus};
use haven_booking::{AuthToken, BookingEnvironment, Config, Session, SessionProvider, Venue};
use haven_core::environment::{Clock, SystemClock};
use haven_runtime::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn seed_venues(data: &InMemoryDataService) -> Venue {
    let now = Utc::now();
    let cabin = Venue::new("Fjord Cabin", 4)
        .with_price(1200.0)
        .with_owner("ola")
        .created_at(now);
    let venues = [
        cabin.clone(),
        Venue::new("Cabin by the Lake", 6).with_price(950.0).created_at(now - Days::days(1)),
        Venue::new("City Loft", 2).with_price(1500.0).created_at(now - Days::days(2)),
        Venue::new("Mountain Cabin", 8).with_price(800.0).created_at(now - Days::days(3)),
    ];
    for mut venue in venues {
        venue.media = vec![Media::new("https://img.example/venue.jpg", venue.name.clone())];
        venue.location = Some(Location {
            city: Some("Bergen".into()),
            country: Some("Norway".into()),
        });
        data.add_venue(venue);
    }
    cabin
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("haven_booking={0},haven_demo={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        debounce_ms = config.search_debounce_ms,
        page_size = config.page_size,
        "Starting Haven booking demo"
    );

    let data = Arc::new(InMemoryDataService::new().with_latency(Duration::from_millis(150)));
    let cabin = seed_venues(&data);
    let token = AuthToken::new("demo-token");
    data.register_user(&token, "kari");

    let sessions = Arc::new(InMemorySessionProvider::default());
    let presenter = Arc::new(RecordingPresenter::new());
    let clock = Arc::new(SystemClock);
    let today = clock.today();
    let env = BookingEnvironment::new(
        clock,
        Arc::clone(&data) as _,
        Arc::clone(&sessions) as _,
        Arc::clone(&presenter) as _,
        config.clone(),
    );

    // Search: two keystrokes inside the debounce window, one fetch
    let search = Store::new(SearchState::default(), SearchReducer::new(), env.clone());
    search.send(SearchAction::QueryChanged("cab".into())).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    search.send(SearchAction::QueryChanged("cabin".into())).await?;
    tokio::time::sleep(config.search_debounce() + Duration::from_millis(400)).await;

    let (query, names) = search
        .state(|s| (s.debounced_query.clone(), s.items.iter().map(|v| v.name.clone()).collect::<Vec<_>>()))
        .await;
    info!(%query, results = ?names, fetches = data.venue_queries().len(), "Search settled");

    // Reservation: logged out, so the workflow asks for a login first
    let reservation = Store::new(ReservationState::new(cabin.clone()), ReservationReducer::new(), env);
    let forwarder = forward_session_changes(
        reservation.clone(),
        sessions.subscribe(),
        ReservationAction::SessionChanged,
    );

    let check_in = today + Days::days(14);
    let request = ReservationRequest::new(cabin.id, check_in, check_in + Days::days(3), 2);
    reservation.send(ReservationAction::Submit(request)).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    info!(route = ?presenter.last_route(), "Reservation waiting for login");

    sessions.set(Session::customer("kari", token));
    tokio::time::sleep(Duration::from_millis(400)).await;

    match reservation.state(|s| s.status.clone()).await {
        ReservationStatus::Succeeded { booking_id } => {
            info!(%booking_id, route = ?presenter.last_route(), "Reservation confirmed");
        },
        other => info!(status = ?other, "Reservation did not complete"),
    }

    forwarder.abort();
    search.shutdown(Duration::from_secs(1)).await?;
    reservation.shutdown(Duration::from_secs(1)).await?;
    info!(bookings = data.bookings().len(), "Demo finished");
    Ok(())
}
