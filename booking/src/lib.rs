//! # Haven Booking
//!
//! Client-side core of a venue booking application, written as reducers that
//! run inside a [`haven_runtime::Store`].
//!
//! ## Features
//!
//! - [`availability`]: which days of a month are booked, and the month shown
//! - [`venue_detail`]: load one venue and browse its availability
//! - [`validator`] and [`workflow`]: validate, authenticate and submit a
//!   reservation exactly once
//! - [`search`]: debounced, paginated venue search with stale-result defence
//! - [`listings`]: venue managers create, edit and delete their venues
//! - [`my_bookings`]: the customer's own bookings
//!
//! ## Collaborators
//!
//! Features never talk to the network, the session or the UI directly. They
//! receive a [`BookingEnvironment`] holding a [`service::DataService`], a
//! [`session::SessionProvider`], a [`presenter::Presenter`] and a clock. The
//! [`memory`] module has in-memory versions of each for tests and the demo.
//!
//! ## Example
//!
//! ```ignore
//! use haven_booking::{search::{SearchAction, SearchReducer, SearchState}, BookingEnvironment};
//! use haven_runtime::Store;
//!
//! let store = Store::new(SearchState::default(), SearchReducer::new(), env);
//! store.send(SearchAction::QueryChanged("cabin".into())).await?;
//! ```

pub mod availability;
pub mod calendar;
pub mod config;
pub mod environment;
pub mod listings;
pub mod memory;
pub mod my_bookings;
pub mod presenter;
pub mod search;
pub mod service;
pub mod session;
pub mod types;
pub mod validator;
pub mod venue_detail;
pub mod workflow;

pub use config::Config;
pub use environment::BookingEnvironment;
pub use service::{DataService, DataServiceError};
pub use session::{AuthToken, Session, SessionProvider};
pub use types::{Booking, BookingId, DateRange, Venue, VenueId};
