//! Presentation layer boundary: navigation and focus signals.

use crate::types::VenueId;
use haven_core::effect::Effect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Navigation target
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Venue listing
    Home,
    /// Login screen
    Login,
    /// The user's bookings
    Bookings,
    /// One venue's page
    Venue(VenueId),
}

impl Route {
    /// Path of the route in the client
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Bookings => "/bookings".to_owned(),
            Self::Venue(id) => format!("/venues/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receives signals from the core features
pub trait Presenter: Send + Sync {
    /// Move to another screen
    fn navigate(&self, route: Route);

    /// Return keyboard focus to the search input
    fn restore_focus(&self);
}

/// Effect that navigates to `route`
pub fn navigate<A: Send + 'static>(presenter: &Arc<dyn Presenter>, route: Route) -> Effect<A> {
    let presenter = Arc::clone(presenter);
    Effect::Future(Box::pin(async move {
        tracing::debug!(%route, "Navigating");
        presenter.navigate(route);
        None
    }))
}

/// Effect that restores focus to the search input
pub fn restore_focus<A: Send + 'static>(presenter: &Arc<dyn Presenter>) -> Effect<A> {
    let presenter = Arc::clone(presenter);
    Effect::Future(Box::pin(async move {
        presenter.restore_focus();
        None
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        let id = VenueId::new();
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Login.to_string(), "/login");
        assert_eq!(Route::Bookings.path(), "/bookings");
        assert_eq!(Route::Venue(id).path(), format!("/venues/{id}"));
    }
}
