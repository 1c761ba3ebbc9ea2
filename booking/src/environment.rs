//! Injected collaborators shared by every booking feature.

use crate::config::Config;
use crate::presenter::Presenter;
use crate::service::DataService;
use crate::session::SessionProvider;
use haven_core::environment::Clock;
use std::sync::Arc;

/// Environment dependencies for the booking features
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for "today"
    pub clock: Arc<dyn Clock>,
    /// Venue/booking data service
    pub data: Arc<dyn DataService>,
    /// Session source
    pub session: Arc<dyn SessionProvider>,
    /// Navigation and focus sink
    pub presenter: Arc<dyn Presenter>,
    /// Tunables
    pub config: Config,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        data: Arc<dyn DataService>,
        session: Arc<dyn SessionProvider>,
        presenter: Arc<dyn Presenter>,
        config: Config,
    ) -> Self {
        Self {
            clock,
            data,
            session,
            presenter,
            config,
        }
    }
}
