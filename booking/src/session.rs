//! Session provider boundary.
//!
//! The session (capability flags plus auth token) is owned outside the core.
//! Features read it through [`SessionProvider::current`] and learn about
//! changes through a `watch` channel forwarded into their store.

use haven_core::reducer::Reducer;
use haven_runtime::Store;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Bearer token for authenticated service calls
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Permission flags of a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Logged in
    pub is_authenticated: bool,
    /// May create and manage venues
    pub is_venue_manager: bool,
}

/// Current user session; read-only to the core
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Capability flags
    pub capabilities: Capabilities,
    /// Auth token, present when logged in
    #[serde(default)]
    pub token: Option<AuthToken>,
    /// Profile name
    #[serde(default)]
    pub name: Option<String>,
}

impl Session {
    /// Logged-out session
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Logged-in customer
    #[must_use]
    pub fn customer(name: impl Into<String>, token: AuthToken) -> Self {
        Self {
            capabilities: Capabilities {
                is_authenticated: true,
                is_venue_manager: false,
            },
            token: Some(token),
            name: Some(name.into()),
        }
    }

    /// Logged-in venue manager
    #[must_use]
    pub fn venue_manager(name: impl Into<String>, token: AuthToken) -> Self {
        let mut session = Self::customer(name, token);
        session.capabilities.is_venue_manager = true;
        session
    }

    /// Logged in with a usable token
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.capabilities.is_authenticated && self.token.is_some()
    }

    /// Logged in as a venue manager
    #[must_use]
    pub const fn is_venue_manager(&self) -> bool {
        self.is_authenticated() && self.capabilities.is_venue_manager
    }

    /// Token to authorise calls with, when logged in
    #[must_use]
    pub fn auth_token(&self) -> Option<&AuthToken> {
        if self.capabilities.is_authenticated {
            self.token.as_ref()
        } else {
            None
        }
    }

    /// Token and profile name, when logged in
    ///
    /// Needed by calls scoped to the user's own profile.
    #[must_use]
    pub fn credentials(&self) -> Option<(&AuthToken, &str)> {
        if !self.capabilities.is_authenticated {
            return None;
        }
        Some((self.token.as_ref()?, self.name.as_deref()?))
    }
}

/// Source of the current session
pub trait SessionProvider: Send + Sync {
    /// Snapshot of the session
    fn current(&self) -> Session;

    /// Receiver notified on every session change
    fn subscribe(&self) -> watch::Receiver<Session>;
}

/// Forward session changes into a store as actions
///
/// Runs until the session sender is dropped or the store shuts down.
pub fn forward_session_changes<S, A, E, R, F>(
    store: Store<S, A, E, R>,
    mut changes: watch::Receiver<Session>,
    to_action: F,
) -> JoinHandle<()>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(Session) -> A + Send + 'static,
{
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let session = changes.borrow_and_update().clone();
            tracing::debug!(
                authenticated = session.is_authenticated(),
                "Session changed, forwarding to store"
            );
            if store.send(to_action(session)).await.is_err() {
                tracing::debug!("Store rejected session change, stopping forwarder");
                break;
            }
        }
    })
}
