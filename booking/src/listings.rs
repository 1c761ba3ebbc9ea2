//! Venue managers' own listings: load, create, update, delete.
//!
//! Only authenticated venue managers get in. Everyone else is redirected:
//! logged-out users to the login screen, customers to the home page.

use crate::environment::BookingEnvironment;
use crate::presenter::{self, Route};
use crate::service::DataServiceError;
use crate::session::{AuthToken, Session};
use crate::types::{Location, Media, Venue, VenueId};
use haven_core::{async_effect, effect::Effect, effect::EffectId, reducer::Reducer, smallvec, SmallVec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Fetch of the manager's venues
pub const LOAD_VENUES: EffectId = EffectId::new("listings.load");

const LOAD_FALLBACK: &str = "Could not fetch your venues";
const DELETE_FALLBACK: &str = "Could not delete venue";
const CREATE_FALLBACK: &str = "Could not create venue";
const UPDATE_FALLBACK: &str = "Could not update venue";

/// Who may open the listings screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingAccess {
    /// Authenticated venue manager
    Allowed,
    /// Not logged in
    LoginRequired,
    /// Logged in without manager rights
    NotVenueManager,
}

impl ListingAccess {
    /// Access for `session`
    #[must_use]
    pub const fn for_session(session: &Session) -> Self {
        if !session.is_authenticated() {
            Self::LoginRequired
        } else if !session.is_venue_manager() {
            Self::NotVenueManager
        } else {
            Self::Allowed
        }
    }

    /// Where to send a user who may not stay
    #[must_use]
    pub const fn redirect(self) -> Option<Route> {
        match self {
            Self::Allowed => None,
            Self::LoginRequired => Some(Route::Login),
            Self::NotVenueManager => Some(Route::Home),
        }
    }
}

/// Why a venue form cannot be saved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Name or description blank
    #[error("Please fill in name and description")]
    MissingNameOrDescription,
    /// No image URL
    #[error("Please provide an image URL for the venue")]
    MissingMediaUrl,
    /// Fewer than one guest allowed
    #[error("Max guests must be at least 1")]
    InvalidMaxGuests,
    /// Price zero, negative or not a number
    #[error("Price must be greater than 0")]
    InvalidPrice,
}

/// The venue form as entered
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDraft {
    /// Set when editing an existing venue
    #[serde(default)]
    pub id: Option<VenueId>,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Main image URL
    pub media_url: String,
    /// Main image alt text
    #[serde(default)]
    pub media_alt: String,
    /// Nightly price
    pub price: f64,
    /// Maximum guests
    pub max_guests: i64,
    /// Location
    #[serde(default)]
    pub location: Option<Location>,
}

impl VenueDraft {
    /// Form pre-filled from an existing venue
    #[must_use]
    pub fn from_venue(venue: &Venue) -> Self {
        let media = venue.media.first();
        Self {
            id: Some(venue.id),
            name: venue.name.clone(),
            description: venue.description.clone(),
            media_url: media.map(|m| m.url.clone()).unwrap_or_default(),
            media_alt: media.map(|m| m.alt.clone()).unwrap_or_default(),
            price: venue.price.unwrap_or_default(),
            max_guests: i64::from(venue.max_guests),
            location: venue.location.clone(),
        }
    }

    /// Check the form before it is sent
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a [`DraftError`].
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() || self.description.trim().is_empty() {
            return Err(DraftError::MissingNameOrDescription);
        }
        if self.media_url.trim().is_empty() {
            return Err(DraftError::MissingMediaUrl);
        }
        if self.max_guests < 1 || u32::try_from(self.max_guests).is_err() {
            return Err(DraftError::InvalidMaxGuests);
        }
        if self.price.is_nan() || self.price <= 0.0 {
            return Err(DraftError::InvalidPrice);
        }
        Ok(())
    }

    /// Copy the form's fields onto `venue`
    ///
    /// Call after [`VenueDraft::validate`]; out-of-range guest counts saturate.
    pub fn apply_to(&self, venue: &mut Venue) {
        venue.name = self.name.trim().to_owned();
        venue.description = self.description.trim().to_owned();
        venue.media = vec![Media::new(self.media_url.trim(), self.media_alt.clone())];
        venue.price = Some(self.price);
        venue.max_guests = u32::try_from(self.max_guests.max(1)).unwrap_or(u32::MAX);
        venue.location.clone_from(&self.location);
    }

    /// A new venue owned by `owner`
    #[must_use]
    pub fn into_venue(self, owner: String) -> Venue {
        let mut venue = Venue::new(String::new(), 1);
        self.apply_to(&mut venue);
        venue.owner = Some(owner);
        venue
    }
}

/// State of the listings screen
#[derive(Clone, Debug, Default)]
pub struct ListingsState {
    /// The manager's venues
    pub venues: Vec<Venue>,
    /// Fetch in flight
    pub loading: bool,
    /// Create/update in flight
    pub saving: bool,
    /// Venue whose delete is in flight
    pub deleting: Option<VenueId>,
    /// Message of the last failure
    pub error: Option<String>,
    request: u64,
}

/// Actions for the listings screen
#[derive(Clone, Debug)]
pub enum ListingsAction {
    /// Screen mounted or refresh requested
    Load,
    /// Fetch result
    VenuesLoaded {
        /// Request the fetch belongs to
        request: u64,
        /// Service result
        result: Result<Vec<Venue>, DataServiceError>,
    },
    /// Delete a venue
    Delete(VenueId),
    /// Delete result
    VenueDeleted {
        /// Deleted venue
        id: VenueId,
        /// Service result
        result: Result<(), DataServiceError>,
    },
    /// Create or update from the form
    Save(VenueDraft),
    /// Save result
    Saved {
        /// Whether the draft was new
        created: bool,
        /// Service result
        result: Result<Venue, DataServiceError>,
    },
    /// Screen unmounted
    Dismissed,
}

/// Reducer for the listings screen
#[derive(Clone, Debug, Default)]
pub struct ListingsReducer;

impl ListingsReducer {
    /// Creates a new `ListingsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Token and owner name, or the redirect for a user who may not manage venues
    fn gate(session: &Session, env: &BookingEnvironment) -> Result<(AuthToken, String), Effect<ListingsAction>> {
        let access = ListingAccess::for_session(session);
        match (access.redirect(), session.credentials()) {
            (None, Some((token, owner))) => Ok((token.clone(), owner.to_owned())),
            (redirect, _) => {
                tracing::debug!(?access, "Listings access denied");
                Err(presenter::navigate(&env.presenter, redirect.unwrap_or(Route::Login)))
            },
        }
    }

    fn load(state: &mut ListingsState, env: &BookingEnvironment) -> SmallVec<[Effect<ListingsAction>; 4]> {
        let (token, owner) = match Self::gate(&env.session.current(), env) {
            Ok(credentials) => credentials,
            Err(redirect) => return smallvec![redirect],
        };
        state.loading = true;
        state.error = None;
        state.request += 1;
        let request = state.request;
        tracing::debug!(%owner, request, "Loading managed venues");

        let data = Arc::clone(&env.data);
        let fetch = async_effect! {
            let result = data.list_my_venues(&token, &owner).await;
            Some(ListingsAction::VenuesLoaded { request, result })
        };
        smallvec![fetch.cancellable(LOAD_VENUES, true)]
    }
}

impl Reducer for ListingsReducer {
    type State = ListingsState;
    type Action = ListingsAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ListingsAction::Load => Self::load(state, env),

            ListingsAction::VenuesLoaded { request, result } => {
                if request != state.request {
                    return SmallVec::new();
                }
                state.loading = false;
                match result {
                    Ok(venues) => state.venues = venues,
                    Err(DataServiceError::Cancelled) => {
                        tracing::trace!(request, "Managed venues fetch cancelled");
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Managed venues fetch failed");
                        state.error = Some(error.user_message(LOAD_FALLBACK));
                    },
                }
                SmallVec::new()
            },

            ListingsAction::Delete(id) => {
                if state.deleting.is_some() {
                    return SmallVec::new();
                }
                let (token, _) = match Self::gate(&env.session.current(), env) {
                    Ok(credentials) => credentials,
                    Err(redirect) => return smallvec![redirect],
                };
                state.deleting = Some(id);
                state.error = None;
                tracing::debug!(venue_id = %id, "Deleting venue");

                let data = Arc::clone(&env.data);
                smallvec![async_effect! {
                    let result = data.delete_venue(&token, id).await;
                    Some(ListingsAction::VenueDeleted { id, result })
                }]
            },

            ListingsAction::VenueDeleted { id, result } => {
                state.deleting = None;
                match result {
                    Ok(()) => state.venues.retain(|venue| venue.id != id),
                    Err(error) => {
                        tracing::warn!(venue_id = %id, %error, "Venue delete failed");
                        state.error = Some(error.user_message(DELETE_FALLBACK));
                    },
                }
                SmallVec::new()
            },

            ListingsAction::Save(draft) => {
                if state.saving {
                    return SmallVec::new();
                }
                if let Err(error) = draft.validate() {
                    state.error = Some(error.to_string());
                    return SmallVec::new();
                }
                let (token, _) = match Self::gate(&env.session.current(), env) {
                    Ok(credentials) => credentials,
                    Err(redirect) => return smallvec![redirect],
                };
                state.saving = true;
                state.error = None;

                let data = Arc::clone(&env.data);
                let created = draft.id.is_none();
                tracing::debug!(created, venue_id = ?draft.id, "Saving venue");
                smallvec![async_effect! {
                    let result = match draft.id {
                        Some(id) => data.update_venue(&token, id, draft).await,
                        None => data.create_venue(&token, draft).await,
                    };
                    Some(ListingsAction::Saved { created, result })
                }]
            },

            ListingsAction::Saved { created, result } => {
                state.saving = false;
                match result {
                    Ok(venue) => {
                        tracing::debug!(venue_id = %venue.id, created, "Venue saved");
                        Self::load(state, env)
                    },
                    Err(error) => {
                        tracing::warn!(created, %error, "Venue save failed");
                        let fallback = if created { CREATE_FALLBACK } else { UPDATE_FALLBACK };
                        state.error = Some(error.user_message(fallback));
                        SmallVec::new()
                    },
                }
            },

            ListingsAction::Dismissed => {
                state.request += 1;
                state.loading = false;
                smallvec![Effect::Cancel(LOAD_VENUES)]
            },
        }
    }
}
