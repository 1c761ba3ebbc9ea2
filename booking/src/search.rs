//! Debounced, paginated venue search.
//!
//! Keystrokes restart a quiet-period timer; only when it elapses does the
//! query take effect. A query change resets pagination and supersedes every
//! fetch of the previous query. Stale results are blocked twice: their tasks
//! are aborted through [`Effect::Cancel`], and any result that still arrives
//! carries an old generation and is dropped by the reducer.

use crate::environment::BookingEnvironment;
use crate::presenter;
use crate::service::{DataServiceError, VenuePage, VenueQuery};
use crate::types::Venue;
use haven_core::{async_effect, cancellable, delay, effect::Effect, effect::EffectId, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Quiet-period timer
pub const DEBOUNCE: EffectId = EffectId::new("search.debounce");
/// First-page fetch of the current query
pub const FIRST_PAGE: EffectId = EffectId::new("search.first_page");
/// Next-page fetch of the current query
pub const LOAD_MORE: EffectId = EffectId::new("search.load_more");

/// Shown when a fetch fails without a service message
pub const FETCH_VENUES_FALLBACK: &str = "Could not fetch venues";

/// State of the venue search screen
#[derive(Clone, Debug)]
pub struct SearchState {
    /// Text as typed
    pub raw_query: String,
    /// Trimmed text the results belong to
    pub debounced_query: String,
    /// Last page loaded, 1-based
    pub page: u32,
    /// Whether another page may exist
    pub has_more: bool,
    /// Venues loaded so far, in page order
    pub items: Vec<Venue>,
    /// First page in flight
    pub loading: bool,
    /// Next page in flight
    pub loading_more: bool,
    /// Message of the last surfaced failure
    pub error: Option<String>,
    /// Identifies the fetches of the current query
    pub generation: u64,
    debounce_token: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            raw_query: String::new(),
            debounced_query: String::new(),
            page: 1,
            has_more: true,
            items: Vec::new(),
            loading: false,
            loading_more: false,
            error: None,
            generation: 0,
            debounce_token: 0,
        }
    }
}

impl SearchState {
    /// Whether "load more" should be offered
    #[must_use]
    pub const fn can_load_more(&self) -> bool {
        self.has_more && !self.loading && !self.loading_more
    }
}

/// Actions for the venue search
#[derive(Clone, Debug)]
pub enum SearchAction {
    /// The screen mounted
    Appeared,
    /// The search text changed
    QueryChanged(String),
    /// The quiet period of keystroke `token` elapsed
    DebounceElapsed {
        /// Keystroke counter when the timer started
        token: u64,
    },
    /// The user asked for the next page
    LoadMore,
    /// First-page result
    FirstPageLoaded {
        /// Generation the fetch was started for
        generation: u64,
        /// Service result
        result: Result<VenuePage, DataServiceError>,
    },
    /// Next-page result
    NextPageLoaded {
        /// Generation the fetch was started for
        generation: u64,
        /// Page number fetched
        page: u32,
        /// Service result
        result: Result<VenuePage, DataServiceError>,
    },
    /// The screen unmounted
    Dismissed,
}

/// Reducer for the venue search
#[derive(Clone, Debug, Default)]
pub struct SearchReducer;

impl SearchReducer {
    /// Creates a new `SearchReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Start over on page 1 of the debounced query
    fn restart(state: &mut SearchState, env: &BookingEnvironment) -> SmallVec<[Effect<SearchAction>; 4]> {
        state.page = 1;
        state.items.clear();
        state.has_more = true;
        state.error = None;
        state.loading = true;
        state.loading_more = false;
        state.generation += 1;

        tracing::debug!(
            query = %state.debounced_query,
            generation = state.generation,
            "Fetching first page"
        );

        let generation = state.generation;
        let fetch = fetch_page(env, &state.debounced_query, 1, move |result| {
            SearchAction::FirstPageLoaded { generation, result }
        });
        smallvec![
            Effect::Cancel(LOAD_MORE),
            fetch.cancellable(FIRST_PAGE, true),
        ]
    }

    /// Items of `page` that belong in the list, and whether more may follow
    fn accept(query: &str, page: VenuePage) -> (Vec<Venue>, bool) {
        let items: Vec<Venue> = page
            .items
            .into_iter()
            .filter(|venue| name_matches(venue, query))
            .collect();
        let has_more = page.is_last_page.map_or(!items.is_empty(), |last| !last);
        (items, has_more)
    }
}

/// Client-side name filter applied on top of the service's search
fn name_matches(venue: &Venue, query: &str) -> bool {
    query.is_empty() || venue.name.to_lowercase().contains(&query.to_lowercase())
}

fn fetch_page<F>(env: &BookingEnvironment, query: &str, page: u32, into_action: F) -> Effect<SearchAction>
where
    F: FnOnce(Result<VenuePage, DataServiceError>) -> SearchAction + Send + 'static,
{
    let data = Arc::clone(&env.data);
    let request = VenueQuery {
        page,
        limit: env.config.page_size,
        query: query.to_owned(),
    };
    async_effect! {
        let result = data.list_venues(request).await;
        Some(into_action(result))
    }
}

impl Reducer for SearchReducer {
    type State = SearchState;
    type Action = SearchAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per screen event
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SearchAction::Appeared => Self::restart(state, env),

            SearchAction::QueryChanged(text) => {
                state.raw_query = text;
                state.debounce_token += 1;
                let token = state.debounce_token;
                smallvec![cancellable! {
                    id: DEBOUNCE,
                    cancel_in_flight: true,
                    effect: delay! {
                        duration: env.config.search_debounce(),
                        action: SearchAction::DebounceElapsed { token }
                    }
                }]
            },

            SearchAction::DebounceElapsed { token } => {
                if token != state.debounce_token {
                    tracing::trace!(token, "Stale debounce timer ignored");
                    return SmallVec::new();
                }
                let query = state.raw_query.trim();
                if query == state.debounced_query {
                    return SmallVec::new();
                }
                state.debounced_query = query.to_owned();
                Self::restart(state, env)
            },

            SearchAction::LoadMore => {
                if !state.can_load_more() {
                    tracing::trace!(
                        has_more = state.has_more,
                        loading = state.loading,
                        loading_more = state.loading_more,
                        "Load more ignored"
                    );
                    return SmallVec::new();
                }
                state.loading_more = true;
                let generation = state.generation;
                let page = state.page + 1;
                tracing::debug!(query = %state.debounced_query, page, "Fetching next page");

                let fetch = fetch_page(env, &state.debounced_query, page, move |result| {
                    SearchAction::NextPageLoaded {
                        generation,
                        page,
                        result,
                    }
                });
                smallvec![fetch.cancellable(LOAD_MORE, true)]
            },

            SearchAction::FirstPageLoaded { generation, result } => {
                if generation != state.generation {
                    tracing::trace!(generation, current = state.generation, "Stale first page dropped");
                    return SmallVec::new();
                }
                state.loading = false;
                match result {
                    Ok(page) => {
                        let (items, has_more) = Self::accept(&state.debounced_query, page);
                        tracing::debug!(
                            query = %state.debounced_query,
                            generation,
                            count = items.len(),
                            has_more,
                            "First page loaded"
                        );
                        state.items = items;
                        state.page = 1;
                        state.has_more = has_more;
                    },
                    Err(DataServiceError::Cancelled) => {
                        tracing::trace!(generation, "First page cancelled");
                        return SmallVec::new();
                    },
                    Err(error) => {
                        tracing::warn!(query = %state.debounced_query, %error, "First page failed");
                        state.items.clear();
                        state.has_more = false;
                        state.error = Some(error.user_message(FETCH_VENUES_FALLBACK));
                    },
                }
                smallvec![presenter::restore_focus(&env.presenter)]
            },

            SearchAction::NextPageLoaded {
                generation,
                page,
                result,
            } => {
                if generation != state.generation {
                    tracing::trace!(generation, current = state.generation, "Stale page dropped");
                    return SmallVec::new();
                }
                state.loading_more = false;
                match result {
                    Ok(loaded) => {
                        let (items, has_more) = Self::accept(&state.debounced_query, loaded);
                        tracing::debug!(page, count = items.len(), has_more, "Next page loaded");
                        state.items.extend(items);
                        state.page = page;
                        state.has_more = has_more;
                    },
                    Err(DataServiceError::Cancelled) => {
                        tracing::trace!(page, "Next page cancelled");
                        return SmallVec::new();
                    },
                    Err(error) => {
                        tracing::warn!(page, %error, "Next page failed");
                        state.error = Some(error.user_message(FETCH_VENUES_FALLBACK));
                    },
                }
                smallvec![presenter::restore_focus(&env.presenter)]
            },

            SearchAction::Dismissed => {
                state.generation += 1;
                state.loading = false;
                state.loading_more = false;
                smallvec![
                    Effect::Cancel(DEBOUNCE),
                    Effect::Cancel(FIRST_PAGE),
                    Effect::Cancel(LOAD_MORE),
                ]
            },
        }
    }
}
