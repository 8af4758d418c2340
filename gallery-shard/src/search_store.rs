//! Debounced search over the photo store.
use std::{sync::Arc, time::Duration};

use gallery_pexels::FetchError;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    debouncer::{DEFAULT_SEARCH_DEBOUNCE, Debouncer},
    photo_store::{FetchOutcome, PhotoStore},
    runtime,
};

/// Observable search state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Text as typed, untrimmed.
    pub search_query: String,
    /// A non-blank search is executing.
    pub is_searching: bool,
}

struct SearchStoreInner {
    photos: PhotoStore,
    state: RwLock<SearchState>,
    debouncer: Debouncer,
}

/// Cheaply cloneable handle to the search state.
#[derive(Clone)]
pub struct SearchStore {
    inner: Arc<SearchStoreInner>,
}

impl std::fmt::Debug for SearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchStore")
            .field("state", &*self.inner.state.read())
            .field("debounce_delay", &self.inner.debouncer.delay())
            .finish()
    }
}

impl SearchStore {
    /// Search store with the default debounce delay.
    pub fn new(photos: PhotoStore) -> Self {
        Self::with_debounce_delay(photos, DEFAULT_SEARCH_DEBOUNCE)
    }

    /// Search store waiting `delay` after the last edit before searching.
    pub fn with_debounce_delay(photos: PhotoStore, delay: Duration) -> Self {
        Self {
            inner: Arc::new(SearchStoreInner {
                photos,
                state: RwLock::new(SearchState::default()),
                debouncer: Debouncer::new(delay),
            }),
        }
    }

    /// Execute a closure with a shared reference to the state.
    pub fn with<R>(&self, f: impl FnOnce(&SearchState) -> R) -> R {
        f(&self.inner.state.read())
    }

    pub fn search_query(&self) -> String {
        self.with(|state| state.search_query.clone())
    }

    pub fn is_searching(&self) -> bool {
        self.with(|state| state.is_searching)
    }

    /// Any text typed, including whitespace.
    pub fn has_active_search(&self) -> bool {
        self.with(|state| !state.search_query.is_empty())
    }

    pub fn debounce_delay(&self) -> Duration {
        self.inner.debouncer.delay()
    }

    /// Whether a search is scheduled but has not started.
    pub fn is_search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Stores `query` and schedules a search once typing pauses.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.inner.state.write().search_query = query.into();
        let store = self.clone();
        self.inner.debouncer.invoke(move || {
            if runtime::spawn(async move { store.execute_search().await }).is_none() {
                debug!("Debounced search dropped without a runtime");
            }
        });
    }

    /// Runs the search for the current text right away. Blank text reloads
    /// curated photos.
    pub async fn execute_search(&self) -> Result<FetchOutcome, FetchError> {
        let query = self.with(|state| state.search_query.trim().to_owned());
        if query.is_empty() {
            return self.inner.photos.fetch_photos(true, Some("")).await;
        }

        debug!("Searching for {query:?}");
        self.inner.state.write().is_searching = true;
        let result = self.inner.photos.fetch_photos(true, Some(&query)).await;
        self.inner.state.write().is_searching = false;
        result
    }

    /// Clears the text, drops any scheduled search and reloads curated
    /// photos.
    pub async fn clear_search(&self) -> Result<FetchOutcome, FetchError> {
        self.inner.debouncer.cancel();
        self.inner.state.write().search_query.clear();
        self.inner.photos.fetch_photos(true, Some("")).await
    }

    /// Drops any scheduled search and restores the initial state.
    pub fn reset(&self) {
        self.inner.debouncer.cancel();
        *self.inner.state.write() = SearchState::default();
    }
}
