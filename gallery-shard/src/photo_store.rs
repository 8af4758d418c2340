//! Photo listing, pagination and details.
//!
//! ## Usage
//!
//! [`PhotoStore`] owns the loaded photos and coordinates every request that
//! changes them. Each listing request takes a ticket from a monotonically
//! increasing generation; a response is applied only if its ticket is still
//! current, so stale responses are discarded no matter when they arrive.
//!
//! - A reset fetch always proceeds and supersedes whatever is in flight.
//! - A load-more fetch is skipped while any listing request is loading.
//! - [`PhotoStore::cancel_request`] aborts the in-flight request and clears
//!   the loading flags without recording an error.
use std::sync::Arc;

use dashmap::DashMap;
use gallery_pexels::{FetchError, PageRequest, Photo, PhotoDetails, PhotoPage, PhotoSource};
use parking_lot::{Mutex, RwLock};
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, error};

use crate::runtime;

/// Default page size.
pub const ITEMS_PER_PAGE: u32 = 40;

/// What a fetch call ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A listing page was applied.
    Loaded {
        /// Photos in the page.
        received: usize,
    },
    /// Details were applied, from the network or the cache.
    Details {
        /// Served from the cache.
        cached: bool,
    },
    /// The request was not started.
    Skipped,
    /// The request finished after being superseded or cancelled; its result
    /// was dropped.
    Discarded,
}

/// Observable photo state.
#[derive(Clone, Debug)]
pub struct PhotoState {
    /// Loaded photos in display order. Replaced as a whole on every change.
    pub photos: Arc<[Arc<Photo>]>,
    /// Details shown in the photo overlay.
    pub current_photo: Option<PhotoDetails>,
    /// Next page to request, 1-based.
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
    /// A reset fetch is in flight.
    pub is_loading: bool,
    /// A load-more fetch is in flight.
    pub is_loading_more: bool,
    /// A details fetch is in flight.
    pub is_loading_details: bool,
    /// Last failure, cleared when the next request starts.
    pub error: Option<FetchError>,
    pub total_results: u64,
    /// Query of the current listing. Empty for curated photos.
    pub active_search_query: String,
    /// Bumped whenever `photos` is replaced.
    pub revision: u64,
    generation: u64,
    details_generation: u64,
}

impl Default for PhotoState {
    fn default() -> Self {
        Self {
            photos: Arc::from(Vec::new()),
            current_photo: None,
            page: 1,
            per_page: ITEMS_PER_PAGE,
            has_more: true,
            is_loading: false,
            is_loading_more: false,
            is_loading_details: false,
            error: None,
            total_results: 0,
            active_search_query: String::new(),
            revision: 0,
            generation: 0,
            details_generation: 0,
        }
    }
}

impl PhotoState {
    /// Loading the first page with nothing to show yet.
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.photos.is_empty()
    }

    /// Any listing request in flight.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more
    }

    /// User-facing message of the last failure.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

struct Ticket {
    generation: u64,
    reset: bool,
    request: PageRequest,
}

struct InFlight {
    generation: u64,
    handle: AbortHandle,
}

struct PhotoStoreInner {
    source: Arc<dyn PhotoSource>,
    state: RwLock<PhotoState>,
    details_cache: DashMap<u64, PhotoDetails>,
    in_flight: Mutex<Option<InFlight>>,
}

/// Cheaply cloneable handle to the photo state.
#[derive(Clone)]
pub struct PhotoStore {
    inner: Arc<PhotoStoreInner>,
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("state", &*self.inner.state.read())
            .finish_non_exhaustive()
    }
}

impl PhotoStore {
    /// Creates an empty store backed by `source`.
    pub fn new(source: Arc<dyn PhotoSource>) -> Self {
        Self::with_per_page(source, ITEMS_PER_PAGE)
    }

    /// Creates an empty store with a custom page size.
    pub fn with_per_page(source: Arc<dyn PhotoSource>, per_page: u32) -> Self {
        let state = PhotoState {
            per_page: per_page.max(1),
            ..PhotoState::default()
        };
        Self {
            inner: Arc::new(PhotoStoreInner {
                source,
                state: RwLock::new(state),
                details_cache: DashMap::new(),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Execute a closure with a shared reference to the state.
    pub fn with<R>(&self, f: impl FnOnce(&PhotoState) -> R) -> R {
        f(&self.inner.state.read())
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> PhotoState {
        self.with(Clone::clone)
    }

    /// Current photo list.
    pub fn photos(&self) -> Arc<[Arc<Photo>]> {
        self.with(|state| state.photos.clone())
    }

    /// Revision of the current photo list.
    pub fn revision(&self) -> u64 {
        self.with(|state| state.revision)
    }

    pub fn is_initial_loading(&self) -> bool {
        self.with(PhotoState::is_initial_loading)
    }

    /// Fetches a listing page.
    ///
    /// With `reset` the list is cleared and page 1 is requested for `query`,
    /// or for the active query when `query` is `None`. Without `reset` the
    /// next page of the active query is appended and `query` is ignored.
    pub async fn fetch_photos(
        &self,
        reset: bool,
        query: Option<&str>,
    ) -> Result<FetchOutcome, FetchError> {
        let Some(ticket) = self.begin_fetch(reset, query) else {
            return Ok(FetchOutcome::Skipped);
        };
        let generation = ticket.generation;
        let request = self.inner.source.get_photos(ticket.request.clone());

        let store = self.clone();
        let Some(task) = runtime::spawn(async move {
            let result = request.await;
            store.finish_fetch(ticket, result)
        }) else {
            let err = FetchError::Unexpected("no async runtime".to_string());
            self.abandon_fetch(generation, Some(err.clone()));
            return Err(err);
        };
        self.track_in_flight(generation, task.abort_handle());

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => self.join_failed(generation, err),
        }
    }

    /// Appends the next page of the active query, if there is one and nothing
    /// is loading.
    pub async fn load_more(&self) -> Result<FetchOutcome, FetchError> {
        let ready = self.with(|state| state.has_more && !state.is_busy());
        if !ready {
            return Ok(FetchOutcome::Skipped);
        }
        self.fetch_photos(false, None).await
    }

    /// Re-runs page 1 of the active query, typically after a failure.
    pub async fn retry(&self) -> Result<FetchOutcome, FetchError> {
        self.fetch_photos(true, None).await
    }

    /// Changes the page size and reloads from page 1.
    pub async fn update_per_page(&self, per_page: u32) -> Result<FetchOutcome, FetchError> {
        self.inner.state.write().per_page = per_page.max(1);
        self.fetch_photos(true, None).await
    }

    /// Loads details for `id` into [`PhotoState::current_photo`], serving
    /// repeated requests from the cache.
    pub async fn fetch_photo_details(&self, id: u64) -> Result<FetchOutcome, FetchError> {
        let generation = {
            let mut state = self.inner.state.write();
            state.details_generation += 1;
            if let Some(cached) = self.inner.details_cache.get(&id) {
                state.current_photo = Some(cached.clone());
                state.is_loading_details = false;
                return Ok(FetchOutcome::Details { cached: true });
            }
            state.is_loading_details = true;
            state.error = None;
            state.details_generation
        };

        let request = self.inner.source.get_photo_details(id);
        let store = self.clone();
        let Some(task) = runtime::spawn(async move {
            let result = request.await;
            store.finish_details(id, generation, result)
        }) else {
            let err = FetchError::Unexpected("no async runtime".to_string());
            return self.finish_details(id, generation, Err(err));
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => self.finish_details(id, generation, Err(FetchError::Unexpected(err.to_string()))),
        }
    }

    pub fn set_current_photo(&self, photo: Option<PhotoDetails>) {
        let mut state = self.inner.state.write();
        state.details_generation += 1;
        state.is_loading_details = false;
        state.current_photo = photo;
    }

    /// Clears the overlay photo and drops any details response still pending.
    pub fn clear_current_photo(&self) {
        self.set_current_photo(None);
    }

    /// Aborts the in-flight listing request. The request ends silently: no
    /// error is recorded and both loading flags are cleared.
    pub fn cancel_request(&self) {
        let mut state = self.inner.state.write();
        self.cancel_locked(&mut state);
    }

    /// Cancels pending work and restores the initial state. The details
    /// cache is emptied too.
    pub fn reset(&self) {
        let mut state = self.inner.state.write();
        self.cancel_locked(&mut state);
        let revision = state.revision + 1;
        let generation = state.generation;
        let details_generation = state.details_generation + 1;
        let per_page = state.per_page;
        *state = PhotoState {
            per_page,
            revision,
            generation,
            details_generation,
            ..PhotoState::default()
        };
        self.inner.details_cache.clear();
    }

    fn cancel_locked(&self, state: &mut PhotoState) {
        state.generation += 1;
        if let Some(in_flight) = self.inner.in_flight.lock().take() {
            debug!("Cancelling listing request {}", in_flight.generation);
            in_flight.handle.abort();
        }
        state.is_loading = false;
        state.is_loading_more = false;
    }

    fn begin_fetch(&self, reset: bool, query: Option<&str>) -> Option<Ticket> {
        let mut state = self.inner.state.write();
        if !reset && state.is_busy() {
            debug!("Listing request in flight, skipping load more");
            return None;
        }

        self.cancel_locked(&mut state);
        if reset {
            if let Some(query) = query {
                state.active_search_query = query.trim().to_owned();
            }
            state.photos = Arc::from(Vec::new());
            state.page = 1;
            state.has_more = true;
            state.total_results = 0;
            state.revision += 1;
            state.is_loading = true;
        } else {
            state.is_loading_more = true;
        }
        state.error = None;

        let request =
            PageRequest::new(state.page, state.per_page).with_query(&state.active_search_query);
        debug!(
            "Requesting page {} ({} per page, query {:?}, reset {reset})",
            request.page, request.per_page, request.query
        );
        Some(Ticket {
            generation: state.generation,
            reset,
            request,
        })
    }

    fn track_in_flight(&self, generation: u64, handle: AbortHandle) {
        let state = self.inner.state.read();
        if state.generation != generation {
            handle.abort();
            return;
        }
        *self.inner.in_flight.lock() = Some(InFlight { generation, handle });
    }

    fn finish_fetch(
        &self,
        ticket: Ticket,
        result: Result<PhotoPage, FetchError>,
    ) -> Result<FetchOutcome, FetchError> {
        let mut state = self.inner.state.write();
        if state.generation != ticket.generation {
            debug!("Dropping stale listing response {}", ticket.generation);
            return Ok(FetchOutcome::Discarded);
        }
        {
            let mut in_flight = self.inner.in_flight.lock();
            if in_flight
                .as_ref()
                .is_some_and(|current| current.generation == ticket.generation)
            {
                *in_flight = None;
            }
        }
        state.is_loading = false;
        state.is_loading_more = false;

        let page = match result {
            Ok(page) => page,
            Err(err) if err.is_cancelled() => return Ok(FetchOutcome::Discarded),
            Err(err) => {
                error!("Failed to fetch photos: {err}");
                state.error = Some(err.clone());
                return Err(err);
            }
        };

        let received = page.photos.len();
        let incoming = page.photos.into_iter().map(Arc::new);
        state.photos = if ticket.reset {
            incoming.collect()
        } else {
            state.photos.iter().cloned().chain(incoming).collect()
        };
        state.total_results = page.total_results;
        state.has_more =
            u64::from(ticket.request.page) * u64::from(ticket.request.per_page) < page.total_results;
        state.page = ticket.request.page + 1;
        state.revision += 1;
        debug!(
            "Loaded page {} with {received} photos, {} of {} loaded",
            ticket.request.page,
            state.photos.len(),
            state.total_results
        );
        Ok(FetchOutcome::Loaded { received })
    }

    fn abandon_fetch(&self, generation: u64, err: Option<FetchError>) {
        let mut state = self.inner.state.write();
        if state.generation == generation {
            state.is_loading = false;
            state.is_loading_more = false;
            state.error = err;
        }
    }

    fn join_failed(&self, generation: u64, err: JoinError) -> Result<FetchOutcome, FetchError> {
        if err.is_cancelled() {
            return Ok(FetchOutcome::Discarded);
        }
        let err = FetchError::Unexpected(err.to_string());
        error!("Listing task failed: {err:?}");
        self.abandon_fetch(generation, Some(err.clone()));
        Err(err)
    }

    fn finish_details(
        &self,
        id: u64,
        generation: u64,
        result: Result<PhotoDetails, FetchError>,
    ) -> Result<FetchOutcome, FetchError> {
        if let Ok(details) = &result {
            self.inner.details_cache.insert(id, details.clone());
        }
        let mut state = self.inner.state.write();
        if state.details_generation != generation {
            return Ok(FetchOutcome::Discarded);
        }
        state.is_loading_details = false;
        match result {
            Ok(details) => {
                state.current_photo = Some(details);
                Ok(FetchOutcome::Details { cached: false })
            }
            Err(err) if err.is_cancelled() => Ok(FetchOutcome::Discarded),
            Err(err) => {
                error!("Failed to fetch photo {id}: {err}");
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }
}
