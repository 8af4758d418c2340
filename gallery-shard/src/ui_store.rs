//! Photo overlay state and the virtualized grid.
//!
//! ## Usage
//!
//! Forward container width, scroll and resize events to [`UiStore`] and
//! render [`UiStore::with_grid`]. The grid follows the photo store by
//! revision, and the next page is requested as soon as the viewport comes
//! within the load-more margin of the end of the content.
use std::sync::Arc;

use gallery_pexels::{FetchError, Photo};
use gallery_ui::{LayoutError, VirtualizationController, VirtualizerArgs};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};
use web_time::Instant;

use crate::{
    photo_store::{FetchOutcome, PhotoStore},
    runtime,
};

/// Keys the gallery reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Other,
}

/// Observable overlay state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_photo_modal_open: bool,
    pub selected_photo_id: Option<u64>,
}

impl UiState {
    pub fn has_open_modal(&self) -> bool {
        self.is_photo_modal_open && self.selected_photo_id.is_some()
    }
}

struct GridSync {
    controller: VirtualizationController<Arc<Photo>>,
    synced_revision: Option<u64>,
}

struct UiStoreInner {
    photos: PhotoStore,
    state: RwLock<UiState>,
    grid: Mutex<GridSync>,
}

/// Cheaply cloneable handle to the UI state.
#[derive(Clone)]
pub struct UiStore {
    inner: Arc<UiStoreInner>,
}

impl std::fmt::Debug for UiStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiStore")
            .field("state", &*self.inner.state.read())
            .finish_non_exhaustive()
    }
}

impl UiStore {
    pub fn new(photos: PhotoStore, args: VirtualizerArgs) -> Self {
        Self {
            inner: Arc::new(UiStoreInner {
                photos,
                state: RwLock::new(UiState::default()),
                grid: Mutex::new(GridSync {
                    controller: VirtualizationController::new(args),
                    synced_revision: None,
                }),
            }),
        }
    }

    /// Execute a closure with a shared reference to the overlay state.
    pub fn with<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        f(&self.inner.state.read())
    }

    pub fn has_open_modal(&self) -> bool {
        self.with(UiState::has_open_modal)
    }

    pub fn current_photo_id(&self) -> Option<u64> {
        self.with(|state| state.selected_photo_id)
    }

    /// Opens the overlay for `id` and loads its details.
    pub async fn open_photo_modal(&self, id: u64) -> Result<FetchOutcome, FetchError> {
        {
            let mut state = self.inner.state.write();
            state.is_photo_modal_open = true;
            state.selected_photo_id = Some(id);
        }
        self.inner.photos.fetch_photo_details(id).await
    }

    /// Closes the overlay and clears the photo store's current photo.
    pub fn close_photo_modal(&self) {
        *self.inner.state.write() = UiState::default();
        self.inner.photos.clear_current_photo();
    }

    /// Handles a key press. Returns whether it was consumed.
    pub fn handle_key(&self, key: Key) -> bool {
        if key == Key::Escape && self.has_open_modal() {
            self.close_photo_modal();
            return true;
        }
        false
    }

    /// Closes the overlay without touching the photo store.
    pub fn reset(&self) {
        *self.inner.state.write() = UiState::default();
    }

    /// Execute a closure with the grid, brought up to date with the photo
    /// store first.
    pub fn with_grid<R>(&self, f: impl FnOnce(&VirtualizationController<Arc<Photo>>) -> R) -> R {
        let mut grid = self.inner.grid.lock();
        self.sync_logged(&mut grid);
        f(&grid.controller)
    }

    /// Pushes the photo store's current list into the grid if its revision
    /// moved. A list that fails to lay out is not retried until the next
    /// revision.
    pub fn sync_items(&self) -> Result<bool, LayoutError> {
        let mut grid = self.inner.grid.lock();
        self.sync_locked(&mut grid)
    }

    /// Applies a container width. Layout failures are logged and leave the
    /// grid as it was.
    pub fn on_container_width_change(&self, container_width: u32) -> bool {
        let applied = {
            let mut grid = self.inner.grid.lock();
            self.sync_logged(&mut grid);
            match grid.controller.on_container_width_change(container_width) {
                Ok(applied) => applied,
                Err(err) => {
                    error!("Failed to lay out grid at width {container_width}: {err}");
                    false
                }
            }
        };
        self.trigger_load_more();
        applied
    }

    /// Applies a scroll offset, subject to the scroll throttle.
    pub fn on_scroll(&self, scroll_top: f32) -> bool {
        self.on_scroll_at(scroll_top, Instant::now())
    }

    /// [`on_scroll`](Self::on_scroll) with an explicit timestamp.
    pub fn on_scroll_at(&self, scroll_top: f32, now: Instant) -> bool {
        let applied = {
            let mut grid = self.inner.grid.lock();
            self.sync_logged(&mut grid);
            grid.controller.on_scroll_at(scroll_top, now)
        };
        if applied {
            self.trigger_load_more();
        }
        applied
    }

    pub fn on_resize(&self, viewport_height: f32) -> bool {
        let applied = {
            let mut grid = self.inner.grid.lock();
            self.sync_logged(&mut grid);
            grid.controller.on_resize(viewport_height)
        };
        if applied {
            self.trigger_load_more();
        }
        applied
    }

    /// Whether the viewport is near the end of a non-empty list and another
    /// page can be requested. The first page is always requested explicitly.
    pub fn should_load_more(&self) -> bool {
        let near_end = {
            let mut grid = self.inner.grid.lock();
            self.sync_logged(&mut grid);
            grid.controller.is_near_end()
        };
        near_end
            && self.inner.photos.with(|state| {
                !state.photos.is_empty() && state.has_more && !state.is_busy()
            })
    }

    /// Requests the next page if [`should_load_more`](Self::should_load_more)
    /// holds.
    pub async fn load_more_if_needed(&self) -> Result<FetchOutcome, FetchError> {
        if !self.should_load_more() {
            return Ok(FetchOutcome::Skipped);
        }
        let outcome = self.inner.photos.load_more().await?;
        if let Err(err) = self.sync_items() {
            error!("Failed to lay out new page: {err}");
        }
        Ok(outcome)
    }

    fn trigger_load_more(&self) {
        if !self.should_load_more() {
            return;
        }
        let store = self.clone();
        let spawned = runtime::spawn(async move {
            if let Err(err) = store.load_more_if_needed().await {
                debug!("Background load more failed: {err}");
            }
        });
        if spawned.is_none() {
            debug!("No async runtime, load more not started");
        }
    }

    fn sync_locked(&self, grid: &mut GridSync) -> Result<bool, LayoutError> {
        let (revision, photos) = self
            .inner
            .photos
            .with(|state| (state.revision, state.photos.clone()));
        if grid.synced_revision == Some(revision) {
            return Ok(false);
        }
        grid.synced_revision = Some(revision);
        grid.controller.set_items(photos.to_vec())
    }

    fn sync_logged(&self, grid: &mut GridSync) {
        if let Err(err) = self.sync_locked(grid) {
            error!("Failed to lay out photos: {err}");
        }
    }
}
