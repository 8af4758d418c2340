//! Stores for the photo gallery.
//!
//! [`GalleryStore`] bundles three cheaply cloneable stores that share one
//! [`PhotoSource`](gallery_pexels::PhotoSource):
//!
//! - [`PhotoStore`] loads and paginates photos and caches photo details.
//! - [`SearchStore`] debounces typed queries into fresh searches.
//! - [`UiStore`] owns the photo overlay and the virtualized grid.
//!
//! Fetches run on tokio. Outside a runtime a background multi-thread runtime
//! is started on first use.
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod debouncer;
pub mod photo_store;
pub mod root_store;
mod runtime;
pub mod search_store;
pub mod ui_store;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, GalleryConfig};
pub use debouncer::Debouncer;
pub use photo_store::{FetchOutcome, ITEMS_PER_PAGE, PhotoState, PhotoStore};
pub use root_store::GalleryStore;
pub use search_store::{SearchState, SearchStore};
pub use ui_store::{Key, UiState, UiStore};
