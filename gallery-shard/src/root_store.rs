//! Root store wiring the photo, search and UI stores together.
use std::sync::Arc;

use gallery_pexels::PhotoSource;
use tracing::debug;

use crate::{
    config::{ConfigError, GalleryConfig},
    photo_store::PhotoStore,
    search_store::SearchStore,
    ui_store::UiStore,
};

/// The gallery's stores, sharing one photo source.
#[derive(Clone, Debug)]
pub struct GalleryStore {
    pub photos: PhotoStore,
    pub search: SearchStore,
    pub ui: UiStore,
}

impl GalleryStore {
    /// Builds the stores over `source`.
    pub fn new(source: Arc<dyn PhotoSource>, config: &GalleryConfig) -> Self {
        let photos = PhotoStore::with_per_page(source, config.per_page);
        let search = SearchStore::with_debounce_delay(photos.clone(), config.search_debounce());
        let ui = UiStore::new(photos.clone(), config.virtualizer_args());
        Self { photos, search, ui }
    }

    /// Builds the stores over a Pexels client configured by `config`.
    pub fn from_config(config: &GalleryConfig) -> Result<Self, ConfigError> {
        let client = config.client()?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Restores every store to its initial state.
    pub fn reset(&self) {
        self.photos.reset();
        self.ui.reset();
        self.search.reset();
    }

    /// Cancels the scheduled search and the in-flight listing request.
    pub fn dispose(&self) {
        debug!("Disposing gallery stores");
        self.search.reset();
        self.photos.cancel_request();
        self.photos.clear_current_photo();
    }
}
