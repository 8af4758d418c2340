//! Gallery configuration.
//!
//! ## Usage
//!
//! Values come from a TOML file (`GALLERY_CONFIG`, falling back to
//! `gallery.toml`), and `PEXELS_API_KEY` overrides the key from the file.
//! Every field has a default, so a missing file is not an error.
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use gallery_pexels::{PEXELS_BASE_URL, PexelsClient};
use gallery_ui::{GridConfig, VirtualizerArgs};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "GALLERY_CONFIG";
/// Environment variable overriding [`GalleryConfig::api_key`].
pub const API_KEY_ENV: &str = "PEXELS_API_KEY";
/// Configuration file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";
/// Largest page size the Pexels API accepts.
pub const MAX_PER_PAGE: u32 = 80;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The file is not valid TOML for [`GalleryConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// No API key in the file or the environment.
    #[error("no Pexels API key configured, set {API_KEY_ENV} or `api_key`")]
    MissingApiKey,
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime settings for the stores and the virtualized grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// API root.
    pub api_base_url: String,
    /// Pexels API key.
    pub api_key: Option<String>,
    /// Photos per listing page.
    pub per_page: u32,
    /// Quiet period before a typed query is searched.
    pub search_debounce_ms: u64,
    /// Minimum time between effective scroll updates.
    pub scroll_throttle_ms: u64,
    /// Items kept rendered around the viewport.
    pub buffer_items: usize,
    /// Distance from the end of content at which the next page is requested.
    pub load_more_margin: f32,
    /// Whole-request timeout.
    pub request_timeout_secs: u64,
    /// Breakpoints and gutter.
    pub grid: GridConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base_url: PEXELS_BASE_URL.to_string(),
            api_key: None,
            per_page: 40,
            search_debounce_ms: 500,
            scroll_throttle_ms: 16,
            buffer_items: 5,
            load_more_margin: 800.0,
            request_timeout_secs: 10,
            grid: GridConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source)?;
        config.grid = GridConfig::new(config.grid.breakpoints, config.grid.gutter);
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads from the environment-selected file and applies the API key
    /// override.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let config = Self::load_from(&path)?;
        Ok(config.with_api_key_override(env::var(API_KEY_ENV).ok()))
    }

    /// Replaces the key when `key` is present and non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::Invalid(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        if !self.load_more_margin.is_finite() || self.load_more_margin < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "load_more_margin must be a non-negative number, got {}",
                self.load_more_margin
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Search debounce delay.
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Controller settings derived from this configuration.
    pub fn virtualizer_args(&self) -> VirtualizerArgs {
        VirtualizerArgs::default()
            .grid(self.grid.clone())
            .buffer_items(self.buffer_items)
            .scroll_throttle(Duration::from_millis(self.scroll_throttle_ms))
            .load_more_margin(self.load_more_margin)
    }

    /// Pexels client for this configuration.
    pub fn client(&self) -> Result<PexelsClient, ConfigError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(PexelsClient::with_base_url(
            &self.api_base_url,
            key,
            Duration::from_secs(self.request_timeout_secs),
        ))
    }
}
