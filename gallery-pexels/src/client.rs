//! Blocking Pexels REST client.
//!
//! The HTTP calls themselves are synchronous. The [`PhotoSource`] impl moves
//! each one onto tokio's blocking pool so the stores can await it.
use std::{sync::Arc, time::Duration};

use futures_util::{FutureExt, future::BoxFuture};
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;

use crate::{
    FetchError, PageRequest, PhotoDetails, PhotoPage, PhotoSource,
    model::{PexelsPhotoDetails, PexelsResponse},
};

/// Production API root.
pub const PEXELS_BASE_URL: &str = "https://api.pexels.com/v1";

/// Default timeout for a whole request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Cheaply cloneable handle to the Pexels API.
#[derive(Clone)]
pub struct PexelsClient {
    agent: Agent,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl std::fmt::Debug for PexelsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PexelsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PexelsClient {
    /// Client against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(PEXELS_BASE_URL, api_key, DEFAULT_TIMEOUT)
    }

    /// Client against an arbitrary API root, e.g. a local mock server.
    pub fn with_base_url(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            api_key: Arc::from(api_key.into()),
        }
    }

    /// API root with no trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL and query parameters for a listing request.
    pub(crate) fn listing_target(&self, request: &PageRequest) -> (String, Vec<(&'static str, String)>) {
        let mut params = Vec::with_capacity(3);
        let path = match &request.query {
            Some(query) => {
                params.push(("query", query.clone()));
                "search"
            }
            None => "curated",
        };
        params.push(("page", request.page.to_string()));
        params.push(("per_page", request.per_page.to_string()));
        (format!("{}/{path}", self.base_url), params)
    }

    pub(crate) fn details_url(&self, id: u64) -> String {
        format!("{}/photos/{id}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", &*self.api_key);
        for (key, value) in params {
            request = request.query(*key, value);
        }
        let mut response = request.call()?;
        let body = response.body_mut().read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches one listing page on the current thread.
    pub fn fetch_page_blocking(&self, request: &PageRequest) -> Result<PhotoPage, FetchError> {
        let (url, params) = self.listing_target(request);
        let response: PexelsResponse = self.get_json(&url, &params)?;
        let page = PhotoPage::from(response);
        debug!(
            "Received {} photos from {url} ({} total, has more: {})",
            page.photos.len(),
            page.total_results,
            page.has_more
        );
        Ok(page)
    }

    /// Fetches one photo's details on the current thread.
    pub fn fetch_photo_details_blocking(&self, id: u64) -> Result<PhotoDetails, FetchError> {
        let raw: PexelsPhotoDetails = self.get_json(&self.details_url(id), &[])?;
        Ok(PhotoDetails::from(raw))
    }
}

fn run_blocking<T, F>(job: F) -> BoxFuture<'static, Result<T, FetchError>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, FetchError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .map(|joined| match joined {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(FetchError::Cancelled),
            Err(err) => Err(FetchError::Unexpected(err.to_string())),
        })
        .boxed()
}

impl PhotoSource for PexelsClient {
    fn get_photos(&self, request: PageRequest) -> BoxFuture<'static, Result<PhotoPage, FetchError>> {
        let client = self.clone();
        run_blocking(move || client.fetch_page_blocking(&request))
    }

    fn get_photo_details(&self, id: u64) -> BoxFuture<'static, Result<PhotoDetails, FetchError>> {
        let client = self.clone();
        run_blocking(move || client.fetch_photo_details_blocking(id))
    }
}
