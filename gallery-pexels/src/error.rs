//! Fetch failures.

use thiserror::Error;

/// Why a request to the photo source failed.
///
/// Display strings are user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP 429.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    /// HTTP 401.
    #[error("Invalid API key. Please check your configuration.")]
    Unauthorized,
    /// HTTP 404.
    #[error("Resource not found.")]
    NotFound,
    /// Any other non-success status.
    #[error("API error: {reason}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, or the code when none is known.
        reason: String,
    },
    /// The request never produced a response.
    #[error("Network error. Please check your connection.")]
    Network(String),
    /// The response body could not be decoded.
    #[error("Unexpected response from the photo service.")]
    Decode(String),
    /// The request was superseded or aborted. Never shown to users.
    #[error("Request cancelled.")]
    Cancelled,
    /// Anything else.
    #[error("An unexpected error occurred.")]
    Unexpected(String),
}

impl FetchError {
    /// Maps a non-success HTTP status to an error.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            _ => Self::Api {
                status,
                reason: ureq::http::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .map_or_else(|| status.to_string(), str::to_owned),
            },
        }
    }

    /// Whether this is a cancellation rather than a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ureq::Error> for FetchError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::StatusCode(status) => Self::from_status(status),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
