//! The seam between the stores and whatever serves photos.
use futures_util::future::BoxFuture;

use crate::{FetchError, PageRequest, PhotoDetails, PhotoPage};

/// Asynchronous photo provider.
///
/// Futures are `'static` so callers can race them against cancellation
/// without holding a borrow of the source.
pub trait PhotoSource: Send + Sync + 'static {
    /// Fetches one listing page. A request with a query searches, one
    /// without lists curated photos.
    fn get_photos(&self, request: PageRequest) -> BoxFuture<'static, Result<PhotoPage, FetchError>>;

    /// Fetches a single photo with its extended metadata.
    fn get_photo_details(&self, id: u64) -> BoxFuture<'static, Result<PhotoDetails, FetchError>>;
}
