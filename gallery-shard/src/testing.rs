use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures_util::{FutureExt, future::BoxFuture};
use gallery_pexels::{
    FetchError, PageRequest, Photo, PhotoDetails, PhotoPage, PhotoSource, PhotoSrc,
};
use parking_lot::Mutex;

pub(crate) fn photo(id: u64) -> Photo {
    let (width, height) = match id % 3 {
        0 => (400, 300),
        1 => (300, 400),
        _ => (400, 400),
    };
    let url = |size: &str| format!("https://images.test/{id}/{size}.jpg");
    Photo {
        id,
        width,
        height,
        aspect_ratio: width as f32 / height as f32,
        src: PhotoSrc {
            tiny: url("tiny"),
            small: url("small"),
            medium: url("medium"),
            large: url("large"),
            original: url("original"),
        },
        photographer: "Test Photographer".to_string(),
        photographer_url: "https://photographers.test/1".to_string(),
        alt: format!("Test photo {id}"),
        avg_color: "#ffffff".to_string(),
        blur_hash: None,
    }
}

pub(crate) fn details(id: u64) -> PhotoDetails {
    PhotoDetails {
        photo: photo(id),
        tags: vec!["nature".to_string(), "landscape".to_string()],
        description: "A beautiful landscape".to_string(),
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
    }
}

/// In-memory source serving `total` numbered photos.
pub(crate) struct MockSource {
    total: u64,
    latency: Mutex<Duration>,
    failure: Mutex<Option<FetchError>>,
    requests: Mutex<Vec<PageRequest>>,
    details: Mutex<HashMap<u64, PhotoDetails>>,
    details_requests: AtomicUsize,
}

impl MockSource {
    pub(crate) fn new(total: u64) -> Arc<Self> {
        Arc::new(Self {
            total,
            latency: Mutex::new(Duration::ZERO),
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            details: Mutex::new(HashMap::new()),
            details_requests: AtomicUsize::new(0),
        })
    }

    /// Applies to requests started after the call.
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub(crate) fn fail_with(&self, err: FetchError) {
        *self.failure.lock() = Some(err);
    }

    pub(crate) fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    pub(crate) fn add_details(&self, details: PhotoDetails) {
        self.details.lock().insert(details.photo.id, details);
    }

    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn details_requests(&self) -> usize {
        self.details_requests.load(Ordering::SeqCst)
    }

    fn respond<T: Send + 'static>(
        &self,
        result: Result<T, FetchError>,
    ) -> BoxFuture<'static, Result<T, FetchError>> {
        let latency = *self.latency.lock();
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
        .boxed()
    }
}

impl PhotoSource for MockSource {
    fn get_photos(&self, request: PageRequest) -> BoxFuture<'static, Result<PhotoPage, FetchError>> {
        self.requests.lock().push(request.clone());
        if let Some(err) = self.failure.lock().clone() {
            return self.respond(Err(err));
        }
        let start = u64::from(request.page.saturating_sub(1)) * u64::from(request.per_page);
        let end = (start + u64::from(request.per_page)).min(self.total);
        let page = PhotoPage {
            photos: (start + 1..=end).map(photo).collect(),
            has_more: end < self.total,
            total_results: self.total,
        };
        self.respond(Ok(page))
    }

    fn get_photo_details(&self, id: u64) -> BoxFuture<'static, Result<PhotoDetails, FetchError>> {
        self.details_requests.fetch_add(1, Ordering::SeqCst);
        let result = self
            .details
            .lock()
            .get(&id)
            .cloned()
            .ok_or(FetchError::NotFound);
        self.respond(result)
    }
}
