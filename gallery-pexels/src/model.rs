//! Normalized photo model and the Pexels wire format it is built from.
use gallery_ui::MasonryItem;
use serde::{Deserialize, Serialize};

/// Image URLs at the sizes the gallery uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSrc {
    pub tiny: String,
    pub small: String,
    pub medium: String,
    pub large: String,
    pub original: String,
}

impl PhotoSrc {
    /// Smallest rendition that still looks sharp in a container of the given
    /// width.
    pub fn optimal_for(&self, container_width: f32) -> &str {
        if container_width <= 350.0 {
            &self.small
        } else if container_width <= 650.0 {
            &self.medium
        } else if container_width <= 1280.0 {
            &self.large
        } else {
            &self.original
        }
    }
}

/// A photo as laid out by the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// `width / height`.
    pub aspect_ratio: f32,
    pub src: PhotoSrc,
    pub photographer: String,
    pub photographer_url: String,
    pub alt: String,
    pub avg_color: String,
    pub blur_hash: Option<String>,
}

impl MasonryItem for Photo {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }

    fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

/// A photo with the extra metadata shown in the detail overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoDetails {
    pub photo: Photo,
    pub tags: Vec<String>,
    pub description: String,
    /// Creation timestamp as reported by the service, if any.
    pub created_at: Option<String>,
}

/// One page of a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Search text. `None` lists curated photos.
    pub query: Option<String>,
}

impl PageRequest {
    /// Curated listing page.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            query: None,
        }
    }

    /// Sets the search text. Whitespace-only text means no filter.
    pub fn with_query(mut self, query: &str) -> Self {
        let trimmed = query.trim();
        self.query = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPage {
    pub photos: Vec<Photo>,
    /// Whether the service reported a next page.
    ///
    /// Informational only. `PhotoStore` derives its own `has_more` from the
    /// page number, page size and `total_results`.
    pub has_more: bool,
    pub total_results: u64,
}

// Unlisted wire fields are ignored on decode.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PexelsSrc {
    pub original: String,
    pub large: String,
    pub medium: String,
    pub small: String,
    pub tiny: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PexelsPhoto {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub photographer: String,
    pub photographer_url: String,
    #[serde(default)]
    pub avg_color: Option<String>,
    pub src: PexelsSrc,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PexelsPhotoDetails {
    #[serde(flatten)]
    pub photo: PexelsPhoto,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PexelsResponse {
    pub photos: Vec<PexelsPhoto>,
    pub total_results: u64,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl From<PexelsPhoto> for Photo {
    fn from(photo: PexelsPhoto) -> Self {
        let alt = match photo.alt {
            Some(alt) if !alt.is_empty() => alt,
            _ => format!("Photo by {}", photo.photographer),
        };
        Self {
            id: photo.id,
            width: photo.width,
            height: photo.height,
            aspect_ratio: photo.width as f32 / photo.height as f32,
            src: PhotoSrc {
                tiny: photo.src.tiny,
                small: photo.src.small,
                medium: photo.src.medium,
                large: photo.src.large,
                original: photo.src.original,
            },
            photographer: photo.photographer,
            photographer_url: photo.photographer_url,
            alt,
            avg_color: photo.avg_color.unwrap_or_default(),
            blur_hash: None,
        }
    }
}

impl From<PexelsPhotoDetails> for PhotoDetails {
    fn from(details: PexelsPhotoDetails) -> Self {
        let photo = Photo::from(details.photo);
        let description = details
            .description
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| photo.alt.clone());
        Self {
            photo,
            tags: details.tags,
            description,
            created_at: details.created_at,
        }
    }
}

impl From<PexelsResponse> for PhotoPage {
    fn from(response: PexelsResponse) -> Self {
        Self {
            has_more: response.next_page.is_some(),
            total_results: response.total_results,
            photos: response.photos.into_iter().map(Photo::from).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PHOTO_JSON: &str = r##"{
        "id": 2014422,
        "width": 3024,
        "height": 3024,
        "url": "https://www.pexels.com/photo/2014422/",
        "photographer": "Joey Farina",
        "photographer_url": "https://www.pexels.com/@joey",
        "photographer_id": 680589,
        "avg_color": "#978E82",
        "src": {
            "original": "https://images.pexels.com/photos/2014422/original.jpeg",
            "large2x": "https://images.pexels.com/photos/2014422/large2x.jpeg",
            "large": "https://images.pexels.com/photos/2014422/large.jpeg",
            "medium": "https://images.pexels.com/photos/2014422/medium.jpeg",
            "small": "https://images.pexels.com/photos/2014422/small.jpeg",
            "portrait": "https://images.pexels.com/photos/2014422/portrait.jpeg",
            "landscape": "https://images.pexels.com/photos/2014422/landscape.jpeg",
            "tiny": "https://images.pexels.com/photos/2014422/tiny.jpeg"
        },
        "liked": false,
        "alt": ""
    }"##;

    fn sample_photo() -> Photo {
        let raw: PexelsPhoto = serde_json::from_str(PHOTO_JSON).unwrap();
        Photo::from(raw)
    }

    #[test]
    fn normalizes_wire_photo() {
        let photo = sample_photo();
        assert_eq!(photo.id, 2014422);
        assert_eq!(photo.aspect_ratio, 1.0);
        assert_eq!(photo.alt, "Photo by Joey Farina");
        assert_eq!(photo.avg_color, "#978E82");
        assert_eq!(photo.photographer_url, "https://www.pexels.com/@joey");
        assert!(photo.src.tiny.ends_with("tiny.jpeg"));
        assert_eq!(MasonryItem::id(&photo), 2014422);
    }

    #[test]
    fn details_fall_back_to_alt_text() {
        let raw: PexelsPhotoDetails = serde_json::from_str(PHOTO_JSON).unwrap();
        let details = PhotoDetails::from(raw);
        assert!(details.tags.is_empty());
        assert_eq!(details.description, "Photo by Joey Farina");
        assert_eq!(details.created_at, None);
    }

    #[test]
    fn listing_has_more_follows_next_page() {
        let body = format!(
            r#"{{"photos": [{PHOTO_JSON}], "page": 1, "per_page": 1, "total_results": 80,
                "next_page": "https://api.pexels.com/v1/curated?page=2"}}"#
        );
        let page = PhotoPage::from(serde_json::from_str::<PexelsResponse>(&body).unwrap());
        assert!(page.has_more);
        assert_eq!(page.total_results, 80);
        assert_eq!(page.photos.len(), 1);

        let last = r#"{"photos": [], "page": 4, "per_page": 20, "total_results": 80}"#;
        let page = PhotoPage::from(serde_json::from_str::<PexelsResponse>(last).unwrap());
        assert!(!page.has_more);
    }

    #[test]
    fn picks_rendition_by_container_width() {
        let src = sample_photo().src;
        assert_eq!(src.optimal_for(300.0), src.small);
        assert_eq!(src.optimal_for(650.0), src.medium);
        assert_eq!(src.optimal_for(1000.0), src.large);
        assert_eq!(src.optimal_for(1920.0), src.original);
    }

    #[test]
    fn blank_query_means_curated() {
        assert_eq!(PageRequest::new(1, 40).with_query("   ").query, None);
        assert_eq!(
            PageRequest::new(2, 40).with_query("  ocean ").query.as_deref(),
            Some("ocean")
        );
    }
}
