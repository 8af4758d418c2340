//! Photo source for the gallery stores, backed by the Pexels REST API.
//!
//! Responses are normalized into [`Photo`], which implements
//! [`gallery_ui::MasonryItem`] and can be laid out directly.
#![deny(clippy::unwrap_used)]

pub mod client;
pub mod error;
pub mod model;
pub mod source;

pub use client::{PEXELS_BASE_URL, PexelsClient};
pub use error::FetchError;
pub use model::{PageRequest, Photo, PhotoDetails, PhotoPage, PhotoSrc};
pub use source::PhotoSource;
