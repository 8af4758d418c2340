//! Errors raised by the layout engine.

use thiserror::Error;

/// Input violations detected while computing a masonry layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// An item reported an aspect ratio that is zero, negative, or not finite.
    #[error("item {index} has invalid aspect ratio {aspect_ratio}")]
    InvalidAspectRatio {
        /// Position of the offending item in the input sequence.
        index: usize,
        /// The rejected ratio.
        aspect_ratio: f32,
    },
}
