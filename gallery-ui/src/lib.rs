//! Masonry layout and viewport virtualization for photo galleries.
//!
//! # Pipeline
//!
//! ```text
//! container width ──> GridDimensions ─┐
//!                                     ├─> positioned items ──> visible items
//! item sequence ──────────────────────┘         ▲
//!                             scroll offset, viewport height
//! ```
//!
//! The pure stages are [`calculate_grid_dimensions`],
//! [`calculate_masonry_layout`] and [`get_visible_items`].
//! [`VirtualizationController`] memoizes them so that scrolling never reruns
//! the layout.
//!
//! ```
//! use gallery_ui::{MasonryItem, VirtualizationController, VirtualizerArgs};
//!
//! #[derive(Clone)]
//! struct Tile(u32, f32);
//!
//! impl MasonryItem for Tile {
//!     type Id = u32;
//!
//!     fn id(&self) -> u32 {
//!         self.0
//!     }
//!
//!     fn aspect_ratio(&self) -> f32 {
//!         self.1
//!     }
//! }
//!
//! let mut grid = VirtualizationController::new(VirtualizerArgs::default().viewport_height(800.0));
//! grid.on_container_width_change(1280).unwrap();
//! grid.set_items((0..100).map(|i| Tile(i, 1.5)).collect()).unwrap();
//! grid.on_scroll(2400.0);
//!
//! for item in grid.visible_items() {
//!     println!("{} at ({}, {})", item.index, item.left, item.top);
//! }
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod controller;
pub mod error;
pub mod geometry;
pub mod masonry;
pub mod timing;
pub mod viewport;

pub use controller::{RecomputeStats, VirtualizationController, VirtualizerArgs};
pub use error::LayoutError;
pub use geometry::{Breakpoint, GridConfig, GridDimensions, calculate_grid_dimensions};
pub use masonry::{
    AspectRatioPolicy, MasonryItem, PositionedItem, calculate_grid_height,
    calculate_masonry_layout, calculate_masonry_layout_with, group_items_by_column,
};
pub use timing::Throttle;
pub use viewport::{ColumnIndex, ViewportWindow, get_visible_items, is_near_end};
