//! Responsive grid geometry.
//!
//! ## Usage
//!
//! Resolve the column count and column width for a container width before
//! running the masonry layout.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gutter between columns and between stacked items, in pixels.
pub const DEFAULT_GUTTER: u32 = 16;

/// Smallest column width ever reported. Containers narrower than the
/// gutters of their tier resolve to this width instead of a negative one.
pub const MIN_COLUMN_WIDTH: f32 = 1.0;

/// One entry of the breakpoint table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Breakpoint {
    /// Smallest container width (inclusive) this tier applies to.
    pub min_width: u32,
    /// Column count used by this tier.
    pub columns: u32,
}

impl Breakpoint {
    /// Creates a breakpoint entry.
    pub const fn new(min_width: u32, columns: u32) -> Self {
        Self { min_width, columns }
    }
}

/// Breakpoint table and gutter used to derive [`GridDimensions`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Breakpoints in ascending `min_width` order.
    pub breakpoints: Vec<Breakpoint>,
    /// Gutter size in pixels, constant across breakpoints.
    pub gutter: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                Breakpoint::new(0, 2),
                Breakpoint::new(768, 3),
                Breakpoint::new(1024, 4),
                Breakpoint::new(1440, 5),
            ],
            gutter: DEFAULT_GUTTER,
        }
    }
}

impl GridConfig {
    /// Creates a config, sorting the breakpoints into ascending order.
    pub fn new(mut breakpoints: Vec<Breakpoint>, gutter: u32) -> Self {
        breakpoints.sort_by_key(|bp| bp.min_width);
        Self {
            breakpoints,
            gutter,
        }
    }

    /// Column count for `container_width`. Always at least one.
    pub fn column_count(&self, container_width: u32) -> usize {
        let columns = self
            .breakpoints
            .iter()
            .take_while(|bp| bp.min_width <= container_width)
            .last()
            .or_else(|| self.breakpoints.first())
            .map_or(1, |bp| bp.columns);
        (columns as usize).max(1)
    }

    /// Resolves the full geometry for `container_width`.
    pub fn dimensions(&self, container_width: u32) -> GridDimensions {
        let column_count = self.column_count(container_width);
        let total_gutter = self.gutter as f32 * (column_count - 1) as f32;
        let column_width = (container_width as f32 - total_gutter) / column_count as f32;

        GridDimensions {
            container_width,
            column_width: if column_width > 0.0 {
                column_width
            } else {
                MIN_COLUMN_WIDTH
            },
            column_count,
            gutter_size: self.gutter,
        }
    }
}

/// Resolved grid geometry for one container width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDimensions {
    /// Width of the grid container in pixels.
    pub container_width: u32,
    /// Width of every column in pixels.
    pub column_width: f32,
    /// Number of columns, at least one.
    pub column_count: usize,
    /// Gap between columns and between items in a column.
    pub gutter_size: u32,
}

impl GridDimensions {
    /// Horizontal offset of `column` from the grid origin.
    pub fn column_left(&self, column: usize) -> f32 {
        column as f32 * (self.column_width + self.gutter_size as f32)
    }
}

/// Geometry for `container_width` using the default breakpoint table.
pub fn calculate_grid_dimensions(container_width: u32) -> GridDimensions {
    GridConfig::default().dimensions(container_width)
}
