//! Virtualization controller.
//!
//! ## Usage
//!
//! Feed container width, item sequence, scroll offset and viewport height
//! into one controller and render its visible items. Geometry and layout are
//! recomputed only when their inputs change; scroll ticks only rerun the
//! window query.
use derive_setters::Setters;
use tracing::debug;
use web_time::{Duration, Instant};

use crate::{
    error::LayoutError,
    geometry::{GridConfig, GridDimensions},
    masonry::{
        AspectRatioPolicy, MasonryItem, PositionedItem, calculate_grid_height,
        calculate_masonry_layout_with,
    },
    timing::{FRAME_INTERVAL, Throttle},
    viewport::{
        ColumnIndex, DEFAULT_BUFFER_ITEMS, DEFAULT_LOAD_MORE_MARGIN, ViewportWindow, is_near_end,
    },
};

/// Configuration for a [`VirtualizationController`].
#[derive(Clone, Debug, Setters)]
pub struct VirtualizerArgs {
    /// Breakpoint table and gutter.
    pub grid: GridConfig,
    /// Items kept around the viewport, see
    /// [`BUFFER_ITEM_ESTIMATE_PX`](crate::viewport::BUFFER_ITEM_ESTIMATE_PX).
    pub buffer_items: usize,
    /// Minimum time between effective scroll updates.
    pub scroll_throttle: Duration,
    /// Treatment of items with invalid aspect ratios.
    pub aspect_ratio_policy: AspectRatioPolicy,
    /// Viewport height used until the first resize event.
    pub viewport_height: f32,
    /// Proximity margin for [`VirtualizationController::is_near_end`].
    pub load_more_margin: f32,
}

impl Default for VirtualizerArgs {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            buffer_items: DEFAULT_BUFFER_ITEMS,
            scroll_throttle: FRAME_INTERVAL,
            aspect_ratio_policy: AspectRatioPolicy::for_build(),
            viewport_height: 0.0,
            load_more_margin: DEFAULT_LOAD_MORE_MARGIN,
        }
    }
}

/// How often each derived value has been recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    /// Geometry recomputations.
    pub geometry: u64,
    /// Full layout recomputations.
    pub layout: u64,
    /// Visible window recomputations.
    pub window: u64,
}

/// Layout computed for one (items, geometry) pair.
struct LayoutCache<T: MasonryItem> {
    ids: Vec<T::Id>,
    items: Vec<PositionedItem<T>>,
    columns: ColumnIndex,
    total_height: f32,
}

impl<T: MasonryItem> Default for LayoutCache<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            items: Vec::new(),
            columns: ColumnIndex::default(),
            total_height: 0.0,
        }
    }
}

/// Memoizing coordinator between the layout engine and the renderer.
///
/// Three inputs drive recomputation:
///
/// - container width: geometry, then layout, then window
/// - item sequence: layout, then window
/// - scroll offset or viewport height: window only
///
/// A failed recomputation leaves every cached value and input untouched.
pub struct VirtualizationController<T: MasonryItem> {
    grid: GridConfig,
    buffer_items: usize,
    policy: AspectRatioPolicy,
    load_more_margin: f32,
    throttle: Throttle,
    dimensions: GridDimensions,
    source: Vec<T>,
    layout: LayoutCache<T>,
    scroll_top: f32,
    viewport_height: f32,
    visible: Vec<usize>,
    stats: RecomputeStats,
}

impl<T> Default for VirtualizationController<T>
where
    T: MasonryItem + Clone,
{
    fn default() -> Self {
        Self::new(VirtualizerArgs::default())
    }
}

impl<T> VirtualizationController<T>
where
    T: MasonryItem + Clone,
{
    /// Creates a controller with a zero-width container and no items.
    pub fn new(args: VirtualizerArgs) -> Self {
        let dimensions = args.grid.dimensions(0);
        Self {
            grid: args.grid,
            buffer_items: args.buffer_items,
            policy: args.aspect_ratio_policy,
            load_more_margin: args.load_more_margin,
            throttle: Throttle::new(args.scroll_throttle),
            dimensions,
            source: Vec::new(),
            layout: LayoutCache::default(),
            scroll_top: 0.0,
            viewport_height: args.viewport_height.max(0.0),
            visible: Vec::new(),
            stats: RecomputeStats {
                geometry: 1,
                ..RecomputeStats::default()
            },
        }
    }

    /// Applies a new container width.
    ///
    /// Returns `Ok(false)` when the width is unchanged.
    pub fn on_container_width_change(&mut self, container_width: u32) -> Result<bool, LayoutError> {
        if container_width == self.dimensions.container_width {
            return Ok(false);
        }
        let dimensions = self.grid.dimensions(container_width);
        debug!(
            "Grid geometry changed: width {container_width}, {} columns",
            dimensions.column_count
        );

        let layout = self.compute_layout(&self.source, &dimensions)?;
        self.dimensions = dimensions;
        self.stats.geometry += 1;
        self.commit_layout(layout);
        Ok(true)
    }

    /// Replaces the item sequence.
    ///
    /// The layout is recomputed only when the identity sequence differs from
    /// the current one. Returns `Ok(false)` when nothing changed.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<bool, LayoutError> {
        let unchanged = items.len() == self.layout.ids.len()
            && items.iter().zip(&self.layout.ids).all(|(item, id)| item.id() == *id);
        if unchanged {
            self.source = items;
            return Ok(false);
        }

        let layout = self.compute_layout(&items, &self.dimensions)?;
        debug!("Item sequence changed, {} items", items.len());
        self.source = items;
        self.commit_layout(layout);
        Ok(true)
    }

    /// Applies a scroll offset, subject to the scroll throttle.
    ///
    /// Returns whether the offset was applied.
    pub fn on_scroll(&mut self, scroll_top: f32) -> bool {
        self.on_scroll_at(scroll_top, Instant::now())
    }

    /// [`on_scroll`](Self::on_scroll) with an explicit timestamp.
    pub fn on_scroll_at(&mut self, scroll_top: f32, now: Instant) -> bool {
        let Some(scroll_top) = self.throttle.invoke_at(scroll_top.max(0.0), now) else {
            return false;
        };
        if scroll_top != self.scroll_top {
            self.scroll_top = scroll_top;
            self.recompute_window();
        }
        true
    }

    /// Applies a new viewport height.
    pub fn on_resize(&mut self, viewport_height: f32) -> bool {
        let viewport_height = viewport_height.max(0.0);
        if viewport_height == self.viewport_height {
            return false;
        }
        self.viewport_height = viewport_height;
        self.recompute_window();
        true
    }

    /// Positioned items in the current window, in input order.
    pub fn visible_items(&self) -> impl ExactSizeIterator<Item = &PositionedItem<T>> + '_ {
        self.visible.iter().map(|&index| &self.layout.items[index])
    }

    /// Input indices of the items in the current window.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Every positioned item.
    pub fn layout(&self) -> &[PositionedItem<T>] {
        &self.layout.items
    }

    /// Current item sequence.
    pub fn items(&self) -> &[T] {
        &self.source
    }

    /// Current grid geometry.
    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    /// Content height in pixels.
    pub fn total_height(&self) -> f32 {
        self.layout.total_height
    }

    /// Content height rounded up to whole pixels, for sizing the scroll
    /// container.
    pub fn content_height(&self) -> u32 {
        self.layout.total_height.ceil() as u32
    }

    /// Applied scroll offset.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Applied viewport height.
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Current extended window.
    pub fn window(&self) -> ViewportWindow {
        ViewportWindow::new(self.scroll_top, self.viewport_height, self.buffer_items)
    }

    /// Whether the viewport is within the load-more margin of the end of
    /// the content.
    pub fn is_near_end(&self) -> bool {
        is_near_end(
            self.layout.total_height,
            self.scroll_top,
            self.viewport_height,
            self.load_more_margin,
        )
    }

    /// Recompute counters.
    pub fn stats(&self) -> RecomputeStats {
        self.stats
    }

    fn compute_layout(
        &self,
        items: &[T],
        dimensions: &GridDimensions,
    ) -> Result<LayoutCache<T>, LayoutError> {
        let positioned = calculate_masonry_layout_with(items, dimensions, self.policy)?;
        let columns = ColumnIndex::build(&positioned, dimensions.column_count);
        Ok(LayoutCache {
            ids: items.iter().map(MasonryItem::id).collect(),
            total_height: calculate_grid_height(&positioned),
            items: positioned,
            columns,
        })
    }

    fn commit_layout(&mut self, layout: LayoutCache<T>) {
        self.layout = layout;
        self.stats.layout += 1;
        self.recompute_window();
    }

    fn recompute_window(&mut self) {
        let window = self.window();
        self.visible = self.layout.columns.select(&self.layout.items, &window);
        self.stats.window += 1;
    }
}
