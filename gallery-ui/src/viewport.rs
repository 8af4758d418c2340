//! Viewport window selection.
//!
//! ## Usage
//!
//! Pick the positioned items that intersect the scroll window plus a buffer,
//! and detect when the window approaches the end of the content.

use crate::masonry::PositionedItem;

/// Pixel estimate for one buffer item. Buffers are expressed in items but
/// applied as `buffer_items * BUFFER_ITEM_ESTIMATE_PX`.
pub const BUFFER_ITEM_ESTIMATE_PX: f32 = 100.0;

/// Buffer used by the virtualization controller unless configured otherwise.
pub const DEFAULT_BUFFER_ITEMS: usize = 5;

/// Distance from the end of the content at which more data is requested.
pub const DEFAULT_LOAD_MORE_MARGIN: f32 = 800.0;

/// Scroll window extended by a buffer on both sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportWindow {
    /// Scroll offset of the viewport's top edge.
    pub scroll_top: f32,
    /// Height of the viewport.
    pub viewport_height: f32,
    /// Buffer size in items.
    pub buffer_items: usize,
}

impl ViewportWindow {
    /// Creates a window.
    pub fn new(scroll_top: f32, viewport_height: f32, buffer_items: usize) -> Self {
        Self {
            scroll_top,
            viewport_height,
            buffer_items,
        }
    }

    /// Buffer converted to pixels.
    pub fn buffer_px(&self) -> f32 {
        self.buffer_items as f32 * BUFFER_ITEM_ESTIMATE_PX
    }

    /// Upper edge of the extended window.
    pub fn top(&self) -> f32 {
        self.scroll_top - self.buffer_px()
    }

    /// Lower edge of the extended window.
    pub fn bottom(&self) -> f32 {
        self.scroll_top + self.viewport_height + self.buffer_px()
    }

    /// Whether a vertical extent touches the extended window. Both edges are
    /// inclusive.
    pub fn intersects(&self, top: f32, height: f32) -> bool {
        top + height >= self.top() && top <= self.bottom()
    }
}

/// Items whose vertical extent intersects the extended window, in input order.
pub fn get_visible_items<T>(
    items: &[PositionedItem<T>],
    scroll_top: f32,
    viewport_height: f32,
    buffer_items: usize,
) -> Vec<&PositionedItem<T>> {
    let window = ViewportWindow::new(scroll_top, viewport_height, buffer_items);
    items
        .iter()
        .filter(|item| window.intersects(item.top, item.height))
        .collect()
}

/// Whether the end-of-content sentinel at `total_height` is within `margin`
/// of the viewport's bottom edge.
pub fn is_near_end(total_height: f32, scroll_top: f32, viewport_height: f32, margin: f32) -> bool {
    total_height <= scroll_top + viewport_height + margin
}

/// Item positions per column, in stacking order.
///
/// Within one column the items are stacked, so both their tops and bottoms
/// are non-decreasing. That lets window queries binary-search each column
/// instead of scanning the whole layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    columns: Vec<Vec<usize>>,
    len: usize,
}

impl ColumnIndex {
    /// Builds the index for a layout with `column_count` columns.
    pub fn build<T>(items: &[PositionedItem<T>], column_count: usize) -> Self {
        let mut columns = vec![Vec::new(); column_count.max(1)];
        for (position, item) in items.iter().enumerate() {
            if item.column >= columns.len() {
                columns.resize_with(item.column + 1, Vec::new);
            }
            columns[item.column].push(position);
        }
        Self {
            columns,
            len: items.len(),
        }
    }

    /// Number of indexed columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Indices of the items intersecting `window`, sorted ascending.
    ///
    /// Matches [`get_visible_items`] on the layout the index was built from.
    /// A slice of any other length yields an empty selection.
    pub fn select<T>(&self, items: &[PositionedItem<T>], window: &ViewportWindow) -> Vec<usize> {
        if items.len() != self.len {
            return Vec::new();
        }
        let window_top = window.top();
        let window_bottom = window.bottom();
        let mut selected = Vec::new();

        for column in &self.columns {
            let first = column.partition_point(|&position| items[position].bottom() < window_top);
            selected.extend(
                column[first..]
                    .iter()
                    .map(|&position| &items[position])
                    .take_while(|item| item.top <= window_bottom)
                    .map(|item| item.index),
            );
        }

        selected.sort_unstable();
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::GridDimensions,
        masonry::{calculate_masonry_layout, tests::tiles},
    };

    fn stacked() -> Vec<PositionedItem<()>> {
        [0.0, 300.0, 600.0, 900.0]
            .into_iter()
            .enumerate()
            .map(|(index, top)| PositionedItem {
                index,
                item: (),
                column: 0,
                top,
                left: 0.0,
                width: 200.0,
                height: 200.0,
            })
            .collect()
    }

    fn indices(items: &[&PositionedItem<()>]) -> Vec<usize> {
        items.iter().map(|item| item.index).collect()
    }

    #[test]
    fn selects_items_intersecting_viewport() {
        let items = stacked();
        let visible = get_visible_items(&items, 400.0, 300.0, 0);
        assert_eq!(indices(&visible), vec![1, 2]);
    }

    #[test]
    fn buffer_extends_window_inclusively() {
        let items = stacked();
        // window [200, 900]: item 0 ends exactly at 200, item 3 starts at 900
        let visible = get_visible_items(&items, 400.0, 300.0, 2);
        assert_eq!(indices(&visible), vec![0, 1, 2, 3]);
    }

    #[test]
    fn touching_edges_are_included() {
        let items = stacked();
        // window [500, 600]: item 1 ends at 500, item 2 starts at 600
        let visible = get_visible_items(&items, 500.0, 100.0, 0);
        assert_eq!(indices(&visible), vec![1, 2]);
    }

    #[test]
    fn scroll_at_top_and_out_of_range() {
        let items = stacked();
        assert_eq!(indices(&get_visible_items(&items, 0.0, 500.0, 0)), vec![0, 1]);
        assert!(get_visible_items(&items, 2000.0, 100.0, 0).is_empty());
        assert!(get_visible_items::<()>(&[], 0.0, 100.0, 0).is_empty());
    }

    #[test]
    fn horizontal_position_is_ignored() {
        let mut items = stacked();
        items[2].left = 10_000.0;
        items[2].column = 7;
        assert_eq!(indices(&get_visible_items(&items, 400.0, 300.0, 0)), vec![1, 2]);
    }

    #[test]
    fn selection_is_ordered_subsequence() {
        let geometry = GridDimensions {
            container_width: 632,
            column_width: 200.0,
            column_count: 3,
            gutter_size: 16,
        };
        let ratios: Vec<f32> = (0..40).map(|i| 0.5 + (i % 7) as f32 * 0.25).collect();
        let items = calculate_masonry_layout(&tiles(&ratios), &geometry).unwrap();

        for scroll in [0.0, 350.0, 1200.0, 2400.0] {
            let visible = get_visible_items(&items, scroll, 600.0, 1);
            let picked: Vec<usize> = visible.iter().map(|item| item.index).collect();
            assert!(picked.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn column_index_matches_linear_scan() {
        let geometry = GridDimensions {
            container_width: 1000,
            column_width: 188.8,
            column_count: 5,
            gutter_size: 14,
        };
        let ratios: Vec<f32> = (0..250).map(|i| 0.4 + ((i * 37) % 19) as f32 * 0.1).collect();
        let items = calculate_masonry_layout(&tiles(&ratios), &geometry).unwrap();
        let index = ColumnIndex::build(&items, geometry.column_count);
        assert_eq!(index.column_count(), 5);

        for scroll in [0.0, 123.0, 999.5, 4000.0, 9000.0, 50_000.0] {
            for buffer in [0, 2, 5] {
                let window = ViewportWindow::new(scroll, 720.0, buffer);
                let expected: Vec<usize> = get_visible_items(&items, scroll, 720.0, buffer)
                    .iter()
                    .map(|item| item.index)
                    .collect();
                assert_eq!(index.select(&items, &window), expected, "scroll {scroll}");
            }
        }
    }

    #[test]
    fn column_index_rejects_foreign_layout() {
        let items = stacked();
        let index = ColumnIndex::build(&items, 1);
        let window = ViewportWindow::new(0.0, 2000.0, 0);
        assert_eq!(index.select(&items, &window), vec![0, 1, 2, 3]);
        assert!(index.select(&items[..2], &window).is_empty());

        let mut shifted = stacked();
        for item in &mut shifted {
            item.index += 10;
        }
        let index = ColumnIndex::build(&shifted, 1);
        assert_eq!(index.select(&shifted, &window), vec![10, 11, 12, 13]);
    }

    #[test]
    fn near_end_is_inclusive() {
        assert!(is_near_end(1800.0, 200.0, 800.0, 800.0));
        assert!(!is_near_end(1801.0, 200.0, 800.0, 800.0));
        assert!(is_near_end(0.0, 0.0, 800.0, DEFAULT_LOAD_MORE_MARGIN));
    }
}
