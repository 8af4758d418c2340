//! Masonry layout engine.
//!
//! ## Usage
//!
//! Place items with known aspect ratios into the shortest column of a
//! [`GridDimensions`], producing absolute positions for every item.
use std::{collections::BTreeMap, fmt::Debug, hash::Hash, sync::Arc};

use smallvec::SmallVec;
use tracing::warn;

use crate::{error::LayoutError, geometry::GridDimensions};

/// Aspect ratio substituted for invalid items under [`AspectRatioPolicy::Clamp`].
pub const MIN_ASPECT_RATIO: f32 = 0.05;

/// An item that can be placed in a masonry grid.
pub trait MasonryItem {
    /// Stable identity of the item.
    type Id: Clone + Eq + Hash + Debug;

    /// Returns the item's identity.
    fn id(&self) -> Self::Id;

    /// Intrinsic width / height ratio. Expected to be finite and positive.
    fn aspect_ratio(&self) -> f32;
}

impl<T: MasonryItem + ?Sized> MasonryItem for Arc<T> {
    type Id = T::Id;

    fn id(&self) -> Self::Id {
        (**self).id()
    }

    fn aspect_ratio(&self) -> f32 {
        (**self).aspect_ratio()
    }
}

/// How the engine treats items whose aspect ratio is not finite and positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AspectRatioPolicy {
    /// Reject the whole layout with [`LayoutError::InvalidAspectRatio`].
    #[default]
    Strict,
    /// Substitute [`MIN_ASPECT_RATIO`] and log a warning.
    Clamp,
}

impl AspectRatioPolicy {
    /// Strict in debug builds, clamping in release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Clamp
        }
    }

    fn resolve(self, index: usize, aspect_ratio: f32) -> Result<f32, LayoutError> {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            return Ok(aspect_ratio);
        }
        match self {
            Self::Strict => Err(LayoutError::InvalidAspectRatio {
                index,
                aspect_ratio,
            }),
            Self::Clamp => {
                warn!("Clamping invalid aspect ratio {aspect_ratio} of item {index}");
                Ok(MIN_ASPECT_RATIO)
            }
        }
    }
}

/// An item with its resolved position in the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedItem<T> {
    /// Position in the input sequence.
    pub index: usize,
    /// The positioned item.
    pub item: T,
    /// Assigned column.
    pub column: usize,
    /// Offset from the top of the grid.
    pub top: f32,
    /// Offset from the left of the grid.
    pub left: f32,
    /// Column width.
    pub width: f32,
    /// Height derived from the aspect ratio.
    pub height: f32,
}

impl<T> PositionedItem<T> {
    /// Bottom edge of the item.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Running bottom edge of every column.
struct ColumnHeights {
    heights: SmallVec<[f32; 8]>,
}

impl ColumnHeights {
    fn new(column_count: usize) -> Self {
        Self {
            heights: SmallVec::from_elem(0.0, column_count.max(1)),
        }
    }

    /// Leftmost of the shortest columns.
    fn shortest(&self) -> usize {
        let mut index = 0;
        let mut best = self.heights[0];
        for (i, height) in self.heights.iter().enumerate().skip(1) {
            if *height < best {
                best = *height;
                index = i;
            }
        }
        index
    }

    fn push(&mut self, column: usize, extent: f32) -> f32 {
        let top = self.heights[column];
        self.heights[column] = top + extent;
        top
    }
}

/// Lays out `items` with [`AspectRatioPolicy::Strict`].
pub fn calculate_masonry_layout<T>(
    items: &[T],
    dimensions: &GridDimensions,
) -> Result<Vec<PositionedItem<T>>, LayoutError>
where
    T: MasonryItem + Clone,
{
    calculate_masonry_layout_with(items, dimensions, AspectRatioPolicy::Strict)
}

/// Lays out `items` in input order, each into the currently shortest column.
///
/// Ties go to the lowest column index. The result is index-aligned with
/// `items`; on error nothing is returned.
pub fn calculate_masonry_layout_with<T>(
    items: &[T],
    dimensions: &GridDimensions,
    policy: AspectRatioPolicy,
) -> Result<Vec<PositionedItem<T>>, LayoutError>
where
    T: MasonryItem + Clone,
{
    let column_width = dimensions.column_width;
    let gutter = dimensions.gutter_size as f32;
    let mut columns = ColumnHeights::new(dimensions.column_count);
    let mut positioned = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let aspect_ratio = policy.resolve(index, item.aspect_ratio())?;
        let column = columns.shortest();
        let height = column_width / aspect_ratio;
        let top = columns.push(column, height + gutter);

        positioned.push(PositionedItem {
            index,
            item: item.clone(),
            column,
            top,
            left: dimensions.column_left(column),
            width: column_width,
            height,
        });
    }

    Ok(positioned)
}

/// Total content height: the lowest bottom edge, or zero when empty.
pub fn calculate_grid_height<T>(items: &[PositionedItem<T>]) -> f32 {
    items
        .iter()
        .map(PositionedItem::bottom)
        .fold(0.0, f32::max)
}

/// Groups positioned items by column, keeping input order within a column.
pub fn group_items_by_column<T>(items: &[PositionedItem<T>]) -> BTreeMap<usize, Vec<&PositionedItem<T>>> {
    let mut columns: BTreeMap<usize, Vec<&PositionedItem<T>>> = BTreeMap::new();
    for item in items {
        columns.entry(item.column).or_default().push(item);
    }
    columns
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct Tile {
        pub(crate) id: u32,
        pub(crate) ratio: f32,
    }

    impl MasonryItem for Tile {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn aspect_ratio(&self) -> f32 {
            self.ratio
        }
    }

    pub(crate) fn tiles(ratios: &[f32]) -> Vec<Tile> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, ratio)| Tile {
                id: i as u32,
                ratio: *ratio,
            })
            .collect()
    }

    fn dims(column_width: f32, column_count: usize, gutter_size: u32) -> GridDimensions {
        GridDimensions {
            container_width: (column_width * column_count as f32) as u32
                + gutter_size * (column_count as u32 - 1),
            column_width,
            column_count,
            gutter_size,
        }
    }

    /// Deterministic ratio generator in `[0.3, 2.3)`.
    fn pseudo_ratios(seed: u64, count: usize) -> Vec<f32> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                0.3 + ((state >> 33) % 2000) as f32 / 1000.0
            })
            .collect()
    }

    #[test]
    fn first_row_fills_columns_left_to_right() {
        let items = calculate_masonry_layout(&tiles(&[4.0 / 3.0, 3.0 / 4.0, 1.0]), &dims(250.0, 3, 16))
            .unwrap();

        assert_eq!(items.len(), 3);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.index, i);
            assert_eq!(item.column, i);
            assert_eq!(item.top, 0.0);
            assert_eq!(item.width, 250.0);
        }
        assert_eq!(items[0].left, 0.0);
        assert_eq!(items[1].left, 266.0);
        assert_eq!(items[2].left, 532.0);
        assert_eq!(items[0].height, 250.0 / (4.0 / 3.0));
        assert_eq!(items[1].height, 250.0 / (3.0 / 4.0));
        assert_eq!(items[2].height, 250.0);
    }

    #[test]
    fn tall_item_pushes_following_items_to_other_column() {
        let items =
            calculate_masonry_layout(&tiles(&[1.0 / 3.0, 1.0, 1.0, 1.0]), &dims(250.0, 2, 16)).unwrap();

        assert_eq!(items[0].column, 0);
        assert_eq!(items[1].column, 1);
        assert_eq!(items[2].column, 1);
        assert_eq!(items[2].top, items[1].height + 16.0);

        let col0 = items[0].height + 16.0;
        let col1 = items[1].height + 16.0 + items[2].height + 16.0;
        assert_eq!(items[3].column, if col0 <= col1 { 0 } else { 1 });
    }

    #[test]
    fn equal_columns_prefer_lowest_index() {
        let items = calculate_masonry_layout(&tiles(&[1.0; 6]), &dims(100.0, 3, 10)).unwrap();
        let columns: Vec<_> = items.iter().map(|item| item.column).collect();
        assert_eq!(columns, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(items[3].top, 110.0);
    }

    #[test]
    fn empty_input_gives_empty_layout_and_zero_height() {
        let items = calculate_masonry_layout::<Tile>(&[], &dims(250.0, 3, 16)).unwrap();
        assert!(items.is_empty());
        assert_eq!(calculate_grid_height(&items), 0.0);
    }

    #[test]
    fn single_column_stacks_vertically() {
        let items = calculate_masonry_layout(&tiles(&[4.0 / 3.0, 0.75, 1.0]), &dims(200.0, 1, 0)).unwrap();
        for item in &items {
            assert_eq!(item.column, 0);
            assert_eq!(item.left, 0.0);
        }
        assert_eq!(items[1].top, items[0].height);
        assert_eq!(items[2].top, items[0].height + items[1].height);
    }

    #[test]
    fn columns_stay_balanced() {
        for seed in 1..20 {
            let ratios = pseudo_ratios(seed, 97);
            let geometry = dims(240.0, 4, 12);
            let items = calculate_masonry_layout(&tiles(&ratios), &geometry).unwrap();

            let tallest = items.iter().map(|item| item.height).fold(0.0, f32::max);
            let mut bottoms = vec![0.0f32; geometry.column_count];
            for item in &items {
                bottoms[item.column] = bottoms[item.column].max(item.bottom());
            }
            let max = bottoms.iter().copied().fold(f32::MIN, f32::max);
            let min = bottoms.iter().copied().fold(f32::MAX, f32::min);
            // Measured on bottom edges: a placement adds one item plus its
            // gutter to the shortest column, so the gutter is part of the slack.
            assert!(
                max - min <= tallest + geometry.gutter_size as f32 + 0.001,
                "seed {seed}: spread {} exceeds {tallest}",
                max - min
            );
        }
    }

    #[test]
    fn items_in_a_column_never_overlap() {
        let geometry = dims(180.0, 3, 8);
        let items = calculate_masonry_layout(&tiles(&pseudo_ratios(7, 60)), &geometry).unwrap();
        for column in group_items_by_column(&items).values() {
            for pair in column.windows(2) {
                assert!(pair[1].top >= pair[0].bottom() + 8.0 - 0.001);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let input = tiles(&pseudo_ratios(42, 50));
        let geometry = dims(300.0, 5, 16);
        let first = calculate_masonry_layout(&input, &geometry).unwrap();
        let second = calculate_masonry_layout(&input, &geometry).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.top.to_bits(), b.top.to_bits());
            assert_eq!(a.height.to_bits(), b.height.to_bits());
        }
    }

    #[test]
    fn grid_height_is_lowest_bottom_edge() {
        let items = vec![
            PositionedItem { index: 0, item: (), column: 0, top: 0.0, left: 0.0, width: 200.0, height: 200.0 },
            PositionedItem { index: 1, item: (), column: 1, top: 0.0, left: 220.0, width: 200.0, height: 300.0 },
            PositionedItem { index: 2, item: (), column: 0, top: 220.0, left: 0.0, width: 200.0, height: 150.0 },
        ];
        assert_eq!(calculate_grid_height(&items), 370.0);
        assert_eq!(calculate_grid_height(&items[..1]), 200.0);
    }

    #[test]
    fn strict_policy_rejects_invalid_ratios() {
        let err = calculate_masonry_layout(&tiles(&[1.0, 0.0, 1.0]), &dims(100.0, 2, 0)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidAspectRatio {
                index: 1,
                aspect_ratio: 0.0
            }
        );
        assert!(calculate_masonry_layout(&tiles(&[f32::NAN]), &dims(100.0, 2, 0)).is_err());
        assert!(calculate_masonry_layout(&tiles(&[-2.0]), &dims(100.0, 2, 0)).is_err());
        assert!(calculate_masonry_layout(&tiles(&[f32::INFINITY]), &dims(100.0, 2, 0)).is_err());
    }

    #[test]
    fn clamp_policy_substitutes_minimum_ratio() {
        let items = calculate_masonry_layout_with(
            &tiles(&[1.0, -1.0]),
            &dims(100.0, 2, 0),
            AspectRatioPolicy::Clamp,
        )
        .unwrap();
        assert_eq!(items[1].height, 100.0 / MIN_ASPECT_RATIO);
        assert!(items.iter().all(|item| item.height.is_finite()));
    }

    #[test]
    fn grouping_keeps_column_order() {
        let items = calculate_masonry_layout(&tiles(&[1.0, 0.5, 1.0, 1.0]), &dims(100.0, 2, 0)).unwrap();
        let grouped = group_items_by_column(&items);
        assert_eq!(grouped.len(), 2);
        let col0: Vec<_> = grouped[&0].iter().map(|item| item.index).collect();
        let col1: Vec<_> = grouped[&1].iter().map(|item| item.index).collect();
        assert_eq!(col0, vec![0, 2, 3]);
        assert_eq!(col1, vec![1]);
        assert!(group_items_by_column::<Tile>(&[]).is_empty());
    }

    #[test]
    fn arc_items_delegate_to_inner() {
        let shared = Arc::new(Tile { id: 9, ratio: 2.0 });
        assert_eq!(shared.id(), 9);
        let items = calculate_masonry_layout(&[shared], &dims(100.0, 1, 0)).unwrap();
        assert_eq!(items[0].height, 50.0);
    }
}
