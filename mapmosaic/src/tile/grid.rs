//! Inclusive tile ranges and the bounding box they form.

use std::fmt;

use crate::coord::TileIndex;

/// Inclusive range of tile indices along one axis.
///
/// `start <= end` always holds; a range where both ends are equal contains
/// exactly one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRange {
    start: u32,
    end: u32,
}

impl TileRange {
    /// Create a range from two endpoints given in any order.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// First index in the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last index in the range (inclusive).
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of tiles in the range, `end - start + 1`.
    pub fn count(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: u32) -> bool {
        (self.start..=self.end).contains(&index)
    }

    /// Iterate over every index in the range in increasing order.
    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Rectangular block of tiles, inclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileBoundingBox {
    cols: TileRange,
    rows: TileRange,
}

impl TileBoundingBox {
    pub fn new(cols: TileRange, rows: TileRange) -> Self {
        Self { cols, rows }
    }

    /// Build the box spanned by two corner tiles, whatever their order.
    pub fn from_corners(a: TileIndex, b: TileIndex) -> Self {
        Self {
            cols: TileRange::new(a.col, b.col),
            rows: TileRange::new(a.row, b.row),
        }
    }

    pub fn cols(&self) -> TileRange {
        self.cols
    }

    pub fn rows(&self) -> TileRange {
        self.rows
    }

    /// North-west tile of the box.
    pub fn first(&self) -> TileIndex {
        TileIndex::new(self.cols.start(), self.rows.start())
    }

    /// South-east tile of the box.
    pub fn last(&self) -> TileIndex {
        TileIndex::new(self.cols.end(), self.rows.end())
    }

    /// Total number of tiles in the box.
    pub fn tile_count(&self) -> u64 {
        self.cols.count() as u64 * self.rows.count() as u64
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        self.cols.contains(index.col) && self.rows.contains(index.row)
    }

    /// Iterate over all tiles row by row, north to south, west to east.
    pub fn iter(&self) -> TileGridIter {
        TileGridIter {
            bbox: *self,
            next: Some(self.first()),
        }
    }

    /// Iterate over all tiles column by column, west to east, north to south.
    pub fn iter_column_major(&self) -> impl Iterator<Item = TileIndex> {
        let rows = self.rows;
        self.cols
            .iter()
            .flat_map(move |col| rows.iter().map(move |row| TileIndex::new(col, row)))
    }
}

impl<'a> IntoIterator for &'a TileBoundingBox {
    type Item = TileIndex;
    type IntoIter = TileGridIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row-major iterator over a [`TileBoundingBox`].
#[derive(Debug, Clone)]
pub struct TileGridIter {
    bbox: TileBoundingBox,
    next: Option<TileIndex>,
}

impl Iterator for TileGridIter {
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let cols = self.bbox.cols;
        let rows = self.bbox.rows;

        self.next = if current.col < cols.end() {
            Some(TileIndex::new(current.col + 1, current.row))
        } else if current.row < rows.end() {
            Some(TileIndex::new(cols.start(), current.row + 1))
        } else {
            None
        };

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            None => 0,
            Some(next) => {
                let cols = self.bbox.cols;
                let full_rows = (self.bbox.rows.end() - next.row) as u64;
                let in_row = (cols.end() - next.col + 1) as u64;
                full_rows * cols.count() as u64 + in_row
            }
        };
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalizes_endpoints() {
        let range = TileRange::new(12, 10);
        assert_eq!(range.start(), 10);
        assert_eq!(range.end(), 12);
        assert_eq!(range.count(), 3);
    }

    #[test]
    fn test_single_tile_range() {
        let range = TileRange::new(7, 7);
        assert_eq!(range.count(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_range_display() {
        assert_eq!(TileRange::new(16908, 16912).to_string(), "16908-16912");
    }

    #[test]
    fn test_box_from_reversed_corners() {
        let bbox =
            TileBoundingBox::from_corners(TileIndex::new(20, 5), TileIndex::new(18, 9));
        assert_eq!(bbox.first(), TileIndex::new(18, 5));
        assert_eq!(bbox.last(), TileIndex::new(20, 9));
        assert_eq!(bbox.tile_count(), 15);
    }

    #[test]
    fn test_iteration_is_row_major() {
        let bbox = TileBoundingBox::new(TileRange::new(0, 1), TileRange::new(10, 11));
        let tiles: Vec<_> = bbox.iter().collect();
        assert_eq!(
            tiles,
            vec![
                TileIndex::new(0, 10),
                TileIndex::new(1, 10),
                TileIndex::new(0, 11),
                TileIndex::new(1, 11),
            ]
        );
    }

    #[test]
    fn test_column_major_iteration() {
        let bbox = TileBoundingBox::new(TileRange::new(0, 1), TileRange::new(10, 11));
        let tiles: Vec<_> = bbox.iter_column_major().collect();
        assert_eq!(
            tiles,
            vec![
                TileIndex::new(0, 10),
                TileIndex::new(0, 11),
                TileIndex::new(1, 10),
                TileIndex::new(1, 11),
            ]
        );
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let bbox = TileBoundingBox::new(TileRange::new(3, 5), TileRange::new(0, 1));
        let mut iter = bbox.iter();
        assert_eq!(iter.size_hint(), (6, Some(6)));
        iter.next();
        iter.next();
        assert_eq!(iter.size_hint(), (4, Some(4)));
        assert_eq!(iter.count(), 4);
    }

    #[test]
    fn test_contains() {
        let bbox = TileBoundingBox::new(TileRange::new(3, 5), TileRange::new(0, 1));
        assert!(bbox.contains(TileIndex::new(4, 1)));
        assert!(!bbox.contains(TileIndex::new(6, 1)));
        assert!(!bbox.contains(TileIndex::new(4, 2)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_count_is_inclusive(a in 0u32..40_000, b in 0u32..40_000) {
                let range = TileRange::new(a, b);
                prop_assert_eq!(range.count(), a.abs_diff(b) + 1);
            }

            #[test]
            fn test_iteration_visits_every_tile_once(
                col in 0u32..1000,
                row in 0u32..1000,
                width in 0u32..8,
                height in 0u32..8
            ) {
                let bbox = TileBoundingBox::from_corners(
                    TileIndex::new(col, row),
                    TileIndex::new(col + width, row + height),
                );
                let tiles: Vec<_> = bbox.iter().collect();
                let unique: std::collections::HashSet<_> = tiles.iter().copied().collect();

                prop_assert_eq!(tiles.len() as u64, bbox.tile_count());
                prop_assert_eq!(unique.len(), tiles.len());
                prop_assert!(tiles.iter().all(|t| bbox.contains(*t)));
            }
        }
    }
}
