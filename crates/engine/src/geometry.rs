//! Rectangular cell geometry.
//!
//! The predicates here run for every rendered cell on every selection
//! change, so they stay O(1) and allocation-free.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A (row, column) grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub column: usize,
}

impl CellPos {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Inclusive (row, column) bounding box describing a selection or a
/// spread target.
///
/// INVARIANT: `start <= end` componentwise. Constructors normalize;
/// every predicate assumes the invariant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub start: CellPos,
    pub end: CellPos,
}

impl Rect {
    /// Single-cell rectangle.
    pub fn cell(pos: CellPos) -> Self {
        Self { start: pos, end: pos }
    }

    /// Build from two opposite corners, normalizing so `start <= end`.
    pub fn from_corners(a: CellPos, b: CellPos) -> Self {
        Self {
            start: CellPos::new(a.row.min(b.row), a.column.min(b.column)),
            end: CellPos::new(a.row.max(b.row), a.column.max(b.column)),
        }
    }

    /// True iff the cell lies within the inclusive bounds.
    pub fn contains(&self, column: usize, row: usize) -> bool {
        column >= self.start.column
            && column <= self.end.column
            && row >= self.start.row
            && row <= self.end.row
    }

    pub fn is_left_edge(&self, column: usize, row: usize) -> bool {
        self.contains(column, row) && column == self.start.column
    }

    pub fn is_right_edge(&self, column: usize, row: usize) -> bool {
        self.contains(column, row) && column == self.end.column
    }

    pub fn is_top_edge(&self, column: usize, row: usize) -> bool {
        self.contains(column, row) && row == self.start.row
    }

    pub fn is_bottom_edge(&self, column: usize, row: usize) -> bool {
        self.contains(column, row) && row == self.end.row
    }

    /// The single cell where the drag-fill handle renders.
    pub fn is_handle_corner(&self, column: usize, row: usize) -> bool {
        self.is_bottom_edge(column, row) && self.is_right_edge(column, row)
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            start: CellPos::new(
                self.start.row.min(other.start.row),
                self.start.column.min(other.start.column),
            ),
            end: CellPos::new(
                self.end.row.max(other.end.row),
                self.end.column.max(other.end.column),
            ),
        }
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start.row..=self.end.row
    }

    pub fn columns(&self) -> RangeInclusive<usize> {
        self.start.column..=self.end.column
    }

    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn column_count(&self) -> usize {
        self.end.column - self.start.column + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rect(r1: usize, c1: usize, r2: usize, c2: usize) -> Rect {
        Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2))
    }

    #[test]
    fn from_corners_normalizes() {
        let r = rect(5, 7, 2, 3);
        assert_eq!(r.start, CellPos::new(2, 3));
        assert_eq!(r.end, CellPos::new(5, 7));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = rect(1, 2, 3, 4);
        assert!(r.contains(2, 1));
        assert!(r.contains(4, 3));
        assert!(r.contains(3, 2));
        assert!(!r.contains(1, 1));
        assert!(!r.contains(5, 3));
        assert!(!r.contains(2, 4));
    }

    #[test]
    fn edges_require_containment() {
        let r = rect(1, 1, 3, 3);
        assert!(r.is_top_edge(2, 1));
        assert!(!r.is_top_edge(0, 1));
        assert!(r.is_left_edge(1, 2));
        assert!(r.is_right_edge(3, 2));
        assert!(r.is_bottom_edge(2, 3));
        assert!(!r.is_bottom_edge(2, 0));
    }

    #[test]
    fn exactly_start_row_is_top_edge() {
        let r = rect(2, 1, 5, 4);
        for row in r.rows() {
            for col in r.columns() {
                assert_eq!(r.is_top_edge(col, row), row == 2, "({}, {})", col, row);
            }
        }
    }

    #[test]
    fn handle_corner_is_unique() {
        let r = rect(2, 1, 5, 4);
        let mut corners = Vec::new();
        for row in r.rows() {
            for col in r.columns() {
                if r.is_handle_corner(col, row) {
                    corners.push((col, row));
                }
            }
        }
        assert_eq!(corners, vec![(4, 5)]);
    }

    #[test]
    fn single_cell_rect_is_all_edges() {
        let r = Rect::cell(CellPos::new(3, 3));
        assert!(r.is_top_edge(3, 3));
        assert!(r.is_bottom_edge(3, 3));
        assert!(r.is_left_edge(3, 3));
        assert!(r.is_right_edge(3, 3));
        assert!(r.is_handle_corner(3, 3));
    }

    #[test]
    fn union_covers_both() {
        let a = rect(1, 1, 3, 3);
        let b = rect(2, 4, 6, 5);
        let u = a.union(&b);
        assert_eq!(u, rect(1, 1, 6, 5));
    }

    proptest! {
        #[test]
        fn containment_matches_componentwise_bounds(
            r1 in 0usize..40, c1 in 0usize..40,
            r2 in 0usize..40, c2 in 0usize..40,
            row in 0usize..40, col in 0usize..40,
        ) {
            let rect = Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2));
            let expected = col >= rect.start.column && col <= rect.end.column
                && row >= rect.start.row && row <= rect.end.row;
            prop_assert_eq!(rect.contains(col, row), expected);
        }

        #[test]
        fn normalization_holds(
            r1 in 0usize..40, c1 in 0usize..40,
            r2 in 0usize..40, c2 in 0usize..40,
        ) {
            let rect = Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2));
            prop_assert!(rect.start.row <= rect.end.row);
            prop_assert!(rect.start.column <= rect.end.column);
        }
    }
}
