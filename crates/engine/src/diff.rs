//! Source/target range diffing.
//!
//! Partitions the rows and fillable columns of a spread target against
//! the original selection by set-difference. The inserted and removed
//! sets drive whether the fill planner produces a Copy (grow) or a
//! Clear (shrink) action; they are mutually exclusive by construction
//! because source and target are contiguous rectangles sharing an
//! origin corner.

use crate::columns::{fillable_keys, ColumnSpec};
use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDiff {
    pub source_rows: Vec<usize>,
    pub target_rows: Vec<usize>,
    pub inserted_rows: Vec<usize>,
    pub removed_rows: Vec<usize>,
    pub source_columns: Vec<String>,
    pub target_columns: Vec<String>,
    pub inserted_columns: Vec<String>,
    pub removed_columns: Vec<String>,
}

impl RangeDiff {
    pub fn between(source: &Rect, target: &Rect, columns: &[ColumnSpec]) -> Self {
        let source_rows: Vec<usize> = source.rows().collect();
        let target_rows: Vec<usize> = target.rows().collect();
        let inserted_rows = target_rows
            .iter()
            .copied()
            .filter(|r| !source.rows().contains(r))
            .collect();
        let removed_rows = source_rows
            .iter()
            .copied()
            .filter(|r| !target.rows().contains(r))
            .collect();

        let source_columns = fillable_keys(columns, source);
        let target_columns = fillable_keys(columns, target);
        let inserted_columns = target_columns
            .iter()
            .filter(|k| !source_columns.contains(k))
            .cloned()
            .collect();
        let removed_columns = source_columns
            .iter()
            .filter(|k| !target_columns.contains(k))
            .cloned()
            .collect();

        Self {
            source_rows,
            target_rows,
            inserted_rows,
            removed_rows,
            source_columns,
            target_columns,
            inserted_columns,
            removed_columns,
        }
    }

    /// True when the drag shrank the selection on either axis.
    pub fn has_removals(&self) -> bool {
        !self.removed_rows.is_empty() || !self.removed_columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnSpec;
    use crate::geometry::CellPos;

    fn rect(r1: usize, c1: usize, r2: usize, c2: usize) -> Rect {
        Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2))
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("ID", 0),
            ColumnSpec::new("createdDate", 1),
            ColumnSpec::new("tissue", 2),
            ColumnSpec::new("batch", 3),
            ColumnSpec::new("notes", 4),
        ]
    }

    #[test]
    fn row_growth_inserts_rows_only() {
        let d = RangeDiff::between(&rect(0, 2, 1, 3), &rect(0, 2, 5, 3), &columns());
        assert_eq!(d.source_rows, vec![0, 1]);
        assert_eq!(d.inserted_rows, vec![2, 3, 4, 5]);
        assert!(d.removed_rows.is_empty());
        assert!(d.inserted_columns.is_empty());
        assert!(d.removed_columns.is_empty());
        assert!(!d.has_removals());
    }

    #[test]
    fn column_growth_inserts_columns_only() {
        let d = RangeDiff::between(&rect(0, 2, 2, 2), &rect(0, 2, 2, 4), &columns());
        assert_eq!(d.source_columns, vec!["tissue"]);
        assert_eq!(d.inserted_columns, vec!["batch", "notes"]);
        assert!(d.inserted_rows.is_empty());
        assert!(!d.has_removals());
    }

    #[test]
    fn row_shrink_removes_rows() {
        let d = RangeDiff::between(&rect(0, 2, 3, 3), &rect(0, 2, 1, 3), &columns());
        assert_eq!(d.removed_rows, vec![2, 3]);
        assert!(d.inserted_rows.is_empty());
        assert!(d.has_removals());
    }

    #[test]
    fn reserved_columns_never_appear() {
        let d = RangeDiff::between(&rect(0, 0, 1, 1), &rect(0, 0, 1, 4), &columns());
        assert!(d.source_columns.is_empty());
        assert_eq!(d.target_columns, vec!["tissue", "batch", "notes"]);
        assert_eq!(d.inserted_columns, vec!["tissue", "batch", "notes"]);
    }
}
