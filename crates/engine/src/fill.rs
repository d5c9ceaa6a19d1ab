//! Fill-action planning.
//!
//! Given the source selection and the spread target, produce the
//! ordered candidate actions: Copy when the drag grew the selection,
//! Clear when it shrank it, and a trailing Revert whenever anything
//! destructive was planned. Clear and Copy are mutually exclusive per
//! invocation; removal masks the copy path.

use crate::columns::ColumnSpec;
use crate::diff::RangeDiff;
use crate::geometry::Rect;
use crate::row::EntityRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Copy,
    Clear,
    Revert,
}

impl FillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillKind::Copy => "copy",
            FillKind::Clear => "clear",
            FillKind::Revert => "revert",
        }
    }
}

/// An executable bulk-edit unit: one save per row in `writes`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillAction {
    pub title: String,
    pub loading_message: String,
    pub kind: FillKind,
    pub writes: Vec<EntityRow>,
    /// Backup captured before the first destructive action runs; absent
    /// on Revert, whose writes ARE the backup.
    pub revert: Option<Vec<EntityRow>>,
}

/// Build the candidate actions for a completed spread drag.
///
/// Returns `None` when there is nothing to plan against (no rows or no
/// columns). Returns `Some(vec![])` when, after filtering the reserved
/// pseudo-columns, the source or target column set is empty — both are
/// "no actions" to the caller, at most three actions otherwise.
pub fn build_fill_actions(
    rows: &[EntityRow],
    columns: &[ColumnSpec],
    source: &Rect,
    target: &Rect,
    backup: &[EntityRow],
) -> Option<Vec<FillAction>> {
    if rows.is_empty() || columns.is_empty() {
        return None;
    }

    let diff = RangeDiff::between(source, target, columns);
    if diff.source_columns.is_empty() || diff.target_columns.is_empty() {
        return Some(Vec::new());
    }

    let mut actions = Vec::new();

    if diff.has_removals() {
        if let Some(clear) = build_clear(rows, &diff, backup) {
            actions.push(clear);
        }
    } else if !diff.inserted_rows.is_empty() {
        if let Some(copy) = build_row_copy(rows, &diff, backup) {
            actions.push(copy);
        }
    } else if !diff.inserted_columns.is_empty() {
        if let Some(copy) = build_column_copy(rows, &diff, backup) {
            actions.push(copy);
        }
    }

    if !actions.is_empty() {
        actions.push(FillAction {
            title: "Revert".into(),
            loading_message: "Restoring previous values...".into(),
            kind: FillKind::Revert,
            writes: backup.to_vec(),
            revert: None,
        });
    }

    Some(actions)
}

/// Row-wise fill: each inserted row receives every target-column value
/// from the corresponding source row; the source block tiles cyclically
/// when the drag extends past its height.
fn build_row_copy(rows: &[EntityRow], diff: &RangeDiff, backup: &[EntityRow]) -> Option<FillAction> {
    let mut writes = Vec::with_capacity(diff.inserted_rows.len());
    for (i, &row_idx) in diff.inserted_rows.iter().enumerate() {
        let src_idx = diff.source_rows[i % diff.source_rows.len()];
        let (Some(dst), Some(src)) = (rows.get(row_idx), rows.get(src_idx)) else {
            continue;
        };
        let mut write = dst.clone();
        for key in &diff.target_columns {
            match src.data.get(key) {
                Some(value) => {
                    write.data.insert(key.clone(), value.clone());
                }
                None => {
                    write.data.remove(key);
                }
            }
        }
        writes.push(write);
    }
    copy_action(writes, backup)
}

/// Column-wise fill: every target row receives source-column values in
/// the inserted columns, wrapping the source column list via modulo.
fn build_column_copy(
    rows: &[EntityRow],
    diff: &RangeDiff,
    backup: &[EntityRow],
) -> Option<FillAction> {
    let mut writes = Vec::with_capacity(diff.target_rows.len());
    for &row_idx in &diff.target_rows {
        let Some(row) = rows.get(row_idx) else {
            continue;
        };
        let mut write = row.clone();
        for (j, key) in diff.inserted_columns.iter().enumerate() {
            let src_key = &diff.source_columns[j % diff.source_columns.len()];
            match row.data.get(src_key).cloned() {
                Some(value) => {
                    write.data.insert(key.clone(), value);
                }
                None => {
                    write.data.remove(key);
                }
            }
        }
        writes.push(write);
    }
    copy_action(writes, backup)
}

/// Shrink: delete the shrunk-away values from the affected rows. Keys
/// are removed from the payload rather than written empty. Row-based
/// removal takes priority when both axes shrank.
fn build_clear(rows: &[EntityRow], diff: &RangeDiff, backup: &[EntityRow]) -> Option<FillAction> {
    let (affected_rows, cleared_keys): (&[usize], &[String]) = if !diff.removed_rows.is_empty() {
        (&diff.removed_rows, &diff.target_columns)
    } else {
        (&diff.target_rows, &diff.removed_columns)
    };

    let mut writes = Vec::with_capacity(affected_rows.len());
    for &row_idx in affected_rows {
        let Some(row) = rows.get(row_idx) else {
            continue;
        };
        let mut write = row.clone();
        let mut touched = false;
        for key in cleared_keys {
            touched |= write.data.remove(key).is_some();
        }
        if touched {
            writes.push(write);
        }
    }

    if writes.is_empty() {
        return None;
    }
    Some(FillAction {
        title: "Clear".into(),
        loading_message: "Clearing cell values...".into(),
        kind: FillKind::Clear,
        writes,
        revert: Some(backup.to_vec()),
    })
}

fn copy_action(writes: Vec<EntityRow>, backup: &[EntityRow]) -> Option<FillAction> {
    if writes.is_empty() {
        return None;
    }
    Some(FillAction {
        title: "Copy".into(),
        loading_message: "Copying cell values...".into(),
        kind: FillKind::Copy,
        writes,
        revert: Some(backup.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnSpec;
    use crate::geometry::{CellPos, Rect};
    use crate::row::FieldValue;

    fn rect(r1: usize, c1: usize, r2: usize, c2: usize) -> Rect {
        Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2))
    }

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("ID", 0),
            ColumnSpec::new("createdDate", 1),
            ColumnSpec::new("tissue", 2),
            ColumnSpec::new("batch", 3),
        ]
    }

    fn row(id: &str, tissue: Option<&str>, batch: Option<&str>) -> EntityRow {
        let mut data = rustc_hash::FxHashMap::default();
        if let Some(t) = tissue {
            data.insert("tissue".to_string(), FieldValue::string(t));
        }
        if let Some(b) = batch {
            data.insert("batch".to_string(), FieldValue::string(b));
        }
        EntityRow {
            class_id: 1,
            class_name: "sample".into(),
            parent_id: None,
            entity_id: id.into(),
            external_id: None,
            created_date: None,
            data,
        }
    }

    fn rows() -> Vec<EntityRow> {
        vec![
            row("s-0", Some("liver"), Some("b1")),
            row("s-1", Some("brain"), Some("b2")),
            row("s-2", Some("skin"), Some("b3")),
            row("s-3", Some("heart"), Some("b4")),
            row("s-4", None, Some("b5")),
            row("s-5", Some("lung"), None),
        ]
    }

    fn field(action: &FillAction, write: usize, key: &str) -> Option<String> {
        action.writes[write].data.get(key).map(|v| v.display())
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert!(build_fill_actions(&[], &columns(), &rect(0, 2, 1, 3), &rect(0, 2, 3, 3), &[])
            .is_none());
        assert!(build_fill_actions(&rows(), &[], &rect(0, 2, 1, 3), &rect(0, 2, 3, 3), &[])
            .is_none());
    }

    #[test]
    fn reserved_only_source_yields_empty_list() {
        // source covers only the createdDate column: nothing fillable
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 1, 1, 1),
            &rect(0, 1, 1, 3),
            &rows(),
        )
        .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn unchanged_target_yields_empty_list() {
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 1, 3),
            &rect(0, 2, 1, 3),
            &rows(),
        )
        .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn row_growth_tiles_source_cyclically() {
        // 2x2 source grown to 2x6: rows 2..=5 get rows 0,1,0,1
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 1, 3),
            &rect(0, 2, 5, 3),
            &rows(),
        )
        .unwrap();
        assert_eq!(actions.len(), 2);
        let copy = &actions[0];
        assert_eq!(copy.kind, FillKind::Copy);
        assert_eq!(copy.writes.len(), 4);

        assert_eq!(field(copy, 0, "tissue").as_deref(), Some("liver"));
        assert_eq!(field(copy, 1, "tissue").as_deref(), Some("brain"));
        assert_eq!(field(copy, 2, "tissue").as_deref(), Some("liver"));
        assert_eq!(field(copy, 3, "tissue").as_deref(), Some("brain"));
        assert_eq!(field(copy, 0, "batch").as_deref(), Some("b1"));
        assert_eq!(field(copy, 3, "batch").as_deref(), Some("b2"));

        assert_eq!(actions[1].kind, FillKind::Revert);
        assert!(actions[1].revert.is_none());
    }

    #[test]
    fn absent_source_value_clears_target_key() {
        // source row 4 has no tissue value: filling down removes it
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(4, 2, 4, 2),
            &rect(4, 2, 5, 2),
            &rows(),
        )
        .unwrap();
        let copy = &actions[0];
        assert_eq!(copy.writes.len(), 1);
        assert_eq!(copy.writes[0].entity_id, "s-5");
        assert!(copy.writes[0].data.get("tissue").is_none());
        // untouched columns survive
        assert!(copy.writes[0].data.get("batch").is_none()); // s-5 never had one
    }

    #[test]
    fn column_growth_wraps_source_columns() {
        // single source column spread right across one inserted column
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 1, 2),
            &rect(0, 2, 1, 3),
            &rows(),
        )
        .unwrap();
        let copy = &actions[0];
        assert_eq!(copy.kind, FillKind::Copy);
        assert_eq!(copy.writes.len(), 2);
        // batch receives the tissue value, per-row
        assert_eq!(field(copy, 0, "batch").as_deref(), Some("liver"));
        assert_eq!(field(copy, 1, "batch").as_deref(), Some("brain"));
    }

    #[test]
    fn row_shrink_builds_single_clear() {
        // 4 rows shrunk to 2: exactly one Clear (plus Revert), no Copy
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 3, 3),
            &rect(0, 2, 1, 3),
            &rows(),
        )
        .unwrap();
        assert_eq!(actions.len(), 2);
        let clear = &actions[0];
        assert_eq!(clear.kind, FillKind::Clear);
        assert_eq!(clear.writes.len(), 2);
        assert_eq!(clear.writes[0].entity_id, "s-2");
        assert_eq!(clear.writes[1].entity_id, "s-3");
        assert!(clear.writes[0].data.get("tissue").is_none());
        assert!(clear.writes[0].data.get("batch").is_none());
    }

    #[test]
    fn column_shrink_clears_removed_columns_in_target_rows() {
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 1, 3),
            &rect(0, 2, 1, 2),
            &rows(),
        )
        .unwrap();
        let clear = &actions[0];
        assert_eq!(clear.kind, FillKind::Clear);
        assert_eq!(clear.writes.len(), 2);
        assert!(clear.writes[0].data.get("batch").is_none());
        assert_eq!(
            clear.writes[0].data.get("tissue").map(|v| v.display()).as_deref(),
            Some("liver")
        );
    }

    #[test]
    fn revert_carries_backup_verbatim() {
        let backup = rows();
        let actions = build_fill_actions(
            &rows(),
            &columns(),
            &rect(0, 2, 1, 3),
            &rect(0, 2, 3, 3),
            &backup,
        )
        .unwrap();
        let revert = actions.last().unwrap();
        assert_eq!(revert.kind, FillKind::Revert);
        assert_eq!(revert.writes, backup);
    }
}
