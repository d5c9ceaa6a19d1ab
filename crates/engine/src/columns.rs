//! Column descriptors for the metadata grid.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Pseudo-columns shown in every grid but never fillable: they are
/// filtered out of both source and target column sets before diffing.
pub const RESERVED_KEYS: [&str; 2] = ["ID", "createdDate"];

/// Maps a rendered grid column to a metadata attribute key.
///
/// Owned by the table configuration; read-only to the selection and
/// fill subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub index: usize,
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_selectable() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(key: impl Into<String>, index: usize) -> Self {
        Self {
            key: key.into(),
            index,
            selectable: true,
        }
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_KEYS.contains(&self.key.as_str())
    }
}

/// Attribute keys of the fillable columns inside `rect`'s column span,
/// in grid order, reserved pseudo-columns excluded.
pub fn fillable_keys(columns: &[ColumnSpec], rect: &Rect) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.index >= rect.start.column && c.index <= rect.end.column)
        .filter(|c| !c.is_reserved())
        .map(|c| c.key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellPos;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("ID", 0),
            ColumnSpec::new("createdDate", 1),
            ColumnSpec::new("tissue", 2),
            ColumnSpec::new("batch", 3),
        ]
    }

    #[test]
    fn reserved_columns_are_filtered() {
        let rect = Rect::from_corners(CellPos::new(0, 0), CellPos::new(5, 3));
        assert_eq!(fillable_keys(&columns(), &rect), vec!["tissue", "batch"]);
    }

    #[test]
    fn span_limits_keys() {
        let rect = Rect::from_corners(CellPos::new(0, 0), CellPos::new(5, 2));
        assert_eq!(fillable_keys(&columns(), &rect), vec!["tissue"]);
    }

    #[test]
    fn reserved_only_span_is_empty() {
        let rect = Rect::from_corners(CellPos::new(0, 0), CellPos::new(5, 1));
        assert!(fillable_keys(&columns(), &rect).is_empty());
    }
}
