use std::path::Path;

use serde::Deserialize;

use metagrid_engine::columns::ColumnSpec;
use metagrid_engine::row::EntityRow;

use crate::util;
use crate::CliError;

/// In-memory grid contents: entity rows plus the rendered column
/// descriptors and their display widths.
pub struct GridData {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<EntityRow>,
    /// Pre-computed display widths per column (clamped to [4, 24])
    pub col_widths: Vec<usize>,
}

/// On-disk grid file: rows plus optional explicit columns. When columns
/// are omitted they are derived from the rows' attribute keys.
#[derive(Deserialize)]
struct GridFile {
    #[serde(default)]
    columns: Vec<ColumnSpec>,
    rows: Vec<EntityRow>,
}

impl GridData {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<EntityRow>) -> Self {
        let col_widths = compute_widths(&columns, &rows);
        Self {
            columns,
            rows,
            col_widths,
        }
    }

    /// Build a grid from fetched rows, deriving the column list: the ID
    /// and createdDate pseudo-columns first, then the attribute keys in
    /// sorted order.
    pub fn from_rows(rows: Vec<EntityRow>) -> Self {
        let mut keys: Vec<String> = rows
            .iter()
            .flat_map(|r| r.data.keys().cloned())
            .collect();
        keys.sort();
        keys.dedup();

        let mut columns = vec![ColumnSpec::new("ID", 0), ColumnSpec::new("createdDate", 1)];
        for (i, key) in keys.into_iter().enumerate() {
            columns.push(ColumnSpec::new(key, i + 2));
        }
        Self::new(columns, rows)
    }

    /// Load a grid JSON file (`{"columns": [...], "rows": [...]}`).
    pub fn load_file(path: &Path) -> Result<Self, CliError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
        let file: GridFile = serde_json::from_str(&contents)
            .map_err(|e| CliError::parse(format!("invalid grid file {}: {}", path.display(), e)))?;
        if file.columns.is_empty() {
            Ok(Self::from_rows(file.rows))
        } else {
            Ok(Self::new(file.columns, file.rows))
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Display text of one cell.
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        let (Some(row), Some(column)) = (self.rows.get(row), self.columns.get(col)) else {
            return String::new();
        };
        match column.key.as_str() {
            "ID" => row.display_id().to_string(),
            "createdDate" => row
                .created_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            key => row.data.get(key).map(|v| v.display()).unwrap_or_default(),
        }
    }

    /// Recompute widths after rows changed (post-fill splice).
    pub fn refresh_widths(&mut self) {
        self.col_widths = compute_widths(&self.columns, &self.rows);
    }
}

fn compute_widths(columns: &[ColumnSpec], rows: &[EntityRow]) -> Vec<usize> {
    columns
        .iter()
        .map(|column| {
            let header = util::display_width(&column.key);
            let cells = rows
                .iter()
                .map(|row| match column.key.as_str() {
                    "ID" => util::display_width(row.display_id()),
                    "createdDate" => 16,
                    key => row
                        .data
                        .get(key)
                        .map(|v| util::display_width(&v.display()))
                        .unwrap_or(0),
                })
                .max()
                .unwrap_or(0);
            header.max(cells).clamp(4, 24)
        })
        .collect()
}
