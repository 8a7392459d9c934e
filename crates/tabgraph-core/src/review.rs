use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extraction::Extraction;

/// One reviewed cell: a replacement display text entered by the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEdit {
    pub table: usize,
    pub row: usize,
    pub col: usize,
    pub text: String,
}

/// Side file written by the correction GUI: validity flags per table, row,
/// column and cell, plus edited display texts. The core only consumes it:
/// invalid cells are blanked and edits applied before a reprocessing pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSheet {
    #[serde(default)]
    pub skipped_tables: Vec<usize>,
    #[serde(default)]
    pub skipped_rows: Vec<(usize, usize)>,
    #[serde(default)]
    pub skipped_cols: Vec<(usize, usize)>,
    #[serde(default)]
    pub skipped_cells: Vec<(usize, usize, usize)>,
    #[serde(default)]
    pub edits: Vec<CellEdit>,
}

impl ReviewSheet {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[must_use]
    pub fn is_valid(&self, table: usize, row: usize, col: usize) -> bool {
        !self.skipped_tables.contains(&table)
            && !self.skipped_rows.contains(&(table, row))
            && !self.skipped_cols.contains(&(table, col))
            && !self.skipped_cells.contains(&(table, row, col))
    }

    /// Rewrite an extraction in place: edited cells take their display text,
    /// invalid cells are blanked so reprocessing ignores them.
    pub fn apply(&self, extraction: &mut Extraction) {
        for edit in &self.edits {
            if let Some(cell) = extraction
                .tables
                .get_mut(edit.table)
                .and_then(|t| t.rows.get_mut(edit.row))
                .and_then(|r| r.get_mut(edit.col))
            {
                cell.text.clone_from(&edit.text);
            }
        }
        for (table_index, table) in extraction.tables.iter_mut().enumerate() {
            for (row_index, row) in table.rows.iter_mut().enumerate() {
                for (col_index, cell) in row.iter_mut().enumerate() {
                    if !self.is_valid(table_index, row_index, col_index) {
                        cell.text.clear();
                    }
                }
            }
        }
    }
}
