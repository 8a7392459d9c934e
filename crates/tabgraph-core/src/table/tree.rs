use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellId, FontSample, GridSpan, RowGroupId};
use crate::extraction::{SourceCell, SourceTable};

/// Rows closer together than this (in page units) sit at the same
/// indentation level.
pub const INDENT_TOLERANCE: f64 = 1.0;

/// One physical row plus the rows nested beneath it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowGroup {
    pub fields: Vec<CellId>,
    pub records: Vec<RowGroupId>,
    pub parent: Option<RowGroupId>,
}

/// A reconstructed table: cell and row-group arenas plus the root group,
/// whose `fields` are the column header row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableTree {
    pub table_index: usize,
    pub cells: Vec<Cell>,
    pub rows: Vec<RowGroup>,
    pub root: RowGroupId,
}

impl TableTree {
    /// Rebuild the nested row-group tree from a flat table.
    ///
    /// Maintains a stack of `(row group, indent)` pairs seeded with the
    /// header row. Each following row walks the stack downward until it
    /// finds a parent: the root always qualifies, a clearly smaller indent
    /// qualifies, and on an indentation tie a mostly-bold candidate keeps a
    /// non-bold row as its child. Ties the heuristics cannot settle make the
    /// row a sibling at the nearest ancestor level.
    ///
    /// Returns `None` for a table with no rows.
    #[must_use]
    pub fn reconstruct(table_index: usize, source: &SourceTable) -> Option<Self> {
        if source.rows.is_empty() {
            return None;
        }

        let mut tree = Self {
            table_index,
            cells: Vec::new(),
            rows: Vec::new(),
            root: RowGroupId(0),
        };

        let root = tree.push_row_group(None);
        for (col, source_cell) in source.rows[0].iter().enumerate() {
            tree.push_cell(root, 0, col, source_cell, source);
        }

        let mut stack: Vec<(RowGroupId, f64)> = vec![(root, row_indent(&source.rows[0]))];

        for (physical_row, source_row) in source.rows.iter().enumerate().skip(1) {
            let indent = row_indent(source_row);

            let group = tree.push_row_group(None);
            for (col, source_cell) in source_row.iter().enumerate() {
                tree.push_cell(group, physical_row, col, source_cell, source);
            }

            let parent = loop {
                let &(candidate, candidate_indent) = stack.last().unwrap_or(&(root, 0.0));
                if stack.len() == 1 {
                    break candidate;
                }
                if candidate_indent < indent - INDENT_TOLERANCE {
                    break candidate;
                }
                if (candidate_indent - indent).abs() < INDENT_TOLERANCE
                    && tie_breaks_to_parent(&tree, candidate, group)
                {
                    break candidate;
                }
                stack.pop();
            };

            tree.rows[group.0].parent = Some(parent);
            tree.rows[parent.0].records.push(group);
            stack.push((group, indent));
        }

        Some(tree)
    }

    fn push_row_group(&mut self, parent: Option<RowGroupId>) -> RowGroupId {
        let id = RowGroupId(self.rows.len());
        self.rows.push(RowGroup {
            fields: Vec::new(),
            records: Vec::new(),
            parent,
        });
        id
    }

    fn push_cell(
        &mut self,
        row: RowGroupId,
        physical_row: usize,
        col: usize,
        source: &SourceCell,
        table: &SourceTable,
    ) -> CellId {
        let fonts = source
            .bbox
            .as_ref()
            .map(|bbox| recover_fonts(bbox, table))
            .unwrap_or_default();

        let span = source
            .spans
            .first()
            .map_or(
                GridSpan {
                    row: physical_row,
                    col,
                },
                |s| GridSpan { row: s[0], col: s[1] },
            );

        let id = CellId(self.cells.len());
        self.cells.push(Cell {
            bbox: source.bbox,
            span,
            table_index: self.table_index,
            text: source.text.clone(),
            fonts,
            row,
            index: col,
            col_parent: None,
            col_children: Vec::new(),
            tokens: Vec::new(),
            lookup_hits: Vec::new(),
            top_concept: None,
        });
        self.rows[row.0].fields.push(id);
        id
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0]
    }

    #[must_use]
    pub fn row(&self, id: RowGroupId) -> &RowGroup {
        &self.rows[id.0]
    }

    /// Row groups in depth-first order, which is also the physical row order
    /// of the source table.
    #[must_use]
    pub fn rows_depth_first(&self) -> Vec<RowGroupId> {
        let mut out = Vec::with_capacity(self.rows.len());
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            out.push(id);
            for &child in self.rows[id.0].records.iter().rev() {
                pending.push(child);
            }
        }
        out
    }

    /// Flatten the tree back to physical rows of cell ids.
    #[must_use]
    pub fn flattened_rows(&self) -> Vec<Vec<CellId>> {
        self.rows_depth_first()
            .into_iter()
            .map(|id| self.rows[id.0].fields.clone())
            .collect()
    }

    /// Wire up column parent/child references: each cell points at the cell
    /// in the same column of each directly nested row group, and back.
    pub fn link_columns(&mut self) {
        for group_id in self.rows_depth_first() {
            let fields = self.rows[group_id.0].fields.clone();
            let records = self.rows[group_id.0].records.clone();
            for (i, &cell_id) in fields.iter().enumerate() {
                for &sub in &records {
                    if let Some(&child_id) = self.rows[sub.0].fields.get(i) {
                        self.cells[child_id.0].col_parent = Some(cell_id);
                        self.cells[cell_id.0].col_children.push(child_id);
                    }
                }
            }
        }
    }
}

fn row_indent(row: &[SourceCell]) -> f64 {
    row.first()
        .and_then(|cell| cell.bbox.as_ref())
        .map_or(0.0, |bbox| bbox.x0)
}

fn recover_fonts(bbox: &crate::extraction::BoundingBox, table: &SourceTable) -> Vec<FontSample> {
    let found: Vec<FontSample> = table
        .font_runs
        .iter()
        .filter(|run| bbox.contains(&run.bbox))
        .map(|run| FontSample {
            text: run.text.clone(),
            font: run.font.clone(),
        })
        .collect();
    if found.is_empty() {
        tracing::warn!(?bbox, "no font runs found for cell");
    }
    found
}

/// On an indentation tie the candidate stays the parent when its first cell
/// is mostly bold and the incoming row's first cell is not. Missing font
/// data on either side disables the tie-break.
fn tie_breaks_to_parent(tree: &TableTree, candidate: RowGroupId, incoming: RowGroupId) -> bool {
    let Some(&candidate_first) = tree.rows[candidate.0].fields.first() else {
        return false;
    };
    let Some(&incoming_first) = tree.rows[incoming.0].fields.first() else {
        return false;
    };
    let candidate_cell = &tree.cells[candidate_first.0];
    let incoming_cell = &tree.cells[incoming_first.0];
    if candidate_cell.fonts.is_empty() || incoming_cell.fonts.is_empty() {
        return false;
    }

    candidate_cell.bold_ratio() >= 0.5 && incoming_cell.bold_ratio() < 0.5
}
