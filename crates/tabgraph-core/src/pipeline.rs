use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::annotate::Annotator;
use crate::classify::{ConceptClassifier, Lexicon};
use crate::error::Result;
use crate::extraction::Extraction;
use crate::graph::{EmitConfig, MeasureTaxonomy, NodeId, NodePool, RelationRecord, Translator};
use crate::interpret::interpret_column;
use crate::lookup::ConceptLookup;
use crate::table::{CellId, TableTree};

/// The top-level composite nodes one column produced, keyed by its header
/// cell.
#[derive(Debug, Clone)]
pub struct ColumnNodes {
    pub header: CellId,
    pub nodes: Vec<NodeId>,
}

/// One processed table: the annotated tree, the node pool its features live
/// in, and the per-column node sets.
pub struct TableOutput {
    pub tree: TableTree,
    pub pool: NodePool,
    pub columns: Vec<ColumnNodes>,
}

impl TableOutput {
    /// Translate every column's nodes into relation records; nodes shared
    /// across columns are emitted once.
    #[must_use]
    pub fn emit(&self, config: EmitConfig) -> Vec<RelationRecord> {
        let mut translator = Translator::new(&self.pool, &self.tree, config);
        for column in &self.columns {
            translator.emit_all(&column.nodes);
        }
        translator.finish()
    }
}

/// Whole-document output plus run counters.
pub struct DocumentOutput {
    pub tables: Vec<TableOutput>,
    pub stats: PipelineStats,
}

impl DocumentOutput {
    #[must_use]
    pub fn emit(&self, config: EmitConfig) -> Vec<RelationRecord> {
        self.tables
            .iter()
            .flat_map(|table| table.emit(config))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub tables: usize,
    pub cells: usize,
    pub tokens: usize,
    pub features: usize,
    pub columns: usize,
    pub duration_ms: u64,
}

/// Orchestrates one run: per table, reconstruct the tree, annotate every
/// cell depth-first, and run the column assembler once per data column. The
/// first column is the row headers and is not separately interpreted.
pub struct Pipeline {
    annotator: Annotator,
    taxonomy: MeasureTaxonomy,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            annotator: Annotator::new(),
            taxonomy: MeasureTaxonomy::default(),
        }
    }

    /// Enable the external-concept classifier.
    #[must_use]
    pub fn with_concept_lookup(
        mut self,
        lookup: Arc<dyn ConceptLookup>,
        lexicon: Lexicon,
        sources: Vec<String>,
    ) -> Self {
        self.annotator = self
            .annotator
            .with_classifier(Box::new(ConceptClassifier::new(lookup, lexicon, sources)));
        self
    }

    #[must_use]
    pub fn with_taxonomy(mut self, taxonomy: MeasureTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub async fn process(&self, extraction: &Extraction) -> Result<DocumentOutput> {
        let start = Instant::now();
        let mut stats = PipelineStats::default();
        let mut tables = Vec::new();

        for (table_index, source) in extraction.tables.iter().enumerate() {
            let Some(mut tree) = TableTree::reconstruct(table_index, source) else {
                tracing::warn!(table_index, "skipping empty table");
                continue;
            };
            let mut pool = NodePool::with_taxonomy(self.taxonomy.clone());

            self.annotator.annotate_tree(&mut tree, &mut pool).await?;

            let headers: Vec<CellId> = tree
                .row(tree.root)
                .fields
                .iter()
                .skip(1)
                .copied()
                .collect();
            let mut columns = Vec::new();
            for header in headers {
                let nodes = interpret_column(&mut tree, &mut pool, header);
                columns.push(ColumnNodes { header, nodes });
            }

            stats.tables += 1;
            stats.cells += tree.cells.len();
            stats.tokens += tree.cells.iter().map(|c| c.tokens.len()).sum::<usize>();
            stats.features += pool.len();
            stats.columns += columns.len();

            tracing::info!(
                table_index,
                cells = tree.cells.len(),
                columns = columns.len(),
                "table processed"
            );

            tables.push(TableOutput {
                tree,
                pool,
                columns,
            });
        }

        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(DocumentOutput { tables, stats })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
