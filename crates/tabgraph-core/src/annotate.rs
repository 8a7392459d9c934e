use crate::classify::{tokenize, KeywordClassifier, NumericClassifier, TokenClassifier};
use crate::error::Result;
use crate::graph::{NodeId, NodePool};
use crate::interpret::interpret_cell;
use crate::table::{CellId, TableTree, Token};

/// Runs the per-cell annotation pass: column parent/child linking,
/// tokenization, classification in priority order, and the in-cell
/// interpreter, depth-first over the row-group tree.
pub struct Annotator {
    classifiers: Vec<Box<dyn TokenClassifier>>,
}

impl Annotator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            classifiers: vec![
                Box::new(NumericClassifier),
                Box::new(KeywordClassifier),
            ],
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn TokenClassifier>) -> Self {
        self.classifiers.push(classifier);
        self
    }

    pub async fn annotate_tree(&self, tree: &mut TableTree, pool: &mut NodePool) -> Result<()> {
        tree.link_columns();
        for group in tree.rows_depth_first() {
            let fields = tree.row(group).fields.clone();
            for cell in fields {
                self.annotate_cell(cell, tree, pool).await?;
            }
        }
        Ok(())
    }

    async fn annotate_cell(
        &self,
        cell: CellId,
        tree: &mut TableTree,
        pool: &mut NodePool,
    ) -> Result<()> {
        let texts = tokenize(&tree.cell(cell).text);
        tree.cell_mut(cell).tokens = texts.iter().map(|t| Token::new(t.as_str())).collect();

        for (index, token) in texts.iter().enumerate() {
            let mut features: Vec<NodeId> = Vec::new();
            for classifier in &self.classifiers {
                let found = classifier
                    .classify(token, cell, &features, tree, pool)
                    .await?;
                features.extend(found);
            }
            tree.cell_mut(cell).tokens[index].features = features;
        }

        interpret_cell(tree, pool, cell);
        Ok(())
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}
