use async_trait::async_trait;

use super::TokenClassifier;
use crate::error::Result;
use crate::graph::{LiteralValue, NodeId, NodePool};
use crate::table::{CellId, TableTree};

/// Classifies tokens that parse as floating-point numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericClassifier;

#[async_trait]
impl TokenClassifier for NumericClassifier {
    async fn classify(
        &self,
        token: &str,
        cell: CellId,
        _prior: &[NodeId],
        _tree: &mut TableTree,
        pool: &mut NodePool,
    ) -> Result<Vec<NodeId>> {
        match token.parse::<f64>() {
            Ok(value) => Ok(vec![pool.new_literal(
                cell,
                vec![token.to_string()],
                LiteralValue::Number(value),
            )]),
            Err(_) => Ok(Vec::new()),
        }
    }
}
