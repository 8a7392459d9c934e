use super::filler::directional_fill;
use crate::graph::{FeatureState, NodePool};
use crate::table::{CellId, TableTree};

/// Single pass over a cell's tokens, invoking `interpret` on every feature
/// that is still interpreter-typed. No fixed-point retry: whatever is left
/// unresolved afterwards stays unresolved for this cell.
pub fn interpret_cell(tree: &mut TableTree, pool: &mut NodePool, cell: CellId) {
    let token_count = tree.cell(cell).tokens.len();
    for token_index in 0..token_count {
        let mut feature_index = 0;
        loop {
            let Some(&feature) = tree.cell(cell).tokens[token_index].features.get(feature_index)
            else {
                break;
            };
            if pool.state(feature) == FeatureState::Interpreter {
                directional_fill(tree, pool, feature);
            }
            feature_index += 1;
        }
    }
}
