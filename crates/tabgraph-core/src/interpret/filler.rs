use crate::graph::{NodeId, NodePool, ScanDirection};
use crate::table::TableTree;

/// Scan the owning cell's tokens from just past this node's own anchor, in
/// its configured direction, and try each unsubsumed feature against the
/// node's unresolved relations in declaration order, stopping at the first
/// successful fill per candidate. The token that carried a used feature is annotated with a
/// reference to this node. One pass only; anything still unresolved leaves
/// the node in interpreter state for good.
pub fn directional_fill(tree: &mut TableTree, pool: &mut NodePool, node: NodeId) {
    let cell = pool.node(node).cell;
    let Some(direction) = pool.node(node).scan else {
        return;
    };

    let token_count = tree.cell(cell).tokens.len();
    let order: Vec<usize> = match direction {
        ScanDirection::LeftToRight => (0..token_count).collect(),
        ScanDirection::RightToLeft => (0..token_count).rev().collect(),
    };

    let mut scanning = false;
    for token_index in order {
        let features = tree.cell(cell).tokens[token_index].features.clone();
        for candidate in features {
            if candidate == node {
                scanning = true;
                continue;
            }
            if !scanning || pool.node(candidate).subsumed {
                continue;
            }
            let pending = pool.pending_count(node);
            for index in 0..pending {
                if pool.try_fill(node, candidate, index) {
                    tree.cell_mut(cell).tokens[token_index].features.push(node);
                    break;
                }
            }
        }
    }
}
