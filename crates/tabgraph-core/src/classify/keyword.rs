use async_trait::async_trait;

use super::TokenClassifier;
use crate::error::Result;
use crate::graph::{
    vocab, Constraint, Identity, NamedRef, NodeId, NodePool, ScanDirection, SupertypeConstraint,
    Term,
};
use crate::table::{CellId, TableTree};

/// Classifies statistical keywords into measure nodes.
///
/// Most keywords yield a composite node that declares its measure type and
/// waits for a value. Range-like measures wait for a minimum and a maximum.
/// Percentage and population count yield self-filling scan nodes instead,
/// since their value has to be searched for in the surrounding tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn measure(pool: &mut NodePool, cell: CellId, token: &str, ty: &str) -> NodeId {
        let id = pool.new_composite(cell, vec![token.to_string()], Identity::Anonymous);
        pool.resolve(
            id,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(ty)),
        );
        pool.push_pending(id, NamedRef::new(vocab::HAS_VALUE), Constraint::Literal);
        id
    }

    fn interval(pool: &mut NodePool, cell: CellId, token: &str, ty: &str) -> NodeId {
        let id = pool.new_composite(cell, vec![token.to_string()], Identity::Anonymous);
        pool.resolve(
            id,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(ty)),
        );
        pool.push_pending(id, NamedRef::new(vocab::HAS_MIN_VALUE), Constraint::Literal);
        pool.push_pending(id, NamedRef::new(vocab::HAS_MAX_VALUE), Constraint::Literal);
        id
    }

    fn scanning(
        pool: &mut NodePool,
        cell: CellId,
        token: &str,
        ty: &str,
        direction: ScanDirection,
    ) -> NodeId {
        let id = pool.new_scanning(cell, vec![token.to_string()], direction);
        pool.resolve(
            id,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(ty)),
        );
        pool.push_pending(id, NamedRef::new(vocab::HAS_VALUE), Constraint::Literal);
        id
    }
}

#[async_trait]
impl TokenClassifier for KeywordClassifier {
    async fn classify(
        &self,
        token: &str,
        cell: CellId,
        _prior: &[NodeId],
        _tree: &mut TableTree,
        pool: &mut NodePool,
    ) -> Result<Vec<NodeId>> {
        let upper = token.to_uppercase();
        let node = match upper.as_str() {
            "MEAN" | "AVERAGE" => Self::measure(pool, cell, token, vocab::MEAN),
            "GM" | "GEOMETRIC_MEAN" => Self::measure(pool, cell, token, vocab::GEOMETRIC_MEAN),
            "MEDIAN" => Self::measure(pool, cell, token, vocab::MEDIAN),
            "SD" | "S_._D_." | "STANDARD_DEVIATION" | "STD_._DEV_." | "ST_._DEV_." => {
                Self::measure(pool, cell, token, vocab::STANDARD_DEVIATION)
            }
            "SE" | "S_._E_." | "STANDARD_ERROR" => {
                Self::measure(pool, cell, token, vocab::STANDARD_ERROR)
            }
            "%" | "PERCENT" => {
                let id = Self::scanning(
                    pool,
                    cell,
                    token,
                    vocab::PERCENTAGE,
                    ScanDirection::RightToLeft,
                );
                pool.push_pending(
                    id,
                    NamedRef::new(vocab::IN_RELATION_TO),
                    Constraint::Supertype(SupertypeConstraint::new(vocab::OWL_CLASS)),
                );
                id
            }
            "IQR" | "INTERQUARTILE_RANGE" => {
                Self::interval(pool, cell, token, vocab::INTERQUARTILE_RANGE)
            }
            "CI" | "CONFIDENCE_INTERVAL" => {
                Self::interval(pool, cell, token, vocab::CONFIDENCE_INTERVAL)
            }
            "CV" | "COEFFICIENT_OF_VARIATION" => {
                Self::interval(pool, cell, token, vocab::COEFFICIENT_OF_VARIATION)
            }
            "RANGE" => Self::interval(pool, cell, token, vocab::RANGE),
            "N" | "NO" => Self::scanning(
                pool,
                cell,
                token,
                vocab::POPULATION_SIZE,
                ScanDirection::LeftToRight,
            ),
            _ => return Ok(Vec::new()),
        };
        Ok(vec![node])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{SourceCell, SourceTable};
    use crate::graph::FeatureState;

    async fn classify(token: &str) -> (NodePool, Vec<NodeId>) {
        let source = SourceTable {
            rows: vec![vec![SourceCell::new(token)]],
            font_runs: Vec::new(),
        };
        let mut tree = TableTree::reconstruct(0, &source).unwrap();
        let mut pool = NodePool::new();
        let out = KeywordClassifier
            .classify(token, CellId(0), &[], &mut tree, &mut pool)
            .await
            .unwrap();
        (pool, out)
    }

    #[tokio::test]
    async fn mean_declares_its_type_and_awaits_a_value() {
        let (pool, out) = classify("Mean").await;
        let id = out[0];

        assert_eq!(
            pool.declared_type(id),
            Some(NamedRef::new(vocab::MEAN))
        );
        assert_eq!(pool.pending_count(id), 1);
        assert_eq!(pool.state(id), FeatureState::Value);
    }

    #[tokio::test]
    async fn keyword_matching_is_case_insensitive() {
        for token in ["sd", "SD", "Sd"] {
            let (pool, out) = classify(token).await;
            assert_eq!(
                pool.declared_type(out[0]),
                Some(NamedRef::new(vocab::STANDARD_DEVIATION)),
                "{token}"
            );
        }
    }

    #[tokio::test]
    async fn merged_idiom_forms_match() {
        let (pool, out) = classify("Standard_Deviation").await;
        assert_eq!(
            pool.declared_type(out[0]),
            Some(NamedRef::new(vocab::STANDARD_DEVIATION))
        );

        let (pool, out) = classify("S_._E_.").await;
        assert_eq!(
            pool.declared_type(out[0]),
            Some(NamedRef::new(vocab::STANDARD_ERROR))
        );
    }

    #[tokio::test]
    async fn range_like_measures_await_min_and_max() {
        for token in ["IQR", "CI", "CV", "Range"] {
            let (pool, out) = classify(token).await;
            assert_eq!(pool.pending_count(out[0]), 2, "{token}");
        }
    }

    #[tokio::test]
    async fn percentage_scans_right_to_left() {
        let (pool, out) = classify("%").await;
        let id = out[0];

        assert_eq!(pool.node(id).scan, Some(ScanDirection::RightToLeft));
        assert_eq!(pool.state(id), FeatureState::Interpreter);
        assert_eq!(pool.pending_count(id), 2);
    }

    #[tokio::test]
    async fn population_count_scans_left_to_right() {
        for token in ["N", "No"] {
            let (pool, out) = classify(token).await;
            assert_eq!(
                pool.node(out[0]).scan,
                Some(ScanDirection::LeftToRight),
                "{token}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_tokens_do_not_match() {
        assert!(classify("Female").await.1.is_empty());
        assert!(classify("42.3").await.1.is_empty());
    }
}
