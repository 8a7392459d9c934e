pub mod concept;
pub mod keyword;
pub mod lexicon;
pub mod numeric;
pub mod tokenizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::graph::{NodeId, NodePool};
use crate::table::{CellId, TableTree};

pub use concept::{ConceptClassifier, MatchKind, RankedConcept, TokenConcepts};
pub use keyword::KeywordClassifier;
pub use lexicon::Lexicon;
pub use numeric::NumericClassifier;
pub use tokenizer::tokenize;

/// Maps one token (plus its owning cell) to zero or more feature nodes.
///
/// Classifiers are tried in a fixed priority order and their outputs
/// concatenated; `prior` carries the features earlier classifiers already
/// attached to this token. Absence of a match is an empty list, never an
/// error; only the concept classifier can fail, on lookup transport errors.
#[async_trait]
pub trait TokenClassifier: Send + Sync {
    async fn classify(
        &self,
        token: &str,
        cell: CellId,
        prior: &[NodeId],
        tree: &mut TableTree,
        pool: &mut NodePool,
    ) -> Result<Vec<NodeId>>;
}
