use std::collections::HashSet;
use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use super::TokenClassifier;
use crate::error::Result;
use crate::graph::{vocab, NamedRef, NodeId, NodePool};
use crate::lookup::{AnnotationResult, ConceptLookup};
use crate::table::{CellId, TableTree};

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

// Reserved terms that are never worth a lookup.
const STOP_WORDS: &[&str] = &["AND", "OR", "OF", "NO"];

/// How a candidate concept was reached from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Literal,
    Lemma,
    Synonym,
}

/// One ranked candidate concept for a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedConcept {
    pub concept_id: String,
    pub ontology: String,
    pub matched_text: String,
    pub kind: MatchKind,
    pub annotator_match: String,
    pub score: f64,
}

/// The full ranked candidate list for one token, kept on the cell so a
/// reviewer can pick a different concept later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConcepts {
    pub token: String,
    pub candidates: Vec<RankedConcept>,
}

/// Classifies tokens against the external concept-lookup collaborator.
///
/// The token is queried in context (cell words wrapped in the column-header
/// words), then once more through its lexical expansions. Candidates whose
/// matched text contains neither the token nor an expansion are discarded;
/// survivors are ranked by matched-word count (synonym matches below lemma
/// matches below literal matches), then by source priority, deduplicated per
/// source. Only the top candidate becomes a feature.
pub struct ConceptClassifier {
    lookup: Arc<dyn ConceptLookup>,
    lexicon: Lexicon,
    sources: Vec<String>,
}

impl ConceptClassifier {
    #[must_use]
    pub fn new(lookup: Arc<dyn ConceptLookup>, lexicon: Lexicon, sources: Vec<String>) -> Self {
        Self {
            lookup,
            lexicon,
            sources,
        }
    }

    fn words(text: &str) -> Vec<String> {
        WORD_RE
            .find_iter(&text.to_uppercase())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Priority position of the candidate's source ontology, by acronym
    /// suffix of its ontology link. Unlisted sources rank nowhere.
    fn source_priority(&self, ontology: &str) -> Option<usize> {
        self.sources.iter().position(|s| ontology.ends_with(s))
    }

    fn rank(&self, raw: Vec<RankedConcept>) -> Vec<RankedConcept> {
        let mut indexed: Vec<(usize, RankedConcept)> = raw
            .into_iter()
            .filter_map(|c| self.source_priority(&c.ontology).map(|p| (p, c)))
            .collect();
        indexed.sort_by(|(pa, a), (pb, b)| b.score.total_cmp(&a.score).then(pa.cmp(pb)));

        let mut seen = HashSet::new();
        indexed
            .into_iter()
            .filter(|(p, c)| seen.insert((*p, c.concept_id.clone())))
            .map(|(_, c)| c)
            .collect()
    }
}

fn literal_candidates(results: Vec<AnnotationResult>) -> Vec<RankedConcept> {
    results
        .into_iter()
        .filter_map(|r| {
            let span = r.annotations.first()?;
            #[allow(clippy::cast_precision_loss)]
            let score = span.text.split_whitespace().count() as f64;
            Some(RankedConcept {
                concept_id: r.annotated_class.id.clone(),
                ontology: r.annotated_class.links.ontology.clone(),
                matched_text: span.text.clone(),
                kind: MatchKind::Literal,
                annotator_match: span.match_type.clone(),
                score,
            })
        })
        .collect()
}

fn expansion_candidates(results: Vec<AnnotationResult>, lemmas: &[String]) -> Vec<RankedConcept> {
    results
        .into_iter()
        .filter_map(|r| {
            let span = r.annotations.first()?;
            let (kind, score) = if lemmas.contains(&span.text.to_lowercase()) {
                (MatchKind::Lemma, 0.5)
            } else {
                (MatchKind::Synonym, 0.0)
            };
            Some(RankedConcept {
                concept_id: r.annotated_class.id.clone(),
                ontology: r.annotated_class.links.ontology.clone(),
                matched_text: span.text.clone(),
                kind,
                annotator_match: span.match_type.clone(),
                score,
            })
        })
        .collect()
}

#[async_trait]
impl TokenClassifier for ConceptClassifier {
    async fn classify(
        &self,
        token: &str,
        cell: CellId,
        prior: &[NodeId],
        tree: &mut TableTree,
        pool: &mut NodePool,
    ) -> Result<Vec<NodeId>> {
        if !token.chars().any(char::is_alphabetic) {
            return Ok(Vec::new());
        }
        if !prior.is_empty() {
            return Ok(Vec::new());
        }
        if STOP_WORDS.contains(&token.to_uppercase().as_str()) {
            return Ok(Vec::new());
        }

        let cell_words = Self::words(&tree.cell(cell).text);
        let parent_words = tree
            .cell(cell)
            .col_parent
            .map(|p| Self::words(&tree.cell(p).text))
            .unwrap_or_default();

        // Wrap the cell words in the column-header context on both sides.
        let query = if parent_words.is_empty() {
            cell_words.join(" ")
        } else {
            format!(
                "{} {} {}",
                parent_words.join(" "),
                cell_words.join(" "),
                parent_words.join(" ")
            )
        };

        let mut candidates = literal_candidates(self.lookup.annotate(&query, &self.sources).await?);

        let mut must_have = vec![token.to_uppercase()];
        let lemmas: Vec<String> = self
            .lexicon
            .lemmas(token)
            .iter()
            .map(|l| l.to_lowercase())
            .collect();
        let mut expansion_terms = Vec::new();
        for term in self.lexicon.expansions(token) {
            let upper = term.to_uppercase();
            if !cell_words.contains(&upper) && !parent_words.contains(&upper) {
                must_have.push(upper);
                expansion_terms.push(term);
            }
        }

        if !expansion_terms.is_empty() {
            let results = self
                .lookup
                .annotate(&expansion_terms.join(" "), &self.sources)
                .await?;
            candidates.extend(expansion_candidates(results, &lemmas));
        }

        candidates.retain(|c| {
            c.matched_text
                .to_uppercase()
                .split_whitespace()
                .any(|w| must_have.iter().any(|m| m == w))
        });

        let ranked = self.rank(candidates);
        tree.cell_mut(cell).lookup_hits.push(TokenConcepts {
            token: token.to_string(),
            candidates: ranked.clone(),
        });

        let Some(top) = ranked.first() else {
            return Ok(Vec::new());
        };

        if tree.cell(cell).top_concept.is_none() {
            tree.cell_mut(cell).top_concept = Some(NamedRef::new(top.concept_id.clone()));
        }

        let node = pool.new_concept(
            cell,
            vec![token.to_string()],
            NamedRef::new(top.concept_id.clone()),
            vec![NamedRef::new(vocab::SUBJECT_CHARACTERISTIC)],
        );
        Ok(vec![node])
    }
}
