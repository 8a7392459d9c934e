use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::{Identity, NodePool, Payload};
use super::term::{LiteralValue, NodeId, Term};
use super::vocab;
use crate::table::TableTree;

/// How much cell provenance to attach to each emitted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceDetail {
    Off,
    Compact,
    #[default]
    Full,
}

/// Emission options, threaded explicitly from the orchestrator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EmitConfig {
    pub provenance: ProvenanceDetail,
}

/// Object position of an emitted relation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectValue {
    Literal(LiteralValue),
    Iri(String),
}

/// One emitted relation: `(subject id, relation type, object)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub subject: String,
    pub predicate: String,
    pub object: ObjectValue,
}

/// Depth-first translator from composite nodes to relation records.
///
/// Allocates one identifier per node (the persistent namespace+name for
/// individuals, a fresh blank label otherwise) and memoizes it so every
/// node is translated exactly once even when referenced from several
/// relations or columns.
pub struct Translator<'a> {
    pool: &'a NodePool,
    tree: &'a TableTree,
    config: EmitConfig,
    ids: HashMap<NodeId, String>,
    next_blank: usize,
    records: Vec<RelationRecord>,
}

impl<'a> Translator<'a> {
    #[must_use]
    pub fn new(pool: &'a NodePool, tree: &'a TableTree, config: EmitConfig) -> Self {
        Self {
            pool,
            tree,
            config,
            ids: HashMap::new(),
            next_blank: 0,
            records: Vec::new(),
        }
    }

    /// Emit every composite node in `nodes`; non-composite leftovers carry
    /// no relations of their own and are skipped.
    pub fn emit_all(&mut self, nodes: &[NodeId]) {
        for &id in nodes {
            if matches!(self.pool.node(id).payload, Payload::Composite(_)) {
                self.emit_node(id);
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> Vec<RelationRecord> {
        self.records
    }

    fn emit_node(&mut self, id: NodeId) -> String {
        if let Some(existing) = self.ids.get(&id) {
            return existing.clone();
        }

        let Some(composite) = self.pool.composite(id) else {
            return String::new();
        };

        let subject = match &composite.identity {
            Identity::Named { name, namespace } => {
                format!("{namespace}{}", vocab::clean_for_iri(name))
            }
            Identity::Anonymous => {
                let label = format!("_:c{}", self.next_blank);
                self.next_blank += 1;
                label
            }
        };
        self.ids.insert(id, subject.clone());

        for relation in &composite.resolved {
            let object = match &relation.object {
                Term::Literal(value) => ObjectValue::Literal(value.clone()),
                Term::Named(name) => ObjectValue::Iri(vocab::expand(name)),
                Term::Node(node) => self.object_for(*node),
            };
            self.records.push(RelationRecord {
                subject: subject.clone(),
                predicate: vocab::expand(&relation.predicate),
                object,
            });
        }

        self.emit_provenance(id, &subject);
        subject
    }

    fn object_for(&mut self, id: NodeId) -> ObjectValue {
        match &self.pool.node(id).payload {
            Payload::Literal(value) => ObjectValue::Literal(value.clone()),
            Payload::Concept { concept, .. } => ObjectValue::Iri(vocab::expand(concept)),
            Payload::Composite(_) => ObjectValue::Iri(self.emit_node(id)),
        }
    }

    fn emit_provenance(&mut self, id: NodeId, subject: &str) {
        let cell = self.tree.cell(self.pool.node(id).cell);
        let span = cell.span;
        match self.config.provenance {
            ProvenanceDetail::Off => {}
            ProvenanceDetail::Compact => {
                let spans = format!("{},{},{}", span.row, span.col, cell.table_index);
                self.push_meta(subject, vocab::CELL_SPANS, ObjectValue::Literal(
                    LiteralValue::Text(spans),
                ));
            }
            ProvenanceDetail::Full => {
                #[allow(clippy::cast_precision_loss)]
                for (predicate, value) in [
                    (vocab::ROW_INDEX, span.row as f64),
                    (vocab::COL_INDEX, span.col as f64),
                    (vocab::TABLE_INDEX, cell.table_index as f64),
                ] {
                    self.push_meta(
                        subject,
                        predicate,
                        ObjectValue::Literal(LiteralValue::Number(value)),
                    );
                }
            }
        }
    }

    fn push_meta(&mut self, subject: &str, predicate: &str, object: ObjectValue) {
        self.records.push(RelationRecord {
            subject: subject.to_string(),
            predicate: vocab::expand(&super::term::NamedRef::new(predicate)),
            object,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{SourceCell, SourceTable};
    use crate::graph::{Constraint, NamedRef};

    fn fixture() -> (NodePool, TableTree) {
        let source = SourceTable {
            rows: vec![vec![SourceCell::new("x").with_span(0, 0)]],
            font_runs: Vec::new(),
        };
        (NodePool::new(), TableTree::reconstruct(0, &source).unwrap())
    }

    #[test]
    fn named_nodes_use_their_persistent_identifier() {
        let (mut pool, tree) = fixture();
        let n = pool.new_composite(
            crate::table::CellId(0),
            vec![],
            Identity::Named {
                name: "Col1Table0StudyArm".into(),
                namespace: vocab::INDIVIDUALS_NS.into(),
            },
        );
        pool.resolve(
            n,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(vocab::OWL_CLASS)),
        );

        let mut translator = Translator::new(&pool, &tree, EmitConfig::default());
        translator.emit_all(&[n]);
        let records = translator.finish();

        assert!(records[0]
            .subject
            .ends_with("studycohort_individuals/Col1Table0StudyArm"));
    }

    #[test]
    fn nodes_are_translated_exactly_once() {
        let (mut pool, tree) = fixture();
        let inner = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        pool.resolve(
            inner,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(vocab::MEAN)),
        );
        let a = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        let b = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        for outer in [a, b] {
            pool.resolve(
                outer,
                NamedRef::new(vocab::HAS_ATTRIBUTE),
                Term::Node(inner),
            );
        }

        let config = EmitConfig {
            provenance: ProvenanceDetail::Off,
        };
        let mut translator = Translator::new(&pool, &tree, config);
        translator.emit_all(&[a, b]);
        let records = translator.finish();

        let type_records: Vec<_> = records
            .iter()
            .filter(|r| r.predicate.ends_with("#type"))
            .collect();
        assert_eq!(type_records.len(), 1);

        let refs: Vec<_> = records
            .iter()
            .filter(|r| r.predicate.ends_with("hasAttribute"))
            .map(|r| r.object.clone())
            .collect();
        assert_eq!(refs[0], refs[1]);
    }

    #[test]
    fn unresolved_relations_are_not_emitted() {
        let (mut pool, tree) = fixture();
        let n = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        pool.push_pending(n, NamedRef::new(vocab::HAS_VALUE), Constraint::Literal);

        let config = EmitConfig {
            provenance: ProvenanceDetail::Off,
        };
        let mut translator = Translator::new(&pool, &tree, config);
        translator.emit_all(&[n]);

        assert!(translator.finish().is_empty());
    }

    #[test]
    fn provenance_detail_levels() {
        let (mut pool, tree) = fixture();
        let n = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        pool.resolve(
            n,
            NamedRef::new(vocab::RDF_TYPE),
            Term::Named(NamedRef::new(vocab::MEAN)),
        );

        for (detail, expected_extra) in [
            (ProvenanceDetail::Off, 0),
            (ProvenanceDetail::Compact, 1),
            (ProvenanceDetail::Full, 3),
        ] {
            let mut translator =
                Translator::new(&pool, &tree, EmitConfig { provenance: detail });
            translator.emit_all(&[n]);
            assert_eq!(translator.finish().len(), 1 + expected_extra);
        }
    }

    #[test]
    fn literal_objects_pass_through() {
        let (mut pool, tree) = fixture();
        let n = pool.new_composite(crate::table::CellId(0), vec![], Identity::Anonymous);
        let v = pool.new_literal(
            crate::table::CellId(0),
            vec!["42.3".into()],
            LiteralValue::Number(42.3),
        );
        pool.resolve(n, NamedRef::new(vocab::HAS_VALUE), Term::Node(v));

        let config = EmitConfig {
            provenance: ProvenanceDetail::Off,
        };
        let mut translator = Translator::new(&pool, &tree, config);
        translator.emit_all(&[n]);
        let records = translator.finish();

        assert_eq!(
            records[0].object,
            ObjectValue::Literal(LiteralValue::Number(42.3))
        );
    }
}
