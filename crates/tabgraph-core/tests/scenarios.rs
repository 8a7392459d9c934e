use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tabgraph_core::graph::vocab;
use tabgraph_core::lookup::{AnnotationResult, ConceptLookup, LookupResult};
use tabgraph_core::{
    BoundingBox, DocumentOutput, EmitConfig, Extraction, Identity, LiteralValue, NodeId, NodePool,
    ObjectValue, Payload, Pipeline, ProvenanceDetail, SourceCell, SourceTable, Term,
};

fn extraction_of(rows: Vec<Vec<&str>>) -> Extraction {
    let table = SourceTable {
        rows: rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, text)| {
                        let indent = if text.starts_with("  ") { 20.0 } else { 10.0 };
                        let mut cell = SourceCell::new(text.trim_start().to_string()).with_span(r, c);
                        if c == 0 {
                            cell = cell.with_bbox(BoundingBox::new(
                                indent,
                                r as f64 * 10.0,
                                indent + 50.0,
                                r as f64 * 10.0 + 8.0,
                            ));
                        }
                        cell
                    })
                    .collect()
            })
            .collect(),
        font_runs: Vec::new(),
    };
    Extraction {
        source: None,
        tables: vec![table],
    }
}

async fn process(rows: Vec<Vec<&str>>) -> DocumentOutput {
    Pipeline::new()
        .process(&extraction_of(rows))
        .await
        .expect("pipeline run")
}

fn arm_attributes(pool: &NodePool, arm: NodeId) -> Vec<NodeId> {
    pool.composite(arm)
        .unwrap()
        .resolved
        .iter()
        .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
        .filter_map(|r| match r.object {
            Term::Node(id) => Some(id),
            _ => None,
        })
        .collect()
}

fn attribute_of(pool: &NodePool, node: NodeId, ty: &str) -> Option<NodeId> {
    pool.composite(node)?
        .resolved
        .iter()
        .filter(|r| r.predicate.id == vocab::HAS_ATTRIBUTE)
        .find_map(|r| match r.object {
            Term::Node(id) => (pool.declared_type(id)?.id == ty).then_some(id),
            _ => None,
        })
}

fn value_of(pool: &NodePool, node: NodeId) -> Option<f64> {
    pool.composite(node)?
        .resolved
        .iter()
        .find(|r| r.predicate.id == vocab::HAS_VALUE)
        .and_then(|r| match &r.object {
            Term::Node(id) => match &pool.node(*id).payload {
                Payload::Literal(LiteralValue::Number(n)) => Some(*n),
                _ => None,
            },
            Term::Literal(LiteralValue::Number(n)) => Some(*n),
            Term::Literal(LiteralValue::Text(_)) | Term::Named(_) => None,
        })
}

fn label_of(pool: &NodePool, node: NodeId) -> Option<String> {
    pool.composite(node)?
        .resolved
        .iter()
        .find(|r| r.predicate.id == vocab::RDFS_LABEL)
        .and_then(|r| match &r.object {
            Term::Node(id) => match &pool.node(*id).payload {
                Payload::Literal(LiteralValue::Text(t)) => Some(t.clone()),
                _ => None,
            },
            _ => None,
        })
}

#[tokio::test]
async fn nested_measure_row_fills_a_continuous_characteristic() {
    let output = process(vec![
        vec!["", "Control"],
        vec!["Age (years)", ""],
        vec!["  Mean (SD)", "42.3 (5.1)"],
    ])
    .await;

    let table = &output.tables[0];
    let arm = table.columns[0].nodes[0];
    let attributes = arm_attributes(&table.pool, arm);
    assert_eq!(attributes.len(), 1);

    let characteristic = attributes[0];
    assert_eq!(
        label_of(&table.pool, characteristic),
        Some("Age years".to_string())
    );

    let mean = attribute_of(&table.pool, characteristic, vocab::MEAN).expect("mean attached");
    assert_eq!(value_of(&table.pool, mean), Some(42.3));

    let sd = attribute_of(&table.pool, characteristic, vocab::STANDARD_DEVIATION)
        .expect("standard deviation attached");
    assert_eq!(value_of(&table.pool, sd), Some(5.1));
}

#[tokio::test]
async fn percent_row_without_keywords_becomes_categorical() {
    let output = process(vec![vec!["", "Control"], vec!["Female", "30 (60%)"]]).await;

    let table = &output.tables[0];
    let categorical = table.columns[0]
        .nodes
        .iter()
        .find_map(|&n| {
            table.pool.composite(n).and_then(|c| match &c.identity {
                Identity::Named { name, .. } if name.contains("StudySubject") => Some(n),
                _ => None,
            })
        })
        .expect("categorical characteristic");

    let population = attribute_of(&table.pool, categorical, vocab::POPULATION_SIZE)
        .expect("population count attached");
    assert_eq!(value_of(&table.pool, population), Some(30.0));

    let percentage = (0..table.pool.len()).map(NodeId).find(|&id| {
        table
            .pool
            .declared_type(id)
            .is_some_and(|t| t.id == vocab::PERCENTAGE)
            && value_of(&table.pool, id) == Some(60.0)
    });
    assert!(percentage.is_some(), "percentage value captured");
}

#[tokio::test]
async fn plus_minus_data_stays_continuous() {
    let output = process(vec![vec!["", "Control"], vec!["Weight", "80.5 ± 12.1"]]).await;

    let table = &output.tables[0];
    let arm = table.columns[0].nodes[0];
    let characteristic = arm_attributes(&table.pool, arm)[0];

    let mean = attribute_of(&table.pool, characteristic, vocab::MEAN).unwrap();
    assert_eq!(value_of(&table.pool, mean), Some(80.5));
    let sd = attribute_of(&table.pool, characteristic, vocab::STANDARD_DEVIATION).unwrap();
    assert_eq!(value_of(&table.pool, sd), Some(12.1));
}

#[tokio::test]
async fn unparsable_data_cell_contributes_no_values() {
    let output = process(vec![vec!["", "Control"], vec!["BMI", "N/A"]]).await;

    let table = &output.tables[0];
    let records = table.emit(EmitConfig {
        provenance: ProvenanceDetail::Off,
    });

    assert!(records
        .iter()
        .all(|r| !matches!(r.object, ObjectValue::Literal(LiteralValue::Number(_)))));
}

#[tokio::test]
async fn subsumption_is_monotonic_across_a_run() {
    let output = process(vec![
        vec!["", "Control", "Treated"],
        vec!["Age (years)", "", ""],
        vec!["  Mean (SD)", "42.3 (5.1)", "44.0 (4.2)"],
        vec!["Female", "30 (60%)", "28 (56%)"],
    ])
    .await;

    // every emitted top-level node is unsubsumed, everything referenced
    // from a resolved relation of an emitted node was subsumed exactly when
    // it was absorbed
    for table in &output.tables {
        for column in &table.columns {
            for &node in column.nodes.iter().skip(1) {
                assert!(!table.pool.node(node).subsumed);
            }
        }
    }
}

#[tokio::test]
async fn relation_records_reference_each_node_consistently() {
    let output = process(vec![
        vec!["", "Control"],
        vec!["Age (years)", ""],
        vec!["  Mean (SD)", "42.3 (5.1)"],
    ])
    .await;

    let records = output.emit(EmitConfig {
        provenance: ProvenanceDetail::Off,
    });

    let arm_subject = records
        .iter()
        .find(|r| r.subject.ends_with("Col1Table0StudyArm"))
        .map(|r| r.subject.clone())
        .expect("arm emitted");

    let attribute_object = records
        .iter()
        .find(|r| r.subject == arm_subject && r.predicate.ends_with("hasAttribute"))
        .map(|r| r.object.clone())
        .expect("arm links its characteristic");

    let ObjectValue::Iri(characteristic_id) = attribute_object else {
        panic!("characteristic must be referenced by id");
    };
    assert!(records.iter().any(|r| r.subject == characteristic_id));

    assert!(records.iter().any(|r| {
        r.predicate.ends_with("hasValue")
            && r.object == ObjectValue::Literal(LiteralValue::Number(42.3))
    }));
}

#[tokio::test]
async fn provenance_records_follow_the_config() {
    let rows = vec![vec!["", "Control"], vec!["Female", "30 (60%)"]];

    let with = process(rows.clone()).await.emit(EmitConfig {
        provenance: ProvenanceDetail::Full,
    });
    let without = process(rows).await.emit(EmitConfig {
        provenance: ProvenanceDetail::Off,
    });

    assert!(with.iter().any(|r| r.predicate.ends_with("rowIndex")));
    assert!(without.iter().all(|r| !r.predicate.ends_with("rowIndex")));
    assert!(with.len() > without.len());
}

struct CountingLookup {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ConceptLookup for CountingLookup {
    async fn annotate(
        &self,
        text: &str,
        _sources: &[String],
    ) -> LookupResult<Vec<AnnotationResult>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn concept_lookup_skips_numbers_and_keyword_matches() {
    let lookup = Arc::new(CountingLookup {
        calls: Mutex::new(Vec::new()),
    });
    let pipeline = Pipeline::new().with_concept_lookup(
        Arc::clone(&lookup) as Arc<dyn ConceptLookup>,
        tabgraph_core::classify::Lexicon::default(),
        vec!["SCO".into()],
    );

    pipeline
        .process(&extraction_of(vec![
            vec!["", "Control"],
            vec!["SD 5", "7"],
        ]))
        .await
        .unwrap();

    let calls = lookup.calls.lock().unwrap();
    assert_eq!(calls.as_slice(), ["CONTROL"]);
}
