//! Relation-type and concept identifiers used by the classifiers and the
//! column assembler, plus prefix expansion for emission.

use super::term::NamedRef;

pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_SUBCLASS_OF: &str = "rdfs:subClassOf";
pub const RDFS_LABEL: &str = "rdfs:hasLabel";

pub const HAS_VALUE: &str = "sio:hasValue";
pub const HAS_MIN_VALUE: &str = "sio:hasMinValue";
pub const HAS_MAX_VALUE: &str = "sio:hasMaxValue";
pub const HAS_UNIT: &str = "sio:hasUnit";
pub const HAS_ATTRIBUTE: &str = "sio:hasAttribute";
pub const IN_RELATION_TO: &str = "sio:inRelationTo";

pub const MEAN: &str = "sio:Mean";
pub const MEDIAN: &str = "sio:Median";
pub const GEOMETRIC_MEAN: &str = "sco:GeometricMean";
pub const STANDARD_DEVIATION: &str = "sio:StandardDeviation";
pub const STANDARD_ERROR: &str = "sco:StandardError";
pub const INTERQUARTILE_RANGE: &str = "sco:InterquartileRange";
pub const CONFIDENCE_INTERVAL: &str = "sco:ConfidenceInterval";
pub const COEFFICIENT_OF_VARIATION: &str = "sco:CoefficientOfVariation";
pub const RANGE: &str = "sco:Range";
pub const PERCENTAGE: &str = "sio:Percentage";
pub const POPULATION_SIZE: &str = "sco:PopulationSize";

pub const CENTRAL_TENDENCY_MEASURE: &str = "sco:CentralTendencyMeasure";
pub const DISPERSION_MEASURE: &str = "sco:DispersionMeasure";
pub const STATISTICAL_MEASURE: &str = "sco:StatisticalMeasure";
pub const SUBJECT_CHARACTERISTIC: &str = "sco:SubjectCharacteristic";
pub const UNIT_OF_MEASUREMENT: &str = "sco:UnitOfMeasurement";
pub const STUDY_SUBJECT: &str = "sio:StudySubject";
pub const OWL_CLASS: &str = "owl:Class";

pub const ROW_INDEX: &str = "sco:rowIndex";
pub const COL_INDEX: &str = "sco:colIndex";
pub const TABLE_INDEX: &str = "sco:tableIndex";
pub const CELL_SPANS: &str = "sco:cellSpans";

/// Namespace under which generated individuals (study arms, categorical
/// subjects) are minted.
pub const INDIVIDUALS_NS: &str = "https://idea.tw.rpi.edu/projects/heals/studycohort_individuals/";

/// Expand a named reference to a full IRI. An explicit namespace wins;
/// absolute IRIs pass through; known prefixes expand; an unknown prefix is
/// kept verbatim.
#[must_use]
pub fn expand(name: &NamedRef) -> String {
    if let Some(ns) = &name.namespace {
        return format!("{ns}{}", name.id);
    }
    if name.id.contains("://") {
        return name.id.clone();
    }
    match name.id.split_once(':') {
        Some((prefix, local)) => {
            let ns = match prefix {
                "rdf" => "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
                "rdfs" => "http://www.w3.org/2000/01/rdf-schema#",
                "sio" => "http://semanticscience.org/resource/",
                "sco" => "https://idea.tw.rpi.edu/projects/heals/studycohort/",
                "owl" => "http://www.w3.org/2002/07/owl#",
                other => other,
            };
            format!("{ns}{local}")
        }
        None => name.id.clone(),
    }
}

/// Keep only characters that are safe inside a minted IRI.
#[must_use]
pub fn clean_for_iri(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        .collect()
}
