use serde::{Deserialize, Serialize};

use super::term::NamedRef;
use super::vocab;

/// Predicate over candidate objects for an unresolved relation.
///
/// `Literal` accepts any literal candidate and `Named` any named-reference
/// candidate (type check only, no value check). `Supertype` is satisfied by
/// composite candidates whose declared type matches the target, directly or
/// through the measure taxonomy. Composite-shaped object constraints are not
/// supported; structural matching is reserved for later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Literal,
    Named,
    Supertype(SupertypeConstraint),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupertypeConstraint {
    pub target: NamedRef,
    pub node_fillable: bool,
}

impl SupertypeConstraint {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: NamedRef::new(target),
            node_fillable: true,
        }
    }

    /// Refuse composite candidates; the slot is a placeholder for a named
    /// type that only a concept lookup can supply.
    #[must_use]
    pub const fn named_only(mut self) -> Self {
        self.node_fillable = false;
        self
    }
}

/// Subtype closure for the statistical-measure categories.
///
/// The default table is fixed; replace it at pool construction to extend the
/// hierarchy (e.g. from an ontology dump).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureTaxonomy {
    entries: Vec<(String, Vec<String>)>,
}

impl MeasureTaxonomy {
    #[must_use]
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// True when `sub` is a strict subtype of `sup` per the closure table.
    /// Identity is handled by the caller, not here.
    #[must_use]
    pub fn is_subtype(&self, sub: &NamedRef, sup: &NamedRef) -> bool {
        self.entries
            .iter()
            .any(|(s, subs)| s == &sup.id && subs.iter().any(|x| x == &sub.id))
    }
}

impl Default for MeasureTaxonomy {
    fn default() -> Self {
        let central = vec![
            vocab::MEAN.to_string(),
            vocab::GEOMETRIC_MEAN.to_string(),
            vocab::MEDIAN.to_string(),
        ];
        let dispersion = vec![
            vocab::STANDARD_DEVIATION.to_string(),
            vocab::STANDARD_ERROR.to_string(),
            vocab::INTERQUARTILE_RANGE.to_string(),
            vocab::CONFIDENCE_INTERVAL.to_string(),
            vocab::RANGE.to_string(),
            vocab::COEFFICIENT_OF_VARIATION.to_string(),
        ];
        let mut all: Vec<String> = central.iter().chain(dispersion.iter()).cloned().collect();
        all.push(vocab::PERCENTAGE.to_string());
        all.push(vocab::POPULATION_SIZE.to_string());

        Self::new(vec![
            (vocab::CENTRAL_TENDENCY_MEASURE.to_string(), central),
            (vocab::DISPERSION_MEASURE.to_string(), dispersion),
            (vocab::STATISTICAL_MEASURE.to_string(), all),
        ])
    }
}
