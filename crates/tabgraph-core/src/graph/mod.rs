pub mod constraint;
pub mod emit;
pub mod node;
pub mod term;
pub mod vocab;

pub use constraint::{Constraint, MeasureTaxonomy, SupertypeConstraint};
pub use emit::{EmitConfig, ObjectValue, ProvenanceDetail, RelationRecord, Translator};
pub use node::{
    Composite, FeatureState, GraphNode, Identity, NodePool, Payload, Pending, Relation,
    ScanDirection,
};
pub use term::{LiteralValue, NamedRef, NodeId, Term};
