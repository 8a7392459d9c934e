pub mod annotate;
pub mod classify;
pub mod error;
pub mod extraction;
pub mod graph;
pub mod interpret;
pub mod lookup;
pub mod pipeline;
pub mod review;
pub mod table;

pub use annotate::Annotator;
pub use error::{Error, Result};
pub use extraction::{BoundingBox, Extraction, FontRun, SourceCell, SourceTable};
pub use graph::{
    Constraint, EmitConfig, FeatureState, Identity, LiteralValue, MeasureTaxonomy, NamedRef,
    NodeId, NodePool, ObjectValue, Payload, ProvenanceDetail, RelationRecord, ScanDirection,
    SupertypeConstraint, Term,
};
pub use lookup::{AnnotatorClient, ConceptLookup, LookupConfig, LookupError};
pub use pipeline::{ColumnNodes, DocumentOutput, Pipeline, PipelineStats, TableOutput};
pub use review::{CellEdit, ReviewSheet};
pub use table::{Cell, CellId, GridSpan, RowGroupId, TableTree};
