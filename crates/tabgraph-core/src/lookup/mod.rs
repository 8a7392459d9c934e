pub mod client;
pub mod config;

pub use client::{
    AnnotatedClass, AnnotationResult, AnnotationSpan, AnnotatorClient, ClassLinks, ConceptLookup,
    LookupError, LookupResult,
};
pub use config::{LookupConfig, DEFAULT_BASE_URL, DEFAULT_SOURCES};
