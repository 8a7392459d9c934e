use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed extraction: {0}")]
    MalformedExtraction(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Concept lookup failed: {0}")]
    Lookup(#[from] crate::lookup::LookupError),
}

pub type Result<T> = std::result::Result<T, Error>;
