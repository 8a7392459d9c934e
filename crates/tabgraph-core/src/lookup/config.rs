use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::client::LookupError;

pub const DEFAULT_BASE_URL: &str = "http://data.bioontology.org";

/// Ontology acronyms queried by default, in ranking priority order.
pub const DEFAULT_SOURCES: &[&str] = &[
    "SCO", "CMO", "HHEAR", "DOID", "LOINC", "DRON", "CHEBI", "HP", "MEDDRA", "NCIT", "IOBC",
];

/// Explicit annotator-client configuration. Constructed once and handed to
/// the client; credentials are never cached process-wide.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub base_url: String,
    pub api_key: String,
    pub sources: Vec<String>,
    pub min_request_interval: Duration,
    pub request_timeout: Duration,
}

impl LookupConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            sources: DEFAULT_SOURCES.iter().map(ToString::to_string).collect(),
            min_request_interval: Duration::from_millis(80),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Read the API key from a JSON key file of the form
    /// `{"api_key": "..."}`.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        #[derive(Deserialize)]
        struct KeyFile {
            api_key: String,
        }

        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LookupError::KeyFile(e.to_string()))?;
        let parsed: KeyFile =
            serde_json::from_str(&raw).map_err(|e| LookupError::KeyFile(e.to_string()))?;
        Ok(Self::new(parsed.api_key))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub const fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }
}
