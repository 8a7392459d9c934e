use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::config::LookupConfig;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid annotator URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Annotator returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed annotator response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API key file error: {0}")]
    KeyFile(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// The concept the annotator matched, with its source ontology link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedClass {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub links: ClassLinks,
    #[serde(rename = "prefLabel", default, skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassLinks {
    #[serde(default)]
    pub ontology: String,
}

/// One matched span within the submitted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSpan {
    pub text: String,
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub to: usize,
    #[serde(rename = "matchType", default)]
    pub match_type: String,
}

/// One annotator result: a matched class plus the spans that matched it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationResult {
    #[serde(rename = "annotatedClass")]
    pub annotated_class: AnnotatedClass,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpan>,
}

/// Free text in, ranked concept annotations out. Implemented by the REST
/// client below and by stubs in tests.
#[async_trait]
pub trait ConceptLookup: Send + Sync {
    /// A transport error is a hard failure for this lookup; retrying is the
    /// caller's decision at the orchestration boundary.
    async fn annotate(
        &self,
        text: &str,
        sources: &[String],
    ) -> LookupResult<Vec<AnnotationResult>>;
}

/// REST annotator client. Enforces a minimum spacing between requests; the
/// traversal that triggered the lookup waits until it returns.
pub struct AnnotatorClient {
    config: LookupConfig,
    http: reqwest::Client,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl AnnotatorClient {
    pub fn new(config: LookupConfig) -> LookupResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            http,
            last_request: tokio::sync::Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LookupConfig {
        &self.config
    }

    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.config.min_request_interval {
                tokio::time::sleep(self.config.min_request_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn annotator_url(&self, text: &str, sources: &[String]) -> LookupResult<Url> {
        Url::parse_with_params(
            &format!("{}/annotator", self.config.base_url),
            [
                ("include", "prefLabel"),
                ("text", text),
                ("ontologies", &sources.join(",")),
            ],
        )
        .map_err(LookupError::Url)
    }
}

#[async_trait]
impl ConceptLookup for AnnotatorClient {
    async fn annotate(
        &self,
        text: &str,
        sources: &[String],
    ) -> LookupResult<Vec<AnnotationResult>> {
        self.throttle().await;

        let url = self.annotator_url(text, sources)?;
        tracing::debug!(%url, "annotator request");

        let response = self
            .http
            .get(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("apikey token={}", self.config.api_key),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
