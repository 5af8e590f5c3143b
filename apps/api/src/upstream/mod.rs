//! Upstream client: the single point of entry for calls to the dealer/review
//! service and the sentiment service.
//!
//! Reads and writes against the dealer/review service walk the configured base
//! URLs in order and stop at the first 2xx response. Reads that exhaust every
//! base yield `None`; writes yield an error envelope. Sentiment calls never
//! fail and fall back to neutral.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::UpstreamConfig;
use crate::models::review::{ReviewDocument, Sentiment, SentimentResult};

pub mod endpoint;

pub use endpoint::join;

pub const INSERT_REVIEW_ENDPOINT: &str = "/insert_review";
pub const ALL_BACKENDS_FAILED: &str = "All backend URLs failed";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    #[error("Could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Operations the handlers need from the upstream services.
///
/// Carried in `AppState` as `Arc<dyn ReviewBackend>`.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// GET `endpoint` against the dealer/review service. `None` when every base failed.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Option<Value>;

    /// Classifies one review text. Failures yield neutral.
    async fn analyze_sentiment(&self, text: &str) -> SentimentResult;

    /// POSTs a review document. Exhausting every base returns an error envelope,
    /// only a failure to build the request is an `Err`.
    async fn submit_review(&self, document: &ReviewDocument) -> Result<Value, UpstreamError>;
}

/// Structured result of a write that failed on every base URL.
pub fn error_envelope(message: &str) -> Value {
    json!({ "status": "error", "error": message })
}

pub fn is_error_envelope(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some("error")
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    backend_bases: Vec<String>,
    sentiment_base: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout).build()?,
            backend_bases: config.backend_bases(),
            sentiment_base: config.sentiment_url.clone(),
        })
    }

    /// One request against one URL, non-2xx counts as a failure.
    async fn send(&self, url: &str, body: Option<&Value>) -> Result<Value, UpstreamError> {
        let request = match body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url),
        };
        let response = request.send().await?.error_for_status()?;
        decode_body(response).await
    }

    /// Tries every backend base in order; first success wins.
    async fn walk(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Option<Value> {
        let method = if body.is_some() { "POST" } else { "GET" };

        for base in &self.backend_bases {
            let url = match endpoint::build_url(base, endpoint, params) {
                Ok(url) => url,
                Err(e) => {
                    warn!("{method} skipped for {base}: {e}");
                    continue;
                }
            };

            info!("{method} {url}");
            match self.send(&url, body).await {
                Ok(result) => {
                    info!("{method} succeeded with {base}");
                    return Some(result);
                }
                Err(e) => warn!("{method} {url} failed: {e}"),
            }
        }

        warn!(
            "{method} {endpoint} failed on all {} backend URLs",
            self.backend_bases.len()
        );
        None
    }
}

#[async_trait]
impl ReviewBackend for UpstreamClient {
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Option<Value> {
        self.walk(endpoint, params, None).await
    }

    async fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        let url = join(&self.sentiment_base, &endpoint::analyze_path(text));
        debug!("Sentiment GET {url}");

        match self.send(&url, None).await {
            Ok(body) => SentimentResult {
                sentiment: Sentiment::from_response(&body),
            },
            Err(e) => {
                warn!("Sentiment call to {url} failed, using neutral: {e}");
                SentimentResult::neutral()
            }
        }
    }

    async fn submit_review(&self, document: &ReviewDocument) -> Result<Value, UpstreamError> {
        let body = serde_json::to_value(document)?;
        Ok(self
            .walk(INSERT_REVIEW_ENDPOINT, &[], Some(&body))
            .await
            .unwrap_or_else(|| error_envelope(ALL_BACKENDS_FAILED)))
    }
}

/// JSON when the response says so, raw text otherwise.
async fn decode_body(response: Response) -> Result<Value, UpstreamError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        Ok(response.json::<Value>().await?)
    } else {
        Ok(Value::String(response.text().await?))
    }
}
