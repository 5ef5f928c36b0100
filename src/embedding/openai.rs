//! OpenAI-compatible embedding client.
//!
//! Sends `POST {base_url}/embeddings` with `{"model", "input"}` and reads the
//! `data[].embedding` arrays back, reordered by their `index` field.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::error::ProviderError;
use super::provider::EmbeddingProvider;

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";
/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenAiConfigError {
    #[error("embedding base_url must not be empty")]
    EmptyBaseUrl,

    #[error("embedding model must not be empty")]
    EmptyModel,

    #[error("embedding request timeout must be > 0")]
    ZeroTimeout,
}

/// Connection settings for [`OpenAiEmbeddingProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// API root, e.g. `https://llm.example.com/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), OpenAiConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(OpenAiConfigError::EmptyBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(OpenAiConfigError::EmptyModel);
        }
        if self.timeout.is_zero() {
            return Err(OpenAiConfigError::ZeroTimeout);
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in request order, checking that exactly `expected` came back.
    pub(crate) fn into_ordered(mut self, expected: usize) -> Result<Vec<Vec<f32>>, ProviderError> {
        if self.data.len() != expected {
            return Err(ProviderError::Malformed {
                reason: format!("expected {} embeddings, got {}", expected, self.data.len()),
            });
        }
        self.data.sort_by_key(|d| d.index);
        if self.data.iter().enumerate().any(|(i, d)| d.index != i) {
            return Err(ProviderError::Malformed {
                reason: "embedding indices are not 0..n".to_string(),
            });
        }
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// [`EmbeddingProvider`] over an OpenAI-compatible HTTP API.
pub struct OpenAiEmbeddingProvider {
    config: OpenAiConfig,
    endpoint: String,
    http: HttpClient,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        config.validate().map_err(|e| ProviderError::Unavailable {
            reason: e.to_string(),
        })?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        let endpoint = config.endpoint();
        Ok(Self {
            config,
            endpoint,
            http,
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

impl std::fmt::Debug for OpenAiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddingProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut req = self.http.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        });
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = resp.json().await?;
        let vectors = parsed.into_ordered(inputs.len())?;
        debug!(
            inputs = inputs.len(),
            model = %self.config.model,
            "Embeddings received"
        );
        Ok(vectors)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
