use thiserror::Error;

/// Failure talking to the embedding service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed embedding response: {reason}")]
    Malformed { reason: String },

    #[error("embedding provider unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Per-query encoding failure. Every variant means "no usable vector".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("query is empty after normalization")]
    EmptyQuery,

    #[error("embedding unavailable: {reason}")]
    EncodingUnavailable { reason: String },

    #[error("embedding has zero or non-finite norm")]
    DegenerateEmbedding,
}

impl From<ProviderError> for EncodingError {
    fn from(err: ProviderError) -> Self {
        EncodingError::EncodingUnavailable {
            reason: err.to_string(),
        }
    }
}
