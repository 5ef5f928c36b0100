//! Query embedding.
//!
//! - [`provider`] defines the external embedding service seam.
//! - [`openai`] talks to any OpenAI-compatible `/embeddings` endpoint.
//! - [`encoder`] turns raw query text into a unit vector.

mod error;

pub mod encoder;
pub mod openai;
pub mod provider;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use encoder::{EncodedQuery, QueryEncoder};
pub use error::{EncodingError, ProviderError};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingProvider;
pub use openai::{OpenAiConfig, OpenAiConfigError, OpenAiEmbeddingProvider};
pub use provider::EmbeddingProvider;
