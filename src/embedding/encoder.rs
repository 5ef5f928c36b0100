use std::sync::Arc;

use moka::sync::Cache;
use tracing::{debug, instrument, warn};

use crate::hashing::{hash_query, short_hex};
use crate::matcher::UnitVector;
use crate::text::normalize_text;

use super::error::EncodingError;
use super::provider::EmbeddingProvider;

/// A query ready for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedQuery {
    pub vector: UnitVector,
    /// The text that was actually embedded.
    pub normalized: String,
}

/// Normalizes query text, embeds it, and scales the result to unit length.
///
/// Vectors are optionally memoized by the BLAKE3 digest of the normalized
/// text, so case or whitespace variants of a query share one provider call.
pub struct QueryEncoder {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Option<Cache<[u8; 32], UnitVector>>,
}

impl QueryEncoder {
    /// Creates an encoder; `cache_capacity == 0` disables the vector cache.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_capacity: u64) -> Self {
        let cache = (cache_capacity > 0).then(|| Cache::new(cache_capacity));
        Self { provider, cache }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    #[instrument(skip_all, fields(model = self.provider.model()))]
    pub async fn encode(&self, text: &str) -> Result<EncodedQuery, EncodingError> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Err(EncodingError::EmptyQuery);
        }

        let key = hash_query(&normalized);
        if let Some(vector) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(key = %short_hex(&key), "Query vector cache hit");
            return Ok(EncodedQuery { vector, normalized });
        }

        let raw = self
            .provider
            .embed(std::slice::from_ref(&normalized))
            .await
            .map_err(|e| {
                warn!(error = %e, "Embedding provider call failed");
                EncodingError::from(e)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| EncodingError::EncodingUnavailable {
                reason: "provider returned no vectors".to_string(),
            })?;

        let vector = UnitVector::normalize(raw).map_err(|_| EncodingError::DegenerateEmbedding)?;

        if let Some(cache) = &self.cache {
            cache.insert(key, vector.clone());
        }

        Ok(EncodedQuery { vector, normalized })
    }

    /// Drops all memoized query vectors.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

impl std::fmt::Debug for QueryEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEncoder")
            .field("model", &self.provider.model())
            .field("cached", &self.cache.as_ref().map(|c| c.entry_count()))
            .finish()
    }
}
