//! Deterministic in-process embedding provider for tests.
//!
//! Each whitespace-separated token is hashed with BLAKE3 into one of `dim`
//! buckets, so texts with the same tokens embed identically and texts with
//! no shared tokens are orthogonal (barring bucket collisions).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::hashing::hash_to_u64;

use super::error::ProviderError;
use super::provider::EmbeddingProvider;

/// Default dimension of mock vectors.
pub const MOCK_EMBEDDING_DIM: usize = 64;

#[derive(Default)]
struct MockState {
    overrides: RwLock<HashMap<String, Vec<f32>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

/// Bag-of-tokens [`EmbeddingProvider`]. Clones share state.
#[derive(Clone)]
pub struct MockEmbeddingProvider {
    dim: usize,
    state: Arc<MockState>,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::with_dim(MOCK_EMBEDDING_DIM)
    }

    pub fn with_dim(dim: usize) -> Self {
        Self {
            dim: dim.max(1),
            state: Arc::default(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns `vector` (as-is) whenever exactly `text` is embedded.
    pub fn set_override(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.state.overrides.write().insert(text.into(), vector);
    }

    /// Makes every call fail with [`ProviderError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// The raw (non-normalized) vector this provider returns for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        if let Some(v) = self.state.overrides.read().get(text) {
            return v.clone();
        }
        let mut v = vec![0.0f32; self.dim];
        for token in text.split_whitespace() {
            let bucket = (hash_to_u64(token.as_bytes()) % self.dim as u64) as usize;
            v[bucket] += 1.0;
        }
        v
    }

    /// [`Self::vector_for`] scaled to unit length, or all zeros.
    pub fn unit_vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = self.vector_for(text);
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable {
                reason: "mock provider set to fail".to_string(),
            });
        }
        Ok(inputs.iter().map(|t| self.vector_for(t)).collect())
    }

    fn model(&self) -> &str {
        "mock"
    }
}
