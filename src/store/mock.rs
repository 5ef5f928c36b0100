//! In-memory stores for tests and examples.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::catalog::{SegmentKey, TemplateRecord};
use crate::weighting::SegmentStats;

use super::error::{StoreError, StoreResult};
use super::{FeedbackStore, TemplateStore};

#[derive(Default)]
struct TemplateState {
    records: RwLock<Vec<TemplateRecord>>,
    embeddings: RwLock<HashMap<u64, Vec<f32>>>,
    unavailable: AtomicBool,
    partial_embeddings: AtomicBool,
    template_fetches: AtomicUsize,
    embedding_fetches: AtomicUsize,
}

/// Shared, mutable in-memory [`TemplateStore`]. Clones see the same data.
#[derive(Default, Clone)]
pub struct MockTemplateStore {
    state: Arc<TemplateState>,
}

impl MockTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template and its embedding.
    pub fn insert(&self, record: TemplateRecord, embedding: Vec<f32>) {
        self.state.embeddings.write().insert(record.id, embedding);
        self.state.records.write().push(record);
    }

    /// Adds a template without an embedding.
    pub fn insert_record(&self, record: TemplateRecord) {
        self.state.records.write().push(record);
    }

    pub fn set_embedding(&self, id: u64, embedding: Vec<f32>) {
        self.state.embeddings.write().insert(id, embedding);
    }

    pub fn remove_embedding(&self, id: u64) -> Option<Vec<f32>> {
        self.state.embeddings.write().remove(&id)
    }

    pub fn clear(&self) {
        self.state.records.write().clear();
        self.state.embeddings.write().clear();
    }

    /// Makes every fetch fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns a partial map instead of raising [`StoreError::MissingEmbeddings`].
    pub fn set_partial_embeddings(&self, partial: bool) {
        self.state.partial_embeddings.store(partial, Ordering::SeqCst);
    }

    pub fn template_fetches(&self) -> usize {
        self.state.template_fetches.load(Ordering::SeqCst)
    }

    pub fn embedding_fetches(&self) -> usize {
        self.state.embedding_fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "mock store offline".to_string(),
            });
        }
        Ok(())
    }
}

impl TemplateStore for MockTemplateStore {
    async fn fetch_all_templates(&self) -> StoreResult<Vec<TemplateRecord>> {
        self.state.template_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.state.records.read().clone())
    }

    async fn fetch_template_embeddings(&self, ids: &[u64]) -> StoreResult<HashMap<u64, Vec<f32>>> {
        self.state.embedding_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let embeddings = self.state.embeddings.read();
        let mut found = HashMap::with_capacity(ids.len());
        let mut missing = BTreeSet::new();
        for &id in ids {
            match embeddings.get(&id) {
                Some(v) => {
                    found.insert(id, v.clone());
                }
                None => {
                    missing.insert(id);
                }
            }
        }

        if !missing.is_empty() && !self.state.partial_embeddings.load(Ordering::SeqCst) {
            return Err(StoreError::MissingEmbeddings {
                ids: missing.into_iter().collect(),
            });
        }

        Ok(found)
    }
}

#[derive(Default)]
struct FeedbackState {
    stats: RwLock<HashMap<SegmentKey, SegmentStats>>,
    unavailable: AtomicBool,
    fetches: AtomicUsize,
}

/// Shared, mutable in-memory [`FeedbackStore`]. Clones see the same data.
#[derive(Default, Clone)]
pub struct MockFeedbackStore {
    state: Arc<FeedbackState>,
}

impl MockFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stats(&self, category: &str, subcategory: &str, total: u64, correct: u64) {
        self.state.stats.write().insert(
            SegmentKey::new(category, subcategory),
            SegmentStats::new(total, correct),
        );
    }

    pub fn clear(&self) {
        self.state.stats.write().clear();
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }
}

impl FeedbackStore for MockFeedbackStore {
    async fn fetch_template_category_stats(&self) -> StoreResult<HashMap<SegmentKey, SegmentStats>> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "mock feedback store offline".to_string(),
            });
        }
        Ok(self.state.stats.read().clone())
    }
}
