use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::debug;

use crate::store::{FeedbackStore, StoreResult};

use super::types::SegmentStatsMap;

/// Time-bounded memo of the feedback store's segment statistics.
///
/// A read after expiry refetches in the caller's task. Concurrent readers that
/// miss at the same time may each fetch; the last insert wins. A zero TTL
/// disables memoization.
pub struct StatsCache {
    entries: Option<Cache<(), Arc<SegmentStatsMap>>>,
    ttl: Duration,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        let entries = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build()
        });
        Self { entries, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns memoized statistics, fetching from `store` when stale or absent.
    ///
    /// Fetch errors are returned and not memoized.
    pub async fn get_or_fetch<F: FeedbackStore>(&self, store: &F) -> StoreResult<Arc<SegmentStatsMap>> {
        if let Some(stats) = self.cached() {
            return Ok(stats);
        }

        let stats = Arc::new(store.fetch_template_category_stats().await?);
        debug!(segments = stats.len(), ttl_secs = self.ttl.as_secs(), "Segment statistics fetched");

        if let Some(entries) = &self.entries {
            entries.insert((), Arc::clone(&stats));
        }

        Ok(stats)
    }

    /// Returns the memoized statistics if still fresh.
    pub fn cached(&self) -> Option<Arc<SegmentStatsMap>> {
        self.entries.as_ref().and_then(|e| e.get(&()))
    }

    pub fn invalidate(&self) {
        if let Some(entries) = &self.entries {
            entries.invalidate_all();
        }
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::constants::DEFAULT_STATS_TTL_SECS))
    }
}

impl std::fmt::Debug for StatsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCache")
            .field("ttl", &self.ttl)
            .field("cached", &self.cached().is_some())
            .finish()
    }
}

struct MemoEntry {
    stats: Arc<SegmentStatsMap>,
    generation: u64,
    weights: Arc<[f32]>,
}

/// Catalog-aligned weight vector memoized per statistics fetch and index generation.
///
/// A new vector is computed only when [`StatsCache`] hands out a different
/// statistics map or a different snapshot is published.
#[derive(Default)]
pub struct WeightVectorCache {
    entry: Mutex<Option<MemoEntry>>,
}

impl WeightVectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized vector for `(stats, generation)`, computing it with `compute` on a miss.
    pub fn get_or_compute(
        &self,
        stats: &Arc<SegmentStatsMap>,
        generation: u64,
        compute: impl FnOnce() -> Vec<f32>,
    ) -> Arc<[f32]> {
        let mut entry = self.entry.lock();
        if let Some(memo) = entry.as_ref()
            && memo.generation == generation
            && Arc::ptr_eq(&memo.stats, stats)
        {
            return Arc::clone(&memo.weights);
        }

        let weights: Arc<[f32]> = compute().into();
        *entry = Some(MemoEntry {
            stats: Arc::clone(stats),
            generation,
            weights: Arc::clone(&weights),
        });
        weights
    }

    pub fn clear(&self) {
        *self.entry.lock() = None;
    }
}

impl std::fmt::Debug for WeightVectorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entry = self.entry.lock();
        f.debug_struct("WeightVectorCache")
            .field("generation", &entry.as_ref().map(|m| m.generation))
            .finish()
    }
}
