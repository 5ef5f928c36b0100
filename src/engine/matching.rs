use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::constants::{MAX_SEARCH_TOP_K, PRODUCT_BOOST, validate_embedding_dim};
use crate::embedding::{EmbeddingProvider, EncodingError, QueryEncoder};
use crate::hashing::short_hex;
use crate::matcher::Matcher;
use crate::matcher::ranking::rank_indices;
use crate::store::{FeedbackStore, TemplateStore};
use crate::text::ProductDetector;
use crate::text::products::count_mentions;
use crate::weighting::{StatsCache, WeightCalculator, WeightVectorCache};

use super::config::EngineConfig;
use super::error::{EngineError, EngineResult};
use super::snapshot::{IndexSnapshot, build_snapshot};
use super::types::{Classification, DegradedReason, QueryOutcome, RefreshReport, SearchHit, SearchOptions};

/// Feedback-weighted semantic template matcher.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct MatchingEngine<T, F> {
    templates: T,
    feedback: F,
    encoder: QueryEncoder,
    matcher: Matcher,
    weights: WeightCalculator,
    stats: StatsCache,
    weight_memo: WeightVectorCache,
    products: ProductDetector,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    rebuild: Mutex<()>,
    first_load_attempted: AtomicBool,
}

impl<T, F> MatchingEngine<T, F>
where
    T: TemplateStore,
    F: FeedbackStore,
{
    /// Creates an engine with nothing loaded. The first query, or an explicit
    /// [`refresh_caches`](Self::refresh_caches), builds the index.
    ///
    /// The first query tries to load only once. If that load fails, queries
    /// report [`DegradedReason::NotReady`] until `refresh_caches` succeeds.
    pub fn new(
        templates: T,
        feedback: F,
        provider: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            templates,
            feedback,
            encoder: QueryEncoder::new(provider, config.query_cache_capacity),
            matcher: Matcher::new(config.matcher),
            weights: WeightCalculator::new(config.weights),
            stats: StatsCache::new(config.stats_ttl),
            weight_memo: WeightVectorCache::new(),
            products: ProductDetector::default(),
            snapshot: RwLock::new(None),
            rebuild: Mutex::new(()),
            first_load_attempted: AtomicBool::new(false),
        })
    }

    /// Replaces the product list used by [`search`](Self::search).
    pub fn with_products(mut self, products: ProductDetector) -> Self {
        self.products = products;
        self
    }

    /// The currently published snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.snapshot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    pub fn encoder(&self) -> &QueryEncoder {
        &self.encoder
    }

    pub fn stats_cache(&self) -> &StatsCache {
        &self.stats
    }

    /// Rebuilds the catalog and matrix from the template store and publishes them.
    ///
    /// On error the previously published snapshot stays in effect.
    #[instrument(skip(self))]
    pub async fn refresh_caches(&self) -> EngineResult<RefreshReport> {
        let _guard = self.rebuild.lock().await;
        self.first_load_attempted.store(true, Ordering::Release);
        self.rebuild_locked().await
    }

    async fn rebuild_locked(&self) -> EngineResult<RefreshReport> {
        let started = Instant::now();
        let previous = self.snapshot();
        let generation = previous.as_ref().map_or(0, |s| s.generation()) + 1;

        let next = match build_snapshot(&self.templates, generation).await {
            Ok(next) => next,
            Err(e) => {
                warn!(
                    error = %e,
                    kept_generation = previous.as_ref().map(|s| s.generation()),
                    "Refresh failed, keeping previous index"
                );
                return Err(e);
            }
        };

        let changed = previous
            .as_ref()
            .is_none_or(|p| p.fingerprint() != next.fingerprint());
        let report = RefreshReport {
            generation,
            templates: next.len(),
            dim: next.dim(),
            fingerprint: *next.fingerprint(),
            changed,
            elapsed: started.elapsed(),
        };

        *self.snapshot.write() = Some(Arc::new(next));

        info!(
            generation,
            templates = report.templates,
            dim = report.dim,
            changed,
            fingerprint = %short_hex(&report.fingerprint),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Template index published"
        );
        Ok(report)
    }

    /// Returns the published snapshot, attempting the first build on demand.
    ///
    /// Only one lazy attempt is made per engine; after a failure the caller
    /// gets [`EngineError::NotReady`] without touching the store.
    async fn ensure_snapshot(&self) -> EngineResult<Arc<IndexSnapshot>> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        if self.first_load_attempted.load(Ordering::Acquire) {
            return Err(EngineError::NotReady);
        }
        let _guard = self.rebuild.lock().await;
        // another caller may have published or failed while we waited
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        if self.first_load_attempted.swap(true, Ordering::AcqRel) {
            return Err(EngineError::NotReady);
        }
        self.rebuild_locked().await?;
        self.snapshot().ok_or(EngineError::NotReady)
    }

    /// Per-template weights for `snapshot`; neutral when statistics are unavailable.
    ///
    /// Reused until the statistics expire or another snapshot is published.
    async fn weights_for(&self, snapshot: &IndexSnapshot) -> Arc<[f32]> {
        match self.stats.get_or_fetch(&self.feedback).await {
            Ok(stats) => self.weight_memo.get_or_compute(&stats, snapshot.generation(), || {
                self.weights.weights_for_catalog(snapshot.catalog(), &stats)
            }),
            Err(e) => {
                warn!(error = %e, "Feedback statistics unavailable, using neutral weights");
                vec![1.0; snapshot.len()].into()
            }
        }
    }

    /// Matches `text`, reporting explicitly when the query could not be scored.
    #[instrument(skip_all, fields(query_len = text.len()))]
    pub async fn match_query(&self, text: &str) -> QueryOutcome {
        let snapshot = match self.ensure_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "No template index available");
                return QueryOutcome::Degraded {
                    reason: DegradedReason::NotReady,
                };
            }
        };

        let encoded = match self.encoder.encode(text).await {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Query could not be encoded");
                return QueryOutcome::Degraded { reason: e.into() };
            }
        };

        let weights = self.weights_for(&snapshot).await;
        let outcome = self.matcher.rank(
            &encoded.vector,
            snapshot.catalog(),
            snapshot.matrix(),
            &weights[..],
        );

        debug!(
            generation = snapshot.generation(),
            matched = outcome.is_match(),
            below_threshold = outcome.below_threshold,
            "Query classified"
        );
        QueryOutcome::Scored(Classification::from(outcome))
    }

    /// Classifies `text`. Never fails: unusable queries come back as
    /// [`Classification::no_match`].
    pub async fn classify_query(&self, text: &str) -> Classification {
        self.match_query(text).await.into_classification()
    }

    /// Semantic search without feedback weighting, optionally restricted to
    /// one segment, with a fixed score boost per mentioned product.
    ///
    /// A query that normalizes to nothing returns no hits. Provider failures
    /// are returned as [`EngineError::Encoding`].
    #[instrument(skip_all, fields(top_k = options.top_k))]
    pub async fn search(&self, query: &str, options: SearchOptions) -> EngineResult<Vec<SearchHit>> {
        let snapshot = self.ensure_snapshot().await?;

        let encoded = match self.encoder.encode(query).await {
            Ok(encoded) => encoded,
            Err(EncodingError::EmptyQuery) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = validate_embedding_dim(encoded.vector.dim(), snapshot.dim()) {
            warn!(error = %e, "Query embedding rejected");
            return Ok(Vec::new());
        }

        let catalog = snapshot.catalog();
        let candidates: Vec<usize> = match &options.segment {
            Some(segment) => (0..catalog.len())
                .filter(|&i| catalog[i].segment() == segment)
                .collect(),
            None => (0..catalog.len()).collect(),
        };
        if candidates.is_empty() {
            debug!(segment = ?options.segment, "No templates in segment");
            return Ok(Vec::new());
        }

        let products = options
            .products
            .unwrap_or_else(|| self.products.detect(query));

        let raw = snapshot
            .matrix()
            .dot_rows(encoded.vector.as_slice(), &candidates);
        let boosted: Vec<f32> = candidates
            .iter()
            .zip(&raw)
            .map(|(&i, &score)| {
                let entry = &catalog[i];
                let text = format!("{} {}", entry.question(), entry.answer());
                score + PRODUCT_BOOST * count_mentions(&text, &products) as f32
            })
            .collect();

        let top_k = options.top_k.clamp(1, MAX_SEARCH_TOP_K);
        let hits = rank_indices(&boosted)
            .into_iter()
            .take(top_k)
            .map(|j| {
                let entry = &catalog[candidates[j]];
                SearchHit {
                    template_id: entry.id(),
                    question: entry.question().to_string(),
                    answer: entry.answer().to_string(),
                    category: entry.category().to_string(),
                    subcategory: entry.subcategory().to_string(),
                    score: boosted[j],
                    raw_score: raw[j],
                }
            })
            .collect();

        Ok(hits)
    }
}

impl<T, F> std::fmt::Debug for MatchingEngine<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.read();
        f.debug_struct("MatchingEngine")
            .field("generation", &snapshot.as_ref().map(|s| s.generation()))
            .field("templates", &snapshot.as_ref().map(|s| s.len()))
            .field("matcher", &self.matcher)
            .field("stats", &self.stats)
            .finish()
    }
}
