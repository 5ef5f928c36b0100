//! Templar library crate (used by the binary and integration tests).
//!
//! Matches free-text customer inquiries against a curated catalog of
//! question/answer templates. Similarity is the cosine between a query
//! embedding and each template embedding; the ranking is then adjusted by how
//! reliably each template's segment has been answered in the past.
//!
//! # Public API Surface
//!
//! ## Engine
//! - [`MatchingEngine`] - `classify_query`, `refresh_caches`, `search`
//! - [`Classification`], [`QueryOutcome`], [`RefreshReport`], [`SearchHit`]
//! - [`EngineConfig`], [`Config`] - Tunables and environment loading
//!
//! ## Components
//! - [`catalog`] - Template validation and ordering
//! - [`index`] - Row-aligned embedding matrix
//! - [`weighting`] - Feedback weights and the statistics TTL cache
//! - [`matcher`] - Scoring, weighting and ranking
//! - [`embedding`] - Query encoding and embedding providers
//!
//! ## Collaborators
//! - [`TemplateStore`], [`FeedbackStore`] - Persistence seams
//! - [`EmbeddingProvider`] - External embedding service seam
//! - [`JsonFileStore`], [`OpenAiEmbeddingProvider`] - Bundled implementations
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod hashing;
pub mod index;
pub mod matcher;
pub mod store;
pub mod text;
pub mod weighting;

pub use catalog::{CatalogError, SegmentKey, TemplateEntry, TemplateRecord};
pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbeddingProvider;
pub use embedding::{
    EmbeddingProvider, EncodedQuery, EncodingError, OpenAiConfig, OpenAiEmbeddingProvider,
    ProviderError, QueryEncoder,
};
pub use engine::{
    Classification, DegradedReason, EngineConfig, EngineError, IndexSnapshot, MatchingEngine,
    QueryOutcome, RefreshReport, SearchHit, SearchOptions,
};
pub use hashing::{hash_query, hash_to_u64};
pub use index::{EmbeddingMatrix, IndexError};
pub use matcher::{MatchOutcome, MatchResult, Matcher, MatcherConfig, UnitVector};
#[cfg(any(test, feature = "mock"))]
pub use store::{MockFeedbackStore, MockTemplateStore};
pub use store::{FeedbackStore, JsonFileStore, StoreError, TemplateStore};
pub use text::{ProductDetector, detect_products, normalize_text};
pub use weighting::{SegmentStats, StatsCache, WeightCalculator, WeightParams};
