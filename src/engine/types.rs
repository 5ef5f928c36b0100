use std::time::Duration;

use serde::Serialize;

use crate::catalog::SegmentKey;
use crate::constants::DEFAULT_SEARCH_TOP_K;
use crate::embedding::EncodingError;
use crate::matcher::{MatchOutcome, MatchResult};

/// Answer to `classify_query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Raw similarity of the best match clamped to `[0, 1]`; `0` without a match.
    pub confidence: f32,
    pub matched_template_id: Option<u64>,
    pub matched_template_question: Option<String>,
    pub below_threshold: bool,
    pub top_matches: Vec<MatchResult>,
}

impl Classification {
    pub fn no_match() -> Self {
        Self {
            category: None,
            subcategory: None,
            confidence: 0.0,
            matched_template_id: None,
            matched_template_question: None,
            below_threshold: true,
            top_matches: Vec::new(),
        }
    }

    pub fn is_confident(&self) -> bool {
        self.matched_template_id.is_some() && !self.below_threshold
    }
}

impl From<MatchOutcome> for Classification {
    fn from(outcome: MatchOutcome) -> Self {
        let Some(best) = outcome.best else {
            return Self::no_match();
        };
        Self {
            confidence: best.raw_score.clamp(0.0, 1.0),
            category: Some(best.category),
            subcategory: Some(best.subcategory),
            matched_template_id: Some(best.template_id),
            matched_template_question: Some(best.question),
            below_threshold: outcome.below_threshold,
            top_matches: outcome.ranked,
        }
    }
}

/// Why a query produced no usable score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradedReason {
    /// No snapshot is published and building one failed.
    NotReady,
    EmptyQuery,
    EncodingUnavailable { reason: String },
    DegenerateEmbedding,
}

impl From<EncodingError> for DegradedReason {
    fn from(err: EncodingError) -> Self {
        match err {
            EncodingError::EmptyQuery => Self::EmptyQuery,
            EncodingError::EncodingUnavailable { reason } => Self::EncodingUnavailable { reason },
            EncodingError::DegenerateEmbedding => Self::DegenerateEmbedding,
        }
    }
}

/// Result of matching one query, keeping the degraded path explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query was scored against the catalog. It may still be below threshold.
    Scored(Classification),
    /// The query could not be scored.
    Degraded { reason: DegradedReason },
}

impl QueryOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Collapses the outcome; degraded queries become [`Classification::no_match`].
    pub fn into_classification(self) -> Classification {
        match self {
            Self::Scored(c) => c,
            Self::Degraded { .. } => Classification::no_match(),
        }
    }
}

/// Summary of a successful `refresh_caches`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub generation: u64,
    pub templates: usize,
    pub dim: usize,
    pub fingerprint: [u8; 32],
    /// `false` when the new snapshot has the same content as the previous one.
    pub changed: bool,
    pub elapsed: Duration,
}

/// Parameters of [`MatchingEngine::search`](super::MatchingEngine::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict candidates to one `(category, subcategory)`.
    pub segment: Option<SegmentKey>,
    /// Products to boost. `None` detects them from the query text.
    pub products: Option<Vec<String>>,
    /// Clamped to `1..=MAX_SEARCH_TOP_K`.
    pub top_k: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            segment: None,
            products: None,
            top_k: DEFAULT_SEARCH_TOP_K,
        }
    }
}

impl SearchOptions {
    pub fn segment(mut self, segment: SegmentKey) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = Some(products.into_iter().map(Into::into).collect());
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// One `search` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub template_id: u64,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub subcategory: String,
    /// Similarity plus product boost.
    pub score: f32,
    pub raw_score: f32,
}
