use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::catalog::TemplateEntry;
use crate::constants::validate_embedding_dim;
use crate::index::EmbeddingMatrix;

use super::config::MatcherConfig;
use super::types::{MatchOutcome, MatchResult, UnitVector};

/// Scores a query against every template and ranks the results.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn threshold(&self) -> f32 {
        self.config.similarity_threshold
    }

    /// Matches `query` against `catalog`/`matrix`, scaling scores by `weights`.
    ///
    /// `weights` must be aligned with the catalog; if its length differs the
    /// call proceeds with neutral weights. An empty catalog or a query whose
    /// dimension differs from the matrix yields [`MatchOutcome::empty`].
    pub fn rank(
        &self,
        query: &UnitVector,
        catalog: &[TemplateEntry],
        matrix: &EmbeddingMatrix,
        weights: &[f32],
    ) -> MatchOutcome {
        if catalog.is_empty() || matrix.is_empty() {
            debug!("Empty catalog or matrix, nothing to match");
            return MatchOutcome::empty();
        }

        if catalog.len() != matrix.rows() {
            warn!(
                catalog = catalog.len(),
                matrix_rows = matrix.rows(),
                "Catalog and matrix are misaligned, refusing to match"
            );
            return MatchOutcome::empty();
        }

        if let Err(e) = validate_embedding_dim(query.dim(), matrix.dim()) {
            warn!(error = %e, "Query embedding rejected");
            return MatchOutcome::empty();
        }

        let raw_scores = matrix.dot_all(query.as_slice());

        let neutral;
        let weights = if weights.len() == raw_scores.len() {
            weights
        } else {
            warn!(
                weights = weights.len(),
                scores = raw_scores.len(),
                "Weight vector length mismatch, using neutral weights"
            );
            neutral = vec![1.0f32; raw_scores.len()];
            &neutral[..]
        };

        let adjusted: Vec<f32> = raw_scores
            .iter()
            .zip(weights.iter())
            .map(|(raw, w)| raw * w)
            .collect();

        let order = rank_indices(&adjusted);
        // non-empty: catalog.len() == raw_scores.len() > 0
        let best_index = order[0];
        let below_threshold = raw_scores[best_index] < self.config.similarity_threshold;

        let to_result = |i: usize| {
            let entry = &catalog[i];
            MatchResult {
                template_id: entry.id(),
                question: entry.question().to_string(),
                category: entry.category().to_string(),
                subcategory: entry.subcategory().to_string(),
                weighted_score: adjusted[i],
                raw_score: raw_scores[i],
                weight: weights[i],
            }
        };

        let ranked: Vec<MatchResult> = order
            .iter()
            .take(self.config.max_top_matches)
            .map(|&i| to_result(i))
            .collect();
        let best = Some(to_result(best_index));

        debug!(
            best_id = catalog[best_index].id(),
            raw_score = raw_scores[best_index],
            weighted_score = adjusted[best_index],
            below_threshold,
            "Query matched"
        );

        MatchOutcome {
            best,
            ranked,
            below_threshold,
        }
    }
}

/// Indices of `scores` sorted by score descending, ties by index ascending.
///
/// NaN scores sort last.
pub(crate) fn rank_indices(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| compare_desc(scores[a], scores[b]).then(a.cmp(&b)));
    order
}

fn compare_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
