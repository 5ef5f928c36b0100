use serde::Serialize;
use thiserror::Error;

use super::similarity::l2_norm;

/// Returned when a vector cannot be scaled to unit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vector has zero or non-finite norm")]
pub struct DegenerateVector;

/// Vector with Euclidean norm 1.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitVector(Vec<f32>);

impl UnitVector {
    /// Scales `values` to unit length.
    pub fn normalize(mut values: Vec<f32>) -> Result<Self, DegenerateVector> {
        let norm = l2_norm(&values);
        if norm == 0.0 || !norm.is_finite() {
            return Err(DegenerateVector);
        }
        for v in values.iter_mut() {
            *v /= norm;
        }
        Ok(Self(values))
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl AsRef<[f32]> for UnitVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub template_id: u64,
    pub question: String,
    pub category: String,
    pub subcategory: String,
    /// `raw_score * weight`, the ranking key.
    pub weighted_score: f32,
    /// Cosine similarity between query and template.
    pub raw_score: f32,
    /// Feedback weight applied to this template.
    pub weight: f32,
}

/// Result of matching one query against a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub best: Option<MatchResult>,
    pub ranked: Vec<MatchResult>,
    pub below_threshold: bool,
}

impl MatchOutcome {
    /// The "no match" outcome.
    pub fn empty() -> Self {
        Self {
            best: None,
            ranked: Vec::new(),
            below_threshold: true,
        }
    }

    pub fn is_match(&self) -> bool {
        self.best.is_some()
    }

    pub fn is_confident(&self) -> bool {
        self.best.is_some() && !self.below_threshold
    }
}
