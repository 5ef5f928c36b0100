use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::SegmentKey;
use crate::constants::{DEFAULT_WEIGHT_MAX_EFFECT, DEFAULT_WEIGHT_TAU, DEFAULT_WEIGHT_THRESHOLD};

use super::error::WeightParamsError;

/// Aggregate answer counts for one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub total_answers: u64,
    pub correct_answers: u64,
}

impl SegmentStats {
    pub fn new(total_answers: u64, correct_answers: u64) -> Self {
        Self {
            total_answers,
            correct_answers,
        }
    }

    /// Observed accuracy in `[0, 1]`, or `None` without samples.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_answers == 0 {
            return None;
        }
        let correct = self.correct_answers.min(self.total_answers);
        Some(correct as f64 / self.total_answers as f64)
    }
}

/// Per-segment statistics as returned by a feedback store.
pub type SegmentStatsMap = HashMap<SegmentKey, SegmentStats>;

/// Constants of the diminishing-sensitivity weighting curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightParams {
    /// Upper bound of the evidence factor `K`.
    pub max_effect: f64,
    /// Sample count scale; `K` reaches ~63% of `max_effect` at `total == tau`.
    pub tau: f64,
    /// Accuracy at which the weight is exactly neutral.
    pub threshold: f64,
}

impl Default for WeightParams {
    fn default() -> Self {
        Self {
            max_effect: DEFAULT_WEIGHT_MAX_EFFECT,
            tau: DEFAULT_WEIGHT_TAU,
            threshold: DEFAULT_WEIGHT_THRESHOLD,
        }
    }
}

impl WeightParams {
    pub fn max_effect(mut self, value: f64) -> Self {
        self.max_effect = value;
        self
    }

    pub fn tau(mut self, value: f64) -> Self {
        self.tau = value;
        self
    }

    pub fn threshold(mut self, value: f64) -> Self {
        self.threshold = value;
        self
    }

    pub fn validate(&self) -> Result<(), WeightParamsError> {
        if !self.max_effect.is_finite() || self.max_effect < 0.0 {
            return Err(WeightParamsError::InvalidMaxEffect(self.max_effect));
        }
        if !self.tau.is_finite() || self.tau <= 0.0 {
            return Err(WeightParamsError::InvalidTau(self.tau));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(WeightParamsError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}
