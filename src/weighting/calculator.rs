use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{SegmentKey, TemplateEntry};

use super::types::{SegmentStats, SegmentStatsMap, WeightParams};

/// Computes template weights from segment statistics.
#[derive(Debug, Clone, Default)]
pub struct WeightCalculator {
    params: WeightParams,
}

impl WeightCalculator {
    pub fn new(params: WeightParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WeightParams {
        &self.params
    }

    /// Weight for a segment with `total_answers` recorded, `correct_answers` of them correct.
    ///
    /// ```text
    /// P = correct / total
    /// K = max_effect * (1 - exp(-total / tau))
    /// w = max(1 + K * (P - threshold), 0)
    /// ```
    ///
    /// Returns `1.0` when nothing has been recorded.
    pub fn weight(&self, total_answers: u64, correct_answers: u64) -> f64 {
        let Some(accuracy) = SegmentStats::new(total_answers, correct_answers).accuracy() else {
            return 1.0;
        };

        let total = total_answers as f64;
        // 1 - exp(-x) computed as -expm1(-x) to keep precision for total << tau.
        let evidence = self.params.max_effect * -(-total / self.params.tau).exp_m1();
        let weight = 1.0 + evidence * (accuracy - self.params.threshold);

        weight.max(0.0)
    }

    pub fn weight_for(&self, stats: SegmentStats) -> f64 {
        self.weight(stats.total_answers, stats.correct_answers)
    }

    /// Builds the weight vector aligned with `catalog` order.
    ///
    /// Segments absent from `stats` get the neutral weight.
    pub fn weights_for_catalog(&self, catalog: &[TemplateEntry], stats: &SegmentStatsMap) -> Vec<f32> {
        let mut per_segment: HashMap<&SegmentKey, f32> = HashMap::new();

        let weights: Vec<f32> = catalog
            .iter()
            .map(|entry| {
                *per_segment.entry(entry.segment()).or_insert_with(|| {
                    let segment_stats = stats.get(entry.segment()).copied().unwrap_or_default();
                    self.weight_for(segment_stats) as f32
                })
            })
            .collect();

        debug!(
            templates = weights.len(),
            segments = per_segment.len(),
            with_feedback = per_segment.keys().filter(|k| stats.contains_key(*k)).count(),
            "Template weights computed"
        );

        weights
    }
}
