//! Feedback-driven template weighting.
//!
//! Each template's similarity score is multiplied by a weight derived from the
//! answer accuracy recorded for its `(category, subcategory)` segment. The
//! adjustment grows with the number of recorded answers and saturates at
//! [`WeightParams::max_effect`], so a freshly added template stays close to a
//! neutral weight of `1.0` until evidence accumulates.
//!
//! Segment statistics are memoized for a short time-to-live by [`StatsCache`],
//! and the weight vector built from them by [`WeightVectorCache`].

pub mod calculator;
pub mod cache;
pub mod error;
pub mod types;


pub use cache::{StatsCache, WeightVectorCache};
pub use calculator::WeightCalculator;
pub use error::WeightParamsError;
pub use types::{SegmentStats, SegmentStatsMap, WeightParams};
