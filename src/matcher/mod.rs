//! Similarity scoring and ranking.
//!
//! Template and query vectors are unit-norm, so cosine similarity reduces to a
//! dot product. Raw scores are scaled by feedback weights to rank candidates,
//! while the acceptance decision looks at the raw score alone: a template that
//! has historically been reliable must not pass off a weak semantic match as
//! a confident one.

pub mod config;
pub mod ranking;
pub mod similarity;
pub mod types;


pub use config::{MatcherConfig, MatcherConfigError};
pub use ranking::Matcher;
pub use similarity::{cosine_similarity, dot, l2_norm};
pub use types::{DegenerateVector, MatchOutcome, MatchResult, UnitVector};
