//! Cross-cutting, shared constants.
//!
//! Matching defaults live here so the matcher, the weight calculator and the
//! configuration layer agree on them. Runtime overrides go through
//! [`crate::config::Config`].

/// Minimum raw cosine similarity for a match to be treated as confident.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.35;

/// Number of ranked candidates returned alongside the best match.
pub const DEFAULT_MAX_TOP_MATCHES: usize = 5;

/// Saturation ceiling of the feedback adjustment.
pub const DEFAULT_WEIGHT_MAX_EFFECT: f64 = 1.0;

/// Sample size scale at which feedback evidence approaches saturation.
pub const DEFAULT_WEIGHT_TAU: f64 = 100_000.0;

/// Observed accuracy at which a template is neither boosted nor damped.
pub const DEFAULT_WEIGHT_THRESHOLD: f64 = 1.0;

/// Time-to-live of memoized segment statistics.
pub const DEFAULT_STATS_TTL_SECS: u64 = 30;

/// Default and maximum `top_k` for [`crate::engine::MatchingEngine::search`].
pub const DEFAULT_SEARCH_TOP_K: usize = 3;
pub const MAX_SEARCH_TOP_K: usize = 10;

/// Score added per detected product mentioned by a template.
pub const PRODUCT_BOOST: f32 = 0.1;

/// Default capacity of the normalized-query embedding cache (0 disables it).
pub const DEFAULT_QUERY_CACHE_CAPACITY: u64 = 1_024;

/// Error returned when an embedding dimension check fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected one.
///
/// Checked by [`crate::matcher::Matcher::rank`] and
/// [`crate::engine::MatchingEngine::search`] before a query vector is scored
/// against the template matrix.
///
/// # Example
///
/// ```
/// use templar::constants::validate_embedding_dim;
///
/// assert!(validate_embedding_dim(1024, 1024).is_ok());
/// assert!(validate_embedding_dim(768, 1024).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
