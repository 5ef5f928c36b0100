use thiserror::Error;

use crate::constants::{DEFAULT_MAX_TOP_MATCHES, DEFAULT_SIMILARITY_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatcherConfigError {
    #[error("similarity_threshold must be within [-1, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("max_top_matches must be > 0")]
    ZeroTopMatches,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Raw similarity below which the best match is flagged as not confident.
    pub similarity_threshold: f32,
    /// Length of the ranked candidate list.
    pub max_top_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_top_matches: DEFAULT_MAX_TOP_MATCHES,
        }
    }
}

impl MatcherConfig {
    pub fn similarity_threshold(mut self, value: f32) -> Self {
        self.similarity_threshold = value;
        self
    }

    pub fn max_top_matches(mut self, value: usize) -> Self {
        self.max_top_matches = value;
        self
    }

    pub fn validate(&self) -> Result<(), MatcherConfigError> {
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MatcherConfigError::InvalidThreshold(
                self.similarity_threshold,
            ));
        }
        if self.max_top_matches == 0 {
            return Err(MatcherConfigError::ZeroTopMatches);
        }
        Ok(())
    }
}
