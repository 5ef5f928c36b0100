use std::time::Duration;

use thiserror::Error;

use crate::constants::{DEFAULT_QUERY_CACHE_CAPACITY, DEFAULT_STATS_TTL_SECS};
use crate::matcher::{MatcherConfig, MatcherConfigError};
use crate::weighting::{WeightParams, WeightParamsError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineConfigError {
    #[error(transparent)]
    Matcher(#[from] MatcherConfigError),

    #[error(transparent)]
    Weights(#[from] WeightParamsError),
}

/// Tunables of a [`MatchingEngine`](super::MatchingEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub matcher: MatcherConfig,
    pub weights: WeightParams,
    /// How long segment statistics are reused before refetching. Zero disables memoization.
    pub stats_ttl: Duration,
    /// Query-vector cache size. Zero disables the cache.
    pub query_cache_capacity: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            weights: WeightParams::default(),
            stats_ttl: Duration::from_secs(DEFAULT_STATS_TTL_SECS),
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn weights(mut self, weights: WeightParams) -> Self {
        self.weights = weights;
        self
    }

    pub fn stats_ttl(mut self, ttl: Duration) -> Self {
        self.stats_ttl = ttl;
        self
    }

    pub fn query_cache_capacity(mut self, capacity: u64) -> Self {
        self.query_cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        self.matcher.validate()?;
        self.weights.validate()?;
        Ok(())
    }
}
