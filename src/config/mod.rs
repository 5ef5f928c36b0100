//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TEMPLAR_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_TOP_MATCHES, DEFAULT_QUERY_CACHE_CAPACITY, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_STATS_TTL_SECS, DEFAULT_WEIGHT_MAX_EFFECT, DEFAULT_WEIGHT_TAU,
    DEFAULT_WEIGHT_THRESHOLD,
};
use crate::embedding::OpenAiConfig;
use crate::embedding::openai::{DEFAULT_EMBEDDING_MODEL, DEFAULT_REQUEST_TIMEOUT};
use crate::engine::EngineConfig;
use crate::matcher::MatcherConfig;
use crate::weighting::WeightParams;

/// Default embedding API root used when `TEMPLAR_EMBEDDING_BASE_URL` is not set.
pub const DEFAULT_EMBEDDING_BASE_URL: &str = "http://localhost:8000/v1";

/// Process configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `TEMPLAR_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// JSON catalog with templates and embeddings. Default: `./data/catalog.json`.
    pub catalog_path: PathBuf,

    /// JSON feedback statistics. Without it every weight is neutral.
    pub feedback_path: Option<PathBuf>,

    /// OpenAI-compatible API root. Default: `http://localhost:8000/v1`.
    pub embedding_base_url: String,

    pub embedding_api_key: Option<String>,

    /// Default: `bge-m3`.
    pub embedding_model: String,

    /// Embedding request timeout in seconds. Default: `10`.
    pub request_timeout_secs: u64,

    /// Default: `0.35`.
    pub similarity_threshold: f32,

    /// Default: `5`.
    pub max_top_matches: usize,

    /// Segment statistics time-to-live in seconds. Default: `30`.
    pub stats_ttl_secs: u64,

    pub weight_max_effect: f64,
    pub weight_tau: f64,
    pub weight_threshold: f64,

    /// Query vector cache entries; `0` disables. Default: `1024`.
    pub query_cache_capacity: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("catalog_path", &self.catalog_path)
            .field("feedback_path", &self.feedback_path)
            .field("embedding_base_url", &self.embedding_base_url)
            .field(
                "embedding_api_key",
                &self.embedding_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("embedding_model", &self.embedding_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("max_top_matches", &self.max_top_matches)
            .field("stats_ttl_secs", &self.stats_ttl_secs)
            .field("weight_max_effect", &self.weight_max_effect)
            .field("weight_tau", &self.weight_tau)
            .field("weight_threshold", &self.weight_threshold)
            .field("query_cache_capacity", &self.query_cache_capacity)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/catalog.json"),
            feedback_path: None,
            embedding_base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_top_matches: DEFAULT_MAX_TOP_MATCHES,
            stats_ttl_secs: DEFAULT_STATS_TTL_SECS,
            weight_max_effect: DEFAULT_WEIGHT_MAX_EFFECT,
            weight_tau: DEFAULT_WEIGHT_TAU,
            weight_threshold: DEFAULT_WEIGHT_THRESHOLD,
            query_cache_capacity: DEFAULT_QUERY_CACHE_CAPACITY,
        }
    }
}

impl Config {
    const ENV_CATALOG_PATH: &'static str = "TEMPLAR_CATALOG_PATH";
    const ENV_FEEDBACK_PATH: &'static str = "TEMPLAR_FEEDBACK_PATH";
    const ENV_EMBEDDING_BASE_URL: &'static str = "TEMPLAR_EMBEDDING_BASE_URL";
    const ENV_EMBEDDING_API_KEY: &'static str = "TEMPLAR_EMBEDDING_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "TEMPLAR_EMBEDDING_MODEL";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "TEMPLAR_REQUEST_TIMEOUT_SECS";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "TEMPLAR_SIMILARITY_THRESHOLD";
    const ENV_MAX_TOP_MATCHES: &'static str = "TEMPLAR_MAX_TOP_MATCHES";
    const ENV_STATS_TTL_SECS: &'static str = "TEMPLAR_STATS_TTL_SECS";
    const ENV_WEIGHT_MAX_EFFECT: &'static str = "TEMPLAR_WEIGHT_MAX_EFFECT";
    const ENV_WEIGHT_TAU: &'static str = "TEMPLAR_WEIGHT_TAU";
    const ENV_WEIGHT_THRESHOLD: &'static str = "TEMPLAR_WEIGHT_THRESHOLD";
    const ENV_QUERY_CACHE_CAPACITY: &'static str = "TEMPLAR_QUERY_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    ///
    /// A variable that is set but cannot be parsed is an error, not a silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            catalog_path: Self::parse_path_from_env(Self::ENV_CATALOG_PATH, defaults.catalog_path),
            feedback_path: Self::parse_optional_from_env(Self::ENV_FEEDBACK_PATH).map(PathBuf::from),
            embedding_base_url: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_BASE_URL,
                defaults.embedding_base_url,
            ),
            embedding_api_key: Self::parse_optional_from_env(Self::ENV_EMBEDDING_API_KEY),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            request_timeout_secs: Self::parse_number_from_env(
                Self::ENV_REQUEST_TIMEOUT_SECS,
                defaults.request_timeout_secs,
            )?,
            similarity_threshold: Self::parse_number_from_env(
                Self::ENV_SIMILARITY_THRESHOLD,
                defaults.similarity_threshold,
            )?,
            max_top_matches: Self::parse_number_from_env(
                Self::ENV_MAX_TOP_MATCHES,
                defaults.max_top_matches,
            )?,
            stats_ttl_secs: Self::parse_number_from_env(
                Self::ENV_STATS_TTL_SECS,
                defaults.stats_ttl_secs,
            )?,
            weight_max_effect: Self::parse_number_from_env(
                Self::ENV_WEIGHT_MAX_EFFECT,
                defaults.weight_max_effect,
            )?,
            weight_tau: Self::parse_number_from_env(Self::ENV_WEIGHT_TAU, defaults.weight_tau)?,
            weight_threshold: Self::parse_number_from_env(
                Self::ENV_WEIGHT_THRESHOLD,
                defaults.weight_threshold,
            )?,
            query_cache_capacity: Self::parse_number_from_env(
                Self::ENV_QUERY_CACHE_CAPACITY,
                defaults.query_cache_capacity,
            )?,
        })
    }

    /// Validates paths and tunables (does not read any file).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.catalog_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.catalog_path.clone(),
            });
        }
        if !self.catalog_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.catalog_path.clone(),
            });
        }

        // a missing feedback file is allowed and means "no feedback yet"
        if let Some(ref path) = self.feedback_path
            && path.exists()
            && !path.is_file()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }

        self.engine_config().validate()?;
        self.embedding_config().validate()?;
        Ok(())
    }

    /// Matching, weighting and caching tunables.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .matcher(
                MatcherConfig::default()
                    .similarity_threshold(self.similarity_threshold)
                    .max_top_matches(self.max_top_matches),
            )
            .weights(
                WeightParams::default()
                    .max_effect(self.weight_max_effect)
                    .tau(self.weight_tau)
                    .threshold(self.weight_threshold),
            )
            .stats_ttl(Duration::from_secs(self.stats_ttl_secs))
            .query_cache_capacity(self.query_cache_capacity)
    }

    /// Settings for the HTTP embedding provider.
    pub fn embedding_config(&self) -> OpenAiConfig {
        let config = OpenAiConfig::new(self.embedding_base_url.clone())
            .model(self.embedding_model.clone())
            .timeout(Duration::from_secs(self.request_timeout_secs));
        match &self.embedding_api_key {
            Some(key) => config.api_key(key.clone()),
            None => config,
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: e.to_string(),
                    value,
                }),
            Err(_) => Ok(default),
        }
    }
}
