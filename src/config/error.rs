//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::OpenAiConfigError;
use crate::engine::EngineConfigError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set to something that does not parse.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error(transparent)]
    Engine(#[from] EngineConfigError),

    #[error(transparent)]
    Embedding(#[from] OpenAiConfigError),
}
