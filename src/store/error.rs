use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by template and feedback stores.
pub enum StoreError {
    /// Requested template ids have no stored embedding.
    #[error("no embedding stored for template ids {ids:?}")]
    MissingEmbeddings {
        /// Ids that were requested but not found, ascending.
        ids: Vec<u64>,
    },

    /// The store could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },

    /// Reading a backing file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backing file could not be decoded.
    #[error("malformed store file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
