use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
/// Errors raised while building the embedding matrix.
pub enum IndexError {
    /// Catalog ids without a stored vector.
    #[error("missing embeddings for template ids {ids:?}")]
    MissingEmbeddings {
        /// Missing ids, ascending.
        ids: Vec<u64>,
    },

    /// A row's dimension differs from the first row's.
    #[error("embedding for template {id} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: u64,
        expected: usize,
        actual: usize,
    },

    /// Vectors have no components.
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,

    /// Catalog and matrix disagree on row count.
    #[error("catalog has {catalog} templates but matrix has {matrix} rows")]
    RowCountMismatch { catalog: usize, matrix: usize },

    /// The backing store failed for another reason.
    #[error("template store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for IndexError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingEmbeddings { ids } => IndexError::MissingEmbeddings { ids },
            other => IndexError::Store(other),
        }
    }
}

/// Convenience result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
