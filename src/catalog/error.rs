use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
/// Errors raised while loading the template catalog.
pub enum CatalogError {
    /// Nothing matchable survived filtering.
    #[error("template catalog is empty ({total_records} records, none usable)")]
    EmptyCatalog {
        /// Records returned by the store before filtering.
        total_records: usize,
    },

    /// The backing store failed.
    #[error("template store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
