use thiserror::Error;

use crate::catalog::CatalogError;
use crate::embedding::EncodingError;
use crate::index::IndexError;

use super::config::EngineConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog load failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("embedding matrix load failed: {0}")]
    Index(#[from] IndexError),

    #[error("query encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] EngineConfigError),

    #[error("no template index has been published yet")]
    NotReady,
}

pub type EngineResult<T> = Result<T, EngineError>;
