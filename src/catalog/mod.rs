//! Template catalog: the ordered, validated set of matchable templates.
//!
//! [`build_catalog`] turns raw store records into [`TemplateEntry`]s, dropping
//! anything that cannot be matched and fixing the order by id so that row
//! alignment with the embedding matrix and argmax tie-breaks are reproducible
//! across rebuilds.

pub mod error;
pub mod loader;
pub mod types;


pub use error::{CatalogError, CatalogResult};
pub use loader::{build_catalog, load_catalog};
pub use types::{SegmentKey, TemplateEntry, TemplateRecord};
