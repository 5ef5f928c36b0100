//! The matching engine facade.
//!
//! [`MatchingEngine`] ties the collaborators together: it owns the published
//! [`IndexSnapshot`], the segment statistics cache and the query encoder, and
//! exposes `classify_query`, `refresh_caches` and `search`.
//!
//! Refreshes are copy-on-write. A new catalog and matrix are loaded in full
//! before the snapshot pointer is swapped, so readers see either the old pair
//! or the new one. A failed refresh leaves the previous snapshot in place.

mod config;
mod error;
mod matching;
mod snapshot;
mod types;

#[cfg(test)]
mod tests;

pub use config::{EngineConfig, EngineConfigError};
pub use error::{EngineError, EngineResult};
pub use matching::MatchingEngine;
pub use snapshot::IndexSnapshot;
pub use types::{
    Classification, DegradedReason, QueryOutcome, RefreshReport, SearchHit, SearchOptions,
};
