//! Collaborator interfaces: template catalog, embeddings, and feedback statistics.
//!
//! The engine never talks to persistence directly. It goes through
//! [`TemplateStore`] and [`FeedbackStore`], which keeps it testable with the
//! in-memory mocks and lets [`JsonFileStore`] back the binary.

pub mod error;
pub mod file;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::{StoreError, StoreResult};
pub use file::{CatalogFile, FeedbackFile, JsonFileStore, SegmentRow, TemplateRow};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockFeedbackStore, MockTemplateStore};

use std::collections::HashMap;

use crate::catalog::{SegmentKey, TemplateRecord};
use crate::weighting::SegmentStats;

/// Source of templates and their pre-normalized embedding vectors.
pub trait TemplateStore: Send + Sync {
    /// Returns every template currently in the catalog, in any order.
    fn fetch_all_templates(
        &self,
    ) -> impl std::future::Future<Output = StoreResult<Vec<TemplateRecord>>> + Send;

    /// Returns the stored vector for each requested id.
    ///
    /// Implementations report absent ids with [`StoreError::MissingEmbeddings`].
    fn fetch_template_embeddings(
        &self,
        ids: &[u64],
    ) -> impl std::future::Future<Output = StoreResult<HashMap<u64, Vec<f32>>>> + Send;
}

/// Source of aggregate answer correctness per segment.
pub trait FeedbackStore: Send + Sync {
    fn fetch_template_category_stats(
        &self,
    ) -> impl std::future::Future<Output = StoreResult<HashMap<SegmentKey, SegmentStats>>> + Send;
}
