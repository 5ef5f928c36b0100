//! JSON-file backed stores.
//!
//! Files are re-read on every fetch so a refresh picks up an index rebuilt on
//! disk. The catalog file carries each template together with its vector:
//!
//! ```json
//! { "templates": [ { "id": 1, "question": "...", "answer": "...",
//!                    "category": "...", "subcategory": "...", "embedding": [0.1, ...] } ] }
//! ```
//!
//! The optional feedback file carries per-segment counters:
//!
//! ```json
//! { "segments": [ { "category": "...", "subcategory": "...",
//!                   "total_answers": 10, "correct_answers": 7 } ] }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::catalog::{SegmentKey, TemplateRecord};
use crate::weighting::SegmentStats;

use super::error::{StoreError, StoreResult};
use super::{FeedbackStore, TemplateStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub templates: Vec<TemplateRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRow {
    #[serde(flatten)]
    pub record: TemplateRecord,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackFile {
    pub segments: Vec<SegmentRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRow {
    pub category: String,
    pub subcategory: String,
    pub total_answers: u64,
    pub correct_answers: u64,
}

/// Template and feedback store reading JSON files from disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    catalog_path: PathBuf,
    feedback_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            feedback_path: None,
        }
    }

    pub fn with_feedback(mut self, path: impl Into<PathBuf>) -> Self {
        self.feedback_path = Some(path.into());
        self
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn feedback_path(&self) -> Option<&Path> {
        self.feedback_path.as_deref()
    }

    async fn read_catalog(&self) -> StoreResult<CatalogFile> {
        read_json(&self.catalog_path).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

impl TemplateStore for JsonFileStore {
    async fn fetch_all_templates(&self) -> StoreResult<Vec<TemplateRecord>> {
        let file = self.read_catalog().await?;
        debug!(
            path = %self.catalog_path.display(),
            templates = file.templates.len(),
            "Read catalog file"
        );
        Ok(file.templates.into_iter().map(|row| row.record).collect())
    }

    async fn fetch_template_embeddings(&self, ids: &[u64]) -> StoreResult<HashMap<u64, Vec<f32>>> {
        let file = self.read_catalog().await?;

        let mut available: HashMap<u64, Vec<f32>> = file
            .templates
            .into_iter()
            .filter_map(|row| row.embedding.map(|e| (row.record.id, e)))
            .collect();

        let mut found = HashMap::with_capacity(ids.len());
        let mut missing = BTreeSet::new();
        for &id in ids {
            match available.remove(&id) {
                Some(vector) => {
                    found.insert(id, vector);
                }
                None => {
                    if !found.contains_key(&id) {
                        missing.insert(id);
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(StoreError::MissingEmbeddings {
                ids: missing.into_iter().collect(),
            });
        }

        Ok(found)
    }
}

impl FeedbackStore for JsonFileStore {
    async fn fetch_template_category_stats(&self) -> StoreResult<HashMap<SegmentKey, SegmentStats>> {
        let Some(path) = self.feedback_path.as_deref() else {
            return Ok(HashMap::new());
        };

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Feedback file absent, using neutral statistics");
            return Ok(HashMap::new());
        }

        let file: FeedbackFile = read_json(path).await?;

        let mut stats = HashMap::with_capacity(file.segments.len());
        for row in file.segments {
            let category = row.category.trim();
            let subcategory = row.subcategory.trim();
            if category.is_empty() || subcategory.is_empty() {
                continue;
            }
            stats.insert(
                SegmentKey::new(category, subcategory),
                SegmentStats::new(row.total_answers, row.correct_answers),
            );
        }

        Ok(stats)
    }
}
