use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::store::TemplateStore;
use crate::text::normalize_text;

use super::error::{CatalogError, CatalogResult};
use super::types::{SegmentKey, TemplateEntry, TemplateRecord};

/// Fetches every template from `store` and builds the catalog.
pub async fn load_catalog<S: TemplateStore>(store: &S) -> CatalogResult<Vec<TemplateEntry>> {
    let records = store.fetch_all_templates().await?;
    build_catalog(records)
}

/// Validates, de-duplicates and orders raw records.
///
/// Records with a zero id, or an empty question, category, subcategory or
/// normalized question are dropped. When an id repeats, the first record wins.
/// The result is sorted by id ascending.
pub fn build_catalog(records: Vec<TemplateRecord>) -> CatalogResult<Vec<TemplateEntry>> {
    let total_records = records.len();
    let mut seen = HashSet::with_capacity(total_records);
    let mut entries = Vec::with_capacity(total_records);
    let mut rejected = 0usize;

    for record in records {
        let Some(entry) = to_entry(record) else {
            rejected += 1;
            continue;
        };

        if !seen.insert(entry.id) {
            warn!(template_id = entry.id, "Duplicate template id, keeping first");
            rejected += 1;
            continue;
        }

        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(CatalogError::EmptyCatalog { total_records });
    }

    entries.sort_by_key(|e| e.id);

    info!(
        total_records,
        accepted = entries.len(),
        rejected,
        "Template catalog built"
    );

    Ok(entries)
}

fn to_entry(record: TemplateRecord) -> Option<TemplateEntry> {
    let question = record.question.trim();
    let category = record.category.trim();
    let subcategory = record.subcategory.trim();

    if record.id == 0 || question.is_empty() || category.is_empty() || subcategory.is_empty() {
        debug!(template_id = record.id, "Dropping incomplete template");
        return None;
    }

    let normalized_question = normalize_text(question);
    if normalized_question.is_empty() {
        debug!(template_id = record.id, "Dropping template with empty normalized question");
        return None;
    }

    Some(TemplateEntry {
        id: record.id,
        question: question.to_string(),
        normalized_question,
        segment: SegmentKey::new(category, subcategory),
        answer: record.answer.trim().to_string(),
    })
}
