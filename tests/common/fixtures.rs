//! Test fixtures for integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use templar::catalog::TemplateRecord;
use templar::embedding::MockEmbeddingProvider;
use templar::engine::{EngineConfig, MatchingEngine};
use templar::store::{
    CatalogFile, FeedbackFile, MockFeedbackStore, MockTemplateStore, SegmentRow, TemplateRow,
};
use templar::text::normalize_text;

pub const BILLING: (&str, &str) = ("Биллинг", "Счета");
pub const STATEMENTS: (&str, &str) = ("Биллинг", "Выписки");
pub const CARD_BLOCK: (&str, &str) = ("Карты", "Блокировка");
pub const CARD_LIMITS: (&str, &str) = ("Карты", "Лимиты");

/// A small bank support catalog: `(id, question, answer, segment)`.
pub const SUPPORT_TEMPLATES: &[(u64, &str, &str, (&str, &str))] = &[
    (3, "Как заблокировать карту?", "Заблокируйте карту в приложении.", CARD_BLOCK),
    (7, "Как оплатить счёт?", "Оплатите счёт в разделе «Платежи».", BILLING),
    (12, "Где посмотреть выписку по счёту?", "Выписка доступна в истории операций.", STATEMENTS),
    (15, "Как увеличить лимит по карте MORE?", "Лимит по карте MORE меняется в настройках.", CARD_LIMITS),
];

#[derive(Default)]
pub struct TemplateBuilder {
    id: Option<u64>,
    question: Option<String>,
    answer: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn question(mut self, question: &str) -> Self {
        self.question = Some(question.to_string());
        self
    }

    pub fn answer(mut self, answer: &str) -> Self {
        self.answer = Some(answer.to_string());
        self
    }

    pub fn segment(mut self, (category, subcategory): (&str, &str)) -> Self {
        self.category = Some(category.to_string());
        self.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn build(self) -> TemplateRecord {
        TemplateRecord::new(
            self.id.unwrap_or(1),
            self.question.unwrap_or_else(|| "Вопрос".to_string()),
            self.answer.unwrap_or_default(),
            self.category.unwrap_or_else(|| BILLING.0.to_string()),
            self.subcategory.unwrap_or_else(|| BILLING.1.to_string()),
        )
    }
}

pub fn support_records() -> Vec<TemplateRecord> {
    SUPPORT_TEMPLATES
        .iter()
        .map(|&(id, question, answer, segment)| {
            TemplateBuilder::new()
                .id(id)
                .question(question)
                .answer(answer)
                .segment(segment)
                .build()
        })
        .collect()
}

/// The unit vector `provider` would produce for `question` after normalization.
pub fn embed_question(provider: &MockEmbeddingProvider, question: &str) -> Vec<f32> {
    provider.unit_vector_for(&normalize_text(question))
}

/// Mock stores seeded with [`SUPPORT_TEMPLATES`].
pub fn seeded_stores(provider: &MockEmbeddingProvider) -> (MockTemplateStore, MockFeedbackStore) {
    let templates = MockTemplateStore::new();
    for record in support_records() {
        let vector = embed_question(provider, &record.question);
        templates.insert(record, vector);
    }
    (templates, MockFeedbackStore::new())
}

pub fn mock_engine(
    templates: &MockTemplateStore,
    feedback: &MockFeedbackStore,
    provider: &MockEmbeddingProvider,
    config: EngineConfig,
) -> MatchingEngine<MockTemplateStore, MockFeedbackStore> {
    MatchingEngine::new(
        templates.clone(),
        feedback.clone(),
        Arc::new(provider.clone()),
        config,
    )
    .expect("valid engine config")
}

/// Catalog file contents with embeddings from `provider`.
pub fn catalog_file(provider: &MockEmbeddingProvider, records: Vec<TemplateRecord>) -> CatalogFile {
    CatalogFile {
        templates: records
            .into_iter()
            .map(|record| TemplateRow {
                embedding: Some(embed_question(provider, &record.question)),
                record,
            })
            .collect(),
    }
}

pub fn feedback_file(rows: &[((&str, &str), u64, u64)]) -> FeedbackFile {
    FeedbackFile {
        segments: rows
            .iter()
            .map(|&((category, subcategory), total, correct)| SegmentRow {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                total_answers: total,
                correct_answers: correct,
            })
            .collect(),
    }
}

pub fn write_json<T: serde::Serialize>(value: &T) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    let bytes = serde_json::to_vec(value).expect("serialize fixture");
    file.write_all(&bytes).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

/// Overwrites `file` in place with `value`.
pub fn rewrite_json<T: serde::Serialize>(file: &NamedTempFile, value: &T) {
    let bytes = serde_json::to_vec(value).expect("serialize fixture");
    std::fs::write(file.path(), bytes).expect("rewrite fixture");
}
