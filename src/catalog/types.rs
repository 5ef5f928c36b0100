use serde::{Deserialize, Serialize};

/// `(category, subcategory)` pair used to group templates for feedback weighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub category: String,
    pub subcategory: String,
}

impl SegmentKey {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }
}

impl std::fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.category, self.subcategory)
    }
}

/// Template row as returned by a [`TemplateStore`](crate::store::TemplateStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: u64,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    pub category: String,
    pub subcategory: String,
}

impl TemplateRecord {
    pub fn new(
        id: u64,
        question: impl Into<String>,
        answer: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }
}

/// Immutable, validated template as seen by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEntry {
    pub(crate) id: u64,
    pub(crate) question: String,
    pub(crate) normalized_question: String,
    pub(crate) segment: SegmentKey,
    pub(crate) answer: String,
}

impl TemplateEntry {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[inline]
    pub fn normalized_question(&self) -> &str {
        &self.normalized_question
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.segment.category
    }

    #[inline]
    pub fn subcategory(&self) -> &str {
        &self.segment.subcategory
    }

    #[inline]
    pub fn segment(&self) -> &SegmentKey {
        &self.segment
    }

    #[inline]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}
