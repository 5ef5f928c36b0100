//! Product mention detection.
//!
//! Matching is a case-insensitive substring test against a fixed list of
//! catalog product names. Each product is reported once, under the first
//! spelling that appears in the list.

/// Product names known to the template catalog.
pub const PRODUCT_NAMES: &[&str] = &[
    "MORE",
    "Форсаж",
    "Комплимент",
    "Signature",
    "Infinite",
    "PLAT/ON",
    "Портмоне 2.0",
    "Отличник",
    "ЧЕРЕПАХА",
    "КСТАТИ",
    "кредит дальше",
    "кредит легко",
    "Старт",
];

/// Case-insensitive detector over a product list.
#[derive(Debug, Clone)]
pub struct ProductDetector {
    // (lowercased key, display label)
    products: Vec<(String, String)>,
}

impl ProductDetector {
    /// Builds a detector; later duplicates of an already-seen key are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut products: Vec<(String, String)> = Vec::new();
        for name in names {
            let label = name.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            let key = label.to_lowercase();
            if products.iter().any(|(k, _)| *k == key) {
                continue;
            }
            products.push((key, label.to_string()));
        }
        Self { products }
    }

    /// Returns the labels of every product mentioned in `text`, in list order.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.products
            .iter()
            .filter(|(key, _)| haystack.contains(key.as_str()))
            .map(|(_, label)| label.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for ProductDetector {
    fn default() -> Self {
        Self::new(PRODUCT_NAMES.iter().copied())
    }
}

/// Detects [`PRODUCT_NAMES`] in `text`.
pub fn detect_products(text: &str) -> Vec<String> {
    ProductDetector::default().detect(text)
}

/// Counts how many of `products` occur in `text` (case-insensitive).
pub(crate) fn count_mentions(text: &str, products: &[String]) -> usize {
    if products.is_empty() {
        return 0;
    }
    let haystack = text.to_lowercase();
    products
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty() && haystack.contains(p.as_str()))
        .count()
}
