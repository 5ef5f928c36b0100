use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::catalog::{SegmentKey, TemplateRecord};
use crate::embedding::MockEmbeddingProvider;
use crate::index::IndexError;
use crate::matcher::MatcherConfig;
use crate::store::{MockFeedbackStore, MockTemplateStore};
use crate::text::normalize_text;

type TestEngine = MatchingEngine<MockTemplateStore, MockFeedbackStore>;

struct Harness {
    templates: MockTemplateStore,
    feedback: MockFeedbackStore,
    provider: MockEmbeddingProvider,
}

impl Harness {
    fn new() -> Self {
        Self::with_provider(MockEmbeddingProvider::new())
    }

    fn with_provider(provider: MockEmbeddingProvider) -> Self {
        Self {
            templates: MockTemplateStore::new(),
            feedback: MockFeedbackStore::new(),
            provider,
        }
    }

    /// Adds a template embedded the way the provider would embed its question.
    fn add(&self, id: u64, question: &str, category: &str, subcategory: &str) {
        let vector = self.provider.unit_vector_for(&normalize_text(question));
        self.templates.insert(
            TemplateRecord::new(id, question, "Ответ", category, subcategory),
            vector,
        );
    }

    fn add_with_vector(&self, record: TemplateRecord, vector: Vec<f32>) {
        self.templates.insert(record, vector);
    }

    fn engine(&self) -> TestEngine {
        self.engine_with(EngineConfig::default())
    }

    fn engine_with(&self, config: EngineConfig) -> TestEngine {
        MatchingEngine::new(
            self.templates.clone(),
            self.feedback.clone(),
            Arc::new(self.provider.clone()),
            config,
        )
        .unwrap()
    }
}

fn billing_harness() -> Harness {
    let h = Harness::new();
    h.add(3, "Как заблокировать карту?", "Карты", "Блокировка");
    h.add(7, "Как оплатить счёт?", "Биллинг", "Счета");
    h.add(12, "Где посмотреть выписку по счёту?", "Биллинг", "Выписки");
    h
}

#[tokio::test]
async fn test_exact_match_variant_query() {
    let h = billing_harness();
    let engine = h.engine();

    let result = engine.classify_query("  как оплатить СЧЁТ?? ").await;

    assert_eq!(result.matched_template_id, Some(7));
    assert_eq!(result.category.as_deref(), Some("Биллинг"));
    assert_eq!(result.subcategory.as_deref(), Some("Счета"));
    assert_eq!(
        result.matched_template_question.as_deref(),
        Some("Как оплатить счёт?")
    );
    assert!(result.top_matches[0].raw_score >= 0.99);
    assert!(result.confidence >= 0.99 && result.confidence <= 1.0);
    assert!(!result.below_threshold);
    assert!(result.is_confident());
}

#[tokio::test]
async fn test_empty_catalog_is_no_match() {
    let h = Harness::new();
    h.add_with_vector(
        TemplateRecord::new(1, "Вопрос", "Ответ", "", "Счета"),
        vec![1.0; 4],
    );
    let engine = h.engine();

    let outcome = engine.match_query("Как оплатить счёт?").await;
    assert_eq!(
        outcome,
        QueryOutcome::Degraded {
            reason: DegradedReason::NotReady
        }
    );

    let result = engine.classify_query("Как оплатить счёт?").await;
    assert_eq!(result, Classification::no_match());
    assert_eq!(result.matched_template_id, None);
    assert!(result.below_threshold);
    assert!(result.top_matches.is_empty());

    assert!(matches!(
        engine.refresh_caches().await,
        Err(EngineError::Catalog(_))
    ));
    assert!(!engine.is_ready());
}

#[tokio::test]
async fn test_failed_first_load_is_not_retried_by_queries() {
    let h = Harness::new();
    h.add_with_vector(
        TemplateRecord::new(1, "Вопрос", "Ответ", "", "Счета"),
        vec![1.0; 4],
    );
    let engine = h.engine();

    for _ in 0..5 {
        assert_eq!(
            engine.match_query("Как оплатить счёт?").await,
            QueryOutcome::Degraded {
                reason: DegradedReason::NotReady
            }
        );
    }
    assert!(matches!(
        engine.search("Как оплатить счёт?", SearchOptions::default()).await,
        Err(EngineError::NotReady)
    ));
    assert_eq!(h.templates.template_fetches(), 1);

    // the store is fixed, but only an explicit refresh picks it up
    h.add(7, "Как оплатить счёт?", "Биллинг", "Счета");
    assert_eq!(
        engine.classify_query("Как оплатить счёт?").await,
        Classification::no_match()
    );
    assert_eq!(h.templates.template_fetches(), 1);

    engine.refresh_caches().await.unwrap();
    assert_eq!(
        engine.classify_query("Как оплатить счёт?").await.matched_template_id,
        Some(7)
    );
    assert_eq!(h.templates.template_fetches(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_queries_share_one_failed_load() {
    let h = Harness::new();
    h.templates.set_unavailable(true);
    let engine = Arc::new(h.engine());

    let mut callers = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        callers.push(tokio::spawn(async move {
            engine.classify_query("Как оплатить счёт?").await
        }));
    }
    for caller in callers {
        assert_eq!(caller.await.unwrap(), Classification::no_match());
    }

    assert_eq!(h.templates.template_fetches(), 1);
}

#[tokio::test]
async fn test_weighting_flips_ranking_on_raw_tie() {
    let h = Harness::with_provider(MockEmbeddingProvider::with_dim(4));
    h.provider.set_override(normalize_text("запрос"), vec![1.0, 0.0, 0.0, 0.0]);
    h.add_with_vector(
        TemplateRecord::new(1, "Шаблон с ошибками", "", "Карты", "Лимиты"),
        vec![0.8, 0.6, 0.0, 0.0],
    );
    h.add_with_vector(
        TemplateRecord::new(2, "Надёжный шаблон", "", "Биллинг", "Счета"),
        vec![0.8, 0.0, 0.6, 0.0],
    );

    // lowest index wins a raw tie without feedback
    let engine = h.engine_with(EngineConfig::default().stats_ttl(Duration::ZERO));
    let before = engine.classify_query("Запрос").await;
    assert_eq!(before.matched_template_id, Some(1));

    h.feedback.set_stats("Карты", "Лимиты", 1_000, 200);
    h.feedback.set_stats("Биллинг", "Счета", 1_000, 1_000);
    let after = engine.classify_query("Запрос").await;

    assert_eq!(after.matched_template_id, Some(2));
    let [first, second] = &after.top_matches[..] else {
        panic!("expected two ranked matches");
    };
    assert!((first.raw_score - second.raw_score).abs() < 1e-6);
    assert!((first.raw_score - 0.8).abs() < 1e-5);
    assert!(first.weight > second.weight);
    assert!(second.weight < 1.0);
    assert!(first.weighted_score > second.weighted_score);
}

#[tokio::test]
async fn test_missing_embeddings_keep_previous_snapshot() {
    let h = billing_harness();
    let engine = h.engine();
    let first = engine.refresh_caches().await.unwrap();
    let baseline = engine.classify_query("Как оплатить счёт?").await;

    h.add(20, "Как закрыть вклад?", "Вклады", "Закрытие");
    h.templates.remove_embedding(20);
    h.templates.set_partial_embeddings(true);

    match engine.refresh_caches().await {
        Err(EngineError::Index(IndexError::MissingEmbeddings { ids })) => {
            assert_eq!(ids, vec![20])
        }
        other => panic!("expected MissingEmbeddings, got {other:?}"),
    }

    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.generation(), first.generation);
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.matrix().rows(), 3);
    assert_eq!(engine.classify_query("Как оплатить счёт?").await, baseline);
}

#[tokio::test]
async fn test_strict_store_missing_embeddings_rejected() {
    let h = billing_harness();
    let engine = h.engine();
    engine.refresh_caches().await.unwrap();

    h.templates
        .insert_record(TemplateRecord::new(30, "Новый вопрос", "", "A", "B"));

    assert!(matches!(
        engine.refresh_caches().await,
        Err(EngineError::Index(IndexError::MissingEmbeddings { .. }))
    ));
    assert_eq!(engine.snapshot().unwrap().len(), 3);
}

#[tokio::test]
async fn test_refresh_twice_is_idempotent() {
    let h = billing_harness();
    h.feedback.set_stats("Биллинг", "Счета", 500, 400);
    let engine = h.engine();

    let first = engine.refresh_caches().await.unwrap();
    let a = engine.classify_query("Где выписка по счёту?").await;
    let second = engine.refresh_caches().await.unwrap();
    let b = engine.classify_query("Где выписка по счёту?").await;

    assert_eq!(a, b);
    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(second.generation, first.generation + 1);
}

#[tokio::test]
async fn test_refresh_publishes_new_templates() {
    let h = billing_harness();
    let engine = h.engine();
    engine.refresh_caches().await.unwrap();

    h.add(40, "Как открыть вклад?", "Вклады", "Открытие");
    // not visible until refresh
    assert_eq!(engine.snapshot().unwrap().len(), 3);

    let report = engine.refresh_caches().await.unwrap();
    assert!(report.changed);
    assert_eq!(report.templates, 4);
    assert_eq!(
        engine.classify_query("как открыть вклад").await.matched_template_id,
        Some(40)
    );
}

#[tokio::test]
async fn test_first_query_loads_index_once() {
    let h = billing_harness();
    let engine = h.engine();
    assert!(!engine.is_ready());

    engine.classify_query("Как оплатить счёт?").await;
    engine.classify_query("Как заблокировать карту?").await;

    assert!(engine.is_ready());
    assert_eq!(h.templates.template_fetches(), 1);
    assert_eq!(engine.snapshot().unwrap().generation(), 1);
}

#[tokio::test]
async fn test_provider_outage_degrades() {
    let h = billing_harness();
    let engine = h.engine();
    engine.refresh_caches().await.unwrap();
    h.provider.set_failing(true);

    let outcome = engine.match_query("Как оплатить счёт?").await;
    assert!(outcome.is_degraded());
    assert!(matches!(
        outcome,
        QueryOutcome::Degraded {
            reason: DegradedReason::EncodingUnavailable { .. }
        }
    ));

    let result = engine.classify_query("Как оплатить счёт?").await;
    assert_eq!(result, Classification::no_match());
}

#[tokio::test]
async fn test_degenerate_and_empty_queries_degrade() {
    let h = billing_harness();
    h.provider.set_override(normalize_text("ноль"), vec![0.0; h.provider.dim()]);
    let engine = h.engine();

    assert_eq!(
        engine.match_query("Ноль").await,
        QueryOutcome::Degraded {
            reason: DegradedReason::DegenerateEmbedding
        }
    );
    assert_eq!(
        engine.match_query("  ...  ").await,
        QueryOutcome::Degraded {
            reason: DegradedReason::EmptyQuery
        }
    );
}

#[tokio::test]
async fn test_feedback_outage_uses_neutral_weights() {
    let h = billing_harness();
    h.feedback.set_unavailable(true);
    let engine = h.engine();

    let result = engine.classify_query("Как оплатить счёт?").await;
    assert_eq!(result.matched_template_id, Some(7));
    assert!(result.top_matches.iter().all(|m| m.weight == 1.0));
}

#[tokio::test]
async fn test_stats_reused_within_ttl() {
    let h = billing_harness();
    let engine = h.engine();

    engine.classify_query("Как оплатить счёт?").await;
    engine.classify_query("Как оплатить счёт?").await;
    engine.classify_query("Как заблокировать карту?").await;

    assert_eq!(h.feedback.fetches(), 1);
}

#[tokio::test]
async fn test_below_threshold_still_reports_best() {
    let h = Harness::with_provider(MockEmbeddingProvider::with_dim(4));
    h.provider.set_override(normalize_text("далекий запрос"), vec![0.2, 0.0, 0.0, 0.98]);
    h.add_with_vector(
        TemplateRecord::new(5, "Вопрос", "", "A", "B"),
        vec![1.0, 0.0, 0.0, 0.0],
    );
    let engine = h.engine();

    let result = engine.classify_query("Далёкий запрос").await;
    assert_eq!(result.matched_template_id, Some(5));
    assert!(result.below_threshold);
    assert!(result.confidence < 0.35);
    assert!(!result.is_confident());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_see_aligned_snapshots() {
    let h = billing_harness();
    let engine = Arc::new(h.engine());
    engine.refresh_caches().await.unwrap();

    let mut readers = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        readers.push(tokio::spawn(async move {
            for _ in 0..50 {
                let snapshot = engine.snapshot().expect("published");
                assert_eq!(snapshot.catalog().len(), snapshot.matrix().rows());
                let result = engine.classify_query("Как оплатить счёт?").await;
                assert_eq!(result.matched_template_id, Some(7));
                tokio::task::yield_now().await;
            }
        }));
    }

    for id in 100..120u64 {
        h.add(id, &format!("Дополнительный вопрос {id}"), "Прочее", "Разное");
        engine.refresh_caches().await.unwrap();
    }

    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(engine.snapshot().unwrap().len(), 23);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let h = Harness::new();
    let config = EngineConfig::default().matcher(MatcherConfig::default().max_top_matches(0));
    let result = MatchingEngine::new(
        h.templates.clone(),
        h.feedback.clone(),
        Arc::new(h.provider.clone()),
        config,
    );
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn test_classification_serializes_camel_case() {
    let json = serde_json::to_value(Classification::no_match()).unwrap();
    assert_eq!(json["belowThreshold"], true);
    assert_eq!(json["matchedTemplateId"], serde_json::Value::Null);
    assert_eq!(json["topMatches"], serde_json::json!([]));
}

fn search_harness() -> Harness {
    let h = Harness::with_provider(MockEmbeddingProvider::with_dim(4));
    h.provider.set_override(normalize_text("кэшбэк форсаж"), vec![1.0, 0.0, 0.0, 0.0]);
    h.add_with_vector(
        TemplateRecord::new(1, "Как получить кэшбэк?", "Кэшбэк начисляется ежемесячно", "Карты", "Кэшбэк"),
        vec![1.0, 0.0, 0.0, 0.0],
    );
    h.add_with_vector(
        TemplateRecord::new(2, "Кэшбэк по карте", "Для карты Форсаж повышенный кэшбэк", "Карты", "Кэшбэк"),
        vec![0.95, (1.0f32 - 0.9025).sqrt(), 0.0, 0.0],
    );
    h.add_with_vector(
        TemplateRecord::new(3, "Какой лимит по карте?", "Лимит зависит от тарифа", "Карты", "Лимиты"),
        vec![0.8, 0.6, 0.0, 0.0],
    );
    h
}

#[tokio::test]
async fn test_search_boosts_detected_products() {
    let h = search_harness();
    let engine = h.engine();

    let hits = engine
        .search("Кэшбэк Форсаж", SearchOptions::default())
        .await
        .unwrap();

    let ids: Vec<u64> = hits.iter().map(|hit| hit.template_id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert!((hits[0].score - 1.05).abs() < 1e-4);
    assert!((hits[0].raw_score - 0.95).abs() < 1e-4);
    assert_eq!(hits[0].answer, "Для карты Форсаж повышенный кэшбэк");
}

#[tokio::test]
async fn test_search_explicit_products_override_detection() {
    let h = search_harness();
    let engine = h.engine();

    let hits = engine
        .search(
            "Кэшбэк Форсаж",
            SearchOptions::default().products(Vec::<String>::new()),
        )
        .await
        .unwrap();

    assert_eq!(hits[0].template_id, 1);
    assert_eq!(hits[0].score, hits[0].raw_score);
}

#[tokio::test]
async fn test_search_segment_filter() {
    let h = search_harness();
    let engine = h.engine();

    let hits = engine
        .search(
            "Кэшбэк Форсаж",
            SearchOptions::default().segment(SegmentKey::new("Карты", "Лимиты")),
        )
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].template_id, 3);

    let none = engine
        .search(
            "Кэшбэк Форсаж",
            SearchOptions::default().segment(SegmentKey::new("Нет", "Такого")),
        )
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_search_top_k_is_clamped() {
    let h = search_harness();
    let engine = h.engine();

    let one = engine
        .search("Кэшбэк Форсаж", SearchOptions::default().top_k(0))
        .await
        .unwrap();
    assert_eq!(one.len(), 1);

    let all = engine
        .search("Кэшбэк Форсаж", SearchOptions::default().top_k(50))
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let default = engine
        .search("Кэшбэк Форсаж", SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(default.len(), 3);
}

#[tokio::test]
async fn test_search_empty_query_and_provider_errors() {
    let h = search_harness();
    let engine = h.engine();

    assert!(
        engine
            .search(" ", SearchOptions::default())
            .await
            .unwrap()
            .is_empty()
    );

    h.provider.set_failing(true);
    assert!(matches!(
        engine.search("Кэшбэк", SearchOptions::default()).await,
        Err(EngineError::Encoding(_))
    ));
}

#[tokio::test]
async fn test_query_of_other_dimension_scores_nothing() {
    let h = search_harness();
    h.provider.set_override(normalize_text("другая модель"), vec![1.0, 0.0, 0.0]);
    let engine = h.engine();

    let hits = engine
        .search("Другая модель", SearchOptions::default())
        .await
        .unwrap();
    assert!(hits.is_empty());

    let result = engine.classify_query("Другая модель").await;
    assert_eq!(result.matched_template_id, None);
    assert!(result.top_matches.is_empty());
}
