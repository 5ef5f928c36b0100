use super::*;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const ALL_VARS: &[&str] = &[
    "TEMPLAR_CATALOG_PATH",
    "TEMPLAR_FEEDBACK_PATH",
    "TEMPLAR_EMBEDDING_BASE_URL",
    "TEMPLAR_EMBEDDING_API_KEY",
    "TEMPLAR_EMBEDDING_MODEL",
    "TEMPLAR_REQUEST_TIMEOUT_SECS",
    "TEMPLAR_SIMILARITY_THRESHOLD",
    "TEMPLAR_MAX_TOP_MATCHES",
    "TEMPLAR_STATS_TTL_SECS",
    "TEMPLAR_WEIGHT_MAX_EFFECT",
    "TEMPLAR_WEIGHT_TAU",
    "TEMPLAR_WEIGHT_THRESHOLD",
    "TEMPLAR_QUERY_CACHE_CAPACITY",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    clear_templar_env();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    clear_templar_env();
    result
}

fn clear_templar_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

fn catalog_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"templates":[]}"#).unwrap();
    file
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.catalog_path, PathBuf::from("./data/catalog.json"));
    assert!(config.feedback_path.is_none());
    assert_eq!(config.embedding_base_url, "http://localhost:8000/v1");
    assert_eq!(config.embedding_model, "bge-m3");
    assert_eq!(config.similarity_threshold, 0.35);
    assert_eq!(config.max_top_matches, 5);
    assert_eq!(config.stats_ttl_secs, 30);
    assert_eq!(config.weight_max_effect, 1.0);
    assert_eq!(config.weight_tau, 100_000.0);
    assert_eq!(config.weight_threshold, 1.0);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_templar_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.catalog_path, Config::default().catalog_path);
    assert_eq!(config.query_cache_capacity, 1_024);
    assert!(config.embedding_api_key.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    let config = with_env_vars(
        &[
            ("TEMPLAR_CATALOG_PATH", "/srv/catalog.json"),
            ("TEMPLAR_FEEDBACK_PATH", "/srv/feedback.json"),
            ("TEMPLAR_EMBEDDING_BASE_URL", "https://llm.example.com/v1"),
            ("TEMPLAR_EMBEDDING_API_KEY", "secret"),
            ("TEMPLAR_EMBEDDING_MODEL", "bge-large"),
            ("TEMPLAR_REQUEST_TIMEOUT_SECS", "3"),
            ("TEMPLAR_SIMILARITY_THRESHOLD", "0.5"),
            ("TEMPLAR_MAX_TOP_MATCHES", "3"),
            ("TEMPLAR_STATS_TTL_SECS", "0"),
            ("TEMPLAR_WEIGHT_MAX_EFFECT", "0.5"),
            ("TEMPLAR_WEIGHT_TAU", "1000"),
            ("TEMPLAR_WEIGHT_THRESHOLD", "0.9"),
            ("TEMPLAR_QUERY_CACHE_CAPACITY", " 0 "),
        ],
        || Config::from_env().unwrap(),
    );

    assert_eq!(config.catalog_path, PathBuf::from("/srv/catalog.json"));
    assert_eq!(config.feedback_path, Some(PathBuf::from("/srv/feedback.json")));
    assert_eq!(config.embedding_api_key.as_deref(), Some("secret"));
    assert_eq!(config.similarity_threshold, 0.5);
    assert_eq!(config.max_top_matches, 3);
    assert_eq!(config.query_cache_capacity, 0);

    let engine = config.engine_config();
    assert_eq!(engine.matcher.max_top_matches, 3);
    assert_eq!(engine.weights.tau, 1000.0);
    assert_eq!(engine.stats_ttl, Duration::ZERO);

    let embedding = config.embedding_config();
    assert_eq!(embedding.model, "bge-large");
    assert_eq!(embedding.api_key.as_deref(), Some("secret"));
    assert_eq!(embedding.timeout, Duration::from_secs(3));
}

#[test]
#[serial]
fn test_blank_optional_vars_are_none() {
    let config = with_env_vars(
        &[
            ("TEMPLAR_FEEDBACK_PATH", "   "),
            ("TEMPLAR_EMBEDDING_API_KEY", ""),
        ],
        || Config::from_env().unwrap(),
    );

    assert!(config.feedback_path.is_none());
    assert!(config.embedding_api_key.is_none());
}

#[test]
#[serial]
fn test_invalid_number_is_error() {
    let result = with_env_vars(&[("TEMPLAR_MAX_TOP_MATCHES", "five")], Config::from_env);

    match result {
        Err(ConfigError::InvalidValue { name, value, .. }) => {
            assert_eq!(name, "TEMPLAR_MAX_TOP_MATCHES");
            assert_eq!(value, "five");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_invalid_float_is_error() {
    let result = with_env_vars(&[("TEMPLAR_WEIGHT_TAU", "fast")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_validate_missing_catalog() {
    let config = Config {
        catalog_path: PathBuf::from("/nonexistent/catalog.json"),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
fn test_validate_catalog_is_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::NotAFile { .. })));
}

#[test]
fn test_validate_ok_with_absent_feedback_file() {
    let catalog = catalog_file();
    let config = Config {
        catalog_path: catalog.path().to_path_buf(),
        feedback_path: Some(PathBuf::from("/nonexistent/feedback.json")),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_feedback_directory_rejected() {
    let catalog = catalog_file();
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        catalog_path: catalog.path().to_path_buf(),
        feedback_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::NotAFile { .. })));
}

#[test]
fn test_validate_rejects_bad_tunables() {
    let catalog = catalog_file();

    let config = Config {
        catalog_path: catalog.path().to_path_buf(),
        weight_tau: 0.0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Engine(_))));

    let config = Config {
        catalog_path: catalog.path().to_path_buf(),
        request_timeout_secs: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Embedding(_))));
}

#[test]
fn test_debug_redacts_api_key() {
    let config = Config {
        embedding_api_key: Some("super-secret".to_string()),
        ..Default::default()
    };
    assert!(!format!("{config:?}").contains("super-secret"));
}
