//! Templar line-oriented classifier.
//!
//! Reads one request per line from stdin and writes one JSON object per line
//! to stdout. A line is either plain query text (classified) or a JSON request:
//!
//! ```text
//! {"op": "classify", "query": "..."}
//! {"op": "search", "query": "...", "category": "...", "subcategory": "...", "top_k": 3}
//! {"op": "refresh"}
//! ```

use std::sync::Arc;

use mimalloc::MiMalloc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;

use templar::config::Config;
use templar::embedding::OpenAiEmbeddingProvider;
use templar::engine::{MatchingEngine, SearchOptions};
use templar::store::JsonFileStore;
use templar::SegmentKey;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

type Engine = MatchingEngine<JsonFileStore, JsonFileStore>;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Classify {
        query: String,
    },
    Search {
        query: String,
        category: Option<String>,
        subcategory: Option<String>,
        products: Option<Vec<String>>,
        top_k: Option<usize>,
    },
    Refresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        catalog = %config.catalog_path.display(),
        feedback = ?config.feedback_path,
        model = %config.embedding_model,
        "Templar starting"
    );

    let mut store = JsonFileStore::new(config.catalog_path.clone());
    if let Some(path) = &config.feedback_path {
        store = store.with_feedback(path.clone());
    }
    let provider = Arc::new(OpenAiEmbeddingProvider::new(config.embedding_config())?);
    let engine: Engine =
        MatchingEngine::new(store.clone(), store, provider, config.engine_config())?;

    // a broken catalog at startup is fatal
    let report = engine.refresh_caches().await?;
    tracing::info!(
        templates = report.templates,
        dim = report.dim,
        "Ready, reading queries from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(&engine, line).await;
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("Templar shutdown complete");
    Ok(())
}

async fn handle_line(engine: &Engine, line: &str) -> Value {
    let request = if line.starts_with('{') {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(e) => return json!({ "error": format!("invalid request: {e}") }),
        }
    } else {
        Request::Classify {
            query: line.to_string(),
        }
    };

    match request {
        Request::Classify { query } => {
            json!(engine.classify_query(&query).await)
        }
        Request::Search {
            query,
            category,
            subcategory,
            products,
            top_k,
        } => {
            let mut options = SearchOptions::default();
            if let (Some(category), Some(subcategory)) = (category, subcategory) {
                options = options.segment(SegmentKey::new(category, subcategory));
            }
            options.products = products;
            if let Some(top_k) = top_k {
                options = options.top_k(top_k);
            }
            match engine.search(&query, options).await {
                Ok(hits) => json!({ "results": hits }),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        Request::Refresh => match engine.refresh_caches().await {
            Ok(report) => json!({
                "refreshed": true,
                "generation": report.generation,
                "templates": report.templates,
                "changed": report.changed,
            }),
            Err(e) => {
                tracing::error!(error = %e, "Refresh failed");
                json!({ "refreshed": false, "error": e.to_string() })
            }
        },
    }
}
