#![forbid(unsafe_code)]

use coursemap_ingest::ingest_bytes;
use coursemap_server::{build_router, AppState, DEFAULT_MAX_UPLOAD_BYTES};
use coursemap_store::CourseStore;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = env_str("COURSEMAP_DB", "courses.db");
    let store = if db_path == ":memory:" {
        CourseStore::open_in_memory()
    } else {
        CourseStore::open(&PathBuf::from(&db_path))
    };
    let store = match store {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(db = %db_path, error = %e, "failed to open course store");
            std::process::exit(1);
        }
    };

    if let Err(e) = seed_if_empty(&store).await {
        error!(error = %e, "startup seed failed");
        std::process::exit(1);
    }

    let mut state = AppState::new(Arc::clone(&store));
    state.max_upload_bytes = env_usize("COURSEMAP_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);

    let addr = env_str("COURSEMAP_ADDR", "127.0.0.1:8080");
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(%addr, db = %db_path, "coursemap server listening");

    if let Err(e) = axum::serve(listener, build_router(state)).await {
        error!(error = %e, "server terminated");
        std::process::exit(1);
    }
}

/// Loads the bundled dataset into an empty store. `COURSEMAP_SEED_PATH` may
/// point at a spreadsheet or a JSON export; a non-empty store is left alone
/// so a restart never clobbers an uploaded catalog.
async fn seed_if_empty(store: &Arc<CourseStore>) -> Result<(), String> {
    let Ok(seed_path) = env::var("COURSEMAP_SEED_PATH") else {
        return Ok(());
    };
    let existing = store.count().await.map_err(|e| e.to_string())?;
    if existing > 0 {
        info!(records = existing, "store already populated; skipping seed");
        return Ok(());
    }
    let bytes = std::fs::read(&seed_path)
        .map_err(|e| format!("cannot read seed file {seed_path}: {e}"))?;
    let outcome = ingest_bytes(&bytes).map_err(|e| e.to_string())?;
    let imported = store
        .replace_all(&outcome.records)
        .await
        .map_err(|e| e.to_string())?;
    info!(seed = %seed_path, imported, "seeded course catalog");
    Ok(())
}
