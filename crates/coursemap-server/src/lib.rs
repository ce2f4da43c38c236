#![forbid(unsafe_code)]

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use coursemap_api::{parse_course_query, ApiError, UploadResponseDto};
use coursemap_ingest::ingest_bytes;
use coursemap_query::{compute_filter_options, compute_stats, query_courses};
use coursemap_store::CourseStore;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod http_handlers;

pub const CRATE_NAME: &str = "coursemap-server";

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CourseStore>,
    pub read_ttl: Duration,
    pub max_upload_bytes: usize,
    request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<CourseStore>) -> Self {
        Self {
            store,
            read_ttl: Duration::from_secs(30),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/courses", get(http_handlers::courses_handler))
        .route("/filters", get(http_handlers::filters_handler))
        .route("/stats", get(http_handlers::stats_handler))
        .route("/admin/upload", post(http_handlers::upload_handler))
        .route("/healthz", get(http_handlers::healthz_handler))
        .route("/version", get(http_handlers::version_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
