use super::*;

fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

fn put_cache_headers(headers: &mut HeaderMap, ttl: Duration, etag: &str) {
    if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", ttl.as_secs())) {
        headers.insert("cache-control", value);
    }
    if let Ok(value) = HeaderValue::from_str(etag) {
        headers.insert("etag", value);
    }
}

/// Serializes a read-endpoint payload with ETag revalidation: a matching
/// `If-None-Match` short-circuits to 304.
fn cacheable_json(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
    payload: &serde_json::Value,
) -> Response {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    let etag = format!("\"{}\"", sha256_hex(&bytes));
    if if_none_match(headers).as_deref() == Some(etag.as_str()) {
        let mut resp = StatusCode::NOT_MODIFIED.into_response();
        put_cache_headers(resp.headers_mut(), state.read_ttl, &etag);
        return with_request_id(resp, request_id);
    }
    let mut resp = (
        StatusCode::OK,
        [("content-type", "application/json")],
        bytes,
    )
        .into_response();
    put_cache_headers(resp.headers_mut(), state.read_ttl, &etag);
    with_request_id(resp, request_id)
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn version_handler() -> impl IntoResponse {
    let payload = json!({
        "name": "coursemap",
        "version": env!("CARGO_PKG_VERSION"),
        "crate": CRATE_NAME,
    });
    let mut response = Json(payload).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=30") {
        response.headers_mut().insert("cache-control", value);
    }
    response
}

pub(crate) async fn courses_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    axum::extract::Query(params): axum::extract::Query<HashMap<String, String>>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/courses", "request start");

    let parse_map: std::collections::BTreeMap<String, String> =
        params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let query = parse_course_query(&parse_map);

    let records = {
        let conn = state.store.connection().await;
        query_courses(&conn, &query)
    };
    let records = match records {
        Ok(v) => v,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "course query failed");
            let resp = api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Failed to fetch courses"),
            );
            return with_request_id(resp, &request_id);
        }
    };

    let payload = serde_json::to_value(&records).unwrap_or_else(|_| json!([]));
    let resp = cacheable_json(&state, &headers, &request_id, &payload);
    info!(request_id = %request_id, rows = records.len(), "request complete");
    resp
}

pub(crate) async fn filters_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/filters", "request start");

    let options = {
        let conn = state.store.connection().await;
        compute_filter_options(&conn)
    };
    match options {
        Ok(options) => {
            let payload = serde_json::to_value(&options).unwrap_or_else(|_| json!({}));
            cacheable_json(&state, &headers, &request_id, &payload)
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "facet query failed");
            let resp = api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Failed to fetch filters"),
            );
            with_request_id(resp, &request_id)
        }
    }
}

pub(crate) async fn stats_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    let stats = {
        let conn = state.store.connection().await;
        compute_stats(&conn)
    };
    match stats {
        Ok(stats) => with_request_id(Json(stats).into_response(), &request_id),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "stats query failed");
            let resp = api_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Failed to fetch stats"),
            );
            with_request_id(resp, &request_id)
        }
    }
}

/// Full dataset replace. The spreadsheet is decoded and normalized before the
/// store is touched, and the store applies delete+insert in one transaction,
/// so a failed upload leaves the previous record set authoritative.
pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/admin/upload", "request start");

    let mut file_bytes: Option<Vec<u8>> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    match field.bytes().await {
                        Ok(bytes) => {
                            file_bytes = Some(bytes.to_vec());
                            break;
                        }
                        Err(e) => {
                            let resp = api_error_response(
                                StatusCode::BAD_REQUEST,
                                ApiError::upload_parse_failed(&e.to_string()),
                            );
                            return with_request_id(resp, &request_id);
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                let resp = api_error_response(
                    StatusCode::BAD_REQUEST,
                    ApiError::upload_parse_failed(&e.to_string()),
                );
                return with_request_id(resp, &request_id);
            }
        }
    }
    let Some(file_bytes) = file_bytes else {
        let resp = api_error_response(StatusCode::BAD_REQUEST, ApiError::missing_upload_file());
        return with_request_id(resp, &request_id);
    };

    let outcome = match ingest_bytes(&file_bytes) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "upload rejected before replace");
            let resp = api_error_response(
                StatusCode::BAD_REQUEST,
                ApiError::upload_parse_failed(&e.to_string()),
            );
            return with_request_id(resp, &request_id);
        }
    };

    if let Err(e) = state.store.replace_all(&outcome.records).await {
        error!(request_id = %request_id, error = %e, "record set replace failed");
        let resp = api_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::store_unavailable(&e.to_string()),
        );
        return with_request_id(resp, &request_id);
    }

    let total = outcome.total();
    info!(request_id = %request_id, imported = total, "upload complete");
    let body = UploadResponseDto::imported(outcome.preview().to_vec(), total);
    with_request_id(Json(body).into_response(), &request_id)
}
