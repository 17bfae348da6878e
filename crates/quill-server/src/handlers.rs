//! HTTP request handlers for the log API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use quill_auth::AUTHORIZATION_HEADER;
use quill_logs::{LogRecord, QueryParams};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::service::IngestRequest;
use crate::state::AppState;

/// Header naming the tenant on ingest requests.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Acknowledgement body for a stored record.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Handle GET /health - liveness probe, no credentials required.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Handle POST /logdata - store one log record.
pub async fn ingest_log(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let authorization = header_string(&headers, AUTHORIZATION_HEADER);
    let tenant = header_string(&headers, TENANT_HEADER);
    let service = state.service();

    tokio::task::spawn_blocking(move || {
        service.ingest(&IngestRequest {
            authorization: authorization.as_deref(),
            tenant_header: tenant.as_deref(),
            body: &body,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ingest task failed: {e}")))??;

    Ok(Json(MessageResponse {
        message: "log data saved successfully".to_string(),
    }))
}

/// Handle GET /getdata - filtered, paginated records for one tenant.
pub async fn retrieve_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> ApiResult<Json<Vec<LogRecord>>> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let authorization = header_string(&headers, AUTHORIZATION_HEADER);
    let service = state.service();

    let records = tokio::task::spawn_blocking(move || {
        service.retrieve(authorization.as_deref(), &params)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("retrieve task failed: {e}")))??;

    Ok(Json(records))
}

/// Fallback for unsupported methods on the log endpoints.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
