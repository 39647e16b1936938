//! Search initiation route.
//!
//! ## Routes
//!
//! - `POST    /searches` - Validate the inbound event and start a workflow execution
//! - `OPTIONS /searches` - CORS preflight short-circuit (204, no dispatch)

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument as _;
use utoipa::ToSchema;

use scout_core::event::TRACE_HEADER;
use scout_core::{parse_event, SearchFlags};

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// Discriminator identifying this initiation endpoint's pipeline.
const PIPELINE: &str = "search";

/// Successful initiation response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSearchResponse {
    /// Always `true` for success responses.
    pub success: bool,
    /// Generated search identifier for tracking.
    pub search_id: String,
    /// Resolved user identifier.
    pub user_id: String,
    /// The search text, as validated.
    pub query: String,
    /// Merged pipeline flags.
    pub flags: SearchFlags,
    /// Orchestrator-assigned execution identifier.
    pub execution_arn: String,
    /// Derived execution name.
    pub execution_name: String,
    /// Service-reported execution start time, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Time the request was accepted, UTC.
    pub initiated_at: DateTime<Utc>,
    /// Pipeline discriminator.
    pub pipeline: &'static str,
}

/// Registers search routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/searches", post(initiate_search).options(preflight))
}

/// Initiates a search workflow execution.
///
/// Accepts both gateway-wrapped and direct event shapes; see `scout-core`.
#[utoipa::path(
    post,
    path = "/api/v1/searches",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Search workflow started", body = InitiateSearchResponse),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorBody),
        (status = 502, description = "Workflow dispatch failed", body = crate::error::ApiErrorBody),
        (status = 500, description = "Internal error", body = crate::error::ApiErrorBody),
    ),
    tag = "searches",
)]
pub(crate) async fn initiate_search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    // Decoded by hand so malformed bodies get the standard error envelope
    // instead of the framework's plain-text rejection.
    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Request body must be valid JSON"))?;

    let request = parse_event(&event, &state.config.default_provider)?;

    tracing::info!(
        search_id = %request.search_id,
        user_id = %request.user_id,
        query = %request.query,
        "initiating search"
    );

    let trace_header = trace_header_from_http(&headers)
        .or_else(|| embedded_trace_header(&event));

    let started = state
        .dispatcher
        .start_execution(&request, trace_header.as_deref())
        .instrument(scout_core::observability::search_span(
            "start_execution",
            &request.search_id,
            &request.user_id,
        ))
        .await?;

    tracing::info!(
        search_id = %request.search_id,
        execution_arn = %started.execution_arn,
        "workflow execution started"
    );

    Ok(Json(InitiateSearchResponse {
        success: true,
        search_id: request.search_id,
        user_id: request.user_id,
        query: request.query,
        flags: request.flags,
        execution_arn: started.execution_arn,
        execution_name: started.execution_name,
        start_date: started.start_date,
        initiated_at: request.initiated_at,
        pipeline: PIPELINE,
    }))
}

/// CORS preflight: 204 with no body, before any normalization or dispatch.
pub(crate) async fn preflight() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

fn trace_header_from_http(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Gateway-wrapped events may carry the trace header inside the event body
/// rather than on the HTTP request itself.
fn embedded_trace_header(event: &serde_json::Value) -> Option<String> {
    scout_core::SearchEvent::from_value(event)
        .ok()
        .and_then(|parsed| parsed.trace_header().map(str::to_string))
}
