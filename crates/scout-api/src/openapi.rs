//! OpenAPI documentation.

use axum::response::IntoResponse;
use axum::Json;
use utoipa::OpenApi;

use crate::dispatcher::StartedExecution;
use crate::error::ApiErrorBody;
use crate::routes::searches::InitiateSearchResponse;
use scout_core::SearchFlags;

/// OpenAPI specification for the scout API.
#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::searches::initiate_search),
    components(schemas(
        ApiErrorBody,
        InitiateSearchResponse,
        SearchFlags,
        StartedExecution,
    )),
    tags(
        (name = "searches", description = "Search workflow initiation")
    ),
    info(
        title = "scout-api",
        description = "Search initiation service: validates inbound search requests and dispatches workflow executions",
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document as JSON.
pub fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
