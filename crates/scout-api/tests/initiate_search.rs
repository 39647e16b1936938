//! End-to-end tests for the search-initiation endpoint.
//!
//! Requests are driven through the full router (middleware included) with
//! an injected dispatcher double, so these tests cover routing, validation,
//! dispatch wiring, response shaping, and CORS behavior together.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use scout_api::dispatcher::{StartedExecution, WorkflowDispatcher};
use scout_api::server::{Server, ServerBuilder};
use scout_core::{build_execution_name, Error, SearchExecutionRequest};

/// Records every dispatched request and returns a canned success.
#[derive(Default)]
struct RecordingDispatcher {
    calls: Mutex<Vec<(SearchExecutionRequest, Option<String>)>>,
}

impl RecordingDispatcher {
    fn calls(&self) -> Vec<(SearchExecutionRequest, Option<String>)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl WorkflowDispatcher for RecordingDispatcher {
    async fn start_execution(
        &self,
        request: &SearchExecutionRequest,
        trace_header: Option<&str>,
    ) -> Result<StartedExecution, Error> {
        self.calls
            .lock()
            .expect("lock")
            .push((request.clone(), trace_header.map(str::to_string)));
        let execution_name =
            build_execution_name("search-exec", &request.search_id, &request.user_id);
        Ok(StartedExecution {
            execution_arn: format!("arn:exec:{execution_name}"),
            execution_name,
            start_date: None,
        })
    }
}

/// Fails every dispatch with a workflow-start error.
struct FailingDispatcher;

#[async_trait]
impl WorkflowDispatcher for FailingDispatcher {
    async fn start_execution(
        &self,
        _request: &SearchExecutionRequest,
        _trace_header: Option<&str>,
    ) -> Result<StartedExecution, Error> {
        Err(Error::workflow_start(
            "connection refused to orchestrator at 10.0.0.7:8081",
        ))
    }
}

fn router_with(dispatcher: Arc<dyn WorkflowDispatcher>) -> Router {
    ServerBuilder::new().dispatcher(dispatcher).build().test_router()
}

fn post_search(event: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/searches")
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

#[tokio::test]
async fn direct_event_starts_execution() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(post_search(json!({
            "query": "find ml experts in rust",
            "userId": "user-123"
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["userId"], json!("user-123"));
    assert_eq!(body["query"], json!("find ml experts in rust"));
    assert_eq!(body["flags"]["hyde_provider"], json!("groq_llama"));
    assert_eq!(body["flags"]["fallback"], json!(false));
    assert_eq!(body["pipeline"], json!("search"));
    assert!(body["executionArn"]
        .as_str()
        .expect("arn")
        .starts_with("arn:exec:search-exec-"));

    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.user_id, "user-123");
}

#[tokio::test]
async fn malformed_json_body_gets_the_error_envelope() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/searches")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Request body must be valid JSON"));
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn gateway_event_missing_query_is_rejected() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(post_search(json!({
            "body": r#"{"userId": "user-123"}"#
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("query is required"));
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn base64_gateway_body_is_equivalent_to_plain() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let encoded = base64::engine::general_purpose::STANDARD
        .encode(r#"{"query": "encoded search", "userId": "user-b64"}"#);

    let response = router
        .oneshot(post_search(json!({
            "body": encoded,
            "isBase64Encoded": true
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["query"], json!("encoded search"));
    assert_eq!(body["userId"], json!("user-b64"));
}

#[tokio::test]
async fn authorizer_user_id_wins_over_body() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(post_search(json!({
            "body": r#"{"query": "q", "userId": "body-user"}"#,
            "requestContext": {"authorizer": {"userId": "auth-user"}}
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["userId"], json!("auth-user"));
}

#[tokio::test]
async fn preflight_returns_204_without_dispatching() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/searches")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response
        .headers()
        .get("access-control-allow-methods")
        .is_some());
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("read body");
    assert!(bytes.is_empty());
    assert!(dispatcher.calls().is_empty());
}

#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let router = router_with(Arc::new(RecordingDispatcher::default()));

    let response = router
        .oneshot(post_search(json!({"userId": "u1"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn dispatch_failure_returns_502_with_generic_message() {
    let router = router_with(Arc::new(FailingDispatcher));

    let response = router
        .oneshot(post_search(json!({"query": "q", "userId": "u1"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Failed to start search workflow"));
    assert_eq!(body["code"], json!("WORKFLOW_START_FAILED"));
    let serialized = body.to_string();
    assert!(!serialized.contains("10.0.0.7"));
}

#[tokio::test]
async fn trace_header_is_forwarded_to_the_dispatcher() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let mut request = post_search(json!({"query": "q", "userId": "u1"}));
    request.headers_mut().insert(
        "x-amzn-trace-id",
        axum::http::HeaderValue::from_static("Root=1-abc"),
    );

    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let calls = dispatcher.calls();
    assert_eq!(calls[0].1.as_deref(), Some("Root=1-abc"));
}

#[tokio::test]
async fn each_call_mints_a_distinct_search_id() {
    let dispatcher = Arc::new(RecordingDispatcher::default());

    for _ in 0..2 {
        let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);
        let response = router
            .oneshot(post_search(json!({"query": "q", "userId": "u1"})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].0.search_id, calls[1].0.search_id);
}

#[tokio::test]
async fn flag_overrides_are_merged_with_defaults() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let router = router_with(Arc::clone(&dispatcher) as Arc<dyn WorkflowDispatcher>);

    let response = router
        .oneshot(post_search(json!({
            "query": "q",
            "userId": "u1",
            "flags": {"reasoning": true, "experimental_rerank": "v2"}
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["flags"]["reasoning"], json!(true));
    assert_eq!(body["flags"]["hyde_provider"], json!("groq_llama"));
    assert_eq!(body["flags"]["experimental_rerank"], json!("v2"));
}

#[tokio::test]
async fn noop_dispatch_in_debug_mode_fabricates_local_handle() {
    // No dispatcher injected and no orchestrator URL configured.
    let router = Server::builder().build().test_router();

    let response = router
        .oneshot(post_search(json!({"query": "q", "userId": "u1"})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["executionArn"]
        .as_str()
        .expect("arn")
        .starts_with("local:execution:"));
}
