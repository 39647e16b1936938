//! API server implementation.
//!
//! Wires configuration, the workflow dispatcher, and the HTTP routes into a
//! single router. CORS and request-id headers are attached to every
//! response, error paths included, so browser callers always receive a
//! diagnosable response.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use scout_core::{Error, Result};

use crate::config::Config;
use crate::dispatcher::{NoopDispatcher, OrchestratorClient, WorkflowDispatcher};

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
    /// Whether a real orchestrator client is configured.
    pub dispatcher_configured: bool,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
///
/// Constructed once at bootstrap and injected into every handler; read-only
/// afterwards, safe for concurrent reuse across invocations.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Workflow dispatcher.
    pub dispatcher: Arc<dyn WorkflowDispatcher>,
    /// Whether the dispatcher talks to a real orchestrator.
    pub dispatcher_is_remote: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("dispatcher", &"<WorkflowDispatcher>")
            .field("dispatcher_is_remote", &self.dispatcher_is_remote)
            .finish()
    }
}

impl AppState {
    /// Creates application state, building the dispatcher from config.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (dispatcher, dispatcher_is_remote): (Arc<dyn WorkflowDispatcher>, bool) =
            match config.orchestrator_url.as_deref() {
                Some(url) => (
                    Arc::new(OrchestratorClient::new(
                        url,
                        config.state_machine_arn.clone(),
                        config.execution_name_prefix.clone(),
                    )),
                    true,
                ),
                None => (
                    Arc::new(NoopDispatcher::new(config.execution_name_prefix.clone())),
                    false,
                ),
            };
        Self {
            config,
            dispatcher,
            dispatcher_is_remote,
        }
    }

    /// Creates application state with an explicit dispatcher (tests).
    #[must_use]
    pub fn with_dispatcher(config: Config, dispatcher: Arc<dyn WorkflowDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            dispatcher_is_remote: false,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler. Shallow; verifies nothing.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check endpoint handler.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ReadyResponse {
        ready: true,
        dispatcher_configured: state.dispatcher_is_remote,
    })
}

// ============================================================================
// Response Middleware
// ============================================================================

/// Attaches CORS headers to every response, error paths included.
///
/// Browser-originated callers must never see an opaque CORS failure in place
/// of an error envelope, so this runs as a response middleware rather than a
/// per-handler concern.
async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    let origin = HeaderValue::from_str(&state.config.cors.allowed_origin)
        .unwrap_or_else(|_| HeaderValue::from_static("*"));
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        origin,
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("Content-Type, Authorization, X-Amzn-Trace-Id"),
    );
    if let Ok(max_age) = HeaderValue::from_str(&state.config.cors.max_age_seconds.to_string()) {
        headers.insert(HeaderName::from_static("access-control-max-age"), max_age);
    }

    response
}

/// Generates a request ID when absent and echoes it on the response.
async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

// ============================================================================
// Server
// ============================================================================

/// The scout API server.
pub struct Server {
    state: Arc<AppState>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("state", &self.state).finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::clone(&self.state);

        let cors_layer = middleware::from_fn_with_state(Arc::clone(&state), cors_middleware);

        Router::new()
            .route("/health", get(health))
            .route("/ready", get(ready))
            .route(
                "/openapi.json",
                get(|| async { crate::openapi::openapi_json() }),
            )
            .nest("/api/v1", crate::routes::api_v1_routes())
            // Middleware (order matters): trace outermost, then request-id,
            // then CORS so its headers land on every produced response.
            .layer(cors_layer)
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the port cannot be
    /// bound.
    pub async fn serve(&self) -> Result<()> {
        self.validate_config()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.create_router();

        tracing::info!(
            http_port = self.state.config.http_port,
            dispatcher_configured = self.state.dispatcher_is_remote,
            "starting scout API server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal(format!("failed to bind to {addr}: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("server error: {e}")))?;

        Ok(())
    }

    /// Creates a test router without binding a port.
    #[doc(hidden)]
    #[must_use]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }

    fn validate_config(&self) -> Result<()> {
        if !self.state.config.debug && !self.state.dispatcher_is_remote {
            return Err(Error::configuration(
                "SCOUT_ORCHESTRATOR_URL is required when SCOUT_DEBUG=false",
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a server.
pub struct ServerBuilder {
    config: Config,
    dispatcher: Option<Arc<dyn WorkflowDispatcher>>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            config: Config::test_default(),
            dispatcher: None,
        }
    }
}

impl ServerBuilder {
    /// Creates a new server builder with a debug-mode default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Sets the CORS allowed origin.
    #[must_use]
    pub fn cors_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.cors.allowed_origin = origin.into();
        self
    }

    /// Sets the dispatcher used by handlers (tests inject doubles here).
    #[must_use]
    pub fn dispatcher(mut self, dispatcher: Arc<dyn WorkflowDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let state = match self.dispatcher {
            Some(dispatcher) => AppState::with_dispatcher(self.config, dispatcher),
            None => AppState::new(self.config),
        };
        Server {
            state: Arc::new(state),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
