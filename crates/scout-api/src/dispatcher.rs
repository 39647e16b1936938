//! Workflow dispatch: the start-execution call against the orchestrator.
//!
//! A single synchronous attempt, no retries. Any transport or service-side
//! rejection (including duplicate-execution-name conflicts) is surfaced as a
//! workflow-start error; a caller retry mints a fresh search id and thus a
//! fresh execution name, sidestepping the duplicate-name collision.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use scout_core::{build_execution_name, Error, SearchExecutionRequest};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifiers of a successfully started workflow execution.
///
/// `execution_name` is always the deterministically derived name, not the
/// service echo, so callers can correlate without re-deriving it.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartedExecution {
    /// Orchestrator-assigned execution identifier.
    pub execution_arn: String,
    /// Derived execution name.
    pub execution_name: String,
    /// Service-reported start time, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
}

/// Starts workflow executions for normalized search requests.
#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    /// Starts a new execution with the request as input.
    ///
    /// # Errors
    ///
    /// Returns a workflow-start error on any transport or service failure.
    async fn start_execution(
        &self,
        request: &SearchExecutionRequest,
        trace_header: Option<&str>,
    ) -> Result<StartedExecution, Error>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionCall<'a> {
    target_id: &'a str,
    execution_name: &'a str,
    input_payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_header: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionReply {
    execution_arn: String,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
}

/// HTTP client for the workflow orchestration service.
#[derive(Clone)]
pub struct OrchestratorClient {
    base_url: String,
    state_machine_arn: String,
    execution_name_prefix: String,
    client: reqwest::Client,
}

impl OrchestratorClient {
    /// Creates a new client targeting the given base URL.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        state_machine_arn: impl Into<String>,
        execution_name_prefix: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            state_machine_arn: state_machine_arn.into(),
            execution_name_prefix: execution_name_prefix.into(),
            client,
        }
    }

    fn start_execution_url(&self) -> String {
        format!("{}/v1/executions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WorkflowDispatcher for OrchestratorClient {
    async fn start_execution(
        &self,
        request: &SearchExecutionRequest,
        trace_header: Option<&str>,
    ) -> Result<StartedExecution, Error> {
        let execution_name = build_execution_name(
            &self.execution_name_prefix,
            &request.search_id,
            &request.user_id,
        );

        let call = StartExecutionCall {
            target_id: &self.state_machine_arn,
            execution_name: &execution_name,
            input_payload: request.to_execution_input(),
            trace_header,
        };

        let response = self
            .client
            .post(self.start_execution_url())
            .json(&call)
            .send()
            .await
            .map_err(|e| Error::workflow_start(format!("start-execution request failed: {e}")))?;

        if response.status().is_success() {
            let reply: StartExecutionReply = response.json().await.map_err(|e| {
                Error::workflow_start(format!("invalid start-execution response: {e}"))
            })?;
            return Ok(StartedExecution {
                execution_arn: reply.execution_arn,
                execution_name,
                start_date: reply.start_date,
            });
        }

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::workflow_start(format!("failed reading error body: {e}")))?;
        let message = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string());

        if status == StatusCode::CONFLICT {
            return Err(Error::workflow_start(format!(
                "duplicate execution name {execution_name}: {message}"
            )));
        }
        Err(Error::workflow_start(format!(
            "start-execution failed ({status}): {message}"
        )))
    }
}

/// Debug-only dispatcher that fabricates a local execution handle.
///
/// Used when no orchestrator URL is configured in debug mode; the request is
/// accepted and logged but no workflow is started.
#[derive(Debug, Clone)]
pub struct NoopDispatcher {
    execution_name_prefix: String,
}

impl NoopDispatcher {
    /// Creates a noop dispatcher deriving names with the given prefix.
    #[must_use]
    pub fn new(execution_name_prefix: impl Into<String>) -> Self {
        Self {
            execution_name_prefix: execution_name_prefix.into(),
        }
    }
}

#[async_trait]
impl WorkflowDispatcher for NoopDispatcher {
    async fn start_execution(
        &self,
        request: &SearchExecutionRequest,
        _trace_header: Option<&str>,
    ) -> Result<StartedExecution, Error> {
        let execution_name = build_execution_name(
            &self.execution_name_prefix,
            &request.search_id,
            &request.user_id,
        );
        tracing::warn!(
            search_id = %request.search_id,
            execution_name = %execution_name,
            "no orchestrator configured; workflow not started"
        );
        Ok(StartedExecution {
            execution_arn: format!("local:execution:{execution_name}"),
            execution_name,
            start_date: Some(Utc::now()),
        })
    }
}
