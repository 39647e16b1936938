//! Server configuration.
//!
//! All settings come from `SCOUT_`-prefixed environment variables; this is
//! the canonical runtime configuration path for containerized deployments.
//! Blank values are treated as unset.

use serde::{Deserialize, Serialize};

use scout_core::{Error, Result};

/// Default execution-name prefix.
const DEFAULT_EXECUTION_NAME_PREFIX: &str = "search-exec";

/// Default language-model provider identifier for flag defaults.
const DEFAULT_PROVIDER: &str = "groq_llama";

/// CORS configuration for browser-based callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origin echoed on every response. `"*"` allows all origins.
    pub allowed_origin: String,
    /// Max age for preflight caching (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            max_age_seconds: 3600,
        }
    }
}

/// Configuration for the scout API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode (pretty logs; orchestrator URL optional).
    pub debug: bool,

    /// Identifier of the target workflow state machine. Mandatory.
    pub state_machine_arn: String,

    /// Prefix for derived execution names.
    pub execution_name_prefix: String,

    /// Provider identifier used for defaulted pipeline flags.
    pub default_provider: String,

    /// Base URL of the workflow orchestration service
    /// (e.g., `http://orchestrator:8081`). Required when `debug` is false.
    pub orchestrator_url: Option<String>,

    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `SCOUT_STATE_MACHINE_ARN` (required)
    /// - `SCOUT_EXECUTION_NAME_PREFIX` (default `search-exec`)
    /// - `SCOUT_DEFAULT_PROVIDER` (default `groq_llama`)
    /// - `SCOUT_ORCHESTRATOR_URL`
    /// - `SCOUT_CORS_ALLOWED_ORIGIN` (default `*`)
    /// - `SCOUT_CORS_MAX_AGE_SECONDS` (default 3600)
    /// - `SCOUT_HTTP_PORT` (default 8080)
    /// - `SCOUT_DEBUG` (default false)
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the state-machine identifier is
    /// absent or an env var is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            http_port: 8080,
            debug: false,
            state_machine_arn: require_state_machine_arn(env_string("SCOUT_STATE_MACHINE_ARN"))?,
            execution_name_prefix: DEFAULT_EXECUTION_NAME_PREFIX.to_string(),
            default_provider: DEFAULT_PROVIDER.to_string(),
            orchestrator_url: env_string("SCOUT_ORCHESTRATOR_URL"),
            cors: CorsConfig::default(),
        };

        if let Some(port) = env_u16("SCOUT_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("SCOUT_DEBUG")? {
            config.debug = debug;
        }
        if let Some(prefix) = env_string("SCOUT_EXECUTION_NAME_PREFIX") {
            config.execution_name_prefix = prefix;
        }
        if let Some(provider) = env_string("SCOUT_DEFAULT_PROVIDER") {
            config.default_provider = provider;
        }
        if let Some(origin) = env_string("SCOUT_CORS_ALLOWED_ORIGIN") {
            config.cors.allowed_origin = origin;
        }
        if let Some(max_age) = env_u64("SCOUT_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        Ok(config)
    }

    /// A minimal valid configuration used by the server builder and tests.
    #[must_use]
    pub fn test_default() -> Self {
        Self {
            http_port: 8080,
            debug: true,
            state_machine_arn: "arn:aws:states:test:0:stateMachine:search".to_string(),
            execution_name_prefix: DEFAULT_EXECUTION_NAME_PREFIX.to_string(),
            default_provider: DEFAULT_PROVIDER.to_string(),
            orchestrator_url: None,
            cors: CorsConfig::default(),
        }
    }
}

/// Validates the mandatory state-machine identifier.
fn require_state_machine_arn(value: Option<String>) -> Result<String> {
    value.ok_or_else(|| {
        Error::configuration("SCOUT_STATE_MACHINE_ARN environment variable is required")
    })
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::configuration(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::configuration(format!("{name} must be a u64: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::configuration(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}
