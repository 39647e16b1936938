//! Structured logging setup and span helpers.
//!
//! Initialization is guarded by `Once` so concurrent or repeated calls are
//! harmless; format selection (JSON vs pretty) is decided by the binary.

use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (production).
    Json,
    /// Pretty-printed logs (development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at startup; subsequent calls are no-ops. `RUST_LOG` controls
/// levels and defaults to `info`.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for search-initiation operations with standard fields.
#[must_use]
pub fn search_span(operation: &str, search_id: &str, user_id: &str) -> Span {
    tracing::info_span!(
        "search",
        op = operation,
        search_id = search_id,
        user_id = user_id,
    )
}
