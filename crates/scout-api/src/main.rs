//! scout-api server binary.

use anyhow::Context;

use scout_api::config::Config;
use scout_api::server::Server;
use scout_core::observability::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let format = if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    };
    init_logging(format);

    tracing::info!(
        http_port = config.http_port,
        debug = config.debug,
        orchestrator_configured = config.orchestrator_url.is_some(),
        "scout-api starting"
    );

    Server::new(config)
        .serve()
        .await
        .context("server exited with error")?;

    Ok(())
}
