//! ws-relay server binary.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ws_relay::adapters::http::RelayServer;
use ws_relay::adapters::observability::TracingSessionObserver;
use ws_relay::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;

    init_tracing(&config);

    info!(
        host = %config.server.host,
        port = config.server.port,
        environment = ?config.server.environment,
        path = %config.websocket.path,
        allowed_origin = %config.websocket.allowed_origin,
        max_message_size = config.websocket.max_message_size,
        idle_timeout_secs = ?config.websocket.idle_timeout_secs,
        max_connections = ?config.websocket.max_connections,
        "Starting ws-relay"
    );

    let server = RelayServer::bind(&config, Arc::new(TracingSessionObserver)).await?;
    info!(address = %server.local_addr()?, "Server listening");

    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured filter.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
