use anyhow::Context;
use tracing::info;

use coffees_api::app::{build_app, services};
use coffees_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coffees_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = services::build_services(&config)
        .await
        .context("failed to initialize stores")?;
    let backend = services.backend();

    let app = build_app(&config, services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, backend, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c; shutting down");
    }
}
