//! Listener lifecycle.

use std::future::IntoFuture;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::{AppState, ServiceConfig, build_router};

/// Binds the configured address and serves until SIGINT.
///
/// On interrupt the process exits with status 0 straight away; in-flight
/// requests are dropped.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let app = build_router(AppState::from_config(&config));
    info!("Server running at http://{}/", listener.local_addr()?);

    tokio::select! {
        served = axum::serve(listener, app).into_future() => served.context("Server stopped unexpectedly"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for interrupt")?;
            info!("Interrupted");
            std::process::exit(0);
        }
    }
}
