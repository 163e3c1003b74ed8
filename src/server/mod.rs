//! Web server for the CTR prediction form and JSON API.

mod api;
mod error;
mod handlers;
pub mod render;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Start the server and block until ctrl+c
pub async fn run_server(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        "Server listening and ready to accept connections"
    );
    info!(url = %format!("http://{}", addr), "Prediction form available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let started_at = state.started_at;
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(started_at);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
