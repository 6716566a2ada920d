mod routes;
mod state;

use anyhow::Result;
use eventboard_core::config::EventBoardConfig;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = EventBoardConfig::load()?;
    info!(
        events_path = %config.events_path().display(),
        dimensions = config.dimensions.len(),
        port = config.server_port,
        "configuration loaded"
    );

    let state = AppState::load(&config)?;
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    info!(%addr, "eventboard-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
