//! Headless server binary.
//!
//! Starts the axum web server and the session retention loop, then waits
//! for Ctrl+C.

use tracing_subscriber::EnvFilter;

use photobooth_lib::app::SharedState;
use photobooth_lib::{background, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting photobooth server");

    let (store, config) = photobooth_lib::init_foundation()?;
    let state = SharedState::new(store, config);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let retention_handle = tokio::spawn(background::session_retention_loop(
        state.clone(),
        background::PRUNE_INTERVAL,
    ));

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::error!("Server task ended abnormally: {e}");
    }
    if let Err(e) = retention_handle.await {
        tracing::error!("Retention task ended abnormally: {e}");
    }
    Ok(())
}
