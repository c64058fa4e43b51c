pub mod router;
pub mod state;

use crate::config::WorkbenchConfig;
use crate::error::{Result, WorkbenchError};

/// Start the HTTP server with the given configuration.
pub async fn start(config: WorkbenchConfig) -> Result<()> {
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir).map_err(|e| {
        WorkbenchError::Config(format!(
            "Failed to create data directory {}: {}",
            config.data_dir.display(),
            e
        ))
    })?;

    let bind_addr = config.bind_address();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        local_model = %config.local_model,
        proxied_model = %config.proxied_model,
        "Initialized workbench"
    );

    let app_state = state::AppState::from_config(config)?;
    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| WorkbenchError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WorkbenchError::Server(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
