//! Memories Server
//!
//! Serves the memory feed, the admin panel and uploaded photos.

use std::time::Duration;

use anyhow::Context;
use memories_server::{AppState, ServerConfig, create_app, init_tracing};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

/// How often expired sessions are purged.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.log_level, config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        admin_user = %config.auth.admin_user,
        persistent = config.database_url.is_some(),
        upload_dir = %config.upload_dir.display(),
        "Starting Memories Server"
    );

    let state = AppState::new(config.clone())
        .await
        .context("Failed to initialize application state")?;

    // Purge expired sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match cleanup_state.sessions.cleanup_expired().await {
                Ok(0) => {}
                Ok(count) => info!(count, "Cleaned up expired sessions"),
                Err(e) => error!(error = %e, "Session cleanup failed"),
            }
        }
    });

    let app = create_app(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
