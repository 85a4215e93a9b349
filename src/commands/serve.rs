//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::notification_storage;
use crate::services::{EventDispatcher, JobNotifier, LogNotifier, Notifier};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Initialize database (runs pending migrations)
    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    // Initialize Redis cache
    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let notifier = build_notifier(&config).await?;
    let dispatcher = EventDispatcher::new(notifier);

    // Create application state with centralized service container
    let addr = config.server_addr();
    let app_state = AppState::from_config(db, Some(Arc::new(cache)), config, dispatcher);

    // Build router
    let app = create_router(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Queue-backed notifier when enabled, log output otherwise.
async fn build_notifier(config: &Config) -> AppResult<Arc<dyn Notifier>> {
    if !config.notification_queue {
        tracing::info!("Notification queue disabled, notifications go to the log");
        return Ok(Arc::new(LogNotifier));
    }

    let storage = notification_storage(config).await?;
    tracing::info!("Notifications are queued for the background worker");
    Ok(Arc::new(JobNotifier::new(storage)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
