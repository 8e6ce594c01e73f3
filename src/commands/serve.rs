//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, JobQueue, NotificationQueue};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    tracing::info!("Starting server...");

    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let db = Arc::new(db);
    tracing::info!("Database connected");

    let cache = Cache::connect_optional(config.redis_url.as_deref())
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?
        .map(Arc::new);
    if cache.is_some() {
        tracing::info!("Redis cache connected");
    }

    let queue = if config.job_queue_enabled {
        let queue = JobQueue::connect(&config.database_url).await?;
        Some(Arc::new(queue) as Arc<dyn NotificationQueue>)
    } else {
        tracing::info!("Job queue disabled; reminders wait for `jobs dispatch`");
        None
    };

    let app_state = AppState::from_config(db, cache, queue, &config);
    let app = create_router(app_state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
