//! Jobs command - Notification worker and outbox maintenance.
//!
//! - `work`: run the apalis worker that delivers scheduled notifications
//! - `list`: job queue and notification outbox counts
//! - `clear`: remove failed jobs from the queue
//! - `dispatch`: deliver every due pending notification right now
//!
//! ```bash
//! agenda-api jobs work
//! agenda-api jobs dispatch
//! ```

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_WORKER_NOTIFICATIONS};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, JobQueue, Persistence, UnitOfWork};
use crate::services::container::build_dispatcher;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    match args.action {
        JobsAction::Work => run_worker(&db, &config).await,
        JobsAction::List => list_jobs(&db).await,
        JobsAction::Clear => clear_failed_jobs(&db).await,
        JobsAction::Dispatch => dispatch_due(&db, &config).await,
    }
}

/// Start the notification worker until Ctrl+C.
async fn run_worker(db: &Database, config: &Config) -> AppResult<()> {
    use apalis::prelude::*;

    use crate::jobs::notification_job_handler;

    let queue = JobQueue::connect(&config.database_url).await?;
    let uow = Persistence::new(db.get_connection());
    let dispatcher = build_dispatcher(&uow, config);

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new(JOB_WORKER_NOTIFICATIONS)
        .data(dispatcher)
        .backend(queue.storage())
        .build_fn(notification_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker error");
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

async fn apalis_schema_exists(conn: &DatabaseConnection) -> AppResult<bool> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

/// Print job queue status and the notification outbox counts.
async fn list_jobs(db: &Database) -> AppResult<()> {
    let conn = db.get_connection();

    println!("\n=== Job Queue Status ===");
    if apalis_schema_exists(&conn).await? {
        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status",
            ))
            .await?;

        let (mut pending, mut running, mut failed, mut done) = (0i64, 0i64, 0i64, 0i64);
        for row in rows {
            if let (Ok(status), Ok(count)) = (
                row.try_get::<String>("", "status"),
                row.try_get::<i64>("", "count"),
            ) {
                match status.as_str() {
                    "Pending" => pending = count,
                    "Running" => running = count,
                    "Failed" => failed = count,
                    "Done" => done = count,
                    _ => {}
                }
            }
        }

        println!("Pending:  {}", pending);
        println!("Running:  {}", running);
        println!("Failed:   {}", failed);
        println!("Done:     {}", done);
    } else {
        println!("Job queue not initialized. Run 'jobs work' or 'serve' to create it.");
    }

    let counts = Persistence::new(conn).notifications().count_by_status().await?;
    println!("\n=== Notification Outbox ===");
    println!("Pending:  {}", counts.pending);
    println!("Sent:     {}", counts.sent);
    println!("Failed:   {}", counts.failed);
    println!("===========================\n");

    Ok(())
}

/// Clear failed jobs from the queue
async fn clear_failed_jobs(db: &Database) -> AppResult<()> {
    let conn = db.get_connection();

    if !apalis_schema_exists(&conn).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = conn
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'",
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}

/// Deliver pending notifications whose send time has passed.
async fn dispatch_due(db: &Database, config: &Config) -> AppResult<()> {
    let uow = Arc::new(Persistence::new(db.get_connection()));
    let dispatcher = build_dispatcher(uow.as_ref(), config);

    let report = dispatcher.deliver_due(Utc::now()).await?;
    tracing::info!(sent = report.sent, failed = report.failed, "Dispatch finished");
    println!("Dispatched: {} sent, {} failed", report.sent, report.failed);

    Ok(())
}
