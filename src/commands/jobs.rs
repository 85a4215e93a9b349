//! Jobs command - Notification queue management.
//!
//! - `work`: Start the notification worker
//! - `list`: Show queued jobs by status
//! - `clear`: Remove failed jobs from the queue
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- jobs work
//! cargo run -- jobs list
//! cargo run -- jobs clear
//! ```

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement, Value};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_NOTIFICATION};
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Start the notification worker.
///
/// Processes jobs enqueued by the server until Ctrl+C.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;

    use crate::jobs::{notification_job_handler, notification_storage};

    tracing::info!("Connecting to job storage...");
    let storage = notification_storage(config).await?;

    tracing::info!("Notification worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new("notification-worker")
        .backend(storage)
        .build_fn(notification_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Notification worker stopped.");
    Ok(())
}

/// Queue connection, or `None` when the worker never created its tables.
async fn queue_connection(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    let db = Database::connect_without_migrations(config).await?;
    let connection = db.get_connection();

    let row = connection
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    let initialized = row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false);

    Ok(initialized.then_some(connection))
}

/// List notification jobs by status
async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Job queue not initialized. Run 'jobs work' first to create the queue tables.");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs \
             WHERE job_type = $1 GROUP BY status",
            [Value::from(JOB_NAME_NOTIFICATION)],
        ))
        .await?;

    let mut counts = [("Pending", 0i64), ("Running", 0), ("Failed", 0), ("Done", 0)];
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            if let Some(slot) = counts.iter_mut().find(|(name, _)| *name == status) {
                slot.1 = count;
            }
        }
    }

    println!("\n=== Notification Queue ===");
    for (name, count) in counts {
        println!("{:<9} {}", format!("{}:", name), count);
    }
    println!("==========================\n");

    Ok(())
}

/// Clear failed notification jobs
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed' AND job_type = $1",
            [Value::from(JOB_NAME_NOTIFICATION)],
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}
