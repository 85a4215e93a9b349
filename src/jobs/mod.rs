//! Background jobs processed by the `jobs work` command.

mod notification_job;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::config::{Config, JOB_NAME_NOTIFICATION, JOB_POOL_CONNECTIONS};
use crate::errors::{AppError, AppResult};

pub use notification_job::{notification_job_handler, NotificationJob};

/// Open the notification queue, creating the apalis tables if needed.
pub async fn notification_storage(config: &Config) -> AppResult<PostgresStorage<NotificationJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(JOB_POOL_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new_with_config(
        pool,
        apalis_sql::Config::new(JOB_NAME_NOTIFICATION),
    ))
}
