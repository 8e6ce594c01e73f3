//! Background job queue backed by apalis' Postgres storage.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use apalis_sql::sqlx::PgPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::JOB_POOL_MAX_CONNECTIONS;
use crate::errors::{AppError, AppResult};
use crate::jobs::NotificationJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Deferred delivery of stored notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Deliver notification `notification_id` at `send_at`.
    async fn schedule(&self, notification_id: Uuid, send_at: DateTime<Utc>) -> AppResult<()>;
}

/// Open the job pool and make sure the apalis tables exist.
pub async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(JOB_POOL_MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(pool)
}

/// apalis-backed notification queue
#[derive(Clone)]
pub struct JobQueue {
    storage: PostgresStorage<NotificationJob>,
}

impl JobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self {
            storage: PostgresStorage::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = connect_pool(database_url).await?;
        tracing::info!("Notification job queue ready");
        Ok(Self::new(pool))
    }

    pub fn storage(&self) -> PostgresStorage<NotificationJob> {
        self.storage.clone()
    }
}

#[async_trait]
impl NotificationQueue for JobQueue {
    async fn schedule(&self, notification_id: Uuid, send_at: DateTime<Utc>) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .schedule(NotificationJob::new(notification_id), send_at.timestamp())
            .await
            .map_err(|e| AppError::internal(format!("Failed to schedule job: {}", e)))?;

        tracing::debug!(%notification_id, %send_at, "Notification job scheduled");
        Ok(())
    }
}
