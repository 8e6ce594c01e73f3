//! Notification outbox repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use crate::domain::notification::NotificationCounts;
use crate::domain::{NewNotification, Notification, NotificationStatus};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Notification repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a `pending` row
    async fn create(&self, notification: NewNotification) -> AppResult<Notification>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Move a `pending` row to `sending` in one conditional update.
    ///
    /// Returns `false` when the row is no longer pending, so at most one
    /// dispatcher sends it.
    async fn claim(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Notification>;

    async fn mark_failed(&self, id: Uuid, error: String, at: DateTime<Utc>) -> AppResult<Notification>;

    /// Notification log of an appointment, newest first
    async fn list_for_appointment(&self, appointment_id: Uuid) -> AppResult<Vec<Notification>>;

    /// Pending rows due at `now`, oldest first
    async fn list_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<Notification>>;

    async fn count_by_status(&self) -> AppResult<NotificationCounts>;
}

/// SeaORM-backed notification repository
pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn record_attempt(
        &self,
        id: Uuid,
        status: NotificationStatus,
        error: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<Notification> {
        let model = NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .ok_or_not_found("Notification")?;

        let attempts = model.attempts + 1;
        let mut active: ActiveModel = model.into();
        active.status = Set(status.as_str().to_string());
        active.attempts = Set(attempts);
        active.error_details = Set(error);
        if status == NotificationStatus::Sent {
            active.sent_at = Set(Some(at));
        }
        active.updated_at = Set(at);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Notification::from(model))
    }

    async fn count_status(&self, status: NotificationStatus) -> AppResult<u64> {
        NotificationEntity::find()
            .filter(notification::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn create(&self, notification: NewNotification) -> AppResult<Notification> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            appointment_id: Set(notification.appointment_id),
            kind: Set(notification.kind.as_str().to_string()),
            channel: Set(notification.channel.as_str().to_string()),
            recipient: Set(notification.recipient),
            subject: Set(notification.subject),
            message: Set(notification.message),
            status: Set(NotificationStatus::Pending.as_str().to_string()),
            attempts: Set(0),
            error_details: Set(None),
            send_at: Set(notification.send_at),
            sent_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(Notification::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let result = NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Notification::from))
    }

    async fn claim(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = NotificationEntity::update_many()
            .col_expr(
                notification::Column::Status,
                Expr::value(NotificationStatus::Sending.as_str()),
            )
            .col_expr(notification::Column::UpdatedAt, Expr::value(at))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::Status.eq(NotificationStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_sent(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Notification> {
        self.record_attempt(id, NotificationStatus::Sent, None, at).await
    }

    async fn mark_failed(&self, id: Uuid, error: String, at: DateTime<Utc>) -> AppResult<Notification> {
        self.record_attempt(id, NotificationStatus::Failed, Some(error), at).await
    }

    async fn list_for_appointment(&self, appointment_id: Uuid) -> AppResult<Vec<Notification>> {
        let models = NotificationEntity::find()
            .filter(notification::Column::AppointmentId.eq(appointment_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Notification::from).collect())
    }

    async fn list_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<Notification>> {
        let models = NotificationEntity::find()
            .filter(notification::Column::Status.eq(NotificationStatus::Pending.as_str()))
            .filter(notification::Column::SendAt.lte(now))
            .order_by_asc(notification::Column::SendAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Notification::from).collect())
    }

    async fn count_by_status(&self) -> AppResult<NotificationCounts> {
        Ok(NotificationCounts {
            pending: self.count_status(NotificationStatus::Pending).await?,
            sent: self.count_status(NotificationStatus::Sent).await?,
            failed: self.count_status(NotificationStatus::Failed).await?,
        })
    }
}
