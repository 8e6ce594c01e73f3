//! Notification delivery job.
//!
//! The job only carries the id of a stored notification; the worker reloads
//! the row and delivers it if it is still pending, so a job that fires after
//! `jobs dispatch` already handled the row is a no-op.

use std::sync::Arc;

use apalis::prelude::Data;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::Dispatcher;

/// Notification job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub notification_id: Uuid,
}

impl NotificationJob {
    pub fn new(notification_id: Uuid) -> Self {
        Self { notification_id }
    }
}

/// Notification job handler - delivers one stored notification
pub async fn notification_job_handler(
    job: NotificationJob,
    dispatcher: Data<Arc<Dispatcher>>,
) -> Result<(), AppError> {
    tracing::info!(notification_id = %job.notification_id, "Processing notification job");

    match dispatcher.deliver_by_id(job.notification_id).await? {
        Some(notification) => {
            tracing::info!(
                notification_id = %notification.id,
                status = notification.status.as_str(),
                attempts = notification.attempts,
                "Notification job finished"
            );
        }
        None => {
            tracing::debug!(notification_id = %job.notification_id, "Notification already handled");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_payload_round_trips_as_json() {
        let job = NotificationJob::new(Uuid::new_v4());
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("notification_id"));
        assert_eq!(serde_json::from_str::<NotificationJob>(&json).unwrap(), job);
    }
}
