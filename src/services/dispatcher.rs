//! Delivery of stored notifications.
//!
//! Every outgoing message is first written to the outbox as `pending`. The
//! dispatcher claims the row (`pending` -> `sending`) before handing it to
//! the sender, so a job and a sweep racing for the same row send it once,
//! then records the outcome on the row.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::container::parallel;
use crate::config::{DISPATCH_BATCH_SIZE, DISPATCH_CONCURRENCY};
use crate::domain::notification::DispatchReport;
use crate::domain::{Notification, NotificationStatus};
use crate::errors::{AppResult, OptionExt};
use crate::infra::repositories::NotificationRepository;
use crate::infra::{NotificationSender, OutgoingMessage};

/// Sends outbox rows and records sent/failed status
pub struct Dispatcher {
    notifications: Arc<dyn NotificationRepository>,
    sender: Arc<dyn NotificationSender>,
}

impl Dispatcher {
    pub fn new(notifications: Arc<dyn NotificationRepository>, sender: Arc<dyn NotificationSender>) -> Self {
        Self { notifications, sender }
    }

    /// Deliver one row. A sender failure is recorded, not returned.
    ///
    /// When another worker claimed the row first, its current state is
    /// returned instead.
    pub async fn deliver(&self, notification: Notification) -> AppResult<Notification> {
        self.deliver_html(notification, None).await
    }

    /// Deliver an email row with an HTML alternative body.
    pub async fn deliver_html(&self, notification: Notification, html_body: Option<String>) -> AppResult<Notification> {
        let id = notification.id;
        match self.try_deliver(notification, html_body).await? {
            Some(delivered) => Ok(delivered),
            None => self
                .notifications
                .find_by_id(id)
                .await?
                .ok_or_not_found("Notification"),
        }
    }

    /// Deliver a row by id if it is still pending.
    pub async fn deliver_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        match self.notifications.find_by_id(id).await? {
            Some(notification) if notification.is_pending() => self.try_deliver(notification, None).await,
            _ => Ok(None),
        }
    }

    /// Deliver every pending row whose send time has passed.
    pub async fn deliver_due(&self, now: DateTime<Utc>) -> AppResult<DispatchReport> {
        let mut report = DispatchReport::default();

        loop {
            let due = self.notifications.list_due(now, DISPATCH_BATCH_SIZE).await?;
            let batch_len = due.len() as u64;

            let delivered = parallel::join_all_limited(
                due.into_iter().map(|notification| self.try_deliver(notification, None)),
                DISPATCH_CONCURRENCY,
            )
            .await?;

            for notification in delivered.into_iter().flatten() {
                match notification.status {
                    NotificationStatus::Sent => report.sent += 1,
                    _ => report.failed += 1,
                }
            }

            if batch_len < DISPATCH_BATCH_SIZE {
                break;
            }
        }

        tracing::info!(sent = report.sent, failed = report.failed, "Due notifications dispatched");
        Ok(report)
    }

    /// Claim, then send. `None` when the row was no longer pending.
    async fn try_deliver(&self, notification: Notification, html_body: Option<String>) -> AppResult<Option<Notification>> {
        if !self.notifications.claim(notification.id, Utc::now()).await? {
            tracing::debug!(notification_id = %notification.id, "Notification already claimed");
            return Ok(None);
        }
        self.send_and_record(notification, html_body).await.map(Some)
    }

    async fn send_and_record(&self, notification: Notification, html_body: Option<String>) -> AppResult<Notification> {
        let message = OutgoingMessage {
            channel: notification.channel,
            recipient: notification.recipient.clone(),
            subject: notification.subject.clone(),
            body: notification.message.clone(),
            html_body,
        };

        match self.sender.send(message).await {
            Ok(()) => self.notifications.mark_sent(notification.id, Utc::now()).await,
            Err(e) => {
                tracing::warn!(
                    notification_id = %notification.id,
                    channel = notification.channel.as_str(),
                    error = %e,
                    "Notification delivery failed"
                );
                self.notifications
                    .mark_failed(notification.id, e.to_string(), Utc::now())
                    .await
            }
        }
    }
}
