//! Outbound message delivery.
//!
//! No provider is contacted: `LogSender` writes every message as a
//! structured tracing event and reports success, so the rest of the
//! notification pipeline (outbox rows, attempts, statuses) behaves exactly
//! as it would against a real provider.

use async_trait::async_trait;

use crate::domain::Channel;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A single message ready to leave the system
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
    pub html_body: Option<String>,
}

impl OutgoingMessage {
    pub fn email(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: Channel::Email,
            recipient: to.into(),
            subject: Some(subject.into()),
            body: body.into(),
            html_body: None,
        }
    }

    pub fn whatsapp(phone: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: Channel::WhatsApp,
            recipient: phone.into(),
            subject: None,
            body: body.into(),
            html_body: None,
        }
    }
}

/// Delivery channel abstraction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: OutgoingMessage) -> AppResult<()>;
}

/// Sender that logs instead of delivering
#[derive(Debug, Clone)]
pub struct LogSender {
    email_from: String,
}

impl LogSender {
    pub fn new(email_from: impl Into<String>) -> Self {
        Self {
            email_from: email_from.into(),
        }
    }
}

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, message: OutgoingMessage) -> AppResult<()> {
        check_recipient(&message)?;

        match message.channel {
            Channel::Email => {
                tracing::info!(
                    channel = "email",
                    from = %self.email_from,
                    to = %message.recipient,
                    subject = message.subject.as_deref().unwrap_or(""),
                    html = message.html_body.is_some(),
                    "Email delivered (simulated)"
                );
            }
            Channel::WhatsApp => {
                tracing::info!(
                    channel = "whatsapp",
                    to = %message.recipient,
                    length = message.body.chars().count(),
                    "WhatsApp message delivered (simulated)"
                );
            }
        }
        tracing::debug!(to = %message.recipient, body = %message.body, "Message body");

        Ok(())
    }
}

fn check_recipient(message: &OutgoingMessage) -> AppResult<()> {
    let recipient = message.recipient.trim();
    let valid = match message.channel {
        Channel::Email => recipient.contains('@'),
        Channel::WhatsApp => recipient.chars().filter(|c| c.is_ascii_digit()).count() >= 8,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Invalid {} recipient '{}'",
            message.channel.as_str(),
            message.recipient
        )))
    }
}
