//! Notifications: outbox rows, channel selection and message rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::client::Client;
use super::company::Company;
use super::payment::format_amount;
use crate::config::{
    DEFAULT_PHONE_COUNTRY_PREFIX, DEFAULT_REMINDER_HOURS, MAX_REMINDER_HOURS, MIN_REMINDER_HOURS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Confirmation,
    Reminder,
    Cancellation,
    Reschedule,
    Payment,
    Custom,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Cancellation => "cancellation",
            NotificationKind::Reschedule => "reschedule",
            NotificationKind::Payment => "payment",
            NotificationKind::Custom => "custom",
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(s: &str) -> Self {
        match s {
            "confirmation" => NotificationKind::Confirmation,
            "reminder" => NotificationKind::Reminder,
            "cancellation" => NotificationKind::Cancellation,
            "reschedule" => NotificationKind::Reschedule,
            "payment" => NotificationKind::Payment,
            _ => NotificationKind::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

impl From<&str> for Channel {
    fn from(s: &str) -> Self {
        match s {
            "whatsapp" => Channel::WhatsApp,
            _ => Channel::Email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    /// Claimed by a dispatcher, delivery in flight
    Sending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sending => "sending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl From<&str> for NotificationStatus {
    fn from(s: &str) -> Self {
        match s {
            "sending" => NotificationStatus::Sending,
            "sent" => NotificationStatus::Sent,
            "failed" => NotificationStatus::Failed,
            _ => NotificationStatus::Pending,
        }
    }
}

/// Persisted notification (outbox row and delivery log)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: NotificationStatus,
    pub attempts: i32,
    pub error_details: Option<String>,
    pub send_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }
}

/// Data for a new notification row
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub appointment_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub channel: Channel,
    pub recipient: String,
    pub subject: Option<String>,
    pub message: String,
    pub send_at: DateTime<Utc>,
}

impl NewNotification {
    /// Build the row for one channel of a rendered message.
    pub fn for_channel(
        appointment_id: Option<Uuid>,
        kind: NotificationKind,
        target: &ChannelTarget,
        message: &RenderedMessage,
        send_at: DateTime<Utc>,
    ) -> Self {
        let (subject, body) = match target.channel {
            Channel::Email => (Some(message.subject.clone()), message.email_body.clone()),
            Channel::WhatsApp => (None, message.whatsapp_body.clone()),
        };
        Self {
            appointment_id,
            kind,
            channel: target.channel,
            recipient: target.recipient.clone(),
            subject,
            message: body,
            send_at,
        }
    }
}

/// A channel and the address to use on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    pub channel: Channel,
    pub recipient: String,
}

/// Channels an appointment notification may use for this client.
///
/// A channel needs contact data, the company toggle, and the client opt-in.
pub fn channels_for(company: &Company, client: &Client) -> Vec<ChannelTarget> {
    let prefs = &client.notification_preferences;
    let mut targets = Vec::new();

    if let Some(email) = client.email.as_ref().filter(|e| !e.is_empty()) {
        if company.email_enabled && prefs.email_enabled {
            targets.push(ChannelTarget {
                channel: Channel::Email,
                recipient: email.clone(),
            });
        }
    }

    if !client.phone.is_empty() && company.whatsapp_enabled && prefs.whatsapp_enabled {
        targets.push(ChannelTarget {
            channel: Channel::WhatsApp,
            recipient: normalize_phone(&client.phone),
        });
    }

    targets
}

/// Numbers without a leading `+` lose `()- ` and get the country prefix.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }
    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-' | ' '))
        .collect();
    format!("{}{}", DEFAULT_PHONE_COUNTRY_PREFIX, digits)
}

/// Names and values a message template needs
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub company_name: String,
    pub company_address: Option<String>,
    pub client_name: String,
    pub professional_name: String,
    pub service_name: String,
    pub starts_at: DateTime<Utc>,
    pub total_cents: i64,
}

/// Subject plus per-channel bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub email_body: String,
    pub whatsapp_body: String,
}

impl MessageContext {
    fn when(&self) -> String {
        self.starts_at.format("%d/%m/%Y at %H:%M").to_string()
    }

    fn price(&self) -> String {
        format!("R$ {}", format_amount(self.total_cents))
    }

    fn details(&self) -> String {
        format!(
            "Date and time: {}\nProfessional: {}\nService: {}\nPrice: {}",
            self.when(),
            self.professional_name,
            self.service_name,
            self.price()
        )
    }

    pub fn render(&self, kind: NotificationKind, hours_before: Option<i64>) -> RenderedMessage {
        match kind {
            NotificationKind::Confirmation => RenderedMessage {
                subject: format!("Appointment confirmed - {}", self.company_name),
                email_body: format!(
                    "Hello {},\n\nYour appointment is confirmed.\n\n{}\n\nAddress:\n{}\n\nSee you soon,\n{}",
                    self.client_name,
                    self.details(),
                    self.company_address.as_deref().unwrap_or("Address not provided"),
                    self.company_name
                ),
                whatsapp_body: format!(
                    "*Appointment confirmed!*\n\nHello {}!\n\n{}\n\nSee you soon!",
                    self.client_name,
                    self.details()
                ),
            },
            NotificationKind::Reminder => {
                let lead = match hours_before {
                    Some(h) if h > 0 => format!("in {} hour{}", h, if h == 1 { "" } else { "s" }),
                    _ => "soon".to_string(),
                };
                RenderedMessage {
                    subject: format!("Reminder: your appointment is {} - {}", lead, self.company_name),
                    email_body: format!(
                        "Hello {},\n\nThis is a reminder of your appointment {}.\n\n{}\n\nIf you cannot attend, please let us know.\n\n{}",
                        self.client_name,
                        lead,
                        self.details(),
                        self.company_name
                    ),
                    whatsapp_body: format!(
                        "*Appointment reminder*\n\nHello {}! Your appointment is {}.\n\n{}",
                        self.client_name,
                        lead,
                        self.details()
                    ),
                }
            }
            NotificationKind::Cancellation => RenderedMessage {
                subject: format!("Appointment cancelled - {}", self.company_name),
                email_body: format!(
                    "Hello {},\n\nYour appointment on {} with {} was cancelled.\n\nBook a new time whenever you like.\n\n{}",
                    self.client_name,
                    self.when(),
                    self.professional_name,
                    self.company_name
                ),
                whatsapp_body: format!(
                    "*Appointment cancelled*\n\nHello {}, your appointment on {} was cancelled.",
                    self.client_name,
                    self.when()
                ),
            },
            NotificationKind::Reschedule => RenderedMessage {
                subject: format!("Appointment rescheduled - {}", self.company_name),
                email_body: format!(
                    "Hello {},\n\nYour appointment was moved.\n\n{}\n\n{}",
                    self.client_name,
                    self.details(),
                    self.company_name
                ),
                whatsapp_body: format!(
                    "*Appointment rescheduled*\n\nHello {}!\n\n{}",
                    self.client_name,
                    self.details()
                ),
            },
            NotificationKind::Payment => RenderedMessage {
                subject: format!("Payment received - {}", self.company_name),
                email_body: format!(
                    "Hello {},\n\nWe received your payment of {} for {} on {}.\n\nThank you,\n{}",
                    self.client_name,
                    self.price(),
                    self.service_name,
                    self.when(),
                    self.company_name
                ),
                whatsapp_body: format!(
                    "*Payment received*\n\nHello {}! We received {} for {} on {}.",
                    self.client_name,
                    self.price(),
                    self.service_name,
                    self.when()
                ),
            },
            NotificationKind::Custom => RenderedMessage {
                subject: self.company_name.clone(),
                email_body: String::new(),
                whatsapp_body: String::new(),
            },
        }
    }
}

/// Result of sending an appointment notification on every eligible channel
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationBatch {
    pub appointment_id: Uuid,
    pub notifications: Vec<Notification>,
    pub total_sent: usize,
}

impl NotificationBatch {
    pub fn new(appointment_id: Uuid, notifications: Vec<Notification>) -> Self {
        let total_sent = notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::Sent)
            .count();
        Self {
            appointment_id,
            notifications,
            total_sent,
        }
    }
}

/// Reminders queued by the scheduling endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScheduledReminders {
    pub reminders: Vec<Notification>,
    pub total_appointments: usize,
    pub total_reminders: usize,
}

/// Outbox counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct NotificationCounts {
    pub pending: u64,
    pub sent: u64,
    pub failed: u64,
}

/// Outcome of a dispatch sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

// =============================================================================
// Request payloads
// =============================================================================

fn default_hours_before() -> i64 {
    crate::config::DEFAULT_REMINDER_HOURS_BEFORE
}

fn default_reminder_offsets() -> Vec<i64> {
    DEFAULT_REMINDER_HOURS.to_vec()
}

fn validate_reminder_offsets(hours: &[i64]) -> Result<(), ValidationError> {
    if hours
        .iter()
        .all(|h| (MIN_REMINDER_HOURS..=MAX_REMINDER_HOURS).contains(h))
    {
        Ok(())
    } else {
        Err(ValidationError::new("range"))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendReminder {
    #[serde(default = "default_hours_before")]
    #[validate(range(
        min = MIN_REMINDER_HOURS,
        max = MAX_REMINDER_HOURS,
        message = "hours_before must be between 1 and 720"
    ))]
    #[schema(example = 24)]
    pub hours_before: i64,
}

impl Default for SendReminder {
    fn default() -> Self {
        Self {
            hours_before: default_hours_before(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub to: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    pub html_body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WhatsAppRequest {
    #[validate(length(min = 8, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleReminder {
    pub appointment_id: Uuid,
    pub send_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AutoReminders {
    pub company_id: Uuid,
    #[serde(default = "default_reminder_offsets")]
    #[validate(
        length(min = 1, message = "At least one reminder offset is required"),
        custom(
            function = "validate_reminder_offsets",
            message = "Every hours_before offset must be between 1 and 720"
        )
    )]
    #[schema(example = json!([24, 2]))]
    pub hours_before: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TestNotification {
    pub kind: Channel,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::{CreateClient, NotificationPreferences};
    use crate::domain::company::CreateCompany;
    use chrono::TimeZone;

    fn company(email_enabled: bool, whatsapp_enabled: bool) -> Company {
        let mut company = Company::create(
            CreateCompany {
                name: "Studio".to_string(),
                email: "studio@example.com".to_string(),
                phone: None,
                address: None,
                logo_url: None,
                primary_color: None,
                secondary_color: None,
                accent_color: None,
                opening_time: None,
                closing_time: None,
                working_days: None,
                plan: None,
                whatsapp_enabled: None,
                email_enabled: None,
                whatsapp_token: None,
            },
            Utc::now(),
        );
        company.email_enabled = email_enabled;
        company.whatsapp_enabled = whatsapp_enabled;
        company
    }

    fn client(email: Option<&str>, prefs: NotificationPreferences) -> Client {
        Client::create(
            Uuid::new_v4(),
            CreateClient {
                name: "Maria".to_string(),
                phone: "(11) 98765-4321".to_string(),
                email: email.map(str::to_string),
                document: None,
                birth_date: None,
                address: None,
                custom_fields: None,
                preferences: None,
                notes: None,
                notification_preferences: Some(prefs),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_reminder_offsets_bounded() {
        let request = |hours_before: Vec<i64>| AutoReminders {
            company_id: Uuid::new_v4(),
            hours_before,
        };
        assert!(request(vec![24, 2]).validate().is_ok());
        assert!(request(vec![1, 720]).validate().is_ok());
        assert!(request(vec![]).validate().is_err());
        assert!(request(vec![24, 0]).validate().is_err());
        assert!(request(vec![721]).validate().is_err());
        assert!(request(vec![i64::MAX]).validate().is_err());
        assert!(request(vec![i64::MIN]).validate().is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(11) 98765-4321"), "+5511987654321");
        assert_eq!(normalize_phone("+1 555 0100"), "+1 555 0100");
    }

    #[test]
    fn test_channels_need_all_three_conditions() {
        let prefs = NotificationPreferences::default();

        let both = channels_for(&company(true, true), &client(Some("m@example.com"), prefs.clone()));
        assert_eq!(both.len(), 2);
        assert_eq!(both[1].recipient, "+5511987654321");

        let no_email = channels_for(&company(true, true), &client(None, prefs.clone()));
        assert_eq!(no_email.len(), 1);
        assert_eq!(no_email[0].channel, Channel::WhatsApp);

        let company_off = channels_for(&company(false, false), &client(Some("m@example.com"), prefs));
        assert!(company_off.is_empty());

        let opted_out = NotificationPreferences {
            whatsapp_enabled: false,
            ..Default::default()
        };
        let only_email = channels_for(&company(true, true), &client(Some("m@example.com"), opted_out));
        assert_eq!(only_email.len(), 1);
        assert_eq!(only_email[0].channel, Channel::Email);
    }

    #[test]
    fn test_render_confirmation() {
        let ctx = MessageContext {
            company_name: "Studio".to_string(),
            company_address: None,
            client_name: "Maria".to_string(),
            professional_name: "Ana".to_string(),
            service_name: "Haircut".to_string(),
            starts_at: Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap(),
            total_cents: 5_000,
        };

        let message = ctx.render(NotificationKind::Confirmation, None);
        assert!(message.subject.contains("confirmed"));
        assert!(message.email_body.contains("04/03/2024 at 14:30"));
        assert!(message.email_body.contains("R$ 50.00"));
        assert!(message.email_body.contains("Address not provided"));
        assert!(message.whatsapp_body.contains("Ana"));

        let reminder = ctx.render(NotificationKind::Reminder, Some(2));
        assert!(reminder.subject.contains("in 2 hours"));
    }

    #[test]
    fn test_batch_counts_sent_rows() {
        let now = Utc::now();
        let row = |status| Notification {
            id: Uuid::new_v4(),
            appointment_id: None,
            kind: NotificationKind::Confirmation,
            channel: Channel::Email,
            recipient: "m@example.com".to_string(),
            subject: None,
            message: "hi".to_string(),
            status,
            attempts: 1,
            error_details: None,
            send_at: now,
            sent_at: None,
            created_at: now,
            updated_at: now,
        };

        let batch = NotificationBatch::new(
            Uuid::new_v4(),
            vec![row(NotificationStatus::Sent), row(NotificationStatus::Failed)],
        );
        assert_eq!(batch.total_sent, 1);
    }
}
