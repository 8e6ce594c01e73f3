//! Client entity, notification preferences and history view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::appointment::Appointment;
use super::patterns::PHONE;
use crate::config::DEFAULT_REMINDER_HOURS;

/// Per-client notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email_enabled: bool,
    pub whatsapp_enabled: bool,
    /// Hours before an appointment when reminders go out
    #[schema(example = json!([24, 2]))]
    pub reminder_hours: Vec<i64>,
    pub marketing_emails: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_enabled: true,
            whatsapp_enabled: true,
            reminder_hours: DEFAULT_REMINDER_HOURS.to_vec(),
            marketing_emails: false,
        }
    }
}

impl NotificationPreferences {
    /// Decode the stored JSON, falling back to defaults for missing or bad data.
    pub fn from_json(value: Option<JsonValue>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

/// Client domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "(11) 98765-4321")]
    pub phone: String,
    pub email: Option<String>,
    /// CPF
    pub document: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_fields: Option<JsonValue>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<JsonValue>,
    pub notes: Option<String>,
    pub active: bool,
    pub notification_preferences: NotificationPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_visit_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn create(company_id: Uuid, input: CreateClient, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: input.name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.map(|e| e.trim().to_lowercase()),
            document: input.document,
            birth_date: input.birth_date,
            address: input.address,
            custom_fields: input.custom_fields,
            preferences: input.preferences,
            notes: input.notes,
            active: true,
            notification_preferences: input.notification_preferences.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            last_visit_at: None,
        }
    }

    pub fn apply(&mut self, changes: UpdateClient, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(email) = changes.email {
            self.email = Some(email.trim().to_lowercase());
        }
        if let Some(document) = changes.document {
            self.document = Some(document);
        }
        if let Some(birth_date) = changes.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(address) = changes.address {
            self.address = Some(address);
        }
        if let Some(custom_fields) = changes.custom_fields {
            self.custom_fields = Some(custom_fields);
        }
        if let Some(preferences) = changes.preferences {
            self.preferences = Some(preferences);
        }
        if let Some(notes) = changes.notes {
            self.notes = Some(notes);
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

/// Client creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClient {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[validate(regex(path = *PHONE, message = "Invalid phone number"))]
    #[schema(example = "(11) 98765-4321")]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub document: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_fields: Option<JsonValue>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<JsonValue>,
    pub notes: Option<String>,
    #[validate(nested)]
    pub notification_preferences: Option<NotificationPreferences>,
}

/// Client partial update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClient {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(regex(path = *PHONE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub document: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_fields: Option<JsonValue>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<JsonValue>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

/// A client together with every appointment they booked
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientHistory {
    pub client: Client,
    pub appointments: Vec<Appointment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preferences_defaults() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.email_enabled);
        assert!(prefs.whatsapp_enabled);
        assert_eq!(prefs.reminder_hours, vec![24, 2]);
        assert!(!prefs.marketing_emails);
    }

    #[test]
    fn test_preferences_from_partial_json() {
        let prefs = NotificationPreferences::from_json(Some(json!({ "whatsapp_enabled": false })));
        assert!(!prefs.whatsapp_enabled);
        assert!(prefs.email_enabled);
        assert_eq!(prefs.reminder_hours, vec![24, 2]);

        let fallback = NotificationPreferences::from_json(Some(json!("not an object")));
        assert_eq!(fallback, NotificationPreferences::default());
        assert_eq!(NotificationPreferences::from_json(None), NotificationPreferences::default());
    }

    #[test]
    fn test_create_normalizes_contact() {
        let client = Client::create(
            Uuid::new_v4(),
            CreateClient {
                name: " Maria ".to_string(),
                phone: " 11987654321 ".to_string(),
                email: Some("Maria@Example.com".to_string()),
                document: None,
                birth_date: None,
                address: None,
                custom_fields: None,
                preferences: None,
                notes: None,
                notification_preferences: None,
            },
            Utc::now(),
        );
        assert_eq!(client.name, "Maria");
        assert_eq!(client.phone, "11987654321");
        assert_eq!(client.email.as_deref(), Some("maria@example.com"));
        assert!(client.active);
        assert!(client.last_visit_at.is_none());
    }
}
