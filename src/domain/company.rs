//! Company (tenant) entity and its settings view.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::patterns::{HEX_COLOR, WORK_DAYS_MASK};
use super::schedule::{hhmm, WorkDays};
use crate::config::{DEFAULT_ACCENT_COLOR, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR};

/// Subscription plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Basic,
    Professional,
    Advanced,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Professional => "professional",
            Plan::Advanced => "advanced",
        }
    }
}

impl From<&str> for Plan {
    fn from(s: &str) -> Self {
        match s {
            "professional" => Plan::Professional,
            "advanced" => Plan::Advanced,
            _ => Plan::Basic,
        }
    }
}

/// Company domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Studio Bella")]
    pub name: String,
    #[schema(example = "contact@studiobella.com")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    #[schema(example = "#007BFF")]
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub opening_time: Option<NaiveTime>,
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>, example = "18:00")]
    pub closing_time: Option<NaiveTime>,
    #[schema(value_type = String, example = "1111100")]
    pub working_days: WorkDays,
    pub plan: Plan,
    pub whatsapp_enabled: bool,
    pub email_enabled: bool,
    /// Never returned to callers
    #[serde(skip_serializing)]
    pub whatsapp_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Build a new company applying the documented defaults.
    pub fn create(input: CreateCompany, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            phone: input.phone,
            address: input.address,
            logo_url: input.logo_url,
            primary_color: input
                .primary_color
                .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string()),
            secondary_color: input
                .secondary_color
                .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string()),
            accent_color: input
                .accent_color
                .unwrap_or_else(|| DEFAULT_ACCENT_COLOR.to_string()),
            opening_time: input.opening_time,
            closing_time: input.closing_time,
            working_days: input
                .working_days
                .as_deref()
                .map(WorkDays::from_stored)
                .unwrap_or_default(),
            plan: input.plan.unwrap_or_default(),
            whatsapp_enabled: input.whatsapp_enabled.unwrap_or(false),
            email_enabled: input.email_enabled.unwrap_or(true),
            whatsapp_token: input.whatsapp_token,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, changes: UpdateCompany, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = changes.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = changes.address {
            self.address = Some(address);
        }
        if let Some(logo_url) = changes.logo_url {
            self.logo_url = Some(logo_url);
        }
        if let Some(color) = changes.primary_color {
            self.primary_color = color;
        }
        if let Some(color) = changes.secondary_color {
            self.secondary_color = color;
        }
        if let Some(color) = changes.accent_color {
            self.accent_color = color;
        }
        if changes.opening_time.is_some() {
            self.opening_time = changes.opening_time;
        }
        if changes.closing_time.is_some() {
            self.closing_time = changes.closing_time;
        }
        if let Some(mask) = changes.working_days.as_deref() {
            self.working_days = WorkDays::from_stored(mask);
        }
        if let Some(plan) = changes.plan {
            self.plan = plan;
        }
        if let Some(enabled) = changes.whatsapp_enabled {
            self.whatsapp_enabled = enabled;
        }
        if let Some(enabled) = changes.email_enabled {
            self.email_enabled = enabled;
        }
        if let Some(token) = changes.whatsapp_token {
            self.whatsapp_token = Some(token);
        }
        self.updated_at = now;
    }

    pub fn settings(&self) -> CompanySettings {
        CompanySettings {
            style: StyleSettings {
                logo_url: self.logo_url.clone(),
                primary_color: self.primary_color.clone(),
                secondary_color: self.secondary_color.clone(),
                accent_color: self.accent_color.clone(),
            },
            operation: OperationSettings {
                opening_time: self.opening_time,
                closing_time: self.closing_time,
                working_days: self.working_days,
            },
            notifications: NotificationSettings {
                whatsapp_enabled: self.whatsapp_enabled,
                email_enabled: self.email_enabled,
            },
            plan: self.plan,
        }
    }
}

/// Company creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Studio Bella")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "contact@studiobella.com")]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(url(message = "Invalid logo URL"))]
    pub logo_url: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub primary_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub secondary_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub accent_color: Option<String>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub opening_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "18:00")]
    pub closing_time: Option<NaiveTime>,
    #[validate(regex(path = *WORK_DAYS_MASK, message = "Working days must be 7 characters of 0/1"))]
    #[schema(example = "1111100")]
    pub working_days: Option<String>,
    pub plan: Option<Plan>,
    pub whatsapp_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub whatsapp_token: Option<String>,
}

/// Company partial update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCompany {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(url(message = "Invalid logo URL"))]
    pub logo_url: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub primary_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub secondary_color: Option<String>,
    #[validate(regex(path = *HEX_COLOR, message = "Colors must be #RRGGBB"))]
    pub accent_color: Option<String>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub opening_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub closing_time: Option<NaiveTime>,
    #[validate(regex(path = *WORK_DAYS_MASK, message = "Working days must be 7 characters of 0/1"))]
    pub working_days: Option<String>,
    pub plan: Option<Plan>,
    pub whatsapp_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub whatsapp_token: Option<String>,
}

/// Grouped settings view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanySettings {
    pub style: StyleSettings,
    pub operation: OperationSettings,
    pub notifications: NotificationSettings,
    pub plan: Plan,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StyleSettings {
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OperationSettings {
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub opening_time: Option<NaiveTime>,
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub closing_time: Option<NaiveTime>,
    #[schema(value_type = String)]
    pub working_days: WorkDays,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationSettings {
    pub whatsapp_enabled: bool,
    pub email_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CreateCompany {
        CreateCompany {
            name: " Studio Bella ".to_string(),
            email: "Contact@StudioBella.com".to_string(),
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
            whatsapp_token: Some("secret-token".to_string()),
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let company = Company::create(input(), Utc::now());
        assert_eq!(company.name, "Studio Bella");
        assert_eq!(company.email, "contact@studiobella.com");
        assert_eq!(company.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(company.working_days.as_mask(), "1111100");
        assert_eq!(company.plan, Plan::Basic);
        assert!(company.email_enabled);
        assert!(!company.whatsapp_enabled);
    }

    #[test]
    fn test_token_is_never_serialized() {
        let company = Company::create(input(), Utc::now());
        let json = serde_json::to_value(&company).unwrap();
        assert!(json.get("whatsapp_token").is_none());
        assert_eq!(json["working_days"], "1111100");
    }

    #[test]
    fn test_invalid_color_rejected() {
        let mut bad = input();
        bad.primary_color = Some("blue".to_string());
        assert!(bad.validate().is_err());
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut company = Company::create(input(), Utc::now());
        company.apply(
            UpdateCompany {
                plan: Some(Plan::Advanced),
                working_days: Some("1111110".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(company.plan, Plan::Advanced);
        assert_eq!(company.working_days.as_mask(), "1111110");
        assert_eq!(company.name, "Studio Bella");

        let settings = company.settings();
        assert_eq!(settings.plan, Plan::Advanced);
        assert!(settings.notifications.email_enabled);
    }
}
