//! Catalog services and professional assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::professional::Professional;

/// Bookable service offered by a company
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "Haircut")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 45)]
    pub duration_minutes: i32,
    /// Price in cents (BRL)
    #[schema(example = 5000)]
    pub price_cents: i64,
    pub category: Option<String>,
    pub active: bool,
    pub requires_preparation: bool,
    pub preparation_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Duration and price that apply to one booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTerms {
    pub duration_minutes: i32,
    pub price_cents: i64,
}

impl Service {
    pub fn create(company_id: Uuid, input: CreateService, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: input.name.trim().to_string(),
            description: input.description,
            duration_minutes: input.duration_minutes,
            price_cents: input.price_cents,
            category: input.category,
            active: true,
            requires_preparation: input.requires_preparation.unwrap_or(false),
            preparation_minutes: input.preparation_minutes.unwrap_or(0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateService, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(duration) = changes.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(price) = changes.price_cents {
            self.price_cents = price;
        }
        if let Some(category) = changes.category {
            self.category = Some(category);
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        if let Some(requires) = changes.requires_preparation {
            self.requires_preparation = requires;
        }
        if let Some(minutes) = changes.preparation_minutes {
            self.preparation_minutes = minutes;
        }
        self.updated_at = now;
    }

    /// Assignment overrides win over the service defaults.
    pub fn terms_for(&self, assignment: Option<&ServiceAssignment>) -> BookingTerms {
        BookingTerms {
            duration_minutes: assignment
                .and_then(|a| a.custom_duration_minutes)
                .unwrap_or(self.duration_minutes),
            price_cents: assignment
                .and_then(|a| a.custom_price_cents)
                .unwrap_or(self.price_cents),
        }
    }
}

/// Link between a service and a professional who performs it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceAssignment {
    pub id: Uuid,
    pub service_id: Uuid,
    pub professional_id: Uuid,
    pub custom_price_cents: Option<i64>,
    pub custom_duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ServiceAssignment {
    pub fn new(service_id: Uuid, professional_id: Uuid, input: AssignProfessional, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            service_id,
            professional_id,
            custom_price_cents: input.custom_price_cents,
            custom_duration_minutes: input.custom_duration_minutes,
            created_at: now,
        }
    }
}

/// Active professional assigned to a service, with the terms that apply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignedProfessional {
    pub professional: Professional,
    pub custom_price_cents: Option<i64>,
    pub custom_duration_minutes: Option<i32>,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

impl AssignedProfessional {
    pub fn new(service: &Service, assignment: &ServiceAssignment, professional: Professional) -> Self {
        let terms = service.terms_for(Some(assignment));
        Self {
            professional,
            custom_price_cents: assignment.custom_price_cents,
            custom_duration_minutes: assignment.custom_duration_minutes,
            price_cents: terms.price_cents,
            duration_minutes: terms.duration_minutes,
        }
    }
}

/// Service creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateService {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Haircut")]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be greater than zero"))]
    #[schema(example = 45)]
    pub duration_minutes: i32,
    #[validate(range(min = 1, message = "Price must be greater than zero"))]
    #[schema(example = 5000)]
    pub price_cents: i64,
    pub category: Option<String>,
    pub requires_preparation: Option<bool>,
    #[validate(range(min = 0, message = "Preparation time cannot be negative"))]
    pub preparation_minutes: Option<i32>,
}

/// Service partial update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateService {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be greater than zero"))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 1, message = "Price must be greater than zero"))]
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub requires_preparation: Option<bool>,
    #[validate(range(min = 0, message = "Preparation time cannot be negative"))]
    pub preparation_minutes: Option<i32>,
}

/// Assignment payload with optional overrides
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AssignProfessional {
    #[validate(range(min = 1, message = "Custom price must be greater than zero"))]
    pub custom_price_cents: Option<i64>,
    #[validate(range(min = 1, message = "Custom duration must be greater than zero"))]
    pub custom_duration_minutes: Option<i32>,
}
