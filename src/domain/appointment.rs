//! Appointment entity, status lifecycle and booking rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::client::Client;
use super::professional::Professional;
use super::schedule::TimeRange;
use super::service::{BookingTerms, Service};
use crate::errors::{AppError, AppResult};

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses that occupy the professional's calendar.
    pub const BLOCKING: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
    ];

    /// Statuses that count as revenue.
    pub const BILLABLE: [AppointmentStatus; 2] =
        [AppointmentStatus::Confirmed, AppointmentStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn is_blocking(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    pub fn is_billable(&self) -> bool {
        Self::BILLABLE.contains(self)
    }

    /// Cancelled and completed appointments can no longer be moved or cancelled.
    pub fn is_closed(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl From<&str> for AppointmentStatus {
    fn from(s: &str) -> Self {
        match s {
            "confirmed" => AppointmentStatus::Confirmed,
            "in_progress" => AppointmentStatus::InProgress,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "no_show" => AppointmentStatus::NoShow,
            _ => AppointmentStatus::Scheduled,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub client_notes: Option<String>,
    pub professional_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub service_price_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Build a new `scheduled` appointment from the effective booking terms.
    pub fn schedule(
        company_id: Uuid,
        input: &CreateAppointment,
        terms: BookingTerms,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let discount = input.discount_cents.unwrap_or(0);
        let total = total_after_discount(terms.price_cents, discount)?;
        let range = TimeRange::starting_at(input.starts_at, terms.duration_minutes)?;

        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            client_id: input.client_id,
            professional_id: input.professional_id,
            service_id: input.service_id,
            starts_at: range.start,
            ends_at: range.end,
            status: AppointmentStatus::Scheduled,
            client_notes: input.client_notes.clone(),
            professional_notes: None,
            internal_notes: None,
            service_price_cents: terms.price_cents,
            discount_cents: discount,
            total_cents: total,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            cancelled_at: None,
        })
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.starts_at, self.ends_at)
    }

    /// Move to a new start, keeping the current duration.
    pub fn reschedule(&mut self, starts_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
        if self.status.is_closed() {
            return Err(AppError::bad_request(format!(
                "Cannot reschedule an appointment that is {}",
                self.status
            )));
        }

        let ends_at = starts_at
            .checked_add_signed(self.ends_at - self.starts_at)
            .ok_or_else(|| AppError::validation("Appointment end is out of range"))?;
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self.status = AppointmentStatus::Scheduled;
        self.confirmed_at = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> AppResult<()> {
        if self.status.is_closed() {
            return Err(AppError::bad_request(format!(
                "Cannot cancel an appointment that is {}",
                self.status
            )));
        }

        self.status = AppointmentStatus::Cancelled;
        self.cancelled_at = Some(now);
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            self.internal_notes = Some(reason);
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn apply(&mut self, changes: UpdateAppointment, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(discount) = changes.discount_cents {
            self.total_cents = total_after_discount(self.service_price_cents, discount)?;
            self.discount_cents = discount;
        }
        if let Some(notes) = changes.client_notes {
            self.client_notes = Some(notes);
        }
        if let Some(notes) = changes.professional_notes {
            self.professional_notes = Some(notes);
        }
        if let Some(notes) = changes.internal_notes {
            self.internal_notes = Some(notes);
        }
        if let Some(status) = changes.status {
            match status {
                AppointmentStatus::Confirmed if self.confirmed_at.is_none() => {
                    self.confirmed_at = Some(now);
                }
                AppointmentStatus::Cancelled if self.cancelled_at.is_none() => {
                    self.cancelled_at = Some(now);
                }
                _ => {}
            }
            self.status = status;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn total_after_discount(price_cents: i64, discount_cents: i64) -> AppResult<i64> {
    if discount_cents < 0 {
        return Err(AppError::validation("Discount cannot be negative"));
    }
    if discount_cents > price_cents {
        return Err(AppError::validation("Discount cannot exceed the service price"));
    }
    Ok(price_cents - discount_cents)
}

/// Entity whose deletion is blocked while it has appointments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOwner {
    Client(Uuid),
    Professional(Uuid),
    Service(Uuid),
}

/// Listing filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    /// Inclusive start date
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    pub to: Option<NaiveDate>,
    pub professional_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

/// Appointment with its client, professional and service embedded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub client: Client,
    pub professional: Professional,
    pub service: Service,
}

/// Booking payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    #[schema(example = "2024-03-04T14:00:00Z")]
    pub starts_at: DateTime<Utc>,
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub client_notes: Option<String>,
    #[validate(range(min = 0, message = "Discount cannot be negative"))]
    pub discount_cents: Option<i64>,
}

/// Appointment partial update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointment {
    pub status: Option<AppointmentStatus>,
    pub client_notes: Option<String>,
    pub professional_notes: Option<String>,
    pub internal_notes: Option<String>,
    #[validate(range(min = 0, message = "Discount cannot be negative"))]
    pub discount_cents: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RescheduleAppointment {
    #[schema(example = "2024-03-05T10:00:00Z")]
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CancelAppointment {
    #[validate(length(max = 500, message = "Reason is too long"))]
    pub reason: Option<String>,
}
