//! Professional entity and availability rules.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::patterns::WORK_DAYS_MASK;
use super::schedule::{hhmm, slot_capacity, WorkDays};
use crate::config::DEFAULT_SLOT_INTERVAL_MINUTES;

/// Professional domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Professional {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "Ana Costa")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = json!(["haircut", "coloring"]))]
    pub specialties: Vec<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub work_start: Option<NaiveTime>,
    #[serde(with = "hhmm")]
    #[schema(value_type = Option<String>, example = "18:00")]
    pub work_end: Option<NaiveTime>,
    #[schema(value_type = String, example = "1111100")]
    pub work_days: WorkDays,
    pub slot_interval_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Professional {
    pub fn create(company_id: Uuid, input: CreateProfessional, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: input.name.trim().to_string(),
            email: input.email.map(|e| e.trim().to_lowercase()),
            phone: input.phone,
            specialties: input.specialties.unwrap_or_default(),
            bio: input.bio,
            photo_url: input.photo_url,
            work_start: input.work_start,
            work_end: input.work_end,
            work_days: input
                .work_days
                .as_deref()
                .map(WorkDays::from_stored)
                .unwrap_or_default(),
            slot_interval_minutes: input
                .slot_interval_minutes
                .unwrap_or(DEFAULT_SLOT_INTERVAL_MINUTES),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateProfessional, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = changes.email {
            self.email = Some(email.trim().to_lowercase());
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(specialties) = changes.specialties {
            self.specialties = specialties;
        }
        if let Some(bio) = changes.bio {
            self.bio = Some(bio);
        }
        if let Some(photo_url) = changes.photo_url {
            self.photo_url = Some(photo_url);
        }
        if changes.work_start.is_some() {
            self.work_start = changes.work_start;
        }
        if changes.work_end.is_some() {
            self.work_end = changes.work_end;
        }
        if let Some(mask) = changes.work_days.as_deref() {
            self.work_days = WorkDays::from_stored(mask);
        }
        if let Some(interval) = changes.slot_interval_minutes {
            self.slot_interval_minutes = interval;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        self.updated_at = now;
    }

    /// Working window on `date`, if the professional works that day and has
    /// hours configured.
    pub fn working_window(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        if !self.work_days.works_on_date(date) {
            return None;
        }
        match (self.work_start, self.work_end) {
            (Some(start), Some(end)) if start < end => Some((start, end)),
            _ => None,
        }
    }

    /// Bookable slot count on `date`.
    pub fn daily_capacity(&self, date: NaiveDate) -> u64 {
        self.working_window(date)
            .map(|(start, end)| slot_capacity(start, end, self.slot_interval_minutes))
            .unwrap_or(0)
    }
}

/// Professional creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfessional {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[schema(example = "Ana Costa")]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub bio: Option<String>,
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub work_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>, example = "18:00")]
    pub work_end: Option<NaiveTime>,
    #[validate(regex(path = *WORK_DAYS_MASK, message = "Work days must be 7 characters of 0/1"))]
    pub work_days: Option<String>,
    #[validate(range(min = 5, max = 480, message = "Slot interval must be between 5 and 480 minutes"))]
    pub slot_interval_minutes: Option<i32>,
}

/// Professional partial update payload
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfessional {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub bio: Option<String>,
    #[validate(url(message = "Invalid photo URL"))]
    pub photo_url: Option<String>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub work_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm")]
    #[schema(value_type = Option<String>)]
    pub work_end: Option<NaiveTime>,
    #[validate(regex(path = *WORK_DAYS_MASK, message = "Work days must be 7 characters of 0/1"))]
    pub work_days: Option<String>,
    #[validate(range(min = 5, max = 480, message = "Slot interval must be between 5 and 480 minutes"))]
    pub slot_interval_minutes: Option<i32>,
    pub active: Option<bool>,
}

/// Free start times for one professional on one day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailableSlots {
    pub date: NaiveDate,
    pub professional_id: Uuid,
    #[schema(example = json!(["09:00", "09:30"]))]
    pub slots: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn professional(mask: &str, start: Option<(u32, u32)>, end: Option<(u32, u32)>) -> Professional {
        let now = Utc::now();
        Professional {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: None,
            phone: None,
            specialties: vec![],
            bio: None,
            photo_url: None,
            work_start: start.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            work_end: end.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            work_days: WorkDays::parse(mask).unwrap(),
            slot_interval_minutes: 30,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_working_window_respects_mask() {
        let pro = professional("1111100", Some((9, 0)), Some((18, 0)));
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        assert!(pro.working_window(monday).is_some());
        assert!(pro.working_window(saturday).is_none());
        assert_eq!(pro.daily_capacity(monday), 18);
        assert_eq!(pro.daily_capacity(saturday), 0);
    }

    #[test]
    fn test_no_hours_means_no_window() {
        let pro = professional("1111111", None, Some((18, 0)));
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert!(pro.working_window(monday).is_none());
        assert_eq!(pro.daily_capacity(monday), 0);
    }
}
