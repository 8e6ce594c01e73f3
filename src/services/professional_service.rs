//! Professional service - Staff records.
//!
//! Agenda and availability queries live in the appointment service since
//! they read the professional's calendar.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AppointmentOwner, CreateProfessional, Professional, UpdateProfessional};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Professional service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfessionalService: Send + Sync {
    /// Active professionals of a company, by name
    async fn list_professionals(&self, company_id: Uuid) -> AppResult<Vec<Professional>>;

    async fn create_professional(&self, company_id: Uuid, input: CreateProfessional) -> AppResult<Professional>;

    async fn get_professional(&self, id: Uuid) -> AppResult<Professional>;

    async fn update_professional(&self, id: Uuid, input: UpdateProfessional) -> AppResult<Professional>;

    /// Rejected while the professional still has appointments
    async fn delete_professional(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ProfessionalService using Unit of Work.
pub struct ProfessionalManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProfessionalManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn check_working_hours(professional: &Professional) -> AppResult<()> {
    if let (Some(start), Some(end)) = (professional.work_start, professional.work_end) {
        if start >= end {
            return Err(AppError::validation("work_start must be before work_end"));
        }
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> ProfessionalService for ProfessionalManager<U> {
    async fn list_professionals(&self, company_id: Uuid) -> AppResult<Vec<Professional>> {
        self.uow.professionals().list_by_company(company_id, true).await
    }

    async fn create_professional(&self, company_id: Uuid, input: CreateProfessional) -> AppResult<Professional> {
        self.uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or_not_found("Company")?;

        let professional = Professional::create(company_id, input, Utc::now());
        check_working_hours(&professional)?;

        let professional = self.uow.professionals().create(professional).await?;
        tracing::info!(professional_id = %professional.id, %company_id, "Professional created");
        Ok(professional)
    }

    async fn get_professional(&self, id: Uuid) -> AppResult<Professional> {
        self.uow
            .professionals()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Professional")
    }

    async fn update_professional(&self, id: Uuid, input: UpdateProfessional) -> AppResult<Professional> {
        let mut professional = self.get_professional(id).await?;
        professional.apply(input, Utc::now());
        check_working_hours(&professional)?;

        self.uow.professionals().update(professional).await
    }

    async fn delete_professional(&self, id: Uuid) -> AppResult<()> {
        if self
            .uow
            .appointments()
            .exists_for(AppointmentOwner::Professional(id))
            .await?
        {
            return Err(AppError::conflict(
                "Professional has appointments and cannot be deleted",
            ));
        }

        if !self.uow.professionals().delete(id).await? {
            return Err(AppError::NotFound("Professional"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{sample_company, sample_professional, Mocks};

    #[tokio::test]
    async fn test_create_rejects_inverted_hours() {
        let company = sample_company();
        let company_id = company.id;

        let mut mocks = Mocks::default();
        mocks
            .companies
            .expect_find_by_id()
            .returning(move |_| Ok(Some(company.clone())));
        mocks.professionals.expect_create().never();

        let manager = ProfessionalManager::new(mocks.into_uow());
        let input: CreateProfessional = serde_json::from_value(serde_json::json!({
            "name": "Ana Costa",
            "work_start": "18:00",
            "work_end": "09:00"
        }))
        .unwrap();

        let result = manager.create_professional(company_id, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_only_active() {
        let mut mocks = Mocks::default();
        mocks
            .professionals
            .expect_list_by_company()
            .withf(|_, active_only| *active_only)
            .returning(|company_id, _| Ok(vec![sample_professional(company_id)]));

        let manager = ProfessionalManager::new(mocks.into_uow());
        let listed = manager.list_professionals(Uuid::new_v4()).await.unwrap();

        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_appointments_conflicts() {
        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_exists_for()
            .withf(|owner| matches!(owner, AppointmentOwner::Professional(_)))
            .returning(|_| Ok(true));

        let manager = ProfessionalManager::new(mocks.into_uow());
        let result = manager.delete_professional(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
