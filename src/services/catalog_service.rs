//! Catalog service - Services a company offers and who performs them.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    AppointmentOwner, AssignProfessional, AssignedProfessional, CreateService, Service,
    ServiceAssignment, UpdateService,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Active services of a company
    async fn list_services(&self, company_id: Uuid) -> AppResult<Vec<Service>>;

    async fn create_service(&self, company_id: Uuid, input: CreateService) -> AppResult<Service>;

    async fn get_service(&self, id: Uuid) -> AppResult<Service>;

    async fn update_service(&self, id: Uuid, input: UpdateService) -> AppResult<Service>;

    /// Rejected while the service still has appointments
    async fn delete_service(&self, id: Uuid) -> AppResult<()>;

    /// Distinct categories of active services
    async fn categories(&self, company_id: Uuid) -> AppResult<Vec<String>>;

    /// Active professionals assigned to a service, with effective terms
    async fn assigned_professionals(&self, service_id: Uuid) -> AppResult<Vec<AssignedProfessional>>;

    async fn assign_professional(
        &self,
        service_id: Uuid,
        professional_id: Uuid,
        input: AssignProfessional,
    ) -> AppResult<ServiceAssignment>;

    async fn unassign_professional(&self, service_id: Uuid, professional_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_services(&self, company_id: Uuid) -> AppResult<Vec<Service>> {
        self.uow.catalog().list_by_company(company_id, true).await
    }

    async fn create_service(&self, company_id: Uuid, input: CreateService) -> AppResult<Service> {
        self.uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or_not_found("Company")?;

        let service = self
            .uow
            .catalog()
            .create(Service::create(company_id, input, Utc::now()))
            .await?;

        tracing::info!(service_id = %service.id, %company_id, "Service created");
        Ok(service)
    }

    async fn get_service(&self, id: Uuid) -> AppResult<Service> {
        self.uow.catalog().find_by_id(id).await?.ok_or_not_found("Service")
    }

    async fn update_service(&self, id: Uuid, input: UpdateService) -> AppResult<Service> {
        let mut service = self.get_service(id).await?;
        service.apply(input, Utc::now());
        self.uow.catalog().update(service).await
    }

    async fn delete_service(&self, id: Uuid) -> AppResult<()> {
        if self
            .uow
            .appointments()
            .exists_for(AppointmentOwner::Service(id))
            .await?
        {
            return Err(AppError::conflict("Service has appointments and cannot be deleted"));
        }

        if !self.uow.catalog().delete(id).await? {
            return Err(AppError::NotFound("Service"));
        }
        Ok(())
    }

    async fn categories(&self, company_id: Uuid) -> AppResult<Vec<String>> {
        self.uow.catalog().categories(company_id).await
    }

    async fn assigned_professionals(&self, service_id: Uuid) -> AppResult<Vec<AssignedProfessional>> {
        let service = self.get_service(service_id).await?;
        let rows = self.uow.catalog().assigned_professionals(service_id).await?;

        Ok(rows
            .into_iter()
            .map(|(assignment, professional)| {
                AssignedProfessional::new(&service, &assignment, professional)
            })
            .collect())
    }

    async fn assign_professional(
        &self,
        service_id: Uuid,
        professional_id: Uuid,
        input: AssignProfessional,
    ) -> AppResult<ServiceAssignment> {
        let service = self.get_service(service_id).await?;
        let professional = self
            .uow
            .professionals()
            .find_by_id(professional_id)
            .await?
            .ok_or_not_found("Professional")?;

        if professional.company_id != service.company_id {
            return Err(AppError::bad_request(
                "Professional and service belong to different companies",
            ));
        }

        if self
            .uow
            .catalog()
            .find_assignment(service_id, professional_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Professional is already assigned to this service"));
        }

        let assignment = ServiceAssignment::new(service_id, professional_id, input, Utc::now());
        self.uow.catalog().assign(assignment).await
    }

    async fn unassign_professional(&self, service_id: Uuid, professional_id: Uuid) -> AppResult<()> {
        if !self.uow.catalog().unassign(service_id, professional_id).await? {
            return Err(AppError::NotFound("Assignment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{sample_professional, sample_service, Mocks};

    #[tokio::test]
    async fn test_assign_twice_conflicts() {
        let company_id = Uuid::new_v4();
        let service = sample_service(company_id);
        let professional = sample_professional(company_id);
        let (service_id, professional_id) = (service.id, professional.id);

        let mut mocks = Mocks::default();
        mocks
            .catalog
            .expect_find_by_id()
            .returning(move |_| Ok(Some(service.clone())));
        mocks
            .professionals
            .expect_find_by_id()
            .returning(move |_| Ok(Some(professional.clone())));
        mocks.catalog.expect_find_assignment().returning(move |s, p| {
            Ok(Some(ServiceAssignment::new(s, p, AssignProfessional::default(), Utc::now())))
        });
        mocks.catalog.expect_assign().never();

        let manager = CatalogManager::new(mocks.into_uow());
        let result = manager
            .assign_professional(service_id, professional_id, AssignProfessional::default())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_assign_across_companies_is_rejected() {
        let service = sample_service(Uuid::new_v4());
        let professional = sample_professional(Uuid::new_v4());
        let (service_id, professional_id) = (service.id, professional.id);

        let mut mocks = Mocks::default();
        mocks
            .catalog
            .expect_find_by_id()
            .returning(move |_| Ok(Some(service.clone())));
        mocks
            .professionals
            .expect_find_by_id()
            .returning(move |_| Ok(Some(professional.clone())));

        let manager = CatalogManager::new(mocks.into_uow());
        let result = manager
            .assign_professional(service_id, professional_id, AssignProfessional::default())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_assigned_professionals_apply_overrides() {
        let company_id = Uuid::new_v4();
        let service = sample_service(company_id);
        let service_id = service.id;
        let professional = sample_professional(company_id);

        let mut mocks = Mocks::default();
        mocks
            .catalog
            .expect_find_by_id()
            .returning(move |_| Ok(Some(service.clone())));
        mocks.catalog.expect_assigned_professionals().returning(move |s| {
            let overrides = AssignProfessional {
                custom_price_cents: Some(9_000),
                custom_duration_minutes: None,
            };
            let assignment = ServiceAssignment::new(s, professional.id, overrides, Utc::now());
            Ok(vec![(assignment, professional.clone())])
        });

        let manager = CatalogManager::new(mocks.into_uow());
        let assigned = manager.assigned_professionals(service_id).await.unwrap();

        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].price_cents, 9_000);
        assert_eq!(assigned[0].duration_minutes, 45);
    }

    #[tokio::test]
    async fn test_unassign_missing_is_not_found() {
        let mut mocks = Mocks::default();
        mocks.catalog.expect_unassign().returning(|_, _| Ok(false));

        let manager = CatalogManager::new(mocks.into_uow());
        let result = manager.unassign_professional(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound("Assignment"))));
    }
}
