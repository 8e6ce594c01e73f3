//! Service catalog repository, including professional assignments.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use super::entities::professional_service::{self, Entity as AssignmentEntity};
use super::entities::service::{self, ActiveModel, Entity as ServiceEntity};
use super::entities::professional::Entity as ProfessionalEntity;
use crate::domain::{Professional, Service, ServiceAssignment};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>>;

    async fn list_by_company(&self, company_id: Uuid, active_only: bool) -> AppResult<Vec<Service>>;

    async fn create(&self, service: Service) -> AppResult<Service>;

    async fn update(&self, service: Service) -> AppResult<Service>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Distinct non-null categories of active services
    async fn categories(&self, company_id: Uuid) -> AppResult<Vec<String>>;

    async fn find_assignment(
        &self,
        service_id: Uuid,
        professional_id: Uuid,
    ) -> AppResult<Option<ServiceAssignment>>;

    async fn assign(&self, assignment: ServiceAssignment) -> AppResult<ServiceAssignment>;

    /// Returns false when no assignment existed
    async fn unassign(&self, service_id: Uuid, professional_id: Uuid) -> AppResult<bool>;

    /// Assignments of a service joined with their active professionals
    async fn assigned_professionals(
        &self,
        service_id: Uuid,
    ) -> AppResult<Vec<(ServiceAssignment, Professional)>>;
}

/// SeaORM-backed service repository
pub struct ServiceStore {
    db: DatabaseConnection,
}

impl ServiceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ServiceRepository for ServiceStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>> {
        let result = ServiceEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Service::from))
    }

    async fn list_by_company(&self, company_id: Uuid, active_only: bool) -> AppResult<Vec<Service>> {
        let mut query = ServiceEntity::find().filter(service::Column::CompanyId.eq(company_id));
        if active_only {
            query = query.filter(service::Column::Active.eq(true));
        }

        let models = query
            .order_by_asc(service::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Service::from).collect())
    }

    async fn create(&self, service: Service) -> AppResult<Service> {
        let model = ActiveModel::from(&service)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Service::from(model))
    }

    async fn update(&self, service: Service) -> AppResult<Service> {
        let model = ActiveModel::from(&service)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Service::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = ServiceEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn categories(&self, company_id: Uuid) -> AppResult<Vec<String>> {
        let categories: Vec<String> = ServiceEntity::find()
            .select_only()
            .column(service::Column::Category)
            .distinct()
            .filter(service::Column::CompanyId.eq(company_id))
            .filter(service::Column::Active.eq(true))
            .filter(service::Column::Category.is_not_null())
            .order_by_asc(service::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(categories)
    }

    async fn find_assignment(
        &self,
        service_id: Uuid,
        professional_id: Uuid,
    ) -> AppResult<Option<ServiceAssignment>> {
        let result = AssignmentEntity::find()
            .filter(professional_service::Column::ServiceId.eq(service_id))
            .filter(professional_service::Column::ProfessionalId.eq(professional_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(ServiceAssignment::from))
    }

    async fn assign(&self, assignment: ServiceAssignment) -> AppResult<ServiceAssignment> {
        let model = professional_service::ActiveModel::from(&assignment)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(ServiceAssignment::from(model))
    }

    async fn unassign(&self, service_id: Uuid, professional_id: Uuid) -> AppResult<bool> {
        let result = AssignmentEntity::delete_many()
            .filter(professional_service::Column::ServiceId.eq(service_id))
            .filter(professional_service::Column::ProfessionalId.eq(professional_id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn assigned_professionals(
        &self,
        service_id: Uuid,
    ) -> AppResult<Vec<(ServiceAssignment, Professional)>> {
        let rows = AssignmentEntity::find()
            .filter(professional_service::Column::ServiceId.eq(service_id))
            .find_also_related(ProfessionalEntity)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .filter_map(|(assignment, professional)| {
                professional
                    .filter(|p| p.active)
                    .map(|p| (ServiceAssignment::from(assignment), Professional::from(p)))
            })
            .collect())
    }
}
