//! Professional repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::professional::{self, ActiveModel, Entity as ProfessionalEntity};
use crate::domain::Professional;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Professional repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Professional>>;

    async fn list_by_company(&self, company_id: Uuid, active_only: bool) -> AppResult<Vec<Professional>>;

    async fn create(&self, professional: Professional) -> AppResult<Professional>;

    async fn update(&self, professional: Professional) -> AppResult<Professional>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// SeaORM-backed professional repository
pub struct ProfessionalStore {
    db: DatabaseConnection,
}

impl ProfessionalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfessionalRepository for ProfessionalStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Professional>> {
        let result = ProfessionalEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Professional::from))
    }

    async fn list_by_company(&self, company_id: Uuid, active_only: bool) -> AppResult<Vec<Professional>> {
        let mut query = ProfessionalEntity::find().filter(professional::Column::CompanyId.eq(company_id));
        if active_only {
            query = query.filter(professional::Column::Active.eq(true));
        }

        let models = query
            .order_by_asc(professional::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Professional::from).collect())
    }

    async fn create(&self, professional: Professional) -> AppResult<Professional> {
        let model = ActiveModel::from(&professional)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Professional::from(model))
    }

    async fn update(&self, professional: Professional) -> AppResult<Professional> {
        let model = ActiveModel::from(&professional)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Professional::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = ProfessionalEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
