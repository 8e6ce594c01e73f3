//! Company repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::company::{self, ActiveModel, Entity as CompanyEntity};
use crate::domain::Company;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Company repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>>;

    /// Emails are stored lowercased
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Company>>;

    async fn list(&self) -> AppResult<Vec<Company>>;

    async fn create(&self, company: Company) -> AppResult<Company>;

    async fn update(&self, company: Company) -> AppResult<Company>;

    /// Delete with cascade; returns false when nothing matched
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// SeaORM-backed company repository
pub struct CompanyStore {
    db: DatabaseConnection,
}

impl CompanyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompanyRepository for CompanyStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        let result = CompanyEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Company::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Company>> {
        let result = CompanyEntity::find()
            .filter(company::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Company::from))
    }

    async fn list(&self) -> AppResult<Vec<Company>> {
        let models = CompanyEntity::find()
            .order_by_asc(company::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Company::from).collect())
    }

    async fn create(&self, company: Company) -> AppResult<Company> {
        let model = ActiveModel::from(&company)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Company::from(model))
    }

    async fn update(&self, company: Company) -> AppResult<Company> {
        let model = ActiveModel::from(&company)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Company::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = CompanyEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
