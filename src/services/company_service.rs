//! Company service - Tenant registration and settings.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Company, CompanySettings, CreateCompany, UpdateCompany};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Company service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompanyService: Send + Sync {
    async fn list_companies(&self) -> AppResult<Vec<Company>>;

    /// Register a company. The email must not be in use.
    async fn create_company(&self, input: CreateCompany) -> AppResult<Company>;

    async fn get_company(&self, id: Uuid) -> AppResult<Company>;

    async fn update_company(&self, id: Uuid, input: UpdateCompany) -> AppResult<Company>;

    /// Delete a company and everything it owns
    async fn delete_company(&self, id: Uuid) -> AppResult<()>;

    async fn company_settings(&self, id: Uuid) -> AppResult<CompanySettings>;
}

/// Concrete implementation of CompanyService using Unit of Work.
pub struct CompanyManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CompanyManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_email_free(&self, email: &str, current: Option<Uuid>) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.uow.companies().find_by_email(&email).await? {
            if Some(existing.id) != current {
                return Err(AppError::conflict("A company with this email already exists"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> CompanyService for CompanyManager<U> {
    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        self.uow.companies().list().await
    }

    async fn create_company(&self, input: CreateCompany) -> AppResult<Company> {
        self.ensure_email_free(&input.email, None).await?;

        let company = self
            .uow
            .companies()
            .create(Company::create(input, Utc::now()))
            .await?;

        tracing::info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    async fn get_company(&self, id: Uuid) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Company")
    }

    async fn update_company(&self, id: Uuid, input: UpdateCompany) -> AppResult<Company> {
        let mut company = self.get_company(id).await?;

        if let Some(email) = input.email.as_deref() {
            self.ensure_email_free(email, Some(id)).await?;
        }

        company.apply(input, Utc::now());
        self.uow.companies().update(company).await
    }

    async fn delete_company(&self, id: Uuid) -> AppResult<()> {
        if !self.uow.companies().delete(id).await? {
            return Err(AppError::NotFound("Company"));
        }

        tracing::info!(company_id = %id, "Company deleted");
        Ok(())
    }

    async fn company_settings(&self, id: Uuid) -> AppResult<CompanySettings> {
        Ok(self.get_company(id).await?.settings())
    }
}
