//! Client repository with search and counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::client::{self, ActiveModel, Entity as ClientEntity};
use crate::domain::Client;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Client repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>>;

    /// Phone is unique within a company
    async fn find_by_phone(&self, company_id: Uuid, phone: &str) -> AppResult<Option<Client>>;

    /// Page of clients, optionally matching `search` on name, phone or email
    async fn list(
        &self,
        company_id: Uuid,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Client>, u64)>;

    /// Quick lookup by name or phone
    async fn search(&self, company_id: Uuid, term: String, limit: u64) -> AppResult<Vec<Client>>;

    async fn create(&self, client: Client) -> AppResult<Client>;

    async fn update(&self, client: Client) -> AppResult<Client>;

    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    async fn count_active(&self, company_id: Uuid) -> AppResult<u64>;

    async fn count_created_since(&self, company_id: Uuid, since: DateTime<Utc>) -> AppResult<u64>;
}

/// SeaORM-backed client repository
pub struct ClientStore {
    db: DatabaseConnection,
}

impl ClientStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Case-insensitive substring match on a column
fn ilike(column: client::Column, term: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", term.to_lowercase()))
}

#[async_trait]
impl ClientRepository for ClientStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>> {
        let result = ClientEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Client::from))
    }

    async fn find_by_phone(&self, company_id: Uuid, phone: &str) -> AppResult<Option<Client>> {
        let result = ClientEntity::find()
            .filter(client::Column::CompanyId.eq(company_id))
            .filter(client::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Client::from))
    }

    async fn list(
        &self,
        company_id: Uuid,
        search: Option<String>,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Client>, u64)> {
        let mut query = ClientEntity::find().filter(client::Column::CompanyId.eq(company_id));

        if let Some(term) = search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(ilike(client::Column::Name, term))
                    .add(client::Column::Phone.contains(term))
                    .add(ilike(client::Column::Email, term)),
            );
        }

        let paginator = query
            .order_by_asc(client::Column::Name)
            .paginate(&self.db, pagination.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(pagination.page_index()).await?;

        Ok((models.into_iter().map(Client::from).collect(), total))
    }

    async fn search(&self, company_id: Uuid, term: String, limit: u64) -> AppResult<Vec<Client>> {
        let models = ClientEntity::find()
            .filter(client::Column::CompanyId.eq(company_id))
            .filter(
                Condition::any()
                    .add(ilike(client::Column::Name, &term))
                    .add(client::Column::Phone.contains(&term)),
            )
            .order_by_asc(client::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Client::from).collect())
    }

    async fn create(&self, client: Client) -> AppResult<Client> {
        let model = ActiveModel::from(&client)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Client::from(model))
    }

    async fn update(&self, client: Client) -> AppResult<Client> {
        let model = ActiveModel::from(&client)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Client::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = ClientEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn count_active(&self, company_id: Uuid) -> AppResult<u64> {
        ClientEntity::find()
            .filter(client::Column::CompanyId.eq(company_id))
            .filter(client::Column::Active.eq(true))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn count_created_since(&self, company_id: Uuid, since: DateTime<Utc>) -> AppResult<u64> {
        ClientEntity::find()
            .filter(client::Column::CompanyId.eq(company_id))
            .filter(client::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}
