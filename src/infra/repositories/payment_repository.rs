//! Payment repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use super::entities::payment::{self, ActiveModel, Entity as PaymentEntity};
use super::entities::{appointment, client, service};
use crate::domain::{Payment, PaymentFilter, PaymentSummary};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Payment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> AppResult<Payment>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;

    /// Lookup by gateway transaction id
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>>;

    async fn update(&self, payment: Payment) -> AppResult<Payment>;

    /// Company payments, newest first, with client and service names
    async fn list_by_company(
        &self,
        company_id: Uuid,
        filter: PaymentFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<PaymentSummary>, u64)>;
}

/// SeaORM-backed payment repository
pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Client and service names for each appointment id.
    async fn names_for(
        &self,
        appointment_ids: Vec<Uuid>,
    ) -> AppResult<HashMap<Uuid, (Option<String>, Option<String>)>> {
        if appointment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let appointments = appointment::Entity::find()
            .filter(appointment::Column::Id.is_in(appointment_ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        let client_ids: Vec<Uuid> = appointments.iter().map(|a| a.client_id).collect();
        let service_ids: Vec<Uuid> = appointments.iter().map(|a| a.service_id).collect();

        let clients: HashMap<Uuid, String> = client::Entity::find()
            .filter(client::Column::Id.is_in(client_ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let services: HashMap<Uuid, String> = service::Entity::find()
            .filter(service::Column::Id.is_in(service_ids))
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(appointments
            .into_iter()
            .map(|a| {
                let names = (
                    clients.get(&a.client_id).cloned(),
                    services.get(&a.service_id).cloned(),
                );
                (a.id, names)
            })
            .collect())
    }
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn create(&self, payment: Payment) -> AppResult<Payment> {
        let model = ActiveModel::from(&payment)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Payment::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let result = PaymentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Payment::from))
    }

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        let result = PaymentEntity::find()
            .filter(payment::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Payment::from))
    }

    async fn update(&self, payment: Payment) -> AppResult<Payment> {
        let model = ActiveModel::from(&payment)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Payment::from(model))
    }

    async fn list_by_company(
        &self,
        company_id: Uuid,
        filter: PaymentFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<PaymentSummary>, u64)> {
        let mut query = PaymentEntity::find()
            .join(JoinType::InnerJoin, payment::Relation::Appointment.def())
            .filter(appointment::Column::CompanyId.eq(company_id));

        if let Some(status) = filter.status {
            query = query.filter(payment::Column::Status.eq(status.as_str()));
        }
        if let Some(gateway) = filter.gateway {
            query = query.filter(payment::Column::Gateway.eq(gateway.as_str()));
        }

        let paginator = query
            .order_by_desc(payment::Column::CreatedAt)
            .paginate(&self.db, pagination.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(pagination.page_index()).await?;

        let names = self
            .names_for(models.iter().map(|p| p.appointment_id).collect())
            .await?;

        let rows = models
            .into_iter()
            .map(|model| {
                let (client_name, service_name) =
                    names.get(&model.appointment_id).cloned().unwrap_or((None, None));
                PaymentSummary {
                    payment: Payment::from(model),
                    client_name,
                    service_name,
                }
            })
            .collect();

        Ok((rows, total))
    }
}
