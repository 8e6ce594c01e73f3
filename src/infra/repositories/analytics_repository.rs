//! Read model for analytics: appointments flattened with display names.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::{appointment, client, professional, service};
use crate::domain::{AppointmentFact, AppointmentStatus};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Analytics read repository.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Company appointments starting at or after `since` (all when `None`)
    async fn facts(&self, company_id: Uuid, since: Option<DateTime<Utc>>) -> AppResult<Vec<AppointmentFact>>;
}

/// SeaORM-backed analytics repository
pub struct AnalyticsStore {
    db: DatabaseConnection,
}

impl AnalyticsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalyticsRepository for AnalyticsStore {
    async fn facts(&self, company_id: Uuid, since: Option<DateTime<Utc>>) -> AppResult<Vec<AppointmentFact>> {
        let mut query = appointment::Entity::find().filter(appointment::Column::CompanyId.eq(company_id));
        if let Some(since) = since {
            query = query.filter(appointment::Column::StartsAt.gte(since));
        }

        let appointments = query
            .order_by_asc(appointment::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        let clients: HashMap<Uuid, client::Model> = client::Entity::find()
            .filter(client::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let professionals: HashMap<Uuid, String> = professional::Entity::find()
            .filter(professional::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let services: HashMap<Uuid, String> = service::Entity::find()
            .filter(service::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await
            .map_err(AppError::from)?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(appointments
            .into_iter()
            .map(|a| {
                let client = clients.get(&a.client_id);
                AppointmentFact {
                    appointment_id: a.id,
                    client_id: a.client_id,
                    client_name: client.map(|c| c.name.clone()).unwrap_or_default(),
                    client_phone: client.map(|c| c.phone.clone()).unwrap_or_default(),
                    professional_id: a.professional_id,
                    professional_name: professionals.get(&a.professional_id).cloned().unwrap_or_default(),
                    service_id: a.service_id,
                    service_name: services.get(&a.service_id).cloned().unwrap_or_default(),
                    status: AppointmentStatus::from(a.status.as_str()),
                    starts_at: a.starts_at,
                    total_cents: a.total_cents,
                    service_price_cents: a.service_price_cents,
                }
            })
            .collect())
    }
}
