//! Appointment repository.
//!
//! Bookings and reschedules run the overlap check and the write inside one
//! serializable transaction, so two concurrent requests for the same slot
//! cannot both commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use super::entities::appointment::{self, ActiveModel, Entity as AppointmentEntity};
use super::entities::client;
use crate::domain::schedule::day_range;
use crate::domain::{Appointment, AppointmentFilter, AppointmentOwner, AppointmentStatus, TimeRange};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Appointment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Insert unless the professional already has a blocking appointment
    /// overlapping it; also records the client's last visit.
    ///
    /// Fails with `SlotUnavailable` on overlap.
    async fn insert_if_available(&self, appointment: Appointment) -> AppResult<Appointment>;

    /// Persist a moved appointment unless the new range overlaps another
    /// blocking appointment of the same professional.
    async fn update_if_available(&self, appointment: Appointment) -> AppResult<Appointment>;

    /// Persist without a conflict check
    async fn update(&self, appointment: Appointment) -> AppResult<Appointment>;

    /// Blocking appointments of a professional overlapping `[from, to)`
    async fn list_blocking(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>>;

    /// Filtered page, newest start first
    async fn list(
        &self,
        company_id: Uuid,
        filter: AppointmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Appointment>, u64)>;

    /// Every appointment starting in `[from, to)`, ascending
    async fn list_between(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>>;

    /// A client's appointments, newest first
    async fn list_for_client(&self, client_id: Uuid) -> AppResult<Vec<Appointment>>;

    /// Scheduled or confirmed appointments starting after `after`
    async fn list_upcoming(&self, company_id: Uuid, after: DateTime<Utc>) -> AppResult<Vec<Appointment>>;

    /// Whether any appointment references the owner
    async fn exists_for(&self, owner: AppointmentOwner) -> AppResult<bool>;
}

/// SeaORM-backed appointment repository
pub struct AppointmentStore {
    db: DatabaseConnection,
}

impl AppointmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn blocking_statuses() -> Vec<&'static str> {
    AppointmentStatus::BLOCKING.iter().map(|s| s.as_str()).collect()
}

/// First blocking appointment of `professional_id` overlapping `range`.
async fn find_conflict<C: ConnectionTrait>(
    conn: &C,
    professional_id: Uuid,
    range: TimeRange,
    exclude: Option<Uuid>,
) -> AppResult<Option<appointment::Model>> {
    let mut query = AppointmentEntity::find()
        .filter(appointment::Column::ProfessionalId.eq(professional_id))
        .filter(appointment::Column::Status.is_in(blocking_statuses()))
        .filter(appointment::Column::StartsAt.lt(range.end))
        .filter(appointment::Column::EndsAt.gt(range.start));

    if let Some(id) = exclude {
        query = query.filter(appointment::Column::Id.ne(id));
    }

    query.one(conn).await.map_err(AppError::from)
}

impl AppointmentStore {
    /// Run the overlap check and `write` in one serializable transaction.
    async fn write_if_available(&self, appointment: Appointment, inserting: bool) -> AppResult<Appointment> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let exclude = if inserting { None } else { Some(appointment.id) };
        let conflict = find_conflict(&txn, appointment.professional_id, appointment.range(), exclude).await?;

        if let Some(existing) = conflict {
            tracing::debug!(
                professional_id = %appointment.professional_id,
                conflicting_id = %existing.id,
                "Slot already taken"
            );
            if let Err(e) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", e);
            }
            return Err(AppError::SlotUnavailable);
        }

        let active = ActiveModel::from(&appointment);
        let written = if inserting {
            active.insert(&txn).await
        } else {
            active.update(&txn).await
        };

        let model = match written {
            Ok(model) => model,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                return Err(AppError::from(e));
            }
        };

        if inserting {
            client::Entity::update_many()
                .col_expr(client::Column::LastVisitAt, Expr::value(appointment.starts_at))
                .filter(client::Column::Id.eq(appointment.client_id))
                .exec(&txn)
                .await
                .map_err(AppError::from)?;
        }

        txn.commit().await.map_err(AppError::from)?;
        Ok(Appointment::from(model))
    }
}

#[async_trait]
impl AppointmentRepository for AppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        let result = AppointmentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Appointment::from))
    }

    async fn insert_if_available(&self, appointment: Appointment) -> AppResult<Appointment> {
        self.write_if_available(appointment, true).await
    }

    async fn update_if_available(&self, appointment: Appointment) -> AppResult<Appointment> {
        self.write_if_available(appointment, false).await
    }

    async fn update(&self, appointment: Appointment) -> AppResult<Appointment> {
        let model = ActiveModel::from(&appointment)
            .update(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Appointment::from(model))
    }

    async fn list_blocking(
        &self,
        professional_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let models = AppointmentEntity::find()
            .filter(appointment::Column::ProfessionalId.eq(professional_id))
            .filter(appointment::Column::Status.is_in(blocking_statuses()))
            .filter(appointment::Column::StartsAt.lt(to))
            .filter(appointment::Column::EndsAt.gt(from))
            .order_by_asc(appointment::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Appointment::from).collect())
    }

    async fn list(
        &self,
        company_id: Uuid,
        filter: AppointmentFilter,
        pagination: PaginationParams,
    ) -> AppResult<(Vec<Appointment>, u64)> {
        let mut query = AppointmentEntity::find().filter(appointment::Column::CompanyId.eq(company_id));

        if let Some(from) = filter.from {
            query = query.filter(appointment::Column::StartsAt.gte(day_range(from).start));
        }
        if let Some(to) = filter.to {
            query = query.filter(appointment::Column::StartsAt.lt(day_range(to).end));
        }
        if let Some(professional_id) = filter.professional_id {
            query = query.filter(appointment::Column::ProfessionalId.eq(professional_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(appointment::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .order_by_desc(appointment::Column::StartsAt)
            .paginate(&self.db, pagination.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(pagination.page_index()).await?;

        Ok((models.into_iter().map(Appointment::from).collect(), total))
    }

    async fn list_between(
        &self,
        company_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Appointment>> {
        let models = AppointmentEntity::find()
            .filter(appointment::Column::CompanyId.eq(company_id))
            .filter(appointment::Column::StartsAt.gte(from))
            .filter(appointment::Column::StartsAt.lt(to))
            .order_by_asc(appointment::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Appointment::from).collect())
    }

    async fn list_for_client(&self, client_id: Uuid) -> AppResult<Vec<Appointment>> {
        let models = AppointmentEntity::find()
            .filter(appointment::Column::ClientId.eq(client_id))
            .order_by_desc(appointment::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Appointment::from).collect())
    }

    async fn list_upcoming(&self, company_id: Uuid, after: DateTime<Utc>) -> AppResult<Vec<Appointment>> {
        let models = AppointmentEntity::find()
            .filter(appointment::Column::CompanyId.eq(company_id))
            .filter(appointment::Column::StartsAt.gt(after))
            .filter(appointment::Column::Status.is_in([
                AppointmentStatus::Scheduled.as_str(),
                AppointmentStatus::Confirmed.as_str(),
            ]))
            .order_by_asc(appointment::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Appointment::from).collect())
    }

    async fn exists_for(&self, owner: AppointmentOwner) -> AppResult<bool> {
        let condition = match owner {
            AppointmentOwner::Client(id) => appointment::Column::ClientId.eq(id),
            AppointmentOwner::Professional(id) => appointment::Column::ProfessionalId.eq(id),
            AppointmentOwner::Service(id) => appointment::Column::ServiceId.eq(id),
        };

        let count = AppointmentEntity::find()
            .filter(condition)
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Statement, Transaction, Value};

    fn appointment_at(hour: u32) -> Appointment {
        let starts_at = Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            starts_at,
            ends_at: starts_at + chrono::Duration::minutes(30),
            status: AppointmentStatus::Scheduled,
            client_notes: None,
            professional_notes: None,
            internal_notes: None,
            service_price_cents: 5_000,
            discount_cents: 0,
            total_cents: 5_000,
            created_at: starts_at,
            updated_at: starts_at,
            confirmed_at: None,
            cancelled_at: None,
        }
    }

    fn model_of(appointment: &Appointment) -> appointment::Model {
        appointment::Model {
            id: appointment.id,
            company_id: appointment.company_id,
            client_id: appointment.client_id,
            professional_id: appointment.professional_id,
            service_id: appointment.service_id,
            starts_at: appointment.starts_at,
            ends_at: appointment.ends_at,
            status: appointment.status.as_str().to_string(),
            client_notes: None,
            professional_notes: None,
            internal_notes: None,
            service_price_cents: appointment.service_price_cents,
            discount_cents: appointment.discount_cents,
            total_cents: appointment.total_cents,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
            confirmed_at: None,
            cancelled_at: None,
        }
    }

    fn statements(log: &[Transaction]) -> Vec<Statement> {
        log.iter().flat_map(|txn| txn.statements().to_vec()).collect()
    }

    fn conflict_select(statements: &[Statement]) -> &Statement {
        statements
            .iter()
            .find(|stmt| stmt.sql.starts_with("SELECT"))
            .expect("conflict query issued")
    }

    fn bound_values(stmt: &Statement) -> Vec<Value> {
        stmt.values.as_ref().map(|v| v.0.clone()).unwrap_or_default()
    }

    #[test]
    fn test_blocking_statuses_match_domain() {
        assert_eq!(blocking_statuses(), vec!["scheduled", "confirmed", "in_progress"]);
    }

    #[tokio::test]
    async fn test_insert_rejects_overlap_without_writing() {
        let requested = appointment_at(10);
        let mut existing = appointment_at(10);
        existing.professional_id = requested.professional_id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model_of(&existing)]])
            .into_connection();
        let store = AppointmentStore::new(db.clone());

        let result = store.insert_if_available(requested).await;
        assert!(matches!(result, Err(AppError::SlotUnavailable)));

        let log = statements(&db.into_transaction_log());
        assert!(log.iter().all(|stmt| !stmt.sql.starts_with("INSERT")));
        assert!(log.iter().all(|stmt| !stmt.sql.starts_with("UPDATE")));
        assert_eq!(log.last().map(|stmt| stmt.sql.as_str()), Some("ROLLBACK"));
    }

    #[tokio::test]
    async fn test_insert_checks_half_open_overlap_and_records_visit() {
        let requested = appointment_at(14);
        let range = requested.range();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<appointment::Model>::new(), vec![model_of(&requested)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let store = AppointmentStore::new(db.clone());

        let saved = store.insert_if_available(requested.clone()).await.unwrap();
        assert_eq!(saved.id, requested.id);

        let log = statements(&db.into_transaction_log());
        let select = conflict_select(&log);
        assert!(select.sql.contains(r#""appointments"."starts_at" < $"#));
        assert!(select.sql.contains(r#""appointments"."ends_at" > $"#));
        assert!(!select.sql.contains(r#""appointments"."id" <> $"#));

        let values = bound_values(select);
        assert!(values.contains(&Value::from(range.end)));
        assert!(values.contains(&Value::from(range.start)));

        let visit = log
            .iter()
            .position(|stmt| stmt.sql.starts_with(r#"UPDATE "clients""#))
            .expect("last visit recorded");
        let commit = log.iter().position(|stmt| stmt.sql == "COMMIT").expect("committed");
        assert!(visit < commit);
    }

    #[tokio::test]
    async fn test_update_excludes_itself_from_conflicts() {
        let moved = appointment_at(16);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<appointment::Model>::new(), vec![model_of(&moved)]])
            .into_connection();
        let store = AppointmentStore::new(db.clone());

        store.update_if_available(moved.clone()).await.unwrap();

        let log = statements(&db.into_transaction_log());
        let select = conflict_select(&log);
        assert!(select.sql.contains(r#""appointments"."id" <> $"#));
        assert!(bound_values(select).contains(&Value::from(moved.id)));
        assert!(log.iter().all(|stmt| !stmt.sql.starts_with(r#"UPDATE "clients""#)));
        assert_eq!(log.last().map(|stmt| stmt.sql.as_str()), Some("COMMIT"));
    }
}
