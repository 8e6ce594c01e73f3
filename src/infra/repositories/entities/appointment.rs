//! Appointment database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Appointment, AppointmentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTimeUtc,
    pub ends_at: DateTimeUtc,
    pub status: String,
    pub client_notes: Option<String>,
    pub professional_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub service_price_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub confirmed_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::professional::Entity",
        from = "Column::ProfessionalId",
        to = "super::professional::Column::Id"
    )]
    Professional,
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::professional::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professional.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Appointment {
    fn from(model: Model) -> Self {
        Appointment {
            id: model.id,
            company_id: model.company_id,
            client_id: model.client_id,
            professional_id: model.professional_id,
            service_id: model.service_id,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            status: AppointmentStatus::from(model.status.as_str()),
            client_notes: model.client_notes,
            professional_notes: model.professional_notes,
            internal_notes: model.internal_notes,
            service_price_cents: model.service_price_cents,
            discount_cents: model.discount_cents,
            total_cents: model.total_cents,
            created_at: model.created_at,
            updated_at: model.updated_at,
            confirmed_at: model.confirmed_at,
            cancelled_at: model.cancelled_at,
        }
    }
}

impl From<&Appointment> for ActiveModel {
    fn from(appointment: &Appointment) -> Self {
        ActiveModel {
            id: Set(appointment.id),
            company_id: Set(appointment.company_id),
            client_id: Set(appointment.client_id),
            professional_id: Set(appointment.professional_id),
            service_id: Set(appointment.service_id),
            starts_at: Set(appointment.starts_at),
            ends_at: Set(appointment.ends_at),
            status: Set(appointment.status.as_str().to_string()),
            client_notes: Set(appointment.client_notes.clone()),
            professional_notes: Set(appointment.professional_notes.clone()),
            internal_notes: Set(appointment.internal_notes.clone()),
            service_price_cents: Set(appointment.service_price_cents),
            discount_cents: Set(appointment.discount_cents),
            total_cents: Set(appointment.total_cents),
            created_at: Set(appointment.created_at),
            updated_at: Set(appointment.updated_at),
            confirmed_at: Set(appointment.confirmed_at),
            cancelled_at: Set(appointment.cancelled_at),
        }
    }
}
