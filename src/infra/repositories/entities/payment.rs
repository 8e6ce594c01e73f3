//! Payment database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Gateway, Payment, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub gateway: String,
    pub amount_cents: i64,
    pub status: String,
    #[sea_orm(unique)]
    pub external_id: String,
    pub gateway_data: Json,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub processed_at: Option<DateTimeUtc>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::appointment::Entity",
        from = "Column::AppointmentId",
        to = "super::appointment::Column::Id",
        on_delete = "Cascade"
    )]
    Appointment,
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Payment {
            id: model.id,
            appointment_id: model.appointment_id,
            // Rows are only ever written from a parsed gateway
            gateway: model.gateway.parse().unwrap_or(Gateway::Pix),
            amount_cents: model.amount_cents,
            status: PaymentStatus::from(model.status.as_str()),
            external_id: model.external_id,
            gateway_data: model.gateway_data,
            expires_at: model.expires_at,
            created_at: model.created_at,
            processed_at: model.processed_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        ActiveModel {
            id: Set(payment.id),
            appointment_id: Set(payment.appointment_id),
            gateway: Set(payment.gateway.as_str().to_string()),
            amount_cents: Set(payment.amount_cents),
            status: Set(payment.status.as_str().to_string()),
            external_id: Set(payment.external_id.clone()),
            gateway_data: Set(payment.gateway_data.clone()),
            expires_at: Set(payment.expires_at),
            created_at: Set(payment.created_at),
            processed_at: Set(payment.processed_at),
            updated_at: Set(payment.updated_at),
        }
    }
}
