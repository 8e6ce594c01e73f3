//! Notification (outbox) database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Channel, Notification, NotificationKind, NotificationStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub kind: String,
    pub channel: String,
    pub recipient: String,
    pub subject: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: String,
    pub attempts: i32,
    pub error_details: Option<String>,
    pub send_at: DateTimeUtc,
    pub sent_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
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

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Notification {
            id: model.id,
            appointment_id: model.appointment_id,
            kind: NotificationKind::from(model.kind.as_str()),
            channel: Channel::from(model.channel.as_str()),
            recipient: model.recipient,
            subject: model.subject,
            message: model.message,
            status: NotificationStatus::from(model.status.as_str()),
            attempts: model.attempts,
            error_details: model.error_details,
            send_at: model.send_at,
            sent_at: model.sent_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
