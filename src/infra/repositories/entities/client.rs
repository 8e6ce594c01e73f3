//! Client database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Client, NotificationPreferences};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    /// Unique per company
    pub phone: String,
    pub email: Option<String>,
    pub document: Option<String>,
    pub birth_date: Option<Date>,
    pub address: Option<String>,
    pub custom_fields: Option<Json>,
    pub preferences: Option<Json>,
    pub notes: Option<String>,
    pub active: bool,
    pub notification_preferences: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub last_visit_at: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Client {
    fn from(model: Model) -> Self {
        Client {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            document: model.document,
            birth_date: model.birth_date,
            address: model.address,
            custom_fields: model.custom_fields,
            preferences: model.preferences,
            notes: model.notes,
            active: model.active,
            notification_preferences: NotificationPreferences::from_json(model.notification_preferences),
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_visit_at: model.last_visit_at,
        }
    }
}

impl From<&Client> for ActiveModel {
    fn from(client: &Client) -> Self {
        ActiveModel {
            id: Set(client.id),
            company_id: Set(client.company_id),
            name: Set(client.name.clone()),
            phone: Set(client.phone.clone()),
            email: Set(client.email.clone()),
            document: Set(client.document.clone()),
            birth_date: Set(client.birth_date),
            address: Set(client.address.clone()),
            custom_fields: Set(client.custom_fields.clone()),
            preferences: Set(client.preferences.clone()),
            notes: Set(client.notes.clone()),
            active: Set(client.active),
            notification_preferences: Set(Some(client.notification_preferences.to_json())),
            created_at: Set(client.created_at),
            updated_at: Set(client.updated_at),
            last_visit_at: Set(client.last_visit_at),
        }
    }
}
