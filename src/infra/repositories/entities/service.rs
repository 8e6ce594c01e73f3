//! Service (catalog) database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Service;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub category: Option<String>,
    pub active: bool,
    pub requires_preparation: bool,
    pub preparation_minutes: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
    #[sea_orm(has_many = "super::professional_service::Entity")]
    Assignments,
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

impl Related<super::professional_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Service {
    fn from(model: Model) -> Self {
        Service {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            description: model.description,
            duration_minutes: model.duration_minutes,
            price_cents: model.price_cents,
            category: model.category,
            active: model.active,
            requires_preparation: model.requires_preparation,
            preparation_minutes: model.preparation_minutes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Service> for ActiveModel {
    fn from(service: &Service) -> Self {
        ActiveModel {
            id: Set(service.id),
            company_id: Set(service.company_id),
            name: Set(service.name.clone()),
            description: Set(service.description.clone()),
            duration_minutes: Set(service.duration_minutes),
            price_cents: Set(service.price_cents),
            category: Set(service.category.clone()),
            active: Set(service.active),
            requires_preparation: Set(service.requires_preparation),
            preparation_minutes: Set(service.preparation_minutes),
            created_at: Set(service.created_at),
            updated_at: Set(service.updated_at),
        }
    }
}
