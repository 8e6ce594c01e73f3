//! Professional-to-service assignment entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::ServiceAssignment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "professional_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub professional_id: Uuid,
    pub custom_price_cents: Option<i64>,
    pub custom_duration_minutes: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id",
        on_delete = "Cascade"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::professional::Entity",
        from = "Column::ProfessionalId",
        to = "super::professional::Column::Id",
        on_delete = "Cascade"
    )]
    Professional,
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::professional::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professional.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceAssignment {
    fn from(model: Model) -> Self {
        ServiceAssignment {
            id: model.id,
            service_id: model.service_id,
            professional_id: model.professional_id,
            custom_price_cents: model.custom_price_cents,
            custom_duration_minutes: model.custom_duration_minutes,
            created_at: model.created_at,
        }
    }
}

impl From<&ServiceAssignment> for ActiveModel {
    fn from(assignment: &ServiceAssignment) -> Self {
        ActiveModel {
            id: Set(assignment.id),
            service_id: Set(assignment.service_id),
            professional_id: Set(assignment.professional_id),
            custom_price_cents: Set(assignment.custom_price_cents),
            custom_duration_minutes: Set(assignment.custom_duration_minutes),
            created_at: Set(assignment.created_at),
        }
    }
}
