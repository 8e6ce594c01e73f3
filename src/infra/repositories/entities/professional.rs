//! Professional database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Professional, WorkDays};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "professionals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// JSON array of strings
    pub specialties: Json,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub work_start: Option<Time>,
    pub work_end: Option<Time>,
    pub work_days: String,
    pub slot_interval_minutes: i32,
    pub active: bool,
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

impl From<Model> for Professional {
    fn from(model: Model) -> Self {
        Professional {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            specialties: serde_json::from_value(model.specialties).unwrap_or_default(),
            bio: model.bio,
            photo_url: model.photo_url,
            work_start: model.work_start,
            work_end: model.work_end,
            work_days: WorkDays::from_stored(&model.work_days),
            slot_interval_minutes: model.slot_interval_minutes,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Professional> for ActiveModel {
    fn from(professional: &Professional) -> Self {
        ActiveModel {
            id: Set(professional.id),
            company_id: Set(professional.company_id),
            name: Set(professional.name.clone()),
            email: Set(professional.email.clone()),
            phone: Set(professional.phone.clone()),
            specialties: Set(serde_json::json!(professional.specialties)),
            bio: Set(professional.bio.clone()),
            photo_url: Set(professional.photo_url.clone()),
            work_start: Set(professional.work_start),
            work_end: Set(professional.work_end),
            work_days: Set(professional.work_days.as_mask()),
            slot_interval_minutes: Set(professional.slot_interval_minutes),
            active: Set(professional.active),
            created_at: Set(professional.created_at),
            updated_at: Set(professional.updated_at),
        }
    }
}
