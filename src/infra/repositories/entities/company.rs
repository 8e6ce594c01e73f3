//! Company database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Company, Plan, WorkDays};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub opening_time: Option<Time>,
    pub closing_time: Option<Time>,
    pub working_days: String,
    pub plan: String,
    pub whatsapp_enabled: bool,
    pub email_enabled: bool,
    pub whatsapp_token: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client::Entity")]
    Clients,
    #[sea_orm(has_many = "super::professional::Entity")]
    Professionals,
    #[sea_orm(has_many = "super::service::Entity")]
    Services,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl Related<super::professional::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professionals.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Company {
    fn from(model: Model) -> Self {
        Company {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            logo_url: model.logo_url,
            primary_color: model.primary_color,
            secondary_color: model.secondary_color,
            accent_color: model.accent_color,
            opening_time: model.opening_time,
            closing_time: model.closing_time,
            working_days: WorkDays::from_stored(&model.working_days),
            plan: Plan::from(model.plan.as_str()),
            whatsapp_enabled: model.whatsapp_enabled,
            email_enabled: model.email_enabled,
            whatsapp_token: model.whatsapp_token,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Company> for ActiveModel {
    fn from(company: &Company) -> Self {
        ActiveModel {
            id: Set(company.id),
            name: Set(company.name.clone()),
            email: Set(company.email.clone()),
            phone: Set(company.phone.clone()),
            address: Set(company.address.clone()),
            logo_url: Set(company.logo_url.clone()),
            primary_color: Set(company.primary_color.clone()),
            secondary_color: Set(company.secondary_color.clone()),
            accent_color: Set(company.accent_color.clone()),
            opening_time: Set(company.opening_time),
            closing_time: Set(company.closing_time),
            working_days: Set(company.working_days.as_mask()),
            plan: Set(company.plan.as_str().to_string()),
            whatsapp_enabled: Set(company.whatsapp_enabled),
            email_enabled: Set(company.email_enabled),
            whatsapp_token: Set(company.whatsapp_token.clone()),
            created_at: Set(company.created_at),
            updated_at: Set(company.updated_at),
        }
    }
}
