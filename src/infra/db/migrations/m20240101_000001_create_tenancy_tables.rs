//! Migration: Create companies, clients, professionals, services and
//! professional_services tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Companies::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Companies::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Companies::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Companies::Phone).string_len(20).null())
                    .col(ColumnDef::new(Companies::Address).text().null())
                    .col(ColumnDef::new(Companies::LogoUrl).string_len(500).null())
                    .col(ColumnDef::new(Companies::PrimaryColor).string_len(7).not_null().default("#007BFF"))
                    .col(ColumnDef::new(Companies::SecondaryColor).string_len(7).not_null().default("#6C757D"))
                    .col(ColumnDef::new(Companies::AccentColor).string_len(7).not_null().default("#28A745"))
                    .col(ColumnDef::new(Companies::OpeningTime).time().null())
                    .col(ColumnDef::new(Companies::ClosingTime).time().null())
                    .col(ColumnDef::new(Companies::WorkingDays).string_len(7).not_null().default("1111100"))
                    .col(ColumnDef::new(Companies::Plan).string_len(20).not_null().default("basic"))
                    .col(ColumnDef::new(Companies::WhatsappEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Companies::EmailEnabled).boolean().not_null().default(true))
                    .col(ColumnDef::new(Companies::WhatsappToken).string_len(500).null())
                    .col(ColumnDef::new(Companies::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Companies::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Clients::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Clients::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Clients::Email).string_len(255).null())
                    .col(ColumnDef::new(Clients::Document).string_len(14).null())
                    .col(ColumnDef::new(Clients::BirthDate).date().null())
                    .col(ColumnDef::new(Clients::Address).text().null())
                    .col(ColumnDef::new(Clients::CustomFields).json_binary().null())
                    .col(ColumnDef::new(Clients::Preferences).json_binary().null())
                    .col(ColumnDef::new(Clients::Notes).text().null())
                    .col(ColumnDef::new(Clients::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Clients::NotificationPreferences).json_binary().null())
                    .col(ColumnDef::new(Clients::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Clients::UpdatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Clients::LastVisitAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clients_company")
                            .from(Clients::Table, Clients::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_company_phone")
                    .table(Clients::Table)
                    .col(Clients::CompanyId)
                    .col(Clients::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Professionals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Professionals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Professionals::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Professionals::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Professionals::Email).string_len(255).null())
                    .col(ColumnDef::new(Professionals::Phone).string_len(20).null())
                    .col(ColumnDef::new(Professionals::Specialties).json_binary().not_null())
                    .col(ColumnDef::new(Professionals::Bio).text().null())
                    .col(ColumnDef::new(Professionals::PhotoUrl).string_len(500).null())
                    .col(ColumnDef::new(Professionals::WorkStart).time().null())
                    .col(ColumnDef::new(Professionals::WorkEnd).time().null())
                    .col(ColumnDef::new(Professionals::WorkDays).string_len(7).not_null().default("1111100"))
                    .col(ColumnDef::new(Professionals::SlotIntervalMinutes).integer().not_null().default(30))
                    .col(ColumnDef::new(Professionals::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Professionals::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Professionals::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_professionals_company")
                            .from(Professionals::Table, Professionals::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Services::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Services::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Services::Description).text().null())
                    .col(ColumnDef::new(Services::DurationMinutes).integer().not_null())
                    .col(ColumnDef::new(Services::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Services::Category).string_len(50).null())
                    .col(ColumnDef::new(Services::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Services::RequiresPreparation).boolean().not_null().default(false))
                    .col(ColumnDef::new(Services::PreparationMinutes).integer().not_null().default(0))
                    .col(ColumnDef::new(Services::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Services::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_company")
                            .from(Services::Table, Services::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProfessionalServices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProfessionalServices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ProfessionalServices::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(ProfessionalServices::ProfessionalId).uuid().not_null())
                    .col(ColumnDef::new(ProfessionalServices::CustomPriceCents).big_integer().null())
                    .col(ColumnDef::new(ProfessionalServices::CustomDurationMinutes).integer().null())
                    .col(ColumnDef::new(ProfessionalServices::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_professional_services_service")
                            .from(ProfessionalServices::Table, ProfessionalServices::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_professional_services_professional")
                            .from(ProfessionalServices::Table, ProfessionalServices::ProfessionalId)
                            .to(Professionals::Table, Professionals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_professional_services_pair")
                    .table(ProfessionalServices::Table)
                    .col(ProfessionalServices::ServiceId)
                    .col(ProfessionalServices::ProfessionalId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfessionalServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Professionals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Companies {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Address,
    LogoUrl,
    PrimaryColor,
    SecondaryColor,
    AccentColor,
    OpeningTime,
    ClosingTime,
    WorkingDays,
    Plan,
    WhatsappEnabled,
    EmailEnabled,
    WhatsappToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Clients {
    Table,
    Id,
    CompanyId,
    Name,
    Phone,
    Email,
    Document,
    BirthDate,
    Address,
    CustomFields,
    Preferences,
    Notes,
    Active,
    NotificationPreferences,
    CreatedAt,
    UpdatedAt,
    LastVisitAt,
}

#[derive(Iden)]
pub(super) enum Professionals {
    Table,
    Id,
    CompanyId,
    Name,
    Email,
    Phone,
    Specialties,
    Bio,
    PhotoUrl,
    WorkStart,
    WorkEnd,
    WorkDays,
    SlotIntervalMinutes,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Services {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    DurationMinutes,
    PriceCents,
    Category,
    Active,
    RequiresPreparation,
    PreparationMinutes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProfessionalServices {
    Table,
    Id,
    ServiceId,
    ProfessionalId,
    CustomPriceCents,
    CustomDurationMinutes,
    CreatedAt,
}
