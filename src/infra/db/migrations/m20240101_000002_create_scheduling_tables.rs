//! Migration: Create appointments, payments and notifications tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_tenancy_tables::{Clients, Companies, Professionals, Services};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appointments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Appointments::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::ClientId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::ProfessionalId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::StartsAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Appointments::EndsAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Appointments::Status).string_len(20).not_null().default("scheduled"))
                    .col(ColumnDef::new(Appointments::ClientNotes).text().null())
                    .col(ColumnDef::new(Appointments::ProfessionalNotes).text().null())
                    .col(ColumnDef::new(Appointments::InternalNotes).text().null())
                    .col(ColumnDef::new(Appointments::ServicePriceCents).big_integer().not_null())
                    .col(ColumnDef::new(Appointments::DiscountCents).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Appointments::TotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Appointments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Appointments::UpdatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Appointments::ConfirmedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Appointments::CancelledAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_company")
                            .from(Appointments::Table, Appointments::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_client")
                            .from(Appointments::Table, Appointments::ClientId)
                            .to(Clients::Table, Clients::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_professional")
                            .from(Appointments::Table, Appointments::ProfessionalId)
                            .to(Professionals::Table, Professionals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_service")
                            .from(Appointments::Table, Appointments::ServiceId)
                            .to(Services::Table, Services::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict checks scan one professional's calendar by start time
        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_professional_starts_at")
                    .table(Appointments::Table)
                    .col(Appointments::ProfessionalId)
                    .col(Appointments::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_company_starts_at")
                    .table(Appointments::Table)
                    .col(Appointments::CompanyId)
                    .col(Appointments::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::AppointmentId).uuid().not_null())
                    .col(ColumnDef::new(Payments::Gateway).string_len(20).not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Status).string_len(20).not_null().default("pending"))
                    .col(ColumnDef::new(Payments::ExternalId).string_len(100).not_null().unique_key())
                    .col(ColumnDef::new(Payments::GatewayData).json_binary().not_null())
                    .col(ColumnDef::new(Payments::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Payments::ProcessedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_appointment")
                            .from(Payments::Table, Payments::AppointmentId)
                            .to(Appointments::Table, Appointments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notifications::AppointmentId).uuid().null())
                    .col(ColumnDef::new(Notifications::Kind).string_len(20).not_null())
                    .col(ColumnDef::new(Notifications::Channel).string_len(20).not_null())
                    .col(ColumnDef::new(Notifications::Recipient).string_len(255).not_null())
                    .col(ColumnDef::new(Notifications::Subject).string_len(255).null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(ColumnDef::new(Notifications::Status).string_len(20).not_null().default("pending"))
                    .col(ColumnDef::new(Notifications::Attempts).integer().not_null().default(0))
                    .col(ColumnDef::new(Notifications::ErrorDetails).text().null())
                    .col(ColumnDef::new(Notifications::SendAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Notifications::SentAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Notifications::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Notifications::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_appointment")
                            .from(Notifications::Table, Notifications::AppointmentId)
                            .to(Appointments::Table, Appointments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Dispatcher sweeps pending rows by due time
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_status_send_at")
                    .table(Notifications::Table)
                    .col(Notifications::Status)
                    .col(Notifications::SendAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
    CompanyId,
    ClientId,
    ProfessionalId,
    ServiceId,
    StartsAt,
    EndsAt,
    Status,
    ClientNotes,
    ProfessionalNotes,
    InternalNotes,
    ServicePriceCents,
    DiscountCents,
    TotalCents,
    CreatedAt,
    UpdatedAt,
    ConfirmedAt,
    CancelledAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    AppointmentId,
    Gateway,
    AmountCents,
    Status,
    ExternalId,
    GatewayData,
    ExpiresAt,
    CreatedAt,
    ProcessedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    AppointmentId,
    Kind,
    Channel,
    Recipient,
    Subject,
    Message,
    Status,
    Attempts,
    ErrorDetails,
    SendAt,
    SentAt,
    CreatedAt,
    UpdatedAt,
}
