use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailSettings::TenantId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmailSettings::ServerMode)
                            .string()
                            .not_null()
                            .default("shared"),
                    )
                    .col(ColumnDef::new(EmailSettings::TransactionalServerId).big_integer())
                    .col(ColumnDef::new(EmailSettings::TransactionalServerToken).string())
                    .col(ColumnDef::new(EmailSettings::TransactionalStreamId).string())
                    .col(ColumnDef::new(EmailSettings::MarketingServerId).big_integer())
                    .col(ColumnDef::new(EmailSettings::MarketingServerToken).string())
                    .col(ColumnDef::new(EmailSettings::MarketingStreamId).string())
                    .col(ColumnDef::new(EmailSettings::DefaultFromEmail).string())
                    .col(ColumnDef::new(EmailSettings::DefaultFromName).string())
                    .col(ColumnDef::new(EmailSettings::DefaultReplyTo).string())
                    .col(ColumnDef::new(EmailSettings::CustomFromEmail).string())
                    .col(ColumnDef::new(EmailSettings::CustomFromName).string())
                    .col(ColumnDef::new(EmailSettings::CustomReplyTo).string())
                    .col(
                        ColumnDef::new(EmailSettings::TrackOpens)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EmailSettings::TrackLinks)
                            .string()
                            .not_null()
                            .default("None"),
                    )
                    .col(
                        ColumnDef::new(EmailSettings::ActivationStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(EmailSettings::ActivationError).string())
                    .col(ColumnDef::new(EmailSettings::ActivatedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(EmailSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EmailSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EmailSettings::Table, EmailSettings::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailSettings {
    Table,
    TenantId,
    ServerMode,
    TransactionalServerId,
    TransactionalServerToken,
    TransactionalStreamId,
    MarketingServerId,
    MarketingServerToken,
    MarketingStreamId,
    DefaultFromEmail,
    DefaultFromName,
    DefaultReplyTo,
    CustomFromEmail,
    CustomFromName,
    CustomReplyTo,
    TrackOpens,
    TrackLinks,
    ActivationStatus,
    ActivationError,
    ActivatedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tenants {
    Table,
    Id,
}
