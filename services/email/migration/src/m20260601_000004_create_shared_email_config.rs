use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SharedEmailConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SharedEmailConfig::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SharedEmailConfig::TransactionalServerId).big_integer())
                    .col(
                        ColumnDef::new(SharedEmailConfig::TransactionalServerToken)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::TransactionalStreamId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SharedEmailConfig::MarketingServerId).big_integer())
                    .col(
                        ColumnDef::new(SharedEmailConfig::MarketingServerToken)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::MarketingStreamId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::DefaultFromEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::DefaultFromName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::DefaultReplyTo)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SharedEmailConfig::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SharedEmailConfig::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SharedEmailConfig {
    Table,
    Id,
    TransactionalServerId,
    TransactionalServerToken,
    TransactionalStreamId,
    MarketingServerId,
    MarketingServerToken,
    MarketingStreamId,
    DefaultFromEmail,
    DefaultFromName,
    DefaultReplyTo,
    UpdatedAt,
}
