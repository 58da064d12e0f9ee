use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailWebhookEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailWebhookEvents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailWebhookEvents::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmailWebhookEvents::EventType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailWebhookEvents::ServerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmailWebhookEvents::MessageId).string())
                    .col(ColumnDef::new(EmailWebhookEvents::RecipientEmail).string())
                    .col(
                        ColumnDef::new(EmailWebhookEvents::EventData)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailWebhookEvents::RawPayload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailWebhookEvents::ProcessedAt)
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
            .drop_table(Table::drop().table(EmailWebhookEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailWebhookEvents {
    Table,
    Id,
    TenantId,
    EventType,
    ServerId,
    MessageId,
    RecipientEmail,
    EventData,
    RawPayload,
    ProcessedAt,
}
