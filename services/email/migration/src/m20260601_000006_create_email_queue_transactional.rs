use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_queue_table(
            manager,
            "email_queue_transactional",
            "idx_email_queue_transactional_due",
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("email_queue_transactional"))
                    .to_owned(),
            )
            .await
    }
}

/// Shared column layout for both queue tables; the marketing migration
/// reuses it with its own table name.
pub(crate) async fn create_queue_table(
    manager: &SchemaManager<'_>,
    table_name: &str,
    due_index_name: &str,
) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Alias::new(table_name))
                .if_not_exists()
                .col(
                    ColumnDef::new(QueueColumn::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(QueueColumn::TenantId).uuid().not_null())
                .col(ColumnDef::new(QueueColumn::ToEmail).string().not_null())
                .col(ColumnDef::new(QueueColumn::FromEmail).string())
                .col(ColumnDef::new(QueueColumn::FromName).string())
                .col(ColumnDef::new(QueueColumn::Subject).string().not_null())
                .col(ColumnDef::new(QueueColumn::HtmlBody).text())
                .col(ColumnDef::new(QueueColumn::TextBody).text())
                .col(ColumnDef::new(QueueColumn::TemplateId).big_integer())
                .col(ColumnDef::new(QueueColumn::TemplateData).json_binary())
                .col(ColumnDef::new(QueueColumn::MessageStream).string())
                .col(
                    ColumnDef::new(QueueColumn::ServerMode)
                        .string()
                        .not_null()
                        .default("shared"),
                )
                .col(
                    ColumnDef::new(QueueColumn::Priority)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(QueueColumn::Status)
                        .string()
                        .not_null()
                        .default("pending"),
                )
                .col(
                    ColumnDef::new(QueueColumn::ScheduledFor)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .col(
                    ColumnDef::new(QueueColumn::RetryCount)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(ColumnDef::new(QueueColumn::ErrorMessage).string())
                .col(ColumnDef::new(QueueColumn::LastErrorAt).timestamp_with_time_zone())
                .col(ColumnDef::new(QueueColumn::ProviderMessageId).string())
                .col(ColumnDef::new(QueueColumn::SentAt).timestamp_with_time_zone())
                .col(ColumnDef::new(QueueColumn::LeaseExpiresAt).timestamp_with_time_zone())
                .col(ColumnDef::new(QueueColumn::Tag).string())
                .col(ColumnDef::new(QueueColumn::Metadata).json_binary())
                .col(
                    ColumnDef::new(QueueColumn::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp()),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(due_index_name)
                .table(Alias::new(table_name))
                .col(QueueColumn::Status)
                .col(QueueColumn::ScheduledFor)
                .to_owned(),
        )
        .await
}

#[derive(Iden)]
pub(crate) enum QueueColumn {
    Id,
    TenantId,
    ToEmail,
    FromEmail,
    FromName,
    Subject,
    HtmlBody,
    TextBody,
    TemplateId,
    TemplateData,
    MessageStream,
    ServerMode,
    Priority,
    Status,
    ScheduledFor,
    RetryCount,
    ErrorMessage,
    LastErrorAt,
    ProviderMessageId,
    SentAt,
    LeaseExpiresAt,
    Tag,
    Metadata,
    CreatedAt,
}
