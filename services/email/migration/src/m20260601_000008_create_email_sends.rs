use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailSends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EmailSends::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EmailSends::TenantId).uuid().not_null())
                    .col(ColumnDef::new(EmailSends::ContactId).uuid())
                    .col(ColumnDef::new(EmailSends::MessageId).string().not_null())
                    .col(ColumnDef::new(EmailSends::ToEmail).string().not_null())
                    .col(ColumnDef::new(EmailSends::Subject).string().not_null())
                    .col(ColumnDef::new(EmailSends::Status).string().not_null())
                    .col(ColumnDef::new(EmailSends::ServerType).string().not_null())
                    .col(ColumnDef::new(EmailSends::MessageStream).string().not_null())
                    .col(ColumnDef::new(EmailSends::Tag).string())
                    .col(ColumnDef::new(EmailSends::Metadata).json_binary())
                    .col(
                        ColumnDef::new(EmailSends::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmailSends::CreatedAt)
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
                    .name("idx_email_sends_tenant_sent_at")
                    .table(EmailSends::Table)
                    .col(EmailSends::TenantId)
                    .col(EmailSends::SentAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailSends::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailSends {
    Table,
    Id,
    TenantId,
    ContactId,
    MessageId,
    ToEmail,
    Subject,
    Status,
    ServerType,
    MessageStream,
    Tag,
    Metadata,
    SentAt,
    CreatedAt,
}
