use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailSuppressions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailSuppressions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailSuppressions::TenantId).uuid().not_null())
                    .col(ColumnDef::new(EmailSuppressions::Email).string().not_null())
                    .col(
                        ColumnDef::new(EmailSuppressions::AppliesTo)
                            .string()
                            .not_null()
                            .default("all"),
                    )
                    .col(ColumnDef::new(EmailSuppressions::Reason).string())
                    .col(ColumnDef::new(EmailSuppressions::Origin).string())
                    .col(
                        ColumnDef::new(EmailSuppressions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EmailSuppressions::Table, EmailSuppressions::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_suppressions_tenant_email")
                    .table(EmailSuppressions::Table)
                    .col(EmailSuppressions::TenantId)
                    .col(EmailSuppressions::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailSuppressions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EmailSuppressions {
    Table,
    Id,
    TenantId,
    Email,
    AppliesTo,
    Reason,
    Origin,
    CreatedAt,
}

#[derive(Iden)]
enum Tenants {
    Table,
    Id,
}
