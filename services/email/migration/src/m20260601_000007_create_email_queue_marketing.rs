use sea_orm_migration::prelude::*;

use crate::m20260601_000006_create_email_queue_transactional::create_queue_table;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_queue_table(manager, "email_queue_marketing", "idx_email_queue_marketing_due")
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("email_queue_marketing"))
                    .to_owned(),
            )
            .await
    }
}
