use sea_orm_migration::prelude::*;

mod m20260601_000001_create_tenants;
mod m20260601_000002_create_contacts;
mod m20260601_000003_create_email_settings;
mod m20260601_000004_create_shared_email_config;
mod m20260601_000005_create_email_suppressions;
mod m20260601_000006_create_email_queue_transactional;
mod m20260601_000007_create_email_queue_marketing;
mod m20260601_000008_create_email_sends;
mod m20260601_000009_create_email_webhook_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_tenants::Migration),
            Box::new(m20260601_000002_create_contacts::Migration),
            Box::new(m20260601_000003_create_email_settings::Migration),
            Box::new(m20260601_000004_create_shared_email_config::Migration),
            Box::new(m20260601_000005_create_email_suppressions::Migration),
            Box::new(m20260601_000006_create_email_queue_transactional::Migration),
            Box::new(m20260601_000007_create_email_queue_marketing::Migration),
            Box::new(m20260601_000008_create_email_sends::Migration),
            Box::new(m20260601_000009_create_email_webhook_events::Migration),
        ]
    }
}
