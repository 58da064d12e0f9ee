use sea_orm_migration::prelude::*;

use contactgate_email_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
