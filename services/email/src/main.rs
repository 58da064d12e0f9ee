use sea_orm::Database;
use tracing::info;

use contactgate_core::config::Config as _;
use contactgate_core::tracing::init_tracing;

use contactgate_email::config::EmailConfig;
use contactgate_email::domain::types::{AccountToken, SharedDefaults};
use contactgate_email::infra::postmark::PostmarkClient;
use contactgate_email::router::build_router;
use contactgate_email::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = EmailConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        provider: PostmarkClient::new(config.postmark_base_url.clone()),
        defaults: SharedDefaults::new(config.postmark_server_token.clone()),
        account_token: config.postmark_account_token.clone().map(AccountToken),
        queue_proxy_name: config.queue_proxy_name.clone(),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.email_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("email service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
