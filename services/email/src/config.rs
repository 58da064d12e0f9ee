use contactgate_core::config::Config;

fn default_email_port() -> u16 {
    3117
}

fn default_postmark_base_url() -> String {
    "https://api.postmarkapp.com".to_owned()
}

fn default_queue_proxy_name() -> String {
    "gateway".to_owned()
}

/// Email service configuration loaded from environment variables.
#[derive(Debug, serde::Deserialize)]
pub struct EmailConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3117). Env var: `EMAIL_PORT`.
    #[serde(default = "default_email_port")]
    pub email_port: u16,
    /// Provider API base URL; overridable for tests.
    #[serde(default = "default_postmark_base_url")]
    pub postmark_base_url: String,
    /// Account-scoped provider token. Required only for the activation
    /// workflow; sends work without it.
    pub postmark_account_token: Option<String>,
    /// Shared server token used for shared-mode sends and as the queue
    /// processor's fallback credential. Required.
    pub postmark_server_token: String,
    /// Value of the `x-proxied-from` header the queue trigger accepts.
    #[serde(default = "default_queue_proxy_name")]
    pub queue_proxy_name: String,
}

impl Config for EmailConfig {}
