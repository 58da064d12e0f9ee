use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    LaneConfig, PLATFORM_FROM_EMAIL, PLATFORM_FROM_NAME, PLATFORM_REPLY_TO, SenderIdentity,
    SharedEmailConfig,
};
use crate::error::EmailServiceError;
use crate::state::AppState;
use crate::usecase::settings::{GetSharedConfigUseCase, UpdateSharedConfigUseCase};

fn require_super_admin(headers: &HeaderMap) -> Result<(), EmailServiceError> {
    let is_super_admin = headers
        .get("x-super-admin")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true");
    if is_super_admin {
        Ok(())
    } else {
        Err(EmailServiceError::Forbidden)
    }
}

/// Flat wire shape of the shared singleton, as the admin screen edits it.
#[derive(Debug, Serialize, Deserialize)]
pub struct SharedConfigView {
    #[serde(default)]
    pub transactional_server_id: Option<i64>,
    #[serde(default)]
    pub transactional_server_token: String,
    #[serde(default = "default_transactional_stream")]
    pub transactional_stream_id: String,
    #[serde(default)]
    pub marketing_server_id: Option<i64>,
    #[serde(default)]
    pub marketing_server_token: String,
    #[serde(default = "default_marketing_stream")]
    pub marketing_stream_id: String,
    #[serde(default = "default_from_email")]
    pub default_from_email: String,
    #[serde(default = "default_from_name")]
    pub default_from_name: String,
    #[serde(default = "default_reply_to")]
    pub default_reply_to: String,
}

fn default_transactional_stream() -> String {
    "outbound".to_owned()
}

fn default_marketing_stream() -> String {
    "broadcasts".to_owned()
}

fn default_from_email() -> String {
    PLATFORM_FROM_EMAIL.to_owned()
}

fn default_from_name() -> String {
    PLATFORM_FROM_NAME.to_owned()
}

fn default_reply_to() -> String {
    PLATFORM_REPLY_TO.to_owned()
}

impl SharedConfigView {
    fn placeholder() -> Self {
        Self {
            transactional_server_id: None,
            transactional_server_token: String::new(),
            transactional_stream_id: default_transactional_stream(),
            marketing_server_id: None,
            marketing_server_token: String::new(),
            marketing_stream_id: default_marketing_stream(),
            default_from_email: default_from_email(),
            default_from_name: default_from_name(),
            default_reply_to: default_reply_to(),
        }
    }

    fn from_config(config: SharedEmailConfig) -> Self {
        Self {
            transactional_server_id: config.transactional.server_id,
            transactional_server_token: config.transactional.server_token.unwrap_or_default(),
            transactional_stream_id: config
                .transactional
                .stream_id
                .unwrap_or_else(default_transactional_stream),
            marketing_server_id: config.marketing.server_id,
            marketing_server_token: config.marketing.server_token.unwrap_or_default(),
            marketing_stream_id: config
                .marketing
                .stream_id
                .unwrap_or_else(default_marketing_stream),
            default_from_email: config.default_sender.email.unwrap_or_else(default_from_email),
            default_from_name: config.default_sender.name.unwrap_or_else(default_from_name),
            default_reply_to: config
                .default_sender
                .reply_to
                .unwrap_or_else(default_reply_to),
        }
    }

    fn into_config(self) -> SharedEmailConfig {
        SharedEmailConfig {
            transactional: LaneConfig {
                server_id: self.transactional_server_id,
                server_token: Some(self.transactional_server_token),
                stream_id: Some(self.transactional_stream_id),
            },
            marketing: LaneConfig {
                server_id: self.marketing_server_id,
                server_token: Some(self.marketing_server_token),
                stream_id: Some(self.marketing_stream_id),
            },
            default_sender: SenderIdentity {
                email: Some(self.default_from_email),
                name: Some(self.default_from_name),
                reply_to: Some(self.default_reply_to),
            },
        }
    }
}

// ── GET /superadmin/shared-config ────────────────────────────────────────────

pub async fn get_shared_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SharedConfigView>, EmailServiceError> {
    require_super_admin(&headers)?;
    let uc = GetSharedConfigUseCase {
        shared: state.shared_config_repo(),
    };
    let view = match uc.execute().await? {
        Some(config) => SharedConfigView::from_config(config),
        None => SharedConfigView::placeholder(),
    };
    Ok(Json(view))
}

// ── PUT /superadmin/shared-config ────────────────────────────────────────────

pub async fn update_shared_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SharedConfigView>,
) -> Result<StatusCode, EmailServiceError> {
    require_super_admin(&headers)?;
    let uc = UpdateSharedConfigUseCase {
        shared: state.shared_config_repo(),
    };
    uc.execute(body.into_config()).await?;
    Ok(StatusCode::NO_CONTENT)
}
