use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use contactgate_tenant::TenantHeaders;

use crate::domain::repository::{SettingsPatch, TenantRepository as _};
use crate::error::EmailServiceError;
use crate::handlers::send::parse_track_links;
use crate::state::AppState;
use crate::usecase::settings::{
    GetEmailSettingsUseCase, SettingsView, UpdateEmailSettingsUseCase,
};

// ── GET /email/settings ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TenantInfo {
    pub linkage_id: Option<String>,
    pub email_tier: String,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: SettingsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantInfo>,
}

pub async fn get_settings(
    identity: TenantHeaders,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, EmailServiceError> {
    let uc = GetEmailSettingsUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        defaults: state.defaults.clone(),
    };
    let settings = uc.execute(identity.tenant_id).await?;

    let tenant = state
        .tenant_repo()
        .profile(identity.tenant_id)
        .await?
        .map(|p| TenantInfo {
            linkage_id: p.linkage_id,
            email_tier: p.email_tier,
        });

    Ok(Json(SettingsResponse { settings, tenant }))
}

// ── POST /email/settings ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub default_from_email: Option<String>,
    pub default_from_name: Option<String>,
    pub default_reply_to: Option<String>,
    pub custom_from_email: Option<String>,
    pub custom_from_name: Option<String>,
    pub custom_reply_to: Option<String>,
    pub track_opens: Option<bool>,
    pub track_links: Option<String>,
    pub linkage_id: Option<String>,
}

pub async fn update_settings(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<StatusCode, EmailServiceError> {
    let track_links = parse_track_links(body.track_links.as_deref())?;

    let uc = UpdateEmailSettingsUseCase {
        settings: state.settings_repo(),
        tenants: state.tenant_repo(),
    };
    uc.execute(
        identity.tenant_id,
        SettingsPatch {
            default_from_email: body.default_from_email,
            default_from_name: body.default_from_name,
            default_reply_to: body.default_reply_to,
            custom_from_email: body.custom_from_email,
            custom_from_name: body.custom_from_name,
            custom_reply_to: body.custom_reply_to,
            track_opens: body.track_opens,
            track_links,
            linkage_id: body.linkage_id,
        },
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
