use axum::{Json, extract::State};
use serde::Serialize;

use contactgate_tenant::TenantHeaders;

use crate::error::EmailServiceError;
use crate::state::AppState;
use crate::usecase::activation::{ActivateEmailUseCase, CheckServersUseCase, ServersExist};

// ── POST /email/activate ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub activation_status: &'static str,
}

pub async fn activate_email(
    identity: TenantHeaders,
    State(state): State<AppState>,
) -> Result<Json<ActivateResponse>, EmailServiceError> {
    let uc = ActivateEmailUseCase {
        settings: state.settings_repo(),
        tenants: state.tenant_repo(),
        provider: state.provider.clone(),
        account_token: state.account_token.clone(),
    };
    uc.execute(identity.tenant_id).await?;

    Ok(Json(ActivateResponse {
        activation_status: "active",
    }))
}

// ── GET /email/servers/check ─────────────────────────────────────────────────

pub async fn check_servers(
    identity: TenantHeaders,
    State(state): State<AppState>,
) -> Result<Json<ServersExist>, EmailServiceError> {
    let uc = CheckServersUseCase {
        tenants: state.tenant_repo(),
        provider: state.provider.clone(),
        account_token: state.account_token.clone(),
    };
    let exists = uc.execute(identity.tenant_id).await?;
    Ok(Json(exists))
}
