use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use contactgate_tenant::TenantHeaders;

use crate::domain::types::Lane;
use crate::error::EmailServiceError;
use crate::handlers::send::parse_lane;
use crate::state::AppState;
use crate::usecase::suppression::{
    AddSuppressionsUseCase, RemoveSuppressionsUseCase, UnsuppressResult,
};

#[derive(Debug, Deserialize)]
pub struct SuppressionsRequest {
    #[serde(default)]
    pub emails: Vec<String>,
    /// Defaults to the marketing lane, matching how unsubscribes arrive.
    pub server_type: Option<String>,
}

// ── POST /email/suppressions ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AddSuppressionsResponse {
    pub added: usize,
}

pub async fn add_suppressions(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<SuppressionsRequest>,
) -> Result<Json<AddSuppressionsResponse>, EmailServiceError> {
    let lane = parse_lane(body.server_type.as_deref(), Lane::Marketing)?;
    let uc = AddSuppressionsUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        suppressions: state.suppression_repo(),
        provider: state.provider.clone(),
        defaults: state.defaults.clone(),
    };
    let added = uc.execute(identity.tenant_id, lane, body.emails).await?;
    Ok(Json(AddSuppressionsResponse { added }))
}

// ── DELETE /email/suppressions ───────────────────────────────────────────────

pub async fn remove_suppressions(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<SuppressionsRequest>,
) -> Result<Json<Vec<UnsuppressResult>>, EmailServiceError> {
    let lane = parse_lane(body.server_type.as_deref(), Lane::Marketing)?;
    let uc = RemoveSuppressionsUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        suppressions: state.suppression_repo(),
        provider: state.provider.clone(),
        defaults: state.defaults.clone(),
    };
    let results = uc.execute(identity.tenant_id, lane, body.emails).await?;
    Ok(Json(results))
}
