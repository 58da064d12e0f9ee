use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;

use contactgate_tenant::TenantHeaders;

use crate::domain::types::Lane;
use crate::error::EmailServiceError;
use crate::handlers::send::{merge_identity, parse_lane, parse_track_links};
use crate::state::AppState;
use crate::usecase::send::{BatchReport, SendBatchInput, SendBatchUseCase};

// ── POST /email/batch ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendBatchRequest {
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<Value>,
    /// Batch sends are usually campaigns; the lane defaults to marketing.
    pub server_type: Option<String>,
    pub track_opens: Option<bool>,
    pub track_links: Option<String>,
}

pub async fn send_batch(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<SendBatchRequest>,
) -> Result<Json<BatchReport>, EmailServiceError> {
    let lane = parse_lane(body.server_type.as_deref(), Lane::Marketing)?;
    let track_links = parse_track_links(body.track_links.as_deref())?;

    let uc = SendBatchUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        suppressions: state.suppression_repo(),
        provider: state.provider.clone(),
        audit: state.audit_repo(),
        contacts: state.contact_repo(),
        defaults: state.defaults.clone(),
    };
    let report = uc
        .execute(
            identity.tenant_id,
            SendBatchInput {
                recipients: body.recipients,
                subject: body.subject,
                html_body: body.html_body,
                text_body: body.text_body,
                from_email: body.from_email,
                from_name: body.from_name,
                reply_to: body.reply_to,
                tag: body.tag,
                metadata: Some(merge_identity(
                    body.metadata,
                    identity.tenant_id,
                    identity.user_id,
                )),
                lane,
                track_opens: body.track_opens,
                track_links,
            },
        )
        .await?;

    Ok(Json(report))
}
