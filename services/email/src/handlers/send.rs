use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use contactgate_tenant::TenantHeaders;

use crate::domain::types::{Lane, TrackLinks};
use crate::error::EmailServiceError;
use crate::state::AppState;
use crate::usecase::send::{
    AuditStatus, SendEmailInput, SendEmailUseCase, SendTemplateInput, SendTemplateUseCase,
};

/// `to` accepts a single address or a list, like the provider itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(email) => vec![email],
            Self::Many(emails) => emails,
        }
    }
}

pub fn parse_lane(server_type: Option<&str>, default: Lane) -> Result<Lane, EmailServiceError> {
    match server_type {
        None => Ok(default),
        Some(s) => Lane::parse(s)
            .ok_or_else(|| EmailServiceError::InvalidRequest(format!("unknown server type '{s}'"))),
    }
}

pub fn parse_track_links(value: Option<&str>) -> Result<Option<TrackLinks>, EmailServiceError> {
    match value {
        None => Ok(None),
        Some(s) => TrackLinks::parse(s)
            .map(Some)
            .ok_or_else(|| EmailServiceError::InvalidRequest(format!("unknown track_links '{s}'"))),
    }
}

/// Stamp the caller's identity into the message metadata for later
/// attribution in webhooks and the audit log.
pub fn merge_identity(metadata: Option<Value>, tenant_id: Uuid, user_id: Uuid) -> Value {
    let mut map = match metadata {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.insert("tenant_id".to_owned(), json!(tenant_id));
    map.insert("user_id".to_owned(), json!(user_id));
    Value::Object(map)
}

// ── POST /email/send ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: Recipients,
    #[serde(default)]
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub tag: Option<String>,
    pub metadata: Option<Value>,
    pub server_type: Option<String>,
    pub track_opens: Option<bool>,
    pub track_links: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub message_id: String,
    pub submitted_at: String,
    pub audit: AuditStatus,
}

pub async fn send_email(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, EmailServiceError> {
    let lane = parse_lane(body.server_type.as_deref(), Lane::Transactional)?;
    let track_links = parse_track_links(body.track_links.as_deref())?;

    let uc = SendEmailUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        provider: state.provider.clone(),
        audit: state.audit_repo(),
        contacts: state.contact_repo(),
        defaults: state.defaults.clone(),
    };
    let receipt = uc
        .execute(
            identity.tenant_id,
            SendEmailInput {
                to: body.to.into_vec(),
                subject: body.subject,
                html_body: body.html_body,
                text_body: body.text_body,
                from_email: body.from_email,
                from_name: body.from_name,
                reply_to: body.reply_to,
                cc: body.cc,
                bcc: body.bcc,
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

    Ok(Json(SendEmailResponse {
        message_id: receipt.message_id,
        submitted_at: receipt.submitted_at,
        audit: receipt.audit,
    }))
}

// ── POST /email/send-template ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SendTemplateRequest {
    pub to: Recipients,
    pub template_id: Option<i64>,
    pub template_alias: Option<String>,
    #[serde(default)]
    pub template_model: Value,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<Value>,
    pub server_type: Option<String>,
}

pub async fn send_template(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<SendTemplateRequest>,
) -> Result<Json<SendEmailResponse>, EmailServiceError> {
    let lane = parse_lane(body.server_type.as_deref(), Lane::Transactional)?;

    let uc = SendTemplateUseCase {
        settings: state.settings_repo(),
        shared: state.shared_config_repo(),
        provider: state.provider.clone(),
        audit: state.audit_repo(),
        contacts: state.contact_repo(),
        defaults: state.defaults.clone(),
    };
    let receipt = uc
        .execute(
            identity.tenant_id,
            SendTemplateInput {
                to: body.to.into_vec(),
                template_id: body.template_id,
                template_alias: body.template_alias,
                template_model: body.template_model,
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
            },
        )
        .await?;

    Ok(Json(SendEmailResponse {
        message_id: receipt.message_id,
        submitted_at: receipt.submitted_at,
        audit: receipt.audit,
    }))
}
