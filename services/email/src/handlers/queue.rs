use axum::{Json, extract::State, http::HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use contactgate_tenant::TenantHeaders;

use crate::domain::types::QueueKind;
use crate::error::EmailServiceError;
use crate::state::AppState;
use crate::usecase::queue::{
    EnqueueTestEmailUseCase, ProcessQueueUseCase, QueueRunReport, QueuedTestEmail,
};

// ── POST /email/queue/process ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProcessQueueResponse {
    pub transactional: QueueRunReport,
    pub marketing: QueueRunReport,
    #[serde(serialize_with = "contactgate_core::serde::to_rfc3339_ms")]
    pub timestamp: DateTime<Utc>,
}

/// Queue trigger. Forbidden from direct untrusted access: only the internal
/// proxy (or scheduled job) identified by `x-proxied-from` may invoke it.
pub async fn process_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProcessQueueResponse>, EmailServiceError> {
    let proxied_from = headers
        .get("x-proxied-from")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if proxied_from != state.queue_proxy_name {
        return Err(EmailServiceError::NotProxied);
    }

    let uc = ProcessQueueUseCase {
        queue: state.queue_repo(),
        settings: state.settings_repo(),
        provider: state.provider.clone(),
        shared_token: state.shared_token(),
        defaults: state.defaults.clone(),
    };
    let transactional = uc.execute(QueueKind::Transactional).await;
    let marketing = uc.execute(QueueKind::Marketing).await;

    Ok(Json(ProcessQueueResponse {
        transactional,
        marketing,
        timestamp: Utc::now(),
    }))
}

// ── POST /email/test ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestEmailRequest {
    #[serde(default)]
    pub to: String,
}

pub async fn enqueue_test_email(
    identity: TenantHeaders,
    State(state): State<AppState>,
    Json(body): Json<TestEmailRequest>,
) -> Result<Json<QueuedTestEmail>, EmailServiceError> {
    let uc = EnqueueTestEmailUseCase {
        queue: state.queue_repo(),
        settings: state.settings_repo(),
        defaults: state.defaults.clone(),
    };
    let queued = uc
        .execute(identity.tenant_id, identity.user_id, body.to)
        .await?;
    Ok(Json(queued))
}
