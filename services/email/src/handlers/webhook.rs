use axum::{Json, extract::State};
use serde_json::Value;

use crate::error::EmailServiceError;
use crate::state::AppState;
use crate::usecase::webhook::{HandleWebhookUseCase, WebhookAck};

// ── POST /email/webhook ──────────────────────────────────────────────────────

/// Provider callback sink. No tenant identity: attribution is by the
/// payload's ServerID. Responds 200 for everything the use case can
/// acknowledge; the only 400 is a payload with no ServerID at all, which the
/// provider never retries usefully anyway.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookAck>, EmailServiceError> {
    let uc = HandleWebhookUseCase {
        settings: state.settings_repo(),
        events: state.webhook_repo(),
        contacts: state.contact_repo(),
        suppressions: state.suppression_repo(),
    };
    let ack = uc.execute(payload).await?;
    Ok(Json(ack))
}
