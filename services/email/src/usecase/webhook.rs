use serde_json::{Value, json};

use crate::domain::repository::{
    ContactRepository, SettingsRepository, SuppressionRepository, WebhookEventRepository,
};
use crate::domain::types::{AppliesTo, SuppressionEntry, WebhookEventRecord};
use crate::error::EmailServiceError;

// ── Classification ───────────────────────────────────────────────────────────

/// Shape of a provider callback, determined from payload fields the same
/// way the provider distinguishes them on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Carries the provider's bounce type, lowercased (`hardbounce`, ...).
    Bounce(String),
    Delivery,
    Open,
    Click,
    SpamComplaint,
    SubscriptionChange,
    Inbound,
    Unknown,
}

impl WebhookEventType {
    pub fn label(&self) -> String {
        match self {
            Self::Bounce(kind) => kind.clone(),
            Self::Delivery => "delivery".to_owned(),
            Self::Open => "open".to_owned(),
            Self::Click => "click".to_owned(),
            Self::SpamComplaint => "spam_complaint".to_owned(),
            Self::SubscriptionChange => "subscription_change".to_owned(),
            Self::Inbound => "inbound".to_owned(),
            Self::Unknown => "unknown".to_owned(),
        }
    }

    pub fn is_hard_bounce(&self) -> bool {
        matches!(self, Self::Bounce(kind) if kind == "hardbounce")
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    pub event_type: WebhookEventType,
    pub email: Option<String>,
    pub message_id: Option<String>,
    pub data: Value,
}

fn str_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Classify a raw provider callback payload. Pure.
pub fn classify(payload: &Value) -> ClassifiedEvent {
    let record_type = payload.get("RecordType").and_then(Value::as_str);
    let message_id = str_field(payload, "MessageID");

    // Bounce callbacks have no RecordType discriminator worth trusting;
    // they are recognized by Type + Email, exactly as delivered.
    if let (Some(bounce_type), Some(email)) =
        (str_field(payload, "Type"), str_field(payload, "Email"))
    {
        return ClassifiedEvent {
            event_type: WebhookEventType::Bounce(bounce_type.to_lowercase()),
            email: Some(email.clone()),
            message_id,
            data: json!({
                "email": email,
                "bounce_type": bounce_type,
                "description": payload.get("Description"),
                "details": payload.get("Details"),
                "inactive": payload.get("Inactive"),
                "can_activate": payload.get("CanActivate"),
                "timestamp": payload.get("BouncedAt"),
            }),
        };
    }

    match record_type {
        Some("Delivery") => ClassifiedEvent {
            event_type: WebhookEventType::Delivery,
            email: str_field(payload, "Recipient"),
            message_id,
            data: json!({
                "email": payload.get("Recipient"),
                "delivered_at": payload.get("DeliveredAt"),
                "details": payload.get("Details"),
                "tag": payload.get("Tag"),
            }),
        },
        Some("Open") => ClassifiedEvent {
            event_type: WebhookEventType::Open,
            email: str_field(payload, "Recipient"),
            message_id,
            data: json!({
                "email": payload.get("Recipient"),
                "first_open": payload.get("FirstOpen"),
                "client": payload.get("Client"),
                "os": payload.get("OS"),
                "platform": payload.get("Platform"),
                "geo": payload.get("Geo"),
                "timestamp": payload.get("ReceivedAt"),
            }),
        },
        Some("Click") => ClassifiedEvent {
            event_type: WebhookEventType::Click,
            email: str_field(payload, "Recipient"),
            message_id,
            data: json!({
                "email": payload.get("Recipient"),
                "link": payload.get("OriginalLink"),
                "click_location": payload.get("ClickLocation"),
                "client": payload.get("Client"),
                "platform": payload.get("Platform"),
                "timestamp": payload.get("ReceivedAt"),
            }),
        },
        Some("SpamComplaint") => ClassifiedEvent {
            event_type: WebhookEventType::SpamComplaint,
            email: str_field(payload, "Recipient"),
            message_id,
            data: json!({
                "email": payload.get("Recipient"),
                "complaint_at": payload.get("BouncedAt"),
                "details": payload.get("Details"),
                "tag": payload.get("Tag"),
            }),
        },
        Some("SubscriptionChange") => ClassifiedEvent {
            event_type: WebhookEventType::SubscriptionChange,
            email: str_field(payload, "Recipient"),
            message_id,
            data: json!({
                "email": payload.get("Recipient"),
                "suppression_reason": payload.get("SuppressionReason"),
                "origin": payload.get("Origin"),
                "timestamp": payload.get("ChangedAt"),
            }),
        },
        _ if payload.get("FromFull").is_some() => ClassifiedEvent {
            event_type: WebhookEventType::Inbound,
            email: payload
                .get("FromFull")
                .and_then(|f| f.get("Email"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            message_id,
            data: json!({
                "from": payload.get("FromFull"),
                "to": payload.get("To"),
                "subject": payload.get("Subject"),
                "timestamp": payload.get("Date"),
            }),
        },
        _ => ClassifiedEvent {
            event_type: WebhookEventType::Unknown,
            email: str_field(payload, "Recipient").or_else(|| str_field(payload, "Email")),
            message_id,
            data: json!({}),
        },
    }
}

// ── HandleWebhook ────────────────────────────────────────────────────────────

/// Acknowledgement returned to the provider. Always 200 except for a
/// payload with no `ServerID` at all.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

pub struct HandleWebhookUseCase<S, W, K, U>
where
    S: SettingsRepository,
    W: WebhookEventRepository,
    K: ContactRepository,
    U: SuppressionRepository,
{
    pub settings: S,
    pub events: W,
    pub contacts: K,
    pub suppressions: U,
}

impl<S, W, K, U> HandleWebhookUseCase<S, W, K, U>
where
    S: SettingsRepository,
    W: WebhookEventRepository,
    K: ContactRepository,
    U: SuppressionRepository,
{
    pub async fn execute(&self, payload: Value) -> Result<WebhookAck, EmailServiceError> {
        // The only rejectable condition: without a ServerID the callback
        // cannot be attributed at all.
        let server_id = payload
            .get("ServerID")
            .and_then(Value::as_i64)
            .ok_or(EmailServiceError::MissingField("ServerID"))?;

        // From here on, every failure is swallowed into a 200 acknowledgement
        // so the provider does not build a retry storm against us.
        let tenant_id = match self.settings.find_tenant_by_server_id(server_id).await {
            Ok(Some(tenant_id)) => tenant_id,
            Ok(None) => {
                tracing::warn!(server_id, "webhook for unknown provider server");
                return Ok(WebhookAck {
                    status: "received",
                    event_type: None,
                    warning: Some("unknown server"),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, server_id, "webhook tenant lookup failed");
                return Ok(WebhookAck {
                    status: "error",
                    event_type: None,
                    warning: Some("tenant lookup failed"),
                });
            }
        };

        let classified = classify(&payload);
        let label = classified.event_type.label();

        let record = WebhookEventRecord {
            tenant_id,
            event_type: label.clone(),
            server_id,
            message_id: classified.message_id.clone(),
            recipient_email: classified.email.clone(),
            event_data: classified.data.clone(),
            raw_payload: payload,
        };
        if let Err(e) = self.events.record(&record).await {
            tracing::error!(error = %e, "failed to store webhook event");
        }

        // Hard bounces and spam complaints poison the address: update the
        // contact and mirror a suppression entry.
        if classified.event_type.is_hard_bounce()
            || classified.event_type == WebhookEventType::SpamComplaint
        {
            if let Some(email) = classified.email.as_deref() {
                let (status, applies_to) = if classified.event_type.is_hard_bounce() {
                    ("bounced", AppliesTo::All)
                } else {
                    ("unsubscribed", AppliesTo::Marketing)
                };
                if let Err(e) = self
                    .contacts
                    .update_email_status(tenant_id, email, status, &label)
                    .await
                {
                    tracing::error!(error = %e, email, "failed to update contact email status");
                }
                let entry = SuppressionEntry {
                    tenant_id,
                    email: email.to_lowercase(),
                    applies_to,
                    reason: label.clone(),
                    origin: "webhook".to_owned(),
                };
                if let Err(e) = self.suppressions.add(&entry).await {
                    tracing::error!(error = %e, email, "failed to store webhook suppression");
                }
            }
        }

        Ok(WebhookAck {
            status: "received",
            event_type: Some(label),
            warning: None,
        })
    }
}
