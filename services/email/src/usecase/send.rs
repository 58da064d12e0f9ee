use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{
    AuditRepository, ContactRepository, EmailProvider, SettingsRepository, SharedConfigRepository,
    SuppressionRepository,
};
use crate::domain::types::{
    Lane, OutboundMessage, PROVIDER_BATCH_LIMIT, ProviderReceipt, ResolvedSend, SendAuditRecord,
    ServerMode, SharedDefaults, TemplateMessage, TrackLinks,
};
use crate::error::EmailServiceError;
use crate::usecase::settings::resolve_sender_and_stream;

/// Outcome of the best-effort audit write. Reported alongside the primary
/// result; never affects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Recorded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub message_id: String,
    pub submitted_at: String,
    pub audit: AuditStatus,
}

/// Lane-based tracking defaults: marketing mail gets full tracking,
/// transactional mail none (deliverability over analytics).
pub fn default_tracking(lane: Lane) -> (bool, TrackLinks) {
    match lane {
        Lane::Marketing => (true, TrackLinks::HtmlAndText),
        Lane::Transactional => (false, TrackLinks::None),
    }
}

fn format_from(email: &str, name: Option<&str>) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("{name} <{email}>"),
        None => email.to_owned(),
    }
}

fn parse_submitted_at(submitted_at: Option<&str>) -> DateTime<Utc> {
    submitted_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

// ── SendEmail ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SendEmailInput {
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub lane: Lane,
    pub track_opens: Option<bool>,
    pub track_links: Option<TrackLinks>,
}

pub struct SendEmailUseCase<S, C, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub settings: S,
    pub shared: C,
    pub provider: P,
    pub audit: A,
    pub contacts: K,
    pub defaults: SharedDefaults,
}

impl<S, C, P, A, K> SendEmailUseCase<S, C, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        input: SendEmailInput,
    ) -> Result<SendReceipt, EmailServiceError> {
        if input.to.is_empty() {
            return Err(EmailServiceError::MissingField("to"));
        }
        if input.subject.is_empty() {
            return Err(EmailServiceError::MissingField("subject"));
        }
        if input.html_body.is_none() && input.text_body.is_none() {
            return Err(EmailServiceError::MissingField("body"));
        }

        let resolved = self.resolve(tenant_id, input.lane).await?;
        let (open_default, links_default) = default_tracking(input.lane);

        let from = match input.from_email.as_deref().filter(|f| !f.is_empty()) {
            Some(email) => format_from(email, input.from_name.as_deref()),
            None => format_from(&resolved.from_email, resolved.from_name.as_deref()),
        };

        let message = OutboundMessage {
            from,
            to: input.to.clone(),
            cc: input.cc.clone(),
            bcc: input.bcc.clone(),
            reply_to: input.reply_to.clone().or_else(|| resolved.reply_to.clone()),
            subject: input.subject.clone(),
            html_body: input.html_body.clone(),
            text_body: input.text_body.clone(),
            tag: input.tag.clone(),
            metadata: input.metadata.clone(),
            message_stream: resolved.stream_id.clone(),
            track_opens: input.track_opens.unwrap_or(open_default),
            track_links: input.track_links.unwrap_or(links_default),
        };

        let receipt = self.provider.send_email(&resolved.server_token, &message).await?;

        let audit = self
            .write_audit(tenant_id, &input.to, &input.subject, &receipt, &resolved, &message)
            .await;

        Ok(SendReceipt {
            message_id: receipt.message_id.unwrap_or_default(),
            submitted_at: receipt.submitted_at.unwrap_or_default(),
            audit,
        })
    }

    async fn resolve(&self, tenant_id: Uuid, lane: Lane) -> Result<ResolvedSend, EmailServiceError> {
        let settings = self.settings.get_or_create(tenant_id).await?;
        let shared = match settings.mode {
            ServerMode::Shared => self.shared.get().await?,
            ServerMode::Dedicated => None,
        };
        resolve_sender_and_stream(&settings, shared.as_ref(), &self.defaults, lane)
    }

    async fn write_audit(
        &self,
        tenant_id: Uuid,
        to: &[String],
        subject: &str,
        receipt: &ProviderReceipt,
        resolved: &ResolvedSend,
        message: &OutboundMessage,
    ) -> AuditStatus {
        // Contact attribution only makes sense for single-recipient sends;
        // lookup failures are swallowed like every other audit failure.
        let contact_id = match to {
            [single] => self
                .contacts
                .find_id_by_email(tenant_id, single)
                .await
                .ok()
                .flatten(),
            _ => None,
        };
        let record = SendAuditRecord {
            tenant_id,
            contact_id,
            message_id: receipt.message_id.clone().unwrap_or_default(),
            to_email: to.join(",").to_lowercase(),
            subject: subject.to_owned(),
            status: "sent".to_owned(),
            server_type: resolved.lane,
            message_stream: message.message_stream.clone(),
            tag: message.tag.clone(),
            metadata: message.metadata.clone(),
            sent_at: parse_submitted_at(receipt.submitted_at.as_deref()),
        };
        match self.audit.record_send(&record).await {
            Ok(()) => AuditStatus::Recorded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to write send audit record");
                AuditStatus::Failed
            }
        }
    }
}

// ── SendBatch ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SendBatchInput {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub lane: Lane,
    pub track_opens: Option<bool>,
    pub track_links: Option<TrackLinks>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub suppressed: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchRecipientResult {
    pub email: String,
    pub message_id: Option<String>,
    pub error_code: i64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<BatchRecipientResult>,
}

pub struct SendBatchUseCase<S, C, U, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub settings: S,
    pub shared: C,
    pub suppressions: U,
    pub provider: P,
    pub audit: A,
    pub contacts: K,
    pub defaults: SharedDefaults,
}

impl<S, C, U, P, A, K> SendBatchUseCase<S, C, U, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        input: SendBatchInput,
    ) -> Result<BatchReport, EmailServiceError> {
        if input.recipients.is_empty() {
            return Err(EmailServiceError::MissingField("recipients"));
        }
        if input.recipients.len() > PROVIDER_BATCH_LIMIT {
            return Err(EmailServiceError::BatchTooLarge);
        }
        if input.subject.is_empty() {
            return Err(EmailServiceError::MissingField("subject"));
        }
        if input.html_body.is_none() && input.text_body.is_none() {
            return Err(EmailServiceError::MissingField("body"));
        }

        // Suppression filtering happens before resolution so a fully
        // suppressed batch never reaches the provider.
        let suppressed = self
            .suppressions
            .suppressed_subset(tenant_id, input.lane, &input.recipients)
            .await?;
        let valid: Vec<&String> = input
            .recipients
            .iter()
            .filter(|r| !suppressed.contains(&r.to_lowercase()))
            .collect();
        if valid.is_empty() {
            return Err(EmailServiceError::AllRecipientsSuppressed);
        }

        let settings = self.settings.get_or_create(tenant_id).await?;
        let shared = match settings.mode {
            ServerMode::Shared => self.shared.get().await?,
            ServerMode::Dedicated => None,
        };
        let resolved = resolve_sender_and_stream(&settings, shared.as_ref(), &self.defaults, input.lane)?;

        let (open_default, links_default) = default_tracking(input.lane);
        let from = match input.from_email.as_deref().filter(|f| !f.is_empty()) {
            Some(email) => format_from(email, input.from_name.as_deref()),
            None => format_from(&resolved.from_email, resolved.from_name.as_deref()),
        };

        let messages: Vec<OutboundMessage> = valid
            .iter()
            .map(|recipient| OutboundMessage {
                from: from.clone(),
                to: vec![(*recipient).clone()],
                cc: vec![],
                bcc: vec![],
                reply_to: input.reply_to.clone().or_else(|| resolved.reply_to.clone()),
                subject: input.subject.clone(),
                html_body: input.html_body.clone(),
                text_body: input.text_body.clone(),
                tag: input.tag.clone(),
                metadata: input.metadata.clone(),
                message_stream: resolved.stream_id.clone(),
                track_opens: input.track_opens.unwrap_or(open_default),
                track_links: input.track_links.unwrap_or(links_default),
            })
            .collect();

        let receipts = self.provider.send_batch(&resolved.server_token, &messages).await?;

        let mut sent = 0;
        let mut failed = 0;
        let mut results = Vec::with_capacity(receipts.len());
        for (recipient, receipt) in valid.iter().zip(receipts.iter()) {
            if receipt.error_code == 0 {
                sent += 1;
                self.audit_one(tenant_id, recipient, &input, receipt, &resolved)
                    .await;
            } else {
                failed += 1;
            }
            results.push(BatchRecipientResult {
                email: (*recipient).clone(),
                message_id: receipt.message_id.clone(),
                error_code: receipt.error_code,
                error: (receipt.error_code != 0)
                    .then(|| receipt.message.clone().unwrap_or_default()),
            });
        }

        Ok(BatchReport {
            summary: BatchSummary {
                total: receipts.len(),
                sent,
                failed,
                suppressed: input.recipients.len() - valid.len(),
            },
            results,
        })
    }

    async fn audit_one(
        &self,
        tenant_id: Uuid,
        recipient: &str,
        input: &SendBatchInput,
        receipt: &ProviderReceipt,
        resolved: &ResolvedSend,
    ) {
        let contact_id = self
            .contacts
            .find_id_by_email(tenant_id, recipient)
            .await
            .ok()
            .flatten();
        let record = SendAuditRecord {
            tenant_id,
            contact_id,
            message_id: receipt.message_id.clone().unwrap_or_default(),
            to_email: recipient.to_lowercase(),
            subject: input.subject.clone(),
            status: "sent".to_owned(),
            server_type: resolved.lane,
            message_stream: resolved.stream_id.clone(),
            tag: input.tag.clone(),
            metadata: input.metadata.clone(),
            sent_at: parse_submitted_at(receipt.submitted_at.as_deref()),
        };
        if let Err(e) = self.audit.record_send(&record).await {
            tracing::warn!(error = %e, "failed to write batch audit record");
        }
    }
}

// ── SendTemplate ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SendTemplateInput {
    pub to: Vec<String>,
    pub template_id: Option<i64>,
    pub template_alias: Option<String>,
    pub template_model: serde_json::Value,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub lane: Lane,
}

pub struct SendTemplateUseCase<S, C, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub settings: S,
    pub shared: C,
    pub provider: P,
    pub audit: A,
    pub contacts: K,
    pub defaults: SharedDefaults,
}

impl<S, C, P, A, K> SendTemplateUseCase<S, C, P, A, K>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
    A: AuditRepository,
    K: ContactRepository,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        input: SendTemplateInput,
    ) -> Result<SendReceipt, EmailServiceError> {
        if input.to.is_empty() {
            return Err(EmailServiceError::MissingField("to"));
        }
        if input.template_id.is_none() && input.template_alias.is_none() {
            return Err(EmailServiceError::MissingField("template"));
        }

        let settings = self.settings.get_or_create(tenant_id).await?;
        let shared = match settings.mode {
            ServerMode::Shared => self.shared.get().await?,
            ServerMode::Dedicated => None,
        };
        let resolved = resolve_sender_and_stream(&settings, shared.as_ref(), &self.defaults, input.lane)?;

        let from = match input.from_email.as_deref().filter(|f| !f.is_empty()) {
            Some(email) => format_from(email, input.from_name.as_deref()),
            None => format_from(&resolved.from_email, resolved.from_name.as_deref()),
        };

        let message = TemplateMessage {
            from,
            to: input.to.clone(),
            reply_to: input.reply_to.clone().or_else(|| resolved.reply_to.clone()),
            template_id: input.template_id,
            template_alias: input.template_alias.clone(),
            template_model: input.template_model.clone(),
            tag: input.tag.clone(),
            metadata: input.metadata.clone(),
            message_stream: resolved.stream_id.clone(),
        };

        let receipt = self
            .provider
            .send_with_template(&resolved.server_token, &message)
            .await?;

        let contact_id = match input.to.as_slice() {
            [single] => self
                .contacts
                .find_id_by_email(tenant_id, single)
                .await
                .ok()
                .flatten(),
            _ => None,
        };
        let record = SendAuditRecord {
            tenant_id,
            contact_id,
            message_id: receipt.message_id.clone().unwrap_or_default(),
            to_email: input.to.join(",").to_lowercase(),
            subject: "Template Email".to_owned(),
            status: "sent".to_owned(),
            server_type: resolved.lane,
            message_stream: message.message_stream.clone(),
            tag: input.tag.clone(),
            metadata: input.metadata.clone(),
            sent_at: parse_submitted_at(receipt.submitted_at.as_deref()),
        };
        let audit = match self.audit.record_send(&record).await {
            Ok(()) => AuditStatus::Recorded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to write template audit record");
                AuditStatus::Failed
            }
        };

        Ok(SendReceipt {
            message_id: receipt.message_id.unwrap_or_default(),
            submitted_at: receipt.submitted_at.unwrap_or_default(),
            audit,
        })
    }
}
