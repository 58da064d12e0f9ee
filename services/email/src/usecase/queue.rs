use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{EmailProvider, QueueRepository, SettingsRepository};
use crate::domain::types::{
    EmailSettings, FailureDisposition, MAX_QUEUE_ATTEMPTS, NewQueueItem, OutboundMessage,
    QUEUE_BATCH_SIZE, QueueItem, QueueKind, QueueStatus, ServerMode, ServerToken, SharedDefaults,
    TemplateMessage, queue_lease, retry_backoff,
};
use crate::error::EmailServiceError;
use crate::usecase::send::default_tracking;

/// Per-invocation processing report, mirrored into the trigger response.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct QueueRunReport {
    pub processed: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Compute the bookkeeping for a failed attempt: retry with escalating
/// backoff while attempts remain, terminal failure otherwise.
pub fn failure_disposition(item: &QueueItem, error: &str, now: DateTime<Utc>) -> FailureDisposition {
    let attempts = item.retry_count + 1;
    if attempts < MAX_QUEUE_ATTEMPTS {
        FailureDisposition {
            status: QueueStatus::Retry,
            retry_count: attempts,
            error_message: error.to_owned(),
            failed_at: now,
            scheduled_for: Some(now + retry_backoff(item.retry_count)),
        }
    } else {
        FailureDisposition {
            status: QueueStatus::Failed,
            retry_count: attempts,
            error_message: error.to_owned(),
            failed_at: now,
            scheduled_for: None,
        }
    }
}

// ── ProcessQueue ─────────────────────────────────────────────────────────────

/// Drains one queue table: claim due rows under a lease, dispatch each
/// through the provider, and record sent/retry/failed transitions.
///
/// Designed for repeated invocation by an external low-frequency trigger;
/// one pass is bounded by `QUEUE_BATCH_SIZE` rows. Internal errors are
/// accumulated in the report rather than raised so a single poisoned row
/// cannot wedge the queue.
pub struct ProcessQueueUseCase<Q, S, P>
where
    Q: QueueRepository,
    S: SettingsRepository,
    P: EmailProvider,
{
    pub queue: Q,
    pub settings: S,
    pub provider: P,
    pub shared_token: ServerToken,
    pub defaults: SharedDefaults,
}

impl<Q, S, P> ProcessQueueUseCase<Q, S, P>
where
    Q: QueueRepository,
    S: SettingsRepository,
    P: EmailProvider,
{
    pub async fn execute(&self, kind: QueueKind) -> QueueRunReport {
        let mut report = QueueRunReport::default();
        let now = Utc::now();

        let due = match self.queue.fetch_due(kind, now, QUEUE_BATCH_SIZE).await {
            Ok(items) => items,
            Err(e) => {
                report.errors.push(e.to_string());
                return report;
            }
        };

        let mut claimed = Vec::with_capacity(due.len());
        for item in due {
            match self
                .queue
                .claim(kind, item.id, item.status, now + queue_lease())
                .await
            {
                Ok(true) => claimed.push(item),
                // Another processor run won the row; skip it.
                Ok(false) => {}
                Err(e) => report.errors.push(e.to_string()),
            }
        }

        // Group by tenant so settings are fetched once per tenant, keeping
        // the within-pass dispatch order intact.
        let mut groups: Vec<(Uuid, Vec<QueueItem>)> = Vec::new();
        for item in claimed {
            match groups.iter_mut().find(|(tenant, _)| *tenant == item.tenant_id) {
                Some((_, items)) => items.push(item),
                None => groups.push((item.tenant_id, vec![item])),
            }
        }

        for (tenant_id, items) in groups {
            let settings = match self.settings.get_or_create(tenant_id).await {
                Ok(settings) => settings,
                Err(e) => {
                    // A missing configuration will not fix itself; fail the
                    // tenant's claimed items outright instead of retrying.
                    let message = format!("email settings unavailable for tenant: {e}");
                    for item in &items {
                        let disposition = FailureDisposition {
                            status: QueueStatus::Failed,
                            retry_count: item.retry_count,
                            error_message: message.clone(),
                            failed_at: Utc::now(),
                            scheduled_for: None,
                        };
                        if let Err(mark_err) =
                            self.queue.mark_failed(kind, item.id, &disposition).await
                        {
                            report.errors.push(mark_err.to_string());
                        }
                        report.failed += 1;
                    }
                    report.errors.push(message);
                    continue;
                }
            };

            for item in items {
                self.dispatch(kind, &settings, item, &mut report).await;
            }
        }

        report
    }

    async fn dispatch(
        &self,
        kind: QueueKind,
        settings: &EmailSettings,
        item: QueueItem,
        report: &mut QueueRunReport,
    ) {
        let token = self.token_for(kind, settings, &item);
        let outcome = self.send_item(&token, kind, settings, &item).await;
        match outcome {
            Ok(message_id) => {
                match self
                    .queue
                    .mark_sent(kind, item.id, &message_id, Utc::now())
                    .await
                {
                    Ok(()) => report.processed += 1,
                    Err(e) => {
                        report.errors.push(e.to_string());
                        report.failed += 1;
                    }
                }
            }
            Err(e) => {
                let message = e.to_string();
                let disposition = failure_disposition(&item, &message, Utc::now());
                if let Err(mark_err) = self.queue.mark_failed(kind, item.id, &disposition).await {
                    report.errors.push(mark_err.to_string());
                }
                report.failed += 1;
                report.errors.push(message);
            }
        }
    }

    /// Dedicated token when the item asks for dedicated mode and one is
    /// configured; the shared processor token otherwise.
    fn token_for(&self, kind: QueueKind, settings: &EmailSettings, item: &QueueItem) -> ServerToken {
        if item.server_mode == ServerMode::Dedicated {
            if let Some(token) = settings.lane(kind.lane()).token() {
                return ServerToken(token.to_owned());
            }
        }
        self.shared_token.clone()
    }

    async fn send_item(
        &self,
        token: &ServerToken,
        kind: QueueKind,
        settings: &EmailSettings,
        item: &QueueItem,
    ) -> Result<String, EmailServiceError> {
        let from = match item.from_email.as_deref().filter(|f| !f.is_empty()) {
            Some(email) => match item.from_name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => format!("{name} <{email}>"),
                None => email.to_owned(),
            },
            None => self.sender_fallback(settings),
        };
        let stream = item
            .message_stream
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| kind.default_stream().to_owned());

        let receipt = if item.template_id.is_some() {
            let message = TemplateMessage {
                from,
                to: vec![item.to_email.clone()],
                reply_to: None,
                template_id: item.template_id,
                template_alias: None,
                template_model: item
                    .template_data
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({})),
                tag: item.tag.clone(),
                metadata: item.metadata.clone(),
                message_stream: stream,
            };
            self.provider.send_with_template(token, &message).await?
        } else {
            let (track_opens, track_links) = default_tracking(kind.lane());
            let message = OutboundMessage {
                from,
                to: vec![item.to_email.clone()],
                cc: vec![],
                bcc: vec![],
                reply_to: None,
                subject: item.subject.clone(),
                html_body: item.html_body.clone(),
                text_body: item.text_body.clone(),
                tag: item.tag.clone(),
                metadata: item.metadata.clone(),
                message_stream: stream,
                track_opens,
                track_links,
            };
            self.provider.send_email(token, &message).await?
        };

        Ok(receipt.message_id.unwrap_or_default())
    }

    fn sender_fallback(&self, settings: &EmailSettings) -> String {
        let email = settings
            .custom_sender
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .or_else(|| {
                settings
                    .default_sender
                    .email
                    .as_deref()
                    .filter(|e| !e.is_empty())
            })
            .unwrap_or(self.defaults.from_email.as_str());
        let name = settings
            .custom_sender
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                settings
                    .default_sender
                    .name
                    .as_deref()
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or(self.defaults.from_name.as_str());
        format!("{name} <{email}>")
    }
}

// ── EnqueueTestEmail ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize)]
pub struct QueuedTestEmail {
    pub queue_id: Uuid,
    pub to: String,
    pub from: String,
    pub mode: &'static str,
}

/// Producer path exercised by the settings screen: drops a high-priority
/// test message into the transactional queue for the next processor pass.
pub struct EnqueueTestEmailUseCase<Q, S>
where
    Q: QueueRepository,
    S: SettingsRepository,
{
    pub queue: Q,
    pub settings: S,
    pub defaults: SharedDefaults,
}

impl<Q, S> EnqueueTestEmailUseCase<Q, S>
where
    Q: QueueRepository,
    S: SettingsRepository,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        to: String,
    ) -> Result<QueuedTestEmail, EmailServiceError> {
        if to.is_empty() {
            return Err(EmailServiceError::MissingField("to"));
        }

        let settings = self.settings.get_or_create(tenant_id).await?;
        let from_email = settings
            .custom_sender
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| settings.default_sender.email.clone().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| self.defaults.from_email.clone());
        let from_name = settings
            .custom_sender
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| settings.default_sender.name.clone().filter(|n| !n.is_empty()))
            .unwrap_or_else(|| self.defaults.from_name.clone());

        let mode = settings.mode;
        let item = NewQueueItem {
            tenant_id,
            to_email: to.clone(),
            from_email: Some(from_email.clone()),
            from_name: Some(from_name),
            subject: format!(
                "Test Email - {} Mode",
                match mode {
                    ServerMode::Shared => "Shared",
                    ServerMode::Dedicated => "Dedicated",
                }
            ),
            html_body: Some(
                "<p>This test email was sent through the email queue. If you received it, \
                 your email configuration is working correctly.</p>"
                    .to_owned(),
            ),
            text_body: Some(
                "This test email was sent through the email queue. If you received it, \
                 your email configuration is working correctly."
                    .to_owned(),
            ),
            template_id: None,
            template_data: None,
            message_stream: None,
            server_mode: mode,
            priority: 10,
            tag: Some("test-email".to_owned()),
            metadata: Some(serde_json::json!({
                "type": "test",
                "requested_by": user_id,
            })),
        };

        let queue_id = self.queue.enqueue(QueueKind::Transactional, &item).await?;
        Ok(QueuedTestEmail {
            queue_id,
            to,
            from: from_email,
            mode: mode.as_str(),
        })
    }
}
