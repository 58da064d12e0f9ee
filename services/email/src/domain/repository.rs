#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    AccountToken, BouncePage, BounceQuery, EmailSettings, FailureDisposition, MessageStream,
    NewQueueItem, NewServerSpec, OutboundMessage, ProviderReceipt, ProviderServer,
    ProvisionedServer, QueueItem, QueueKind, QueueStatus, SendAuditRecord, ServerToken,
    SharedEmailConfig, StatsQuery, SuppressionEntry, TemplateMessage, TenantProfile,
    WebhookEventRecord,
};
use crate::error::EmailServiceError;

/// Repository for per-tenant email settings.
pub trait SettingsRepository: Send + Sync {
    /// Fetch the tenant's settings, creating the default shared/pending row
    /// on first access. Fails with `ConfigUnavailable` only on a data-store
    /// outage.
    async fn get_or_create(&self, tenant_id: Uuid) -> Result<EmailSettings, EmailServiceError>;

    async fn update(
        &self,
        tenant_id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<EmailSettings, EmailServiceError>;

    async fn set_activation_status(
        &self,
        tenant_id: Uuid,
        status: crate::domain::types::ActivationStatus,
        error: Option<&str>,
    ) -> Result<(), EmailServiceError>;

    /// Persist the outcome of a successful activation in one write: mode
    /// flips to dedicated, both lanes are populated, status becomes active.
    async fn store_dedicated_servers(
        &self,
        tenant_id: Uuid,
        transactional: &ProvisionedServer,
        marketing: &ProvisionedServer,
    ) -> Result<(), EmailServiceError>;

    /// Resolve a tenant from a provider server id (either lane). Used by the
    /// webhook to attribute callbacks.
    async fn find_tenant_by_server_id(
        &self,
        server_id: i64,
    ) -> Result<Option<Uuid>, EmailServiceError>;
}

/// Partial update of tenant email settings; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub default_from_email: Option<String>,
    pub default_from_name: Option<String>,
    pub default_reply_to: Option<String>,
    pub custom_from_email: Option<String>,
    pub custom_from_name: Option<String>,
    pub custom_reply_to: Option<String>,
    pub track_opens: Option<bool>,
    pub track_links: Option<crate::domain::types::TrackLinks>,
    /// Passed through to `tenants.postmark_id` when present.
    pub linkage_id: Option<String>,
}

/// Repository for the shared provider configuration singleton.
pub trait SharedConfigRepository: Send + Sync {
    async fn get(&self) -> Result<Option<SharedEmailConfig>, EmailServiceError>;
    async fn upsert(&self, config: &SharedEmailConfig) -> Result<(), EmailServiceError>;
}

/// Read/write access to tenant billing and linkage fields.
pub trait TenantRepository: Send + Sync {
    async fn profile(&self, tenant_id: Uuid) -> Result<Option<TenantProfile>, EmailServiceError>;
    async fn set_linkage_id(
        &self,
        tenant_id: Uuid,
        linkage_id: &str,
    ) -> Result<(), EmailServiceError>;
    async fn mark_email_activated(&self, tenant_id: Uuid) -> Result<(), EmailServiceError>;
}

/// Repository for the per-tenant suppression list.
pub trait SuppressionRepository: Send + Sync {
    /// Of `emails` (any case), return the lowercased subset suppressed for
    /// the lane: the union of `applies_to = all` and the lane's channel.
    async fn suppressed_subset(
        &self,
        tenant_id: Uuid,
        lane: crate::domain::types::Lane,
        emails: &[String],
    ) -> Result<std::collections::HashSet<String>, EmailServiceError>;

    async fn add(&self, entry: &SuppressionEntry) -> Result<(), EmailServiceError>;

    /// Delete all suppression rows for the address. Returns `true` if any
    /// row was deleted.
    async fn remove(&self, tenant_id: Uuid, email: &str) -> Result<bool, EmailServiceError>;
}

/// Repository for the two durable send queues.
pub trait QueueRepository: Send + Sync {
    /// Rows eligible for processing: due, and either pending/retry or
    /// carrying an expired lease. Ordered `priority DESC, created_at ASC`.
    async fn fetch_due(
        &self,
        queue: QueueKind,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<QueueItem>, EmailServiceError>;

    /// Compare-and-set claim: transition the row to `processing` with a
    /// lease, guarded on the status we observed. Returns `false` when a
    /// concurrent processor run won the row.
    async fn claim(
        &self,
        queue: QueueKind,
        id: Uuid,
        observed: QueueStatus,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, EmailServiceError>;

    async fn mark_sent(
        &self,
        queue: QueueKind,
        id: Uuid,
        provider_message_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), EmailServiceError>;

    async fn mark_failed(
        &self,
        queue: QueueKind,
        id: Uuid,
        disposition: &FailureDisposition,
    ) -> Result<(), EmailServiceError>;

    async fn enqueue(
        &self,
        queue: QueueKind,
        item: &NewQueueItem,
    ) -> Result<Uuid, EmailServiceError>;
}

/// Writer for the send audit log. Callers treat failures as a reportable
/// side-effect outcome, never as a send failure.
pub trait AuditRepository: Send + Sync {
    async fn record_send(&self, record: &SendAuditRecord) -> Result<(), EmailServiceError>;
}

/// Minimal contact lookups used for audit attribution and webhook status
/// updates.
pub trait ContactRepository: Send + Sync {
    async fn find_id_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<Option<Uuid>, EmailServiceError>;

    async fn update_email_status(
        &self,
        tenant_id: Uuid,
        email: &str,
        status: &str,
        reason: &str,
    ) -> Result<(), EmailServiceError>;
}

/// Writer for the webhook event audit table.
pub trait WebhookEventRepository: Send + Sync {
    async fn record(&self, event: &WebhookEventRecord) -> Result<(), EmailServiceError>;
}

/// The third-party email provider HTTP API. Stateless: every call carries
/// its credentials explicitly. Implementations must surface the provider's
/// numeric error code and message verbatim on failure.
pub trait EmailProvider: Send + Sync {
    async fn send_email(
        &self,
        token: &ServerToken,
        message: &OutboundMessage,
    ) -> Result<ProviderReceipt, EmailServiceError>;

    /// Batch send, capped at 500 messages. Oversized batches are rejected
    /// before any network call.
    async fn send_batch(
        &self,
        token: &ServerToken,
        messages: &[OutboundMessage],
    ) -> Result<Vec<ProviderReceipt>, EmailServiceError>;

    async fn send_with_template(
        &self,
        token: &ServerToken,
        message: &TemplateMessage,
    ) -> Result<ProviderReceipt, EmailServiceError>;

    async fn get_bounces(
        &self,
        token: &ServerToken,
        query: &BounceQuery,
    ) -> Result<BouncePage, EmailServiceError>;

    async fn activate_bounce(
        &self,
        token: &ServerToken,
        bounce_id: i64,
    ) -> Result<(), EmailServiceError>;

    async fn add_suppressions(
        &self,
        token: &ServerToken,
        stream_id: &str,
        emails: &[String],
    ) -> Result<(), EmailServiceError>;

    async fn remove_suppression(
        &self,
        token: &ServerToken,
        stream_id: &str,
        email: &str,
    ) -> Result<(), EmailServiceError>;

    async fn outbound_stats(
        &self,
        token: &ServerToken,
        query: &StatsQuery,
    ) -> Result<serde_json::Value, EmailServiceError>;

    async fn list_servers(
        &self,
        token: &AccountToken,
    ) -> Result<Vec<ProviderServer>, EmailServiceError>;

    async fn create_server(
        &self,
        token: &AccountToken,
        spec: &NewServerSpec,
    ) -> Result<ProviderServer, EmailServiceError>;

    async fn create_server_token(
        &self,
        token: &AccountToken,
        server_id: i64,
        name: &str,
    ) -> Result<String, EmailServiceError>;

    async fn list_message_streams(
        &self,
        token: &ServerToken,
    ) -> Result<Vec<MessageStream>, EmailServiceError>;
}
