use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Platform constants ───────────────────────────────────────────────────────

/// Sender identity used when neither the tenant nor the shared singleton
/// provides one. Shared-mode resolution must always succeed, so these are
/// compiled in.
pub const PLATFORM_FROM_EMAIL: &str = "share@share.komunate.com";
pub const PLATFORM_FROM_NAME: &str = "Komunate Platform";
pub const PLATFORM_REPLY_TO: &str = "noreply@komunate.com";

/// Fallback sender for dedicated mode when the tenant never set one.
pub const DEDICATED_FALLBACK_FROM: &str = "noreply@komunate.com";

/// Stream ids on the shared provider servers.
pub const SHARED_TRANSACTIONAL_STREAM: &str = "transactional-shared";
pub const SHARED_MARKETING_STREAM: &str = "marketing-shared";

/// Default stream ids on dedicated provider servers.
pub const DEDICATED_TRANSACTIONAL_STREAM: &str = "outbound";
pub const DEDICATED_MARKETING_STREAM: &str = "broadcasts";

/// Provider-imposed maximum number of messages in one batch call.
pub const PROVIDER_BATCH_LIMIT: usize = 500;

/// Maximum queue rows claimed per processor invocation.
pub const QUEUE_BATCH_SIZE: u64 = 50;

/// A queue item is abandoned after this many delivery attempts.
pub const MAX_QUEUE_ATTEMPTS: i32 = 3;

/// How long a claimed queue row is protected from reclaim by another
/// processor run.
pub fn queue_lease() -> Duration {
    Duration::minutes(5)
}

/// Escalating retry delay: 5, 15, 45 minutes for `retry_count` 0, 1, 2
/// (the count *before* the failing attempt is recorded).
pub fn retry_backoff(retry_count: i32) -> Duration {
    Duration::minutes(5 * 3i64.pow(retry_count.max(0) as u32))
}

// ── Closed enums ─────────────────────────────────────────────────────────────

/// Delivery lane. Transactional mail prioritizes deliverability (no
/// tracking by default); marketing mail defaults to full tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Transactional,
    Marketing,
}

impl Lane {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transactional => "transactional",
            Self::Marketing => "marketing",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "transactional" => Some(Self::Transactional),
            "marketing" => Some(Self::Marketing),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Shared,
    Dedicated,
}

impl ServerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Dedicated => "dedicated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "shared" => Some(Self::Shared),
            "dedicated" => Some(Self::Dedicated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationStatus {
    Pending,
    Checking,
    Activating,
    Active,
    Failed,
}

impl ActivationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Checking => "checking",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "checking" => Some(Self::Checking),
            "activating" => Some(Self::Activating),
            "active" => Some(Self::Active),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Pending,
    Processing,
    Retry,
    Sent,
    Failed,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Retry => "retry",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "retry" => Some(Self::Retry),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Which durable queue table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    Transactional,
    Marketing,
}

impl QueueKind {
    pub fn lane(self) -> Lane {
        match self {
            Self::Transactional => Lane::Transactional,
            Self::Marketing => Lane::Marketing,
        }
    }

    /// Default dedicated-server stream for items that carry none.
    pub fn default_stream(self) -> &'static str {
        match self {
            Self::Transactional => DEDICATED_TRANSACTIONAL_STREAM,
            Self::Marketing => DEDICATED_MARKETING_STREAM,
        }
    }
}

/// Channel scope of a suppression entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliesTo {
    All,
    Marketing,
    Transactional,
}

impl AppliesTo {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Marketing => "marketing",
            Self::Transactional => "transactional",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "marketing" => Some(Self::Marketing),
            "transactional" => Some(Self::Transactional),
            _ => None,
        }
    }
}

/// Link-tracking mode, spelled the way the provider expects it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackLinks {
    None,
    HtmlOnly,
    TextOnly,
    HtmlAndText,
}

impl TrackLinks {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::HtmlOnly => "HtmlOnly",
            Self::TextOnly => "TextOnly",
            Self::HtmlAndText => "HtmlAndText",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "None" => Some(Self::None),
            "HtmlOnly" => Some(Self::HtmlOnly),
            "TextOnly" => Some(Self::TextOnly),
            "HtmlAndText" => Some(Self::HtmlAndText),
            _ => None,
        }
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

/// Server-scoped provider API token, passed explicitly on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerToken(pub String);

impl ServerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Account-scoped provider API token (server provisioning only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountToken(pub String);

impl AccountToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ── Tenant configuration ─────────────────────────────────────────────────────

/// Provider credentials for one delivery lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneConfig {
    pub server_id: Option<i64>,
    pub server_token: Option<String>,
    pub stream_id: Option<String>,
}

impl LaneConfig {
    /// The lane token, treating empty strings as absent.
    pub fn token(&self) -> Option<&str> {
        self.server_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderIdentity {
    pub email: Option<String>,
    pub name: Option<String>,
    pub reply_to: Option<String>,
}

/// Per-tenant email configuration, one row per tenant. In shared mode the
/// lane configs are ignored in favor of the shared singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSettings {
    pub tenant_id: Uuid,
    pub mode: ServerMode,
    pub transactional: LaneConfig,
    pub marketing: LaneConfig,
    pub default_sender: SenderIdentity,
    pub custom_sender: SenderIdentity,
    pub track_opens: bool,
    pub track_links: TrackLinks,
    pub activation_status: ActivationStatus,
    pub activation_error: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl EmailSettings {
    pub fn lane(&self, lane: Lane) -> &LaneConfig {
        match lane {
            Lane::Transactional => &self.transactional,
            Lane::Marketing => &self.marketing,
        }
    }

    /// Default settings row for a tenant seen for the first time.
    pub fn default_for(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            mode: ServerMode::Shared,
            transactional: LaneConfig::default(),
            marketing: LaneConfig::default(),
            default_sender: SenderIdentity::default(),
            custom_sender: SenderIdentity::default(),
            track_opens: false,
            track_links: TrackLinks::None,
            activation_status: ActivationStatus::Pending,
            activation_error: None,
            activated_at: None,
        }
    }
}

/// The process-wide shared provider configuration singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedEmailConfig {
    pub transactional: LaneConfig,
    pub marketing: LaneConfig,
    pub default_sender: SenderIdentity,
}

impl SharedEmailConfig {
    pub fn lane(&self, lane: Lane) -> &LaneConfig {
        match lane {
            Lane::Transactional => &self.transactional,
            Lane::Marketing => &self.marketing,
        }
    }
}

/// Hard platform fallbacks for shared mode, built from process config. The
/// server token comes from the environment and is required at startup, so
/// shared-mode resolution can never come up empty.
#[derive(Debug, Clone)]
pub struct SharedDefaults {
    pub server_token: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: String,
}

impl SharedDefaults {
    pub fn new(server_token: impl Into<String>) -> Self {
        Self {
            server_token: server_token.into(),
            from_email: PLATFORM_FROM_EMAIL.to_owned(),
            from_name: PLATFORM_FROM_NAME.to_owned(),
            reply_to: PLATFORM_REPLY_TO.to_owned(),
        }
    }
}

/// Everything a send needs, resolved once per operation. Immutable; the
/// provider client takes these values explicitly instead of holding state.
#[derive(Debug, Clone)]
pub struct ResolvedSend {
    pub lane: Lane,
    pub from_email: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub server_token: ServerToken,
    pub stream_id: String,
    pub track_opens: bool,
    pub track_links: TrackLinks,
}

/// Billing/linkage fields of a tenant consulted by the activation workflow.
#[derive(Debug, Clone)]
pub struct TenantProfile {
    pub id: Uuid,
    pub name: String,
    pub linkage_id: Option<String>,
    pub email_tier: String,
}

/// Result of provisioning one dedicated provider server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedServer {
    pub server_id: i64,
    pub server_token: String,
    pub stream_id: String,
}

// ── Suppressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SuppressionEntry {
    pub tenant_id: Uuid,
    pub email: String,
    pub applies_to: AppliesTo,
    pub reason: String,
    pub origin: String,
}

// ── Queue ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub to_email: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub template_id: Option<i64>,
    pub template_data: Option<serde_json::Value>,
    pub message_stream: Option<String>,
    pub server_mode: ServerMode,
    pub priority: i32,
    pub status: QueueStatus,
    pub scheduled_for: DateTime<Utc>,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Producer-side queue insert.
#[derive(Debug, Clone)]
pub struct NewQueueItem {
    pub tenant_id: Uuid,
    pub to_email: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub template_id: Option<i64>,
    pub template_data: Option<serde_json::Value>,
    pub message_stream: Option<String>,
    pub server_mode: ServerMode,
    pub priority: i32,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Terminal bookkeeping for a failed delivery attempt, computed by the
/// processor and applied atomically by the queue repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDisposition {
    pub status: QueueStatus,
    pub retry_count: i32,
    pub error_message: String,
    pub failed_at: DateTime<Utc>,
    /// Next attempt time; only set when `status` is `Retry`.
    pub scheduled_for: Option<DateTime<Utc>>,
}

// ── Provider wire types ──────────────────────────────────────────────────────

/// A fully-resolved outbound message handed to the provider client.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub message_stream: String,
    pub track_opens: bool,
    pub track_links: TrackLinks,
}

/// A template-based outbound message.
#[derive(Debug, Clone)]
pub struct TemplateMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub template_id: Option<i64>,
    pub template_alias: Option<String>,
    pub template_model: serde_json::Value,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub message_stream: String,
}

/// Per-message provider acknowledgement. Batch calls return one receipt per
/// entry; `error_code` 0 means accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderReceipt {
    #[serde(rename = "To", default)]
    pub to: Option<String>,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "ErrorCode", default)]
    pub error_code: i64,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BounceQuery {
    pub count: Option<i64>,
    pub offset: Option<i64>,
    #[serde(rename = "type")]
    pub bounce_type: Option<String>,
    pub inactive: Option<bool>,
    #[serde(rename = "emailFilter")]
    pub email_filter: Option<String>,
    #[serde(rename = "messagestream")]
    pub message_stream: Option<String>,
    #[serde(rename = "fromdate")]
    pub from_date: Option<String>,
    #[serde(rename = "todate")]
    pub to_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounce {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Type")]
    pub bounce_type: String,
    #[serde(rename = "TypeCode", default)]
    pub type_code: i64,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "BouncedAt", default)]
    pub bounced_at: Option<String>,
    #[serde(rename = "Details", default)]
    pub details: Option<String>,
    #[serde(rename = "Inactive", default)]
    pub inactive: bool,
    #[serde(rename = "CanActivate", default)]
    pub can_activate: bool,
    #[serde(rename = "Subject", default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouncePage {
    #[serde(rename = "TotalCount")]
    pub total_count: i64,
    #[serde(rename = "Bounces")]
    pub bounces: Vec<Bounce>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(rename = "fromdate")]
    pub from_date: Option<String>,
    #[serde(rename = "todate")]
    pub to_date: Option<String>,
    #[serde(rename = "messagestream")]
    pub message_stream: Option<String>,
    pub tag: Option<String>,
}

/// A provider-side mail server.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderServer {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Request to create a provider-side mail server.
#[derive(Debug, Clone)]
pub struct NewServerSpec {
    pub name: String,
    pub color: String,
    pub track_opens: bool,
    pub track_links: TrackLinks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageStream {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MessageStreamType", default)]
    pub stream_type: Option<String>,
}

// ── Audit / webhook records ──────────────────────────────────────────────────

/// Event-log entry written after every accepted provider send. Best-effort:
/// a failed write never fails the send.
#[derive(Debug, Clone)]
pub struct SendAuditRecord {
    pub tenant_id: Uuid,
    pub contact_id: Option<Uuid>,
    pub message_id: String,
    pub to_email: String,
    pub subject: String,
    pub status: String,
    pub server_type: Lane,
    pub message_stream: String,
    pub tag: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    pub tenant_id: Uuid,
    pub event_type: String,
    pub server_id: i64,
    pub message_id: Option<String>,
    pub recipient_email: Option<String>,
    pub event_data: serde_json::Value,
    pub raw_payload: serde_json::Value,
}
