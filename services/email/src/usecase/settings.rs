use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{
    SettingsPatch, SettingsRepository, SharedConfigRepository, TenantRepository,
};
use crate::domain::types::{
    ActivationStatus, DEDICATED_FALLBACK_FROM, EmailSettings, Lane, ResolvedSend, ServerMode,
    ServerToken, SHARED_MARKETING_STREAM, SHARED_TRANSACTIONAL_STREAM, SharedDefaults,
    SharedEmailConfig, TrackLinks,
};
use crate::error::EmailServiceError;

// ── Resolution ───────────────────────────────────────────────────────────────

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// Resolve the effective sender, credentials, stream, and tracking for one
/// send. Pure: the caller fetches the settings row and shared singleton
/// once, then resolution cannot touch I/O.
///
/// Shared mode falls back through shared config to the compiled platform
/// defaults and therefore always succeeds. Dedicated mode requires the
/// lane's server token and fails with `LaneNotConfigured` otherwise.
pub fn resolve_sender_and_stream(
    settings: &EmailSettings,
    shared: Option<&SharedEmailConfig>,
    defaults: &SharedDefaults,
    lane: Lane,
) -> Result<ResolvedSend, EmailServiceError> {
    let custom = &settings.custom_sender;

    match settings.mode {
        ServerMode::Shared => {
            let shared_lane = shared.map(|c| c.lane(lane));
            let token = shared_lane
                .and_then(|l| l.token())
                .unwrap_or(defaults.server_token.as_str())
                .to_owned();
            let stream = shared_lane
                .and_then(|l| non_empty(l.stream_id.as_deref()))
                .unwrap_or(match lane {
                    Lane::Transactional => SHARED_TRANSACTIONAL_STREAM,
                    Lane::Marketing => SHARED_MARKETING_STREAM,
                })
                .to_owned();
            let shared_sender = shared.map(|c| &c.default_sender);
            let from_email = non_empty(custom.email.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.email.as_deref())))
                .unwrap_or(defaults.from_email.as_str())
                .to_owned();
            let from_name = non_empty(custom.name.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.name.as_deref())))
                .unwrap_or(defaults.from_name.as_str())
                .to_owned();
            let reply_to = non_empty(custom.reply_to.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.reply_to.as_deref())))
                .unwrap_or(defaults.reply_to.as_str())
                .to_owned();

            Ok(ResolvedSend {
                lane,
                from_email,
                from_name: Some(from_name),
                reply_to: Some(reply_to),
                server_token: ServerToken(token),
                stream_id: stream,
                track_opens: settings.track_opens,
                track_links: settings.track_links,
            })
        }
        ServerMode::Dedicated => {
            let lane_config = settings.lane(lane);
            let token = lane_config
                .token()
                .ok_or(EmailServiceError::LaneNotConfigured(lane))?
                .to_owned();
            let stream = non_empty(lane_config.stream_id.as_deref())
                .unwrap_or(match lane {
                    Lane::Transactional => crate::domain::types::DEDICATED_TRANSACTIONAL_STREAM,
                    Lane::Marketing => crate::domain::types::DEDICATED_MARKETING_STREAM,
                })
                .to_owned();
            let from_email = non_empty(custom.email.as_deref())
                .or_else(|| non_empty(settings.default_sender.email.as_deref()))
                .unwrap_or(DEDICATED_FALLBACK_FROM)
                .to_owned();
            let from_name = non_empty(custom.name.as_deref())
                .or_else(|| non_empty(settings.default_sender.name.as_deref()))
                .map(str::to_owned);
            let reply_to = non_empty(custom.reply_to.as_deref())
                .or_else(|| non_empty(settings.default_sender.reply_to.as_deref()))
                .map(str::to_owned);

            Ok(ResolvedSend {
                lane,
                from_email,
                from_name,
                reply_to,
                server_token: ServerToken(token),
                stream_id: stream,
                track_opens: settings.track_opens,
                track_links: settings.track_links,
            })
        }
    }
}

// ── Settings view ────────────────────────────────────────────────────────────

/// One lane of the merged settings view returned to the CRUD layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LaneView {
    pub server_id: Option<i64>,
    pub server_token: Option<String>,
    pub stream_id: String,
}

/// Tenant settings merged with the shared singleton and platform defaults,
/// as the settings screen shows them.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SettingsView {
    pub mode: &'static str,
    pub activation_status: &'static str,
    pub activation_error: Option<String>,
    #[serde(serialize_with = "contactgate_core::serde::opt_to_rfc3339_ms")]
    pub activated_at: Option<DateTime<Utc>>,
    pub transactional: LaneView,
    pub marketing: LaneView,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: String,
    pub track_opens: bool,
    pub track_links: TrackLinks,
}

fn lane_view(
    settings: &EmailSettings,
    shared: Option<&SharedEmailConfig>,
    defaults: &SharedDefaults,
    lane: Lane,
) -> LaneView {
    match settings.mode {
        ServerMode::Shared => {
            let shared_lane = shared.map(|c| c.lane(lane));
            LaneView {
                server_id: shared_lane.and_then(|l| l.server_id),
                server_token: Some(
                    shared_lane
                        .and_then(|l| l.token())
                        .unwrap_or(defaults.server_token.as_str())
                        .to_owned(),
                ),
                stream_id: shared_lane
                    .and_then(|l| non_empty(l.stream_id.as_deref()))
                    .unwrap_or(match lane {
                        Lane::Transactional => SHARED_TRANSACTIONAL_STREAM,
                        Lane::Marketing => SHARED_MARKETING_STREAM,
                    })
                    .to_owned(),
            }
        }
        ServerMode::Dedicated => {
            let lane_config = settings.lane(lane);
            LaneView {
                server_id: lane_config.server_id,
                server_token: lane_config.token().map(str::to_owned),
                stream_id: non_empty(lane_config.stream_id.as_deref())
                    .unwrap_or(lane_default_stream(lane))
                    .to_owned(),
            }
        }
    }
}

fn lane_default_stream(lane: Lane) -> &'static str {
    match lane {
        Lane::Transactional => crate::domain::types::DEDICATED_TRANSACTIONAL_STREAM,
        Lane::Marketing => crate::domain::types::DEDICATED_MARKETING_STREAM,
    }
}

/// Build the merged settings view. Pure.
pub fn settings_view(
    settings: &EmailSettings,
    shared: Option<&SharedEmailConfig>,
    defaults: &SharedDefaults,
) -> SettingsView {
    let custom = &settings.custom_sender;
    let shared_sender = shared.map(|c| &c.default_sender);
    let (from_email, from_name, reply_to) = match settings.mode {
        ServerMode::Shared => (
            non_empty(custom.email.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.email.as_deref())))
                .unwrap_or(defaults.from_email.as_str())
                .to_owned(),
            non_empty(custom.name.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.name.as_deref())))
                .unwrap_or(defaults.from_name.as_str())
                .to_owned(),
            non_empty(custom.reply_to.as_deref())
                .or_else(|| shared_sender.and_then(|s| non_empty(s.reply_to.as_deref())))
                .unwrap_or(defaults.reply_to.as_str())
                .to_owned(),
        ),
        ServerMode::Dedicated => (
            non_empty(custom.email.as_deref())
                .or_else(|| non_empty(settings.default_sender.email.as_deref()))
                .unwrap_or(DEDICATED_FALLBACK_FROM)
                .to_owned(),
            non_empty(custom.name.as_deref())
                .or_else(|| non_empty(settings.default_sender.name.as_deref()))
                .unwrap_or_default()
                .to_owned(),
            non_empty(custom.reply_to.as_deref())
                .or_else(|| non_empty(settings.default_sender.reply_to.as_deref()))
                .unwrap_or_default()
                .to_owned(),
        ),
    };

    SettingsView {
        mode: settings.mode.as_str(),
        activation_status: settings.activation_status.as_str(),
        activation_error: settings.activation_error.clone(),
        activated_at: settings.activated_at,
        transactional: lane_view(settings, shared, defaults, Lane::Transactional),
        marketing: lane_view(settings, shared, defaults, Lane::Marketing),
        from_email,
        from_name,
        reply_to,
        track_opens: settings.track_opens,
        track_links: settings.track_links,
    }
}

// ── GetEmailSettings ─────────────────────────────────────────────────────────

pub struct GetEmailSettingsUseCase<S, C>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
{
    pub settings: S,
    pub shared: C,
    pub defaults: SharedDefaults,
}

impl<S, C> GetEmailSettingsUseCase<S, C>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
{
    pub async fn execute(&self, tenant_id: Uuid) -> Result<SettingsView, EmailServiceError> {
        let settings = self.settings.get_or_create(tenant_id).await?;
        let shared = match settings.mode {
            ServerMode::Shared => self.shared.get().await?,
            ServerMode::Dedicated => None,
        };
        Ok(settings_view(&settings, shared.as_ref(), &self.defaults))
    }
}

// ── UpdateEmailSettings ──────────────────────────────────────────────────────

pub struct UpdateEmailSettingsUseCase<S, T>
where
    S: SettingsRepository,
    T: TenantRepository,
{
    pub settings: S,
    pub tenants: T,
}

impl<S, T> UpdateEmailSettingsUseCase<S, T>
where
    S: SettingsRepository,
    T: TenantRepository,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        patch: SettingsPatch,
    ) -> Result<EmailSettings, EmailServiceError> {
        let updated = self.settings.update(tenant_id, &patch).await?;
        if let Some(linkage_id) = patch.linkage_id.as_deref().filter(|s| !s.is_empty()) {
            self.tenants.set_linkage_id(tenant_id, linkage_id).await?;
        }
        Ok(updated)
    }
}

// ── Shared config (superadmin) ───────────────────────────────────────────────

pub struct GetSharedConfigUseCase<C: SharedConfigRepository> {
    pub shared: C,
}

impl<C: SharedConfigRepository> GetSharedConfigUseCase<C> {
    pub async fn execute(&self) -> Result<Option<SharedEmailConfig>, EmailServiceError> {
        self.shared.get().await
    }
}

pub struct UpdateSharedConfigUseCase<C: SharedConfigRepository> {
    pub shared: C,
}

impl<C: SharedConfigRepository> UpdateSharedConfigUseCase<C> {
    pub async fn execute(&self, config: SharedEmailConfig) -> Result<(), EmailServiceError> {
        if config.transactional.token().is_none() {
            return Err(EmailServiceError::MissingField("transactional_server_token"));
        }
        if config.marketing.token().is_none() {
            return Err(EmailServiceError::MissingField("marketing_server_token"));
        }
        self.shared.upsert(&config).await
    }
}

/// Activation-status transitions the settings row may take. Exposed so the
/// activation workflow and tests agree on the legal order.
pub fn is_activation_start_allowed(status: ActivationStatus) -> bool {
    matches!(status, ActivationStatus::Pending | ActivationStatus::Failed)
}
