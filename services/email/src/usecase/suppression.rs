use uuid::Uuid;

use crate::domain::repository::{
    EmailProvider, SettingsRepository, SharedConfigRepository, SuppressionRepository,
};
use crate::domain::types::{
    AppliesTo, Lane, ResolvedSend, ServerMode, SharedDefaults, SuppressionEntry,
};
use crate::error::EmailServiceError;
use crate::usecase::settings::resolve_sender_and_stream;

async fn resolve_lane<S, C>(
    settings: &S,
    shared: &C,
    defaults: &SharedDefaults,
    tenant_id: Uuid,
    lane: Lane,
) -> Result<ResolvedSend, EmailServiceError>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
{
    let tenant_settings = settings.get_or_create(tenant_id).await?;
    let shared_config = match tenant_settings.mode {
        ServerMode::Shared => shared.get().await?,
        ServerMode::Dedicated => None,
    };
    resolve_sender_and_stream(&tenant_settings, shared_config.as_ref(), defaults, lane)
}

/// Channel scope recorded for an explicit suppression: marketing-lane
/// suppressions stay marketing-only, transactional-lane suppressions block
/// everything.
fn applies_to_for(lane: Lane) -> AppliesTo {
    match lane {
        Lane::Marketing => AppliesTo::Marketing,
        Lane::Transactional => AppliesTo::All,
    }
}

// ── AddSuppressions ──────────────────────────────────────────────────────────

pub struct AddSuppressionsUseCase<S, C, U, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
{
    pub settings: S,
    pub shared: C,
    pub suppressions: U,
    pub provider: P,
    pub defaults: SharedDefaults,
}

impl<S, C, U, P> AddSuppressionsUseCase<S, C, U, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        emails: Vec<String>,
    ) -> Result<usize, EmailServiceError> {
        if emails.is_empty() {
            return Err(EmailServiceError::MissingField("emails"));
        }

        let resolved =
            resolve_lane(&self.settings, &self.shared, &self.defaults, tenant_id, lane).await?;
        self.provider
            .add_suppressions(&resolved.server_token, &resolved.stream_id, &emails)
            .await?;

        // Mirror into the local list so pre-send filtering sees it without a
        // provider round-trip.
        let applies_to = applies_to_for(lane);
        for email in &emails {
            let entry = SuppressionEntry {
                tenant_id,
                email: email.to_lowercase(),
                applies_to,
                reason: "Added via API".to_owned(),
                origin: "system".to_owned(),
            };
            self.suppressions.add(&entry).await?;
        }
        Ok(emails.len())
    }
}

// ── RemoveSuppressions ───────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize)]
pub struct UnsuppressResult {
    pub email: String,
    pub removed: bool,
}

pub struct RemoveSuppressionsUseCase<S, C, U, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
{
    pub settings: S,
    pub shared: C,
    pub suppressions: U,
    pub provider: P,
    pub defaults: SharedDefaults,
}

impl<S, C, U, P> RemoveSuppressionsUseCase<S, C, U, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    U: SuppressionRepository,
    P: EmailProvider,
{
    pub async fn execute(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        emails: Vec<String>,
    ) -> Result<Vec<UnsuppressResult>, EmailServiceError> {
        if emails.is_empty() {
            return Err(EmailServiceError::MissingField("emails"));
        }

        let resolved =
            resolve_lane(&self.settings, &self.shared, &self.defaults, tenant_id, lane).await?;

        // The provider only supports per-address deletion; each success also
        // clears the local entry so the two lists stay in step.
        let mut results = Vec::with_capacity(emails.len());
        for email in emails {
            let removed = match self
                .provider
                .remove_suppression(&resolved.server_token, &resolved.stream_id, &email)
                .await
            {
                Ok(()) => {
                    self.suppressions.remove(tenant_id, &email).await?;
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, email = %email, "failed to remove provider suppression");
                    false
                }
            };
            results.push(UnsuppressResult { email, removed });
        }
        Ok(results)
    }
}
