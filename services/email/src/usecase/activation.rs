use uuid::Uuid;

use crate::domain::repository::{EmailProvider, SettingsRepository, TenantRepository};
use crate::domain::types::{
    AccountToken, ActivationStatus, DEDICATED_MARKETING_STREAM, DEDICATED_TRANSACTIONAL_STREAM,
    NewServerSpec, ProviderServer, ProvisionedServer, TrackLinks,
};
use crate::error::EmailServiceError;
use crate::usecase::settings::is_activation_start_allowed;

fn server_name_matches(server: &ProviderServer, wanted: &str) -> bool {
    server.name == wanted || server.name.contains(wanted)
}

/// Provider-side existence of a tenant's dedicated servers.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ServersExist {
    pub transactional: bool,
    pub marketing: bool,
}

// ── CheckServers ─────────────────────────────────────────────────────────────

pub struct CheckServersUseCase<T, P>
where
    T: TenantRepository,
    P: EmailProvider,
{
    pub tenants: T,
    pub provider: P,
    pub account_token: Option<AccountToken>,
}

impl<T, P> CheckServersUseCase<T, P>
where
    T: TenantRepository,
    P: EmailProvider,
{
    pub async fn execute(&self, tenant_id: Uuid) -> Result<ServersExist, EmailServiceError> {
        let account_token = self
            .account_token
            .as_ref()
            .ok_or(EmailServiceError::AccountTokenMissing)?;
        let profile = self
            .tenants
            .profile(tenant_id)
            .await?
            .ok_or(EmailServiceError::TenantNotFound)?;
        let linkage_id = profile
            .linkage_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(EmailServiceError::LinkageIdMissing)?;

        let servers = self.provider.list_servers(account_token).await?;
        let transactional_name = format!("{linkage_id}-transactional");
        let marketing_name = format!("{linkage_id}-marketing");
        Ok(ServersExist {
            transactional: servers.iter().any(|s| server_name_matches(s, &transactional_name)),
            marketing: servers.iter().any(|s| server_name_matches(s, &marketing_name)),
        })
    }
}

// ── ActivateEmail ────────────────────────────────────────────────────────────

/// One-time shared → dedicated provisioning workflow.
///
/// Status walks pending|failed → checking → activating → active, or lands
/// on failed with the error captured. The tenant's mode only flips to
/// dedicated in the single final write, so a mid-flight failure never
/// leaves it half-migrated.
pub struct ActivateEmailUseCase<S, T, P>
where
    S: SettingsRepository,
    T: TenantRepository,
    P: EmailProvider,
{
    pub settings: S,
    pub tenants: T,
    pub provider: P,
    pub account_token: Option<AccountToken>,
}

impl<S, T, P> ActivateEmailUseCase<S, T, P>
where
    S: SettingsRepository,
    T: TenantRepository,
    P: EmailProvider,
{
    pub async fn execute(&self, tenant_id: Uuid) -> Result<(), EmailServiceError> {
        // Fatal preconditions, checked before any external call.
        let profile = self
            .tenants
            .profile(tenant_id)
            .await?
            .ok_or(EmailServiceError::TenantNotFound)?;
        if profile.email_tier == "free" {
            return Err(EmailServiceError::TierNotEligible);
        }
        let linkage_id = profile
            .linkage_id
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(EmailServiceError::LinkageIdMissing)?;
        let account_token = self
            .account_token
            .clone()
            .ok_or(EmailServiceError::AccountTokenMissing)?;

        let current = self.settings.get_or_create(tenant_id).await?;
        if !is_activation_start_allowed(current.activation_status) {
            return Err(EmailServiceError::InvalidRequest(format!(
                "activation cannot start from status '{}'",
                current.activation_status.as_str()
            )));
        }

        self.settings
            .set_activation_status(tenant_id, ActivationStatus::Checking, None)
            .await?;

        match self.provision(tenant_id, &linkage_id, &account_token).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let message = e.to_string();
                if let Err(status_err) = self
                    .settings
                    .set_activation_status(tenant_id, ActivationStatus::Failed, Some(&message))
                    .await
                {
                    tracing::error!(error = %status_err, "failed to record activation failure");
                }
                Err(e)
            }
        }
    }

    async fn provision(
        &self,
        tenant_id: Uuid,
        linkage_id: &str,
        account_token: &AccountToken,
    ) -> Result<(), EmailServiceError> {
        let transactional_name = format!("{linkage_id}-transactional");
        let marketing_name = format!("{linkage_id}-marketing");

        let servers = self.provider.list_servers(account_token).await?;
        let transactional_exists = servers
            .iter()
            .any(|s| server_name_matches(s, &transactional_name));
        let marketing_exists = servers.iter().any(|s| server_name_matches(s, &marketing_name));

        if transactional_exists && marketing_exists {
            // Credentials for pre-existing servers cannot be read back from
            // the provider API; linking them is a manual operation.
            return Err(EmailServiceError::ManualLinkRequired);
        }

        self.settings
            .set_activation_status(tenant_id, ActivationStatus::Activating, None)
            .await?;

        let transactional = self
            .create_server_with_token(
                account_token,
                NewServerSpec {
                    name: transactional_name.clone(),
                    color: "blue".to_owned(),
                    track_opens: false,
                    track_links: TrackLinks::None,
                },
                DEDICATED_TRANSACTIONAL_STREAM,
            )
            .await?;

        let marketing = self
            .create_server_with_token(
                account_token,
                NewServerSpec {
                    name: marketing_name.clone(),
                    color: "green".to_owned(),
                    track_opens: true,
                    track_links: TrackLinks::HtmlAndText,
                },
                DEDICATED_MARKETING_STREAM,
            )
            .await?;

        self.settings
            .store_dedicated_servers(tenant_id, &transactional, &marketing)
            .await?;
        self.tenants.mark_email_activated(tenant_id).await?;
        Ok(())
    }

    async fn create_server_with_token(
        &self,
        account_token: &AccountToken,
        spec: NewServerSpec,
        stream_id: &str,
    ) -> Result<ProvisionedServer, EmailServiceError> {
        let name = spec.name.clone();
        let server = self.provider.create_server(account_token, &spec).await?;
        let token = self
            .provider
            .create_server_token(account_token, server.id, &format!("{name}-token"))
            .await?;
        Ok(ProvisionedServer {
            server_id: server.id,
            server_token: token,
            stream_id: stream_id.to_owned(),
        })
    }
}
