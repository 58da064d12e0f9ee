use uuid::Uuid;

use crate::domain::repository::{EmailProvider, SettingsRepository, SharedConfigRepository};
use crate::domain::types::{
    BouncePage, BounceQuery, Lane, MessageStream, ServerMode, SharedDefaults, StatsQuery,
};
use crate::error::EmailServiceError;
use crate::usecase::settings::resolve_sender_and_stream;

/// Provider passthrough operations that need a resolved lane token:
/// bounce listing/reactivation, outbound statistics, stream listing.
pub struct ReportingUseCase<S, C, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
{
    pub settings: S,
    pub shared: C,
    pub provider: P,
    pub defaults: SharedDefaults,
}

impl<S, C, P> ReportingUseCase<S, C, P>
where
    S: SettingsRepository,
    C: SharedConfigRepository,
    P: EmailProvider,
{
    async fn token_for(
        &self,
        tenant_id: Uuid,
        lane: Lane,
    ) -> Result<crate::domain::types::ServerToken, EmailServiceError> {
        let settings = self.settings.get_or_create(tenant_id).await?;
        let shared = match settings.mode {
            ServerMode::Shared => self.shared.get().await?,
            ServerMode::Dedicated => None,
        };
        let resolved = resolve_sender_and_stream(&settings, shared.as_ref(), &self.defaults, lane)?;
        Ok(resolved.server_token)
    }

    pub async fn list_bounces(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        query: BounceQuery,
    ) -> Result<BouncePage, EmailServiceError> {
        let token = self.token_for(tenant_id, lane).await?;
        self.provider.get_bounces(&token, &query).await
    }

    pub async fn reactivate_bounce(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        bounce_id: i64,
    ) -> Result<(), EmailServiceError> {
        let token = self.token_for(tenant_id, lane).await?;
        self.provider.activate_bounce(&token, bounce_id).await
    }

    pub async fn outbound_stats(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        query: StatsQuery,
    ) -> Result<serde_json::Value, EmailServiceError> {
        let token = self.token_for(tenant_id, lane).await?;
        self.provider.outbound_stats(&token, &query).await
    }

    pub async fn list_message_streams(
        &self,
        tenant_id: Uuid,
        lane: Lane,
    ) -> Result<Vec<MessageStream>, EmailServiceError> {
        let token = self.token_for(tenant_id, lane).await?;
        self.provider.list_message_streams(&token).await
    }
}
