use sea_orm::DatabaseConnection;

use crate::domain::types::{AccountToken, ServerToken, SharedDefaults};
use crate::infra::db::{
    DbAuditRepository, DbContactRepository, DbQueueRepository, DbSettingsRepository,
    DbSharedConfigRepository, DbSuppressionRepository, DbTenantRepository,
    DbWebhookEventRepository,
};
use crate::infra::postmark::PostmarkClient;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub provider: PostmarkClient,
    pub defaults: SharedDefaults,
    pub account_token: Option<AccountToken>,
    pub queue_proxy_name: String,
}

impl AppState {
    pub fn settings_repo(&self) -> DbSettingsRepository {
        DbSettingsRepository {
            db: self.db.clone(),
        }
    }

    pub fn shared_config_repo(&self) -> DbSharedConfigRepository {
        DbSharedConfigRepository {
            db: self.db.clone(),
        }
    }

    pub fn tenant_repo(&self) -> DbTenantRepository {
        DbTenantRepository {
            db: self.db.clone(),
        }
    }

    pub fn suppression_repo(&self) -> DbSuppressionRepository {
        DbSuppressionRepository {
            db: self.db.clone(),
        }
    }

    pub fn queue_repo(&self) -> DbQueueRepository {
        DbQueueRepository {
            db: self.db.clone(),
        }
    }

    pub fn audit_repo(&self) -> DbAuditRepository {
        DbAuditRepository {
            db: self.db.clone(),
        }
    }

    pub fn contact_repo(&self) -> DbContactRepository {
        DbContactRepository {
            db: self.db.clone(),
        }
    }

    pub fn webhook_repo(&self) -> DbWebhookEventRepository {
        DbWebhookEventRepository {
            db: self.db.clone(),
        }
    }

    /// Shared server token used by the queue processor when an item does not
    /// resolve to a dedicated credential.
    pub fn shared_token(&self) -> ServerToken {
        ServerToken(self.defaults.server_token.clone())
    }
}
