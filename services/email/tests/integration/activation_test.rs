use uuid::Uuid;

use contactgate_email::domain::types::{
    AccountToken, ActivationStatus, ProviderServer, ServerMode, TrackLinks,
};
use contactgate_email::error::EmailServiceError;
use contactgate_email::usecase::activation::{ActivateEmailUseCase, CheckServersUseCase};

use crate::helpers::{
    MockProvider, MockSettingsRepo, MockTenantRepo, shared_settings, tenant_profile,
};

fn account_token() -> Option<AccountToken> {
    Some(AccountToken("account-token".to_owned()))
}

fn activation(
    settings: MockSettingsRepo,
    tenants: MockTenantRepo,
    provider: MockProvider,
) -> ActivateEmailUseCase<MockSettingsRepo, MockTenantRepo, MockProvider> {
    ActivateEmailUseCase {
        settings,
        tenants,
        provider,
        account_token: account_token(),
    }
}

#[tokio::test]
async fn free_tier_is_rejected_before_any_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = activation(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockTenantRepo::new(Some(tenant_profile(tenant_id, "free", Some("acme")))),
        provider.clone(),
    );

    let result = uc.execute(tenant_id).await;

    assert!(matches!(result, Err(EmailServiceError::TierNotEligible)));
    assert_eq!(*provider.list_server_calls.lock().unwrap(), 0);
    assert!(provider.created_servers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_linkage_id_is_rejected_before_any_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = activation(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", None))),
        provider.clone(),
    );

    let result = uc.execute(tenant_id).await;

    assert!(matches!(result, Err(EmailServiceError::LinkageIdMissing)));
    assert_eq!(*provider.list_server_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn missing_account_token_fails_without_provider_calls() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = ActivateEmailUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        tenants: MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme")))),
        provider: provider.clone(),
        account_token: None,
    };

    let result = uc.execute(tenant_id).await;

    assert!(matches!(result, Err(EmailServiceError::AccountTokenMissing)));
    assert_eq!(*provider.list_server_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn pre_existing_servers_require_manual_linking() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::with_servers(vec![
        ProviderServer {
            id: 1,
            name: "acme-transactional".to_owned(),
        },
        ProviderServer {
            id: 2,
            name: "acme-marketing".to_owned(),
        },
    ]);
    let settings = MockSettingsRepo::new(shared_settings(tenant_id));

    let uc = activation(
        settings.clone(),
        MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme")))),
        provider.clone(),
    );

    let result = uc.execute(tenant_id).await;

    assert!(matches!(result, Err(EmailServiceError::ManualLinkRequired)));
    assert!(provider.created_servers.lock().unwrap().is_empty());

    // Status walked checking → failed with the error recorded; mode stayed shared.
    let statuses = settings.statuses.lock().unwrap();
    assert_eq!(statuses[0].0, ActivationStatus::Checking);
    let (last_status, last_error) = statuses.last().unwrap();
    assert_eq!(*last_status, ActivationStatus::Failed);
    assert!(last_error.is_some());
    assert_eq!(settings.current().mode, ServerMode::Shared);
}

#[tokio::test]
async fn successful_activation_provisions_both_lanes_and_flips_mode_once() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();
    let settings = MockSettingsRepo::new(shared_settings(tenant_id));
    let tenants = MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme"))));

    let uc = activation(settings.clone(), tenants.clone(), provider.clone());

    uc.execute(tenant_id).await.unwrap();

    // Two servers created with the linkage naming convention and the right
    // per-lane tracking posture.
    let created = provider.created_servers.lock().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].name, "acme-transactional");
    assert!(!created[0].track_opens);
    assert_eq!(created[0].track_links, TrackLinks::None);
    assert_eq!(created[1].name, "acme-marketing");
    assert!(created[1].track_opens);
    assert_eq!(created[1].track_links, TrackLinks::HtmlAndText);

    // A fresh API credential per server.
    let tokens = provider.created_tokens.lock().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].1, "acme-transactional-token");
    assert_eq!(tokens[1].1, "acme-marketing-token");

    // Status walked checking → activating; the final write stored both lanes.
    let statuses = settings.statuses.lock().unwrap();
    assert_eq!(statuses[0].0, ActivationStatus::Checking);
    assert_eq!(statuses[1].0, ActivationStatus::Activating);

    let stored = settings.stored_servers.lock().unwrap();
    let (transactional, marketing) = stored.as_ref().unwrap();
    assert!(transactional.server_token.starts_with("tok-"));
    assert_eq!(transactional.stream_id, "outbound");
    assert_eq!(marketing.stream_id, "broadcasts");

    let current = settings.current();
    assert_eq!(current.mode, ServerMode::Dedicated);
    assert_eq!(current.activation_status, ActivationStatus::Active);
    assert!(current.activated_at.is_some());
    assert!(*tenants.activated.lock().unwrap());
}

#[tokio::test]
async fn provisioning_failure_records_failed_status_and_keeps_shared_mode() {
    let tenant_id = Uuid::new_v4();
    let mut provider = MockProvider::new();
    provider.fail_create_server = true;
    let settings = MockSettingsRepo::new(shared_settings(tenant_id));

    let uc = activation(
        settings.clone(),
        MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme")))),
        provider,
    );

    let result = uc.execute(tenant_id).await;
    assert!(matches!(result, Err(EmailServiceError::Provider { .. })));

    let current = settings.current();
    assert_eq!(current.mode, ServerMode::Shared);
    assert_eq!(current.activation_status, ActivationStatus::Failed);
    assert!(current.activation_error.as_deref().unwrap().contains("603"));
    assert!(settings.stored_servers.lock().unwrap().is_none());
}

#[tokio::test]
async fn activation_cannot_restart_while_already_active() {
    let tenant_id = Uuid::new_v4();
    let mut settings = shared_settings(tenant_id);
    settings.activation_status = ActivationStatus::Active;
    let provider = MockProvider::new();

    let uc = activation(
        MockSettingsRepo::new(settings),
        MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme")))),
        provider.clone(),
    );

    let result = uc.execute(tenant_id).await;

    assert!(matches!(result, Err(EmailServiceError::InvalidRequest(_))));
    assert_eq!(*provider.list_server_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn check_servers_reports_per_lane_existence() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::with_servers(vec![ProviderServer {
        id: 1,
        name: "acme-transactional".to_owned(),
    }]);

    let uc = CheckServersUseCase {
        tenants: MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", Some("acme")))),
        provider,
        account_token: account_token(),
    };

    let exists = uc.execute(tenant_id).await.unwrap();
    assert!(exists.transactional);
    assert!(!exists.marketing);
}
