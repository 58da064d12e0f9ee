use uuid::Uuid;

use contactgate_email::domain::repository::SettingsPatch;
use contactgate_email::error::EmailServiceError;
use contactgate_email::usecase::settings::{
    GetEmailSettingsUseCase, UpdateEmailSettingsUseCase,
};

use crate::helpers::{
    MockSettingsRepo, MockSharedConfigRepo, MockTenantRepo, platform_defaults, shared_config,
    shared_settings, tenant_profile,
};

#[tokio::test]
async fn settings_view_merges_shared_singleton_tokens() {
    let tenant_id = Uuid::new_v4();

    let uc = GetEmailSettingsUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        shared: MockSharedConfigRepo::new(Some(shared_config())),
        defaults: platform_defaults(),
    };

    let view = uc.execute(tenant_id).await.unwrap();
    assert_eq!(view.mode, "shared");
    assert_eq!(view.activation_status, "pending");
    assert_eq!(view.transactional.server_token.as_deref(), Some("shared-tx-token"));
    assert_eq!(view.marketing.stream_id, "marketing-shared");
    assert_eq!(view.from_email, "hello@platform.test");
}

#[tokio::test]
async fn settings_view_falls_back_to_platform_defaults_without_singleton() {
    let tenant_id = Uuid::new_v4();

    let uc = GetEmailSettingsUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        shared: MockSharedConfigRepo::empty(),
        defaults: platform_defaults(),
    };

    let view = uc.execute(tenant_id).await.unwrap();
    assert_eq!(view.transactional.server_token.as_deref(), Some("platform-shared-token"));
    assert_eq!(view.from_email, "share@share.komunate.com");
    assert_eq!(view.from_name, "Komunate Platform");
}

#[tokio::test]
async fn settings_fetch_failure_surfaces_config_unavailable() {
    let uc = GetEmailSettingsUseCase {
        settings: MockSettingsRepo::failing(),
        shared: MockSharedConfigRepo::empty(),
        defaults: platform_defaults(),
    };

    let result = uc.execute(Uuid::new_v4()).await;
    assert!(matches!(result, Err(EmailServiceError::ConfigUnavailable(_))));
}

#[tokio::test]
async fn settings_update_passes_linkage_id_through_to_the_tenant() {
    let tenant_id = Uuid::new_v4();
    let tenants = MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", None)));

    let uc = UpdateEmailSettingsUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        tenants: tenants.clone(),
    };

    uc.execute(
        tenant_id,
        SettingsPatch {
            custom_from_email: Some("branded@tenant.test".to_owned()),
            linkage_id: Some("acme".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(tenants.linkage_sets.lock().unwrap().as_slice(), ["acme"]);
}

#[tokio::test]
async fn settings_update_without_linkage_id_leaves_the_tenant_alone() {
    let tenant_id = Uuid::new_v4();
    let tenants = MockTenantRepo::new(Some(tenant_profile(tenant_id, "growth", None)));

    let uc = UpdateEmailSettingsUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        tenants: tenants.clone(),
    };

    uc.execute(tenant_id, SettingsPatch::default()).await.unwrap();

    assert!(tenants.linkage_sets.lock().unwrap().is_empty());
}
