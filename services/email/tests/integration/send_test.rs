use uuid::Uuid;

use contactgate_email::domain::types::{Lane, TrackLinks};
use contactgate_email::error::EmailServiceError;
use contactgate_email::usecase::send::{AuditStatus, SendEmailInput, SendEmailUseCase};

use crate::helpers::{
    MockAuditRepo, MockContactRepo, MockProvider, MockSettingsRepo, MockSharedConfigRepo,
    dedicated_settings, platform_defaults, shared_config, shared_settings,
};

fn send_input(lane: Lane) -> SendEmailInput {
    SendEmailInput {
        to: vec!["a@example.com".to_owned()],
        subject: "hello".to_owned(),
        html_body: Some("<p>hi</p>".to_owned()),
        text_body: None,
        from_email: None,
        from_name: None,
        reply_to: None,
        cc: vec![],
        bcc: vec![],
        tag: Some("welcome".to_owned()),
        metadata: None,
        lane,
        track_opens: None,
        track_links: None,
    }
}

fn usecase(
    settings: MockSettingsRepo,
    shared: MockSharedConfigRepo,
    provider: MockProvider,
    audit: MockAuditRepo,
    contacts: MockContactRepo,
) -> SendEmailUseCase<MockSettingsRepo, MockSharedConfigRepo, MockProvider, MockAuditRepo, MockContactRepo>
{
    SendEmailUseCase {
        settings,
        shared,
        provider,
        audit,
        contacts,
        defaults: platform_defaults(),
    }
}

#[tokio::test]
async fn shared_transactional_send_disables_tracking_and_uses_shared_stream() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();
    let audit = MockAuditRepo::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::new(Some(shared_config())),
        provider.clone(),
        audit.clone(),
        MockContactRepo::empty(),
    );

    let receipt = uc.execute(tenant_id, send_input(Lane::Transactional)).await.unwrap();
    assert!(!receipt.message_id.is_empty());
    assert_eq!(receipt.audit, AuditStatus::Recorded);

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends.len(), 1, "expected exactly one provider call");
    let (token, message) = &sends[0];
    assert_eq!(token, "shared-tx-token");
    assert_eq!(message.message_stream, "transactional-shared");
    assert!(!message.track_opens);
    assert_eq!(message.track_links, TrackLinks::None);

    // Audit record persisted with the provider message id and lane.
    let records = audit.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message_id, receipt.message_id);
    assert_eq!(records[0].server_type, Lane::Transactional);
    assert_eq!(records[0].message_stream, "transactional-shared");
    assert_eq!(records[0].to_email, "a@example.com");
}

#[tokio::test]
async fn marketing_send_defaults_to_full_tracking() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::new(Some(shared_config())),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    uc.execute(tenant_id, send_input(Lane::Marketing)).await.unwrap();

    let sends = provider.sends.lock().unwrap();
    let (token, message) = &sends[0];
    assert_eq!(token, "shared-mk-token");
    assert_eq!(message.message_stream, "marketing-shared");
    assert!(message.track_opens);
    assert_eq!(message.track_links, TrackLinks::HtmlAndText);
}

#[tokio::test]
async fn request_tracking_override_beats_lane_default() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    let mut input = send_input(Lane::Transactional);
    input.track_opens = Some(true);
    input.track_links = Some(TrackLinks::HtmlOnly);
    uc.execute(tenant_id, input).await.unwrap();

    let sends = provider.sends.lock().unwrap();
    assert!(sends[0].1.track_opens);
    assert_eq!(sends[0].1.track_links, TrackLinks::HtmlOnly);
}

#[tokio::test]
async fn shared_mode_without_singleton_still_sends_with_platform_token() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    uc.execute(tenant_id, send_input(Lane::Transactional)).await.unwrap();

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends[0].0, "platform-shared-token");
    assert!(!sends[0].0.is_empty());
}

#[tokio::test]
async fn missing_subject_is_rejected_before_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    let mut input = send_input(Lane::Transactional);
    input.subject = String::new();
    let result = uc.execute(tenant_id, input).await;

    assert!(matches!(result, Err(EmailServiceError::MissingField("subject"))));
    assert_eq!(provider.send_count(), 0);
}

#[tokio::test]
async fn missing_body_is_rejected_before_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    let mut input = send_input(Lane::Transactional);
    input.html_body = None;
    input.text_body = None;
    let result = uc.execute(tenant_id, input).await;

    assert!(matches!(result, Err(EmailServiceError::MissingField("body"))));
    assert_eq!(provider.send_count(), 0);
}

#[tokio::test]
async fn dedicated_mode_with_missing_lane_token_fails_without_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(dedicated_settings(tenant_id, None, Some("mk-token"))),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    let result = uc.execute(tenant_id, send_input(Lane::Transactional)).await;

    assert!(matches!(
        result,
        Err(EmailServiceError::LaneNotConfigured(Lane::Transactional))
    ));
    assert_eq!(provider.send_count(), 0);
}

#[tokio::test]
async fn dedicated_mode_uses_lane_token_and_stream() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(dedicated_settings(tenant_id, Some("tx-token"), None)),
        MockSharedConfigRepo::empty(),
        provider.clone(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    uc.execute(tenant_id, send_input(Lane::Transactional)).await.unwrap();

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends[0].0, "tx-token");
    assert_eq!(sends[0].1.message_stream, "outbound");
}

#[tokio::test]
async fn audit_failure_does_not_fail_the_send() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::new(Some(shared_config())),
        provider.clone(),
        MockAuditRepo::failing(),
        MockContactRepo::empty(),
    );

    let receipt = uc.execute(tenant_id, send_input(Lane::Transactional)).await.unwrap();

    assert!(!receipt.message_id.is_empty());
    assert_eq!(receipt.audit, AuditStatus::Failed);
    assert_eq!(provider.send_count(), 1);
}

#[tokio::test]
async fn audit_attributes_contact_for_single_recipient() {
    let tenant_id = Uuid::new_v4();
    let contact_id = Uuid::new_v4();
    let audit = MockAuditRepo::new();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::new(Some(shared_config())),
        MockProvider::new(),
        audit.clone(),
        MockContactRepo::with_contact(tenant_id, "a@example.com", contact_id),
    );

    uc.execute(tenant_id, send_input(Lane::Transactional)).await.unwrap();

    let records = audit.records.lock().unwrap();
    assert_eq!(records[0].contact_id, Some(contact_id));
}

#[tokio::test]
async fn provider_error_is_propagated_verbatim() {
    let tenant_id = Uuid::new_v4();

    let uc = usecase(
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockSharedConfigRepo::new(Some(shared_config())),
        MockProvider::failing_sends(),
        MockAuditRepo::new(),
        MockContactRepo::empty(),
    );

    let result = uc.execute(tenant_id, send_input(Lane::Transactional)).await;

    match result {
        Err(EmailServiceError::Provider { code, message }) => {
            assert_eq!(code, 300);
            assert_eq!(message, "Invalid 'From' address");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}
