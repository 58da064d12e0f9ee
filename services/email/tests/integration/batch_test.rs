use uuid::Uuid;

use contactgate_email::domain::types::{AppliesTo, Lane, SuppressionEntry};
use contactgate_email::error::EmailServiceError;
use contactgate_email::usecase::send::{SendBatchInput, SendBatchUseCase};

use crate::helpers::{
    MockAuditRepo, MockContactRepo, MockProvider, MockSettingsRepo, MockSharedConfigRepo,
    MockSuppressionRepo, platform_defaults, shared_config, shared_settings,
};

fn batch_input(recipients: Vec<&str>, lane: Lane) -> SendBatchInput {
    SendBatchInput {
        recipients: recipients.into_iter().map(str::to_owned).collect(),
        subject: "campaign".to_owned(),
        html_body: Some("<p>news</p>".to_owned()),
        text_body: None,
        from_email: None,
        from_name: None,
        reply_to: None,
        tag: None,
        metadata: None,
        lane,
        track_opens: None,
        track_links: None,
    }
}

fn suppression(tenant_id: Uuid, email: &str, applies_to: AppliesTo) -> SuppressionEntry {
    SuppressionEntry {
        tenant_id,
        email: email.to_owned(),
        applies_to,
        reason: "test".to_owned(),
        origin: "test".to_owned(),
    }
}

fn usecase(
    tenant_id: Uuid,
    suppressions: MockSuppressionRepo,
    provider: MockProvider,
    audit: MockAuditRepo,
) -> SendBatchUseCase<
    MockSettingsRepo,
    MockSharedConfigRepo,
    MockSuppressionRepo,
    MockProvider,
    MockAuditRepo,
    MockContactRepo,
> {
    SendBatchUseCase {
        settings: MockSettingsRepo::new(shared_settings(tenant_id)),
        shared: MockSharedConfigRepo::new(Some(shared_config())),
        suppressions,
        provider,
        audit,
        contacts: MockContactRepo::empty(),
        defaults: platform_defaults(),
    }
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_provider_call() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        tenant_id,
        MockSuppressionRepo::default(),
        provider.clone(),
        MockAuditRepo::new(),
    );

    let recipients: Vec<String> = (0..501).map(|i| format!("user{i}@example.com")).collect();
    let mut input = batch_input(vec![], Lane::Marketing);
    input.recipients = recipients;

    let result = uc.execute(tenant_id, input).await;

    assert!(matches!(result, Err(EmailServiceError::BatchTooLarge)));
    assert_eq!(provider.batch_count(), 0);
}

#[tokio::test]
async fn suppressed_recipients_are_excluded_from_the_provider_payload() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();
    let suppressions = MockSuppressionRepo::with_entries(vec![
        suppression(tenant_id, "blocked@example.com", AppliesTo::All),
        suppression(tenant_id, "unsubscribed@example.com", AppliesTo::Marketing),
    ]);

    let uc = usecase(tenant_id, suppressions, provider.clone(), MockAuditRepo::new());

    let report = uc
        .execute(
            tenant_id,
            batch_input(
                vec![
                    "ok@example.com",
                    // Case differs from the stored entry; still suppressed.
                    "Blocked@Example.com",
                    "unsubscribed@example.com",
                ],
                Lane::Marketing,
            ),
        )
        .await
        .unwrap();

    let batches = provider.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    let sent_to: Vec<&str> = batches[0]
        .1
        .iter()
        .map(|m| m.to[0].as_str())
        .collect();
    assert_eq!(sent_to, vec!["ok@example.com"]);
    assert_eq!(report.summary.suppressed, 2);
    assert_eq!(report.summary.sent, 1);
}

#[tokio::test]
async fn marketing_suppression_does_not_block_transactional_batch() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();
    let suppressions = MockSuppressionRepo::with_entries(vec![suppression(
        tenant_id,
        "unsubscribed@example.com",
        AppliesTo::Marketing,
    )]);

    let uc = usecase(tenant_id, suppressions, provider.clone(), MockAuditRepo::new());

    let report = uc
        .execute(
            tenant_id,
            batch_input(vec!["unsubscribed@example.com"], Lane::Transactional),
        )
        .await
        .unwrap();

    assert_eq!(report.summary.sent, 1);
    assert_eq!(report.summary.suppressed, 0);
    assert_eq!(provider.batch_count(), 1);
}

#[tokio::test]
async fn fully_suppressed_batch_never_reaches_the_provider() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();
    let suppressions = MockSuppressionRepo::with_entries(vec![
        suppression(tenant_id, "a@example.com", AppliesTo::All),
        suppression(tenant_id, "b@example.com", AppliesTo::Marketing),
    ]);

    let uc = usecase(tenant_id, suppressions, provider.clone(), MockAuditRepo::new());

    let result = uc
        .execute(
            tenant_id,
            batch_input(vec!["a@example.com", "b@example.com"], Lane::Marketing),
        )
        .await;

    assert!(matches!(result, Err(EmailServiceError::AllRecipientsSuppressed)));
    assert_eq!(provider.batch_count(), 0);
}

#[tokio::test]
async fn empty_recipient_list_is_a_validation_error() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        tenant_id,
        MockSuppressionRepo::default(),
        provider.clone(),
        MockAuditRepo::new(),
    );

    let result = uc.execute(tenant_id, batch_input(vec![], Lane::Marketing)).await;

    assert!(matches!(result, Err(EmailServiceError::MissingField("recipients"))));
    assert_eq!(provider.batch_count(), 0);
}

#[tokio::test]
async fn per_recipient_failures_are_reported_and_not_audited() {
    let tenant_id = Uuid::new_v4();
    let mut provider = MockProvider::new();
    provider.batch_error_emails.insert("bad@example.com".to_owned());
    let audit = MockAuditRepo::new();

    let uc = usecase(
        tenant_id,
        MockSuppressionRepo::default(),
        provider.clone(),
        audit.clone(),
    );

    let report = uc
        .execute(
            tenant_id,
            batch_input(vec!["good@example.com", "bad@example.com"], Lane::Marketing),
        )
        .await
        .unwrap();

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.sent, 1);
    assert_eq!(report.summary.failed, 1);

    let bad = report
        .results
        .iter()
        .find(|r| r.email == "bad@example.com")
        .unwrap();
    assert_eq!(bad.error_code, 406);
    assert_eq!(bad.error.as_deref(), Some("Inactive recipient"));

    // Only the accepted message was audited.
    let records = audit.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].to_email, "good@example.com");
}

#[tokio::test]
async fn marketing_batch_messages_default_to_full_tracking() {
    let tenant_id = Uuid::new_v4();
    let provider = MockProvider::new();

    let uc = usecase(
        tenant_id,
        MockSuppressionRepo::default(),
        provider.clone(),
        MockAuditRepo::new(),
    );

    uc.execute(tenant_id, batch_input(vec!["a@example.com"], Lane::Marketing))
        .await
        .unwrap();

    let batches = provider.batches.lock().unwrap();
    let message = &batches[0].1[0];
    assert!(message.track_opens);
    assert_eq!(message.message_stream, "marketing-shared");
}
