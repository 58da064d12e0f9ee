use chrono::Duration;
use uuid::Uuid;

use contactgate_email::domain::types::{QueueKind, QueueStatus, ServerMode, ServerToken};
use contactgate_email::usecase::queue::ProcessQueueUseCase;

use crate::helpers::{
    MockProvider, MockQueueRepo, MockSettingsRepo, dedicated_settings, platform_defaults,
    queue_item, shared_settings,
};

fn processor(
    queue: MockQueueRepo,
    settings: MockSettingsRepo,
    provider: MockProvider,
) -> ProcessQueueUseCase<MockQueueRepo, MockSettingsRepo, MockProvider> {
    ProcessQueueUseCase {
        queue,
        settings,
        provider,
        shared_token: ServerToken("queue-shared-token".to_owned()),
        defaults: platform_defaults(),
    }
}

#[tokio::test]
async fn higher_priority_items_dispatch_first_regardless_of_age() {
    let tenant_id = Uuid::new_v4();
    let mut old_low = queue_item(tenant_id, 5, 0, -600);
    old_low.to_email = "low@example.com".to_owned();
    let mut new_high = queue_item(tenant_id, 10, 0, 0);
    new_high.to_email = "high@example.com".to_owned();

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(vec![old_low, new_high]);
    let uc = processor(
        queue,
        MockSettingsRepo::new(shared_settings(tenant_id)),
        provider.clone(),
    );

    let report = uc.execute(QueueKind::Transactional).await;
    assert_eq!(report.processed, 2);

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends[0].1.to[0], "high@example.com");
    assert_eq!(sends[1].1.to[0], "low@example.com");
}

#[tokio::test]
async fn successful_dispatch_marks_sent_with_provider_message_id() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 0, 0);
    let item_id = item.id;

    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockProvider::new(),
    );

    let report = uc.execute(QueueKind::Transactional).await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);

    let sent = queue.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, item_id);
    assert!(sent[0].1.starts_with("msg-"));
}

#[tokio::test]
async fn first_failure_schedules_retry_five_minutes_out() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 0, 0);

    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockProvider::failing_sends(),
    );

    let report = uc.execute(QueueKind::Transactional).await;
    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 1);

    let failed = queue.failed.lock().unwrap();
    let (_, disposition) = &failed[0];
    assert_eq!(disposition.status, QueueStatus::Retry);
    assert_eq!(disposition.retry_count, 1);
    assert_eq!(
        disposition.scheduled_for,
        Some(disposition.failed_at + Duration::minutes(5))
    );
    assert!(disposition.error_message.contains("300"));
}

#[tokio::test]
async fn second_failure_backs_off_fifteen_minutes() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 1, 0);

    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockProvider::failing_sends(),
    );

    uc.execute(QueueKind::Transactional).await;

    let failed = queue.failed.lock().unwrap();
    let (_, disposition) = &failed[0];
    assert_eq!(disposition.status, QueueStatus::Retry);
    assert_eq!(disposition.retry_count, 2);
    assert_eq!(
        disposition.scheduled_for,
        Some(disposition.failed_at + Duration::minutes(15))
    );
}

#[tokio::test]
async fn third_failure_is_terminal_and_not_retried_by_later_passes() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 2, 0);

    let provider = MockProvider::failing_sends();
    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        provider.clone(),
    );

    uc.execute(QueueKind::Transactional).await;

    {
        let failed = queue.failed.lock().unwrap();
        let (_, disposition) = &failed[0];
        assert_eq!(disposition.status, QueueStatus::Failed);
        assert_eq!(disposition.retry_count, 3);
        assert_eq!(disposition.scheduled_for, None);
    }

    // A fourth pass must not touch the failed row.
    let report = uc.execute(QueueKind::Transactional).await;
    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(queue.failed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn full_retry_ladder_walks_pending_retry_retry_failed() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 0, 0);
    let item_id = item.id;

    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        MockProvider::failing_sends(),
    );

    for _ in 0..3 {
        // Pull the schedule forward so the next pass sees the item as due.
        uc.execute(QueueKind::Transactional).await;
        if let Some(item) = queue.items.lock().unwrap().iter_mut().find(|i| i.id == item_id) {
            item.scheduled_for = chrono::Utc::now() - Duration::seconds(1);
        }
    }

    let failed = queue.failed.lock().unwrap();
    let statuses: Vec<QueueStatus> = failed.iter().map(|(_, d)| d.status).collect();
    assert_eq!(
        statuses,
        vec![QueueStatus::Retry, QueueStatus::Retry, QueueStatus::Failed]
    );
    let counts: Vec<i32> = failed.iter().map(|(_, d)| d.retry_count).collect();
    assert_eq!(counts, vec![1, 2, 3]);
}

#[tokio::test]
async fn missing_settings_fail_items_immediately_without_provider_calls() {
    let tenant_id = Uuid::new_v4();
    let items = vec![queue_item(tenant_id, 0, 0, 0), queue_item(tenant_id, 0, 0, 1)];

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(items);
    let uc = processor(queue.clone(), MockSettingsRepo::failing(), provider.clone());

    let report = uc.execute(QueueKind::Transactional).await;

    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(provider.send_count(), 0);

    let failed = queue.failed.lock().unwrap();
    assert_eq!(failed.len(), 2);
    for (_, disposition) in failed.iter() {
        assert_eq!(disposition.status, QueueStatus::Failed);
        assert!(disposition.error_message.contains("settings unavailable"));
    }
}

#[tokio::test]
async fn dedicated_items_use_the_dedicated_lane_token() {
    let tenant_id = Uuid::new_v4();
    let mut item = queue_item(tenant_id, 0, 0, 0);
    item.server_mode = ServerMode::Dedicated;

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue,
        MockSettingsRepo::new(dedicated_settings(tenant_id, Some("dedicated-tx"), None)),
        provider.clone(),
    );

    uc.execute(QueueKind::Transactional).await;

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends[0].0, "dedicated-tx");
}

#[tokio::test]
async fn dedicated_items_fall_back_to_shared_token_when_lane_unconfigured() {
    let tenant_id = Uuid::new_v4();
    let mut item = queue_item(tenant_id, 0, 0, 0);
    item.server_mode = ServerMode::Dedicated;

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue,
        MockSettingsRepo::new(shared_settings(tenant_id)),
        provider.clone(),
    );

    uc.execute(QueueKind::Transactional).await;

    let sends = provider.sends.lock().unwrap();
    assert_eq!(sends[0].0, "queue-shared-token");
}

#[tokio::test]
async fn items_claimed_by_a_concurrent_run_are_skipped() {
    let tenant_id = Uuid::new_v4();
    let contested = queue_item(tenant_id, 0, 0, 0);
    let free = queue_item(tenant_id, 0, 0, 1);
    let contested_id = contested.id;

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(vec![contested, free]).denying([contested_id]);
    let uc = processor(
        queue.clone(),
        MockSettingsRepo::new(shared_settings(tenant_id)),
        provider.clone(),
    );

    let report = uc.execute(QueueKind::Transactional).await;

    assert_eq!(report.processed, 1);
    assert_eq!(provider.send_count(), 1);
    assert!(queue.sent.lock().unwrap().iter().all(|(id, _)| *id != contested_id));
}

#[tokio::test]
async fn queued_transactional_sends_carry_no_tracking() {
    let tenant_id = Uuid::new_v4();
    let item = queue_item(tenant_id, 0, 0, 0);

    let provider = MockProvider::new();
    let queue = MockQueueRepo::new(vec![item]);
    let uc = processor(
        queue,
        MockSettingsRepo::new(shared_settings(tenant_id)),
        provider.clone(),
    );

    uc.execute(QueueKind::Transactional).await;

    let sends = provider.sends.lock().unwrap();
    assert!(!sends[0].1.track_opens);
    assert_eq!(sends[0].1.message_stream, "outbound");
}
