use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use contactgate_email_schema::{
    contacts, email_queue_marketing, email_queue_transactional, email_sends, email_settings,
    email_suppressions, email_webhook_events, shared_email_config, tenants,
};

use crate::domain::repository::{
    AuditRepository, ContactRepository, QueueRepository, SettingsPatch, SettingsRepository,
    SharedConfigRepository, SuppressionRepository, TenantRepository, WebhookEventRepository,
};
use crate::domain::types::{
    ActivationStatus, EmailSettings, FailureDisposition, Lane, LaneConfig, NewQueueItem,
    ProvisionedServer, QueueItem, QueueKind, QueueStatus, SendAuditRecord, SenderIdentity,
    ServerMode, SharedEmailConfig, SuppressionEntry, TenantProfile, TrackLinks,
    WebhookEventRecord,
};
use crate::error::EmailServiceError;

fn internal(e: anyhow::Error) -> EmailServiceError {
    EmailServiceError::Internal(e)
}

// ── Settings repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSettingsRepository {
    pub db: DatabaseConnection,
}

impl SettingsRepository for DbSettingsRepository {
    async fn get_or_create(&self, tenant_id: Uuid) -> Result<EmailSettings, EmailServiceError> {
        let existing = email_settings::Entity::find_by_id(tenant_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                EmailServiceError::ConfigUnavailable(
                    anyhow::Error::new(e).context("fetch email settings"),
                )
            })?;

        match existing {
            Some(model) => settings_from_model(model),
            None => {
                let now = Utc::now();
                let defaults = EmailSettings::default_for(tenant_id);
                let inserted = email_settings::ActiveModel {
                    tenant_id: Set(tenant_id),
                    server_mode: Set(defaults.mode.as_str().to_owned()),
                    transactional_server_id: Set(None),
                    transactional_server_token: Set(None),
                    transactional_stream_id: Set(None),
                    marketing_server_id: Set(None),
                    marketing_server_token: Set(None),
                    marketing_stream_id: Set(None),
                    default_from_email: Set(None),
                    default_from_name: Set(None),
                    default_reply_to: Set(None),
                    custom_from_email: Set(None),
                    custom_from_name: Set(None),
                    custom_reply_to: Set(None),
                    track_opens: Set(false),
                    track_links: Set(TrackLinks::None.as_str().to_owned()),
                    activation_status: Set(defaults.activation_status.as_str().to_owned()),
                    activation_error: Set(None),
                    activated_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
                .map_err(|e| {
                    EmailServiceError::ConfigUnavailable(
                        anyhow::Error::new(e).context("create default email settings"),
                    )
                })?;
                settings_from_model(inserted)
            }
        }
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<EmailSettings, EmailServiceError> {
        // Ensure the row exists first; updates may arrive before any send.
        self.get_or_create(tenant_id).await?;

        let mut am = email_settings::ActiveModel {
            tenant_id: Set(tenant_id),
            ..Default::default()
        };
        if let Some(v) = &patch.default_from_email {
            am.default_from_email = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.default_from_name {
            am.default_from_name = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.default_reply_to {
            am.default_reply_to = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.custom_from_email {
            am.custom_from_email = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.custom_from_name {
            am.custom_from_name = Set(Some(v.clone()));
        }
        if let Some(v) = &patch.custom_reply_to {
            am.custom_reply_to = Set(Some(v.clone()));
        }
        if let Some(v) = patch.track_opens {
            am.track_opens = Set(v);
        }
        if let Some(v) = patch.track_links {
            am.track_links = Set(v.as_str().to_owned());
        }
        am.updated_at = Set(Utc::now());
        let updated = am
            .update(&self.db)
            .await
            .context("update email settings")
            .map_err(internal)?;
        settings_from_model(updated)
    }

    async fn set_activation_status(
        &self,
        tenant_id: Uuid,
        status: ActivationStatus,
        error: Option<&str>,
    ) -> Result<(), EmailServiceError> {
        email_settings::ActiveModel {
            tenant_id: Set(tenant_id),
            activation_status: Set(status.as_str().to_owned()),
            activation_error: Set(error.map(str::to_owned)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set activation status")
        .map_err(internal)?;
        Ok(())
    }

    async fn store_dedicated_servers(
        &self,
        tenant_id: Uuid,
        transactional: &ProvisionedServer,
        marketing: &ProvisionedServer,
    ) -> Result<(), EmailServiceError> {
        let now = Utc::now();
        email_settings::ActiveModel {
            tenant_id: Set(tenant_id),
            server_mode: Set(ServerMode::Dedicated.as_str().to_owned()),
            transactional_server_id: Set(Some(transactional.server_id)),
            transactional_server_token: Set(Some(transactional.server_token.clone())),
            transactional_stream_id: Set(Some(transactional.stream_id.clone())),
            marketing_server_id: Set(Some(marketing.server_id)),
            marketing_server_token: Set(Some(marketing.server_token.clone())),
            marketing_stream_id: Set(Some(marketing.stream_id.clone())),
            activation_status: Set(ActivationStatus::Active.as_str().to_owned()),
            activation_error: Set(None),
            activated_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("store dedicated servers")
        .map_err(internal)?;
        Ok(())
    }

    async fn find_tenant_by_server_id(
        &self,
        server_id: i64,
    ) -> Result<Option<Uuid>, EmailServiceError> {
        let model = email_settings::Entity::find()
            .filter(
                Condition::any()
                    .add(email_settings::Column::TransactionalServerId.eq(server_id))
                    .add(email_settings::Column::MarketingServerId.eq(server_id)),
            )
            .one(&self.db)
            .await
            .context("find tenant by server id")
            .map_err(internal)?;
        Ok(model.map(|m| m.tenant_id))
    }
}

fn settings_from_model(model: email_settings::Model) -> Result<EmailSettings, EmailServiceError> {
    let mode = ServerMode::parse(&model.server_mode)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown server mode '{}'", model.server_mode)))?;
    let activation_status = ActivationStatus::parse(&model.activation_status).ok_or_else(|| {
        internal(anyhow::anyhow!(
            "unknown activation status '{}'",
            model.activation_status
        ))
    })?;
    let track_links = TrackLinks::parse(&model.track_links)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown track links '{}'", model.track_links)))?;

    Ok(EmailSettings {
        tenant_id: model.tenant_id,
        mode,
        transactional: LaneConfig {
            server_id: model.transactional_server_id,
            server_token: model.transactional_server_token,
            stream_id: model.transactional_stream_id,
        },
        marketing: LaneConfig {
            server_id: model.marketing_server_id,
            server_token: model.marketing_server_token,
            stream_id: model.marketing_stream_id,
        },
        default_sender: SenderIdentity {
            email: model.default_from_email,
            name: model.default_from_name,
            reply_to: model.default_reply_to,
        },
        custom_sender: SenderIdentity {
            email: model.custom_from_email,
            name: model.custom_from_name,
            reply_to: model.custom_reply_to,
        },
        track_opens: model.track_opens,
        track_links,
        activation_status,
        activation_error: model.activation_error,
        activated_at: model.activated_at,
    })
}

// ── Shared config repository ─────────────────────────────────────────────────

/// Primary key of the singleton row.
const SHARED_CONFIG_ID: i32 = 1;

#[derive(Clone)]
pub struct DbSharedConfigRepository {
    pub db: DatabaseConnection,
}

impl SharedConfigRepository for DbSharedConfigRepository {
    async fn get(&self) -> Result<Option<SharedEmailConfig>, EmailServiceError> {
        let model = shared_email_config::Entity::find_by_id(SHARED_CONFIG_ID)
            .one(&self.db)
            .await
            .context("fetch shared email config")
            .map_err(internal)?;
        Ok(model.map(shared_config_from_model))
    }

    async fn upsert(&self, config: &SharedEmailConfig) -> Result<(), EmailServiceError> {
        let am = shared_email_config::ActiveModel {
            id: Set(SHARED_CONFIG_ID),
            transactional_server_id: Set(config.transactional.server_id),
            transactional_server_token: Set(config
                .transactional
                .server_token
                .clone()
                .unwrap_or_default()),
            transactional_stream_id: Set(config
                .transactional
                .stream_id
                .clone()
                .unwrap_or_else(|| "outbound".to_owned())),
            marketing_server_id: Set(config.marketing.server_id),
            marketing_server_token: Set(config.marketing.server_token.clone().unwrap_or_default()),
            marketing_stream_id: Set(config
                .marketing
                .stream_id
                .clone()
                .unwrap_or_else(|| "broadcasts".to_owned())),
            default_from_email: Set(config
                .default_sender
                .email
                .clone()
                .unwrap_or_else(|| crate::domain::types::PLATFORM_FROM_EMAIL.to_owned())),
            default_from_name: Set(config
                .default_sender
                .name
                .clone()
                .unwrap_or_else(|| crate::domain::types::PLATFORM_FROM_NAME.to_owned())),
            default_reply_to: Set(config
                .default_sender
                .reply_to
                .clone()
                .unwrap_or_else(|| crate::domain::types::PLATFORM_REPLY_TO.to_owned())),
            updated_at: Set(Utc::now()),
        };
        shared_email_config::Entity::insert(am)
            .on_conflict(
                OnConflict::column(shared_email_config::Column::Id)
                    .update_columns([
                        shared_email_config::Column::TransactionalServerId,
                        shared_email_config::Column::TransactionalServerToken,
                        shared_email_config::Column::TransactionalStreamId,
                        shared_email_config::Column::MarketingServerId,
                        shared_email_config::Column::MarketingServerToken,
                        shared_email_config::Column::MarketingStreamId,
                        shared_email_config::Column::DefaultFromEmail,
                        shared_email_config::Column::DefaultFromName,
                        shared_email_config::Column::DefaultReplyTo,
                        shared_email_config::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert shared email config")
            .map_err(internal)?;
        Ok(())
    }
}

fn shared_config_from_model(model: shared_email_config::Model) -> SharedEmailConfig {
    SharedEmailConfig {
        transactional: LaneConfig {
            server_id: model.transactional_server_id,
            server_token: Some(model.transactional_server_token),
            stream_id: Some(model.transactional_stream_id),
        },
        marketing: LaneConfig {
            server_id: model.marketing_server_id,
            server_token: Some(model.marketing_server_token),
            stream_id: Some(model.marketing_stream_id),
        },
        default_sender: SenderIdentity {
            email: Some(model.default_from_email),
            name: Some(model.default_from_name),
            reply_to: Some(model.default_reply_to),
        },
    }
}

// ── Tenant repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTenantRepository {
    pub db: DatabaseConnection,
}

impl TenantRepository for DbTenantRepository {
    async fn profile(&self, tenant_id: Uuid) -> Result<Option<TenantProfile>, EmailServiceError> {
        let model = tenants::Entity::find_by_id(tenant_id)
            .one(&self.db)
            .await
            .context("fetch tenant profile")
            .map_err(internal)?;
        Ok(model.map(|m| TenantProfile {
            id: m.id,
            name: m.name,
            linkage_id: m.postmark_id,
            email_tier: m.email_tier,
        }))
    }

    async fn set_linkage_id(
        &self,
        tenant_id: Uuid,
        linkage_id: &str,
    ) -> Result<(), EmailServiceError> {
        tenants::ActiveModel {
            id: Set(tenant_id),
            postmark_id: Set(Some(linkage_id.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set tenant linkage id")
        .map_err(internal)?;
        Ok(())
    }

    async fn mark_email_activated(&self, tenant_id: Uuid) -> Result<(), EmailServiceError> {
        tenants::ActiveModel {
            id: Set(tenant_id),
            email_activated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark tenant email activated")
        .map_err(internal)?;
        Ok(())
    }
}

// ── Suppression repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSuppressionRepository {
    pub db: DatabaseConnection,
}

impl SuppressionRepository for DbSuppressionRepository {
    async fn suppressed_subset(
        &self,
        tenant_id: Uuid,
        lane: Lane,
        emails: &[String],
    ) -> Result<std::collections::HashSet<String>, EmailServiceError> {
        let lowered: Vec<String> = emails.iter().map(|e| e.to_lowercase()).collect();
        let models = email_suppressions::Entity::find()
            .filter(email_suppressions::Column::TenantId.eq(tenant_id))
            .filter(
                email_suppressions::Column::AppliesTo
                    .is_in(["all", lane.as_str()]),
            )
            .filter(email_suppressions::Column::Email.is_in(lowered))
            .all(&self.db)
            .await
            .context("fetch suppressed subset")
            .map_err(internal)?;
        Ok(models.into_iter().map(|m| m.email).collect())
    }

    async fn add(&self, entry: &SuppressionEntry) -> Result<(), EmailServiceError> {
        email_suppressions::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(entry.tenant_id),
            email: Set(entry.email.to_lowercase()),
            applies_to: Set(entry.applies_to.as_str().to_owned()),
            reason: Set(Some(entry.reason.clone())),
            origin: Set(Some(entry.origin.clone())),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert suppression entry")
        .map_err(internal)?;
        Ok(())
    }

    async fn remove(&self, tenant_id: Uuid, email: &str) -> Result<bool, EmailServiceError> {
        let result = email_suppressions::Entity::delete_many()
            .filter(email_suppressions::Column::TenantId.eq(tenant_id))
            .filter(email_suppressions::Column::Email.eq(email.to_lowercase()))
            .exec(&self.db)
            .await
            .context("delete suppression entries")
            .map_err(internal)?;
        Ok(result.rows_affected > 0)
    }
}

// ── Queue repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbQueueRepository {
    pub db: DatabaseConnection,
}

impl QueueRepository for DbQueueRepository {
    async fn fetch_due(
        &self,
        queue: QueueKind,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<QueueItem>, EmailServiceError> {
        match queue {
            QueueKind::Transactional => fetch_due_transactional(&self.db, now, limit).await,
            QueueKind::Marketing => fetch_due_marketing(&self.db, now, limit).await,
        }
    }

    async fn claim(
        &self,
        queue: QueueKind,
        id: Uuid,
        observed: QueueStatus,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, EmailServiceError> {
        match queue {
            QueueKind::Transactional => {
                claim_transactional(&self.db, id, observed, lease_until).await
            }
            QueueKind::Marketing => claim_marketing(&self.db, id, observed, lease_until).await,
        }
    }

    async fn mark_sent(
        &self,
        queue: QueueKind,
        id: Uuid,
        provider_message_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), EmailServiceError> {
        match queue {
            QueueKind::Transactional => {
                mark_sent_transactional(&self.db, id, provider_message_id, sent_at).await
            }
            QueueKind::Marketing => {
                mark_sent_marketing(&self.db, id, provider_message_id, sent_at).await
            }
        }
    }

    async fn mark_failed(
        &self,
        queue: QueueKind,
        id: Uuid,
        disposition: &FailureDisposition,
    ) -> Result<(), EmailServiceError> {
        match queue {
            QueueKind::Transactional => mark_failed_transactional(&self.db, id, disposition).await,
            QueueKind::Marketing => mark_failed_marketing(&self.db, id, disposition).await,
        }
    }

    async fn enqueue(
        &self,
        queue: QueueKind,
        item: &NewQueueItem,
    ) -> Result<Uuid, EmailServiceError> {
        match queue {
            QueueKind::Transactional => enqueue_transactional(&self.db, item).await,
            QueueKind::Marketing => enqueue_marketing(&self.db, item).await,
        }
    }
}

async fn fetch_due_transactional(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<QueueItem>, EmailServiceError> {
    use email_queue_transactional as q;
    let eligible = Condition::any()
        .add(q::Column::Status.is_in([QueueStatus::Pending.as_str(), QueueStatus::Retry.as_str()]))
        .add(
            Condition::all()
                .add(q::Column::Status.eq(QueueStatus::Processing.as_str()))
                .add(q::Column::LeaseExpiresAt.lte(now)),
        );
    let models = q::Entity::find()
        .filter(q::Column::ScheduledFor.lte(now))
        .filter(eligible)
        .order_by_desc(q::Column::Priority)
        .order_by_asc(q::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .context("fetch due transactional queue items")
        .map_err(internal)?;
    models.into_iter().map(queue_item_from_transactional).collect()
}

async fn fetch_due_marketing(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<QueueItem>, EmailServiceError> {
    use email_queue_marketing as q;
    let eligible = Condition::any()
        .add(q::Column::Status.is_in([QueueStatus::Pending.as_str(), QueueStatus::Retry.as_str()]))
        .add(
            Condition::all()
                .add(q::Column::Status.eq(QueueStatus::Processing.as_str()))
                .add(q::Column::LeaseExpiresAt.lte(now)),
        );
    let models = q::Entity::find()
        .filter(q::Column::ScheduledFor.lte(now))
        .filter(eligible)
        .order_by_desc(q::Column::Priority)
        .order_by_asc(q::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .context("fetch due marketing queue items")
        .map_err(internal)?;
    models.into_iter().map(queue_item_from_marketing).collect()
}

async fn claim_transactional(
    db: &DatabaseConnection,
    id: Uuid,
    observed: QueueStatus,
    lease_until: DateTime<Utc>,
) -> Result<bool, EmailServiceError> {
    use email_queue_transactional as q;
    let mut update = q::Entity::update_many()
        .col_expr(q::Column::Status, Expr::value(QueueStatus::Processing.as_str()))
        .col_expr(q::Column::LeaseExpiresAt, Expr::value(lease_until))
        .filter(q::Column::Id.eq(id))
        .filter(q::Column::Status.eq(observed.as_str()));
    if observed == QueueStatus::Processing {
        // Reclaiming an abandoned row: the lease must actually be expired.
        update = update.filter(q::Column::LeaseExpiresAt.lte(Utc::now()));
    }
    let result = update
        .exec(db)
        .await
        .context("claim transactional queue item")
        .map_err(internal)?;
    Ok(result.rows_affected == 1)
}

async fn claim_marketing(
    db: &DatabaseConnection,
    id: Uuid,
    observed: QueueStatus,
    lease_until: DateTime<Utc>,
) -> Result<bool, EmailServiceError> {
    use email_queue_marketing as q;
    let mut update = q::Entity::update_many()
        .col_expr(q::Column::Status, Expr::value(QueueStatus::Processing.as_str()))
        .col_expr(q::Column::LeaseExpiresAt, Expr::value(lease_until))
        .filter(q::Column::Id.eq(id))
        .filter(q::Column::Status.eq(observed.as_str()));
    if observed == QueueStatus::Processing {
        update = update.filter(q::Column::LeaseExpiresAt.lte(Utc::now()));
    }
    let result = update
        .exec(db)
        .await
        .context("claim marketing queue item")
        .map_err(internal)?;
    Ok(result.rows_affected == 1)
}

async fn mark_sent_transactional(
    db: &DatabaseConnection,
    id: Uuid,
    provider_message_id: &str,
    sent_at: DateTime<Utc>,
) -> Result<(), EmailServiceError> {
    use email_queue_transactional as q;
    q::ActiveModel {
        id: Set(id),
        status: Set(QueueStatus::Sent.as_str().to_owned()),
        sent_at: Set(Some(sent_at)),
        provider_message_id: Set(Some(provider_message_id.to_owned())),
        retry_count: Set(0),
        error_message: Set(None),
        lease_expires_at: Set(None),
        ..Default::default()
    }
    .update(db)
    .await
    .context("mark transactional queue item sent")
    .map_err(internal)?;
    Ok(())
}

async fn mark_sent_marketing(
    db: &DatabaseConnection,
    id: Uuid,
    provider_message_id: &str,
    sent_at: DateTime<Utc>,
) -> Result<(), EmailServiceError> {
    use email_queue_marketing as q;
    q::ActiveModel {
        id: Set(id),
        status: Set(QueueStatus::Sent.as_str().to_owned()),
        sent_at: Set(Some(sent_at)),
        provider_message_id: Set(Some(provider_message_id.to_owned())),
        retry_count: Set(0),
        error_message: Set(None),
        lease_expires_at: Set(None),
        ..Default::default()
    }
    .update(db)
    .await
    .context("mark marketing queue item sent")
    .map_err(internal)?;
    Ok(())
}

async fn mark_failed_transactional(
    db: &DatabaseConnection,
    id: Uuid,
    disposition: &FailureDisposition,
) -> Result<(), EmailServiceError> {
    use email_queue_transactional as q;
    let mut am = q::ActiveModel {
        id: Set(id),
        status: Set(disposition.status.as_str().to_owned()),
        retry_count: Set(disposition.retry_count),
        error_message: Set(Some(disposition.error_message.clone())),
        last_error_at: Set(Some(disposition.failed_at)),
        lease_expires_at: Set(None),
        ..Default::default()
    };
    if let Some(scheduled_for) = disposition.scheduled_for {
        am.scheduled_for = Set(scheduled_for);
    }
    am.update(db)
        .await
        .context("mark transactional queue item failed")
        .map_err(internal)?;
    Ok(())
}

async fn mark_failed_marketing(
    db: &DatabaseConnection,
    id: Uuid,
    disposition: &FailureDisposition,
) -> Result<(), EmailServiceError> {
    use email_queue_marketing as q;
    let mut am = q::ActiveModel {
        id: Set(id),
        status: Set(disposition.status.as_str().to_owned()),
        retry_count: Set(disposition.retry_count),
        error_message: Set(Some(disposition.error_message.clone())),
        last_error_at: Set(Some(disposition.failed_at)),
        lease_expires_at: Set(None),
        ..Default::default()
    };
    if let Some(scheduled_for) = disposition.scheduled_for {
        am.scheduled_for = Set(scheduled_for);
    }
    am.update(db)
        .await
        .context("mark marketing queue item failed")
        .map_err(internal)?;
    Ok(())
}

async fn enqueue_transactional(
    db: &DatabaseConnection,
    item: &NewQueueItem,
) -> Result<Uuid, EmailServiceError> {
    use email_queue_transactional as q;
    let id = Uuid::new_v4();
    let now = Utc::now();
    q::ActiveModel {
        id: Set(id),
        tenant_id: Set(item.tenant_id),
        to_email: Set(item.to_email.clone()),
        from_email: Set(item.from_email.clone()),
        from_name: Set(item.from_name.clone()),
        subject: Set(item.subject.clone()),
        html_body: Set(item.html_body.clone()),
        text_body: Set(item.text_body.clone()),
        template_id: Set(item.template_id),
        template_data: Set(item.template_data.clone()),
        message_stream: Set(item.message_stream.clone()),
        server_mode: Set(item.server_mode.as_str().to_owned()),
        priority: Set(item.priority),
        status: Set(QueueStatus::Pending.as_str().to_owned()),
        scheduled_for: Set(now),
        retry_count: Set(0),
        error_message: Set(None),
        last_error_at: Set(None),
        provider_message_id: Set(None),
        sent_at: Set(None),
        lease_expires_at: Set(None),
        tag: Set(item.tag.clone()),
        metadata: Set(item.metadata.clone()),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .context("enqueue transactional email")
    .map_err(internal)?;
    Ok(id)
}

async fn enqueue_marketing(
    db: &DatabaseConnection,
    item: &NewQueueItem,
) -> Result<Uuid, EmailServiceError> {
    use email_queue_marketing as q;
    let id = Uuid::new_v4();
    let now = Utc::now();
    q::ActiveModel {
        id: Set(id),
        tenant_id: Set(item.tenant_id),
        to_email: Set(item.to_email.clone()),
        from_email: Set(item.from_email.clone()),
        from_name: Set(item.from_name.clone()),
        subject: Set(item.subject.clone()),
        html_body: Set(item.html_body.clone()),
        text_body: Set(item.text_body.clone()),
        template_id: Set(item.template_id),
        template_data: Set(item.template_data.clone()),
        message_stream: Set(item.message_stream.clone()),
        server_mode: Set(item.server_mode.as_str().to_owned()),
        priority: Set(item.priority),
        status: Set(QueueStatus::Pending.as_str().to_owned()),
        scheduled_for: Set(now),
        retry_count: Set(0),
        error_message: Set(None),
        last_error_at: Set(None),
        provider_message_id: Set(None),
        sent_at: Set(None),
        lease_expires_at: Set(None),
        tag: Set(item.tag.clone()),
        metadata: Set(item.metadata.clone()),
        created_at: Set(now),
    }
    .insert(db)
    .await
    .context("enqueue marketing email")
    .map_err(internal)?;
    Ok(id)
}

fn queue_item_from_transactional(
    model: email_queue_transactional::Model,
) -> Result<QueueItem, EmailServiceError> {
    let server_mode = ServerMode::parse(&model.server_mode)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown server mode '{}'", model.server_mode)))?;
    let status = QueueStatus::parse(&model.status)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown queue status '{}'", model.status)))?;
    Ok(QueueItem {
        id: model.id,
        tenant_id: model.tenant_id,
        to_email: model.to_email,
        from_email: model.from_email,
        from_name: model.from_name,
        subject: model.subject,
        html_body: model.html_body,
        text_body: model.text_body,
        template_id: model.template_id,
        template_data: model.template_data,
        message_stream: model.message_stream,
        server_mode,
        priority: model.priority,
        status,
        scheduled_for: model.scheduled_for,
        retry_count: model.retry_count,
        error_message: model.error_message,
        tag: model.tag,
        metadata: model.metadata,
        created_at: model.created_at,
    })
}

fn queue_item_from_marketing(
    model: email_queue_marketing::Model,
) -> Result<QueueItem, EmailServiceError> {
    let server_mode = ServerMode::parse(&model.server_mode)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown server mode '{}'", model.server_mode)))?;
    let status = QueueStatus::parse(&model.status)
        .ok_or_else(|| internal(anyhow::anyhow!("unknown queue status '{}'", model.status)))?;
    Ok(QueueItem {
        id: model.id,
        tenant_id: model.tenant_id,
        to_email: model.to_email,
        from_email: model.from_email,
        from_name: model.from_name,
        subject: model.subject,
        html_body: model.html_body,
        text_body: model.text_body,
        template_id: model.template_id,
        template_data: model.template_data,
        message_stream: model.message_stream,
        server_mode,
        priority: model.priority,
        status,
        scheduled_for: model.scheduled_for,
        retry_count: model.retry_count,
        error_message: model.error_message,
        tag: model.tag,
        metadata: model.metadata,
        created_at: model.created_at,
    })
}

// ── Audit repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditRepository {
    pub db: DatabaseConnection,
}

impl AuditRepository for DbAuditRepository {
    async fn record_send(&self, record: &SendAuditRecord) -> Result<(), EmailServiceError> {
        email_sends::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(record.tenant_id),
            contact_id: Set(record.contact_id),
            message_id: Set(record.message_id.clone()),
            to_email: Set(record.to_email.clone()),
            subject: Set(record.subject.clone()),
            status: Set(record.status.clone()),
            server_type: Set(record.server_type.as_str().to_owned()),
            message_stream: Set(record.message_stream.clone()),
            tag: Set(record.tag.clone()),
            metadata: Set(record.metadata.clone()),
            sent_at: Set(record.sent_at),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert send audit record")
        .map_err(internal)?;
        Ok(())
    }
}

// ── Contact repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContactRepository {
    pub db: DatabaseConnection,
}

impl ContactRepository for DbContactRepository {
    async fn find_id_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<Option<Uuid>, EmailServiceError> {
        let model = contacts::Entity::find()
            .filter(contacts::Column::TenantId.eq(tenant_id))
            .filter(contacts::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .context("find contact by email")
            .map_err(internal)?;
        Ok(model.map(|m| m.id))
    }

    async fn update_email_status(
        &self,
        tenant_id: Uuid,
        email: &str,
        status: &str,
        reason: &str,
    ) -> Result<(), EmailServiceError> {
        contacts::Entity::update_many()
            .col_expr(contacts::Column::EmailStatus, Expr::value(status))
            .col_expr(contacts::Column::EmailStatusReason, Expr::value(reason))
            .col_expr(
                contacts::Column::EmailStatusUpdatedAt,
                Expr::value(Utc::now()),
            )
            .filter(contacts::Column::TenantId.eq(tenant_id))
            .filter(contacts::Column::Email.eq(email.to_lowercase()))
            .exec(&self.db)
            .await
            .context("update contact email status")
            .map_err(internal)?;
        Ok(())
    }
}

// ── Webhook event repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbWebhookEventRepository {
    pub db: DatabaseConnection,
}

impl WebhookEventRepository for DbWebhookEventRepository {
    async fn record(&self, event: &WebhookEventRecord) -> Result<(), EmailServiceError> {
        email_webhook_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(event.tenant_id),
            event_type: Set(event.event_type.clone()),
            server_id: Set(event.server_id),
            message_id: Set(event.message_id.clone()),
            recipient_email: Set(event.recipient_email.clone()),
            event_data: Set(event.event_data.clone()),
            raw_payload: Set(event.raw_payload.clone()),
            processed_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("insert webhook event")
        .map_err(internal)?;
        Ok(())
    }
}
