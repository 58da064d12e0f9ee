use sea_orm::entity::prelude::*;

/// Queued transactional email awaiting dispatch by the queue processor.
///
/// `status` walks pending → processing → sent, or processing → retry →
/// failed; `lease_expires_at` bounds how long a claim is honored before
/// another processor run may reclaim the row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_queue_transactional")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub to_email: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub template_id: Option<i64>,
    pub template_data: Option<Json>,
    pub message_stream: Option<String>,
    pub server_mode: String,
    pub priority: i32,
    pub status: String,
    pub scheduled_for: chrono::DateTime<chrono::Utc>,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub last_error_at: Option<chrono::DateTime<chrono::Utc>>,
    pub provider_message_id: Option<String>,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
    pub lease_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub tag: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
