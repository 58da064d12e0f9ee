use sea_orm::entity::prelude::*;

/// Audit record for a successful provider send. Written best-effort after
/// the provider accepts a message; never blocks the send itself.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_sends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub contact_id: Option<Uuid>,
    pub message_id: String,
    pub to_email: String,
    pub subject: String,
    pub status: String,
    pub server_type: String,
    pub message_stream: String,
    pub tag: Option<String>,
    pub metadata: Option<Json>,
    pub sent_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
