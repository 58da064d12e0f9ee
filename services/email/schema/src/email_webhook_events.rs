use sea_orm::entity::prelude::*;

/// Raw provider webhook callback, stored for audit and timeline replay.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "email_webhook_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub event_type: String,
    pub server_id: i64,
    pub message_id: Option<String>,
    pub recipient_email: Option<String>,
    pub event_data: Json,
    pub raw_payload: Json,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
