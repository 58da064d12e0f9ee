use sea_orm::entity::prelude::*;

/// Process-wide shared provider configuration (singleton, id = 1).
///
/// Read by every tenant operating in shared mode; written only by the
/// superadmin shared-config operation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shared_email_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub transactional_server_id: Option<i64>,
    pub transactional_server_token: String,
    pub transactional_stream_id: String,
    pub marketing_server_id: Option<i64>,
    pub marketing_server_token: String,
    pub marketing_stream_id: String,
    pub default_from_email: String,
    pub default_from_name: String,
    pub default_reply_to: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
