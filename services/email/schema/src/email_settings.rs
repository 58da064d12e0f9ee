use sea_orm::entity::prelude::*;

/// Per-tenant email delivery configuration (one row per tenant).
///
/// `server_mode` is `shared` or `dedicated`; the transactional/marketing
/// credential columns are only populated in dedicated mode.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "email_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tenant_id: Uuid,
    pub server_mode: String,
    pub transactional_server_id: Option<i64>,
    pub transactional_server_token: Option<String>,
    pub transactional_stream_id: Option<String>,
    pub marketing_server_id: Option<i64>,
    pub marketing_server_token: Option<String>,
    pub marketing_stream_id: Option<String>,
    pub default_from_email: Option<String>,
    pub default_from_name: Option<String>,
    pub default_reply_to: Option<String>,
    pub custom_from_email: Option<String>,
    pub custom_from_name: Option<String>,
    pub custom_reply_to: Option<String>,
    pub track_opens: bool,
    pub track_links: String,
    pub activation_status: String,
    pub activation_error: Option<String>,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenants::Entity",
        from = "Column::TenantId",
        to = "super::tenants::Column::Id"
    )]
    Tenant,
}

impl Related<super::tenants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
