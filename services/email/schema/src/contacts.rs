use sea_orm::entity::prelude::*;

/// Minimal projection of the contacts table. The email service only looks
/// contacts up by (tenant_id, lowercased email) and updates their email
/// delivery status from webhook callbacks.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub email_status: Option<String>,
    pub email_status_reason: Option<String>,
    pub email_status_updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
