//! sea-orm entities for the tables owned or consumed by the email service.

pub mod contacts;
pub mod email_queue_marketing;
pub mod email_queue_transactional;
pub mod email_sends;
pub mod email_settings;
pub mod email_suppressions;
pub mod email_webhook_events;
pub mod shared_email_config;
pub mod tenants;
