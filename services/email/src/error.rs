use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use contactgate_core::error::ErrorBody;

use crate::domain::types::Lane;

/// Email service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum EmailServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("batch size cannot exceed 500 recipients")]
    BatchTooLarge,
    #[error("all recipients are suppressed")]
    AllRecipientsSuppressed,
    #[error("no {0} server configured")]
    LaneNotConfigured(Lane),
    #[error("tenant not found")]
    TenantNotFound,
    #[error("free tier does not support dedicated servers")]
    TierNotEligible,
    #[error("tenant has no provider linkage id")]
    LinkageIdMissing,
    #[error("dedicated servers already exist and must be linked manually")]
    ManualLinkRequired,
    #[error("provider account token not configured")]
    AccountTokenMissing,
    #[error("queue trigger requires the internal proxy")]
    NotProxied,
    #[error("forbidden")]
    Forbidden,
    #[error("provider error {code}: {message}")]
    Provider { code: i64, message: String },
    #[error("email settings unavailable")]
    ConfigUnavailable(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl EmailServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::BatchTooLarge => "BATCH_TOO_LARGE",
            Self::AllRecipientsSuppressed => "ALL_RECIPIENTS_SUPPRESSED",
            Self::LaneNotConfigured(_) => "LANE_NOT_CONFIGURED",
            Self::TenantNotFound => "TENANT_NOT_FOUND",
            Self::TierNotEligible => "TIER_NOT_ELIGIBLE",
            Self::LinkageIdMissing => "LINKAGE_ID_MISSING",
            Self::ManualLinkRequired => "MANUAL_LINK_REQUIRED",
            Self::AccountTokenMissing => "ACCOUNT_TOKEN_MISSING",
            Self::NotProxied => "NOT_PROXIED",
            Self::Forbidden => "FORBIDDEN",
            Self::Provider { .. } => "PROVIDER",
            Self::ConfigUnavailable(_) => "CONFIG_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for EmailServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingField(_)
            | Self::InvalidRequest(_)
            | Self::BatchTooLarge
            | Self::AllRecipientsSuppressed
            | Self::LaneNotConfigured(_)
            | Self::TierNotEligible
            | Self::LinkageIdMissing => StatusCode::BAD_REQUEST,
            Self::NotProxied => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::TenantNotFound => StatusCode::NOT_FOUND,
            Self::ManualLinkRequired => StatusCode::CONFLICT,
            Self::AccountTokenMissing
            | Self::Provider { .. }
            | Self::ConfigUnavailable(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors; logging them here
        // would be noise. Internal errors need the anyhow chain logged so the
        // root cause is traceable.
        match &self {
            Self::Internal(e) | Self::ConfigUnavailable(e) => {
                tracing::error!(error = %e, kind = self.kind(), "internal error");
            }
            Self::Provider { code, message } => {
                tracing::error!(code = *code, message = %message, "provider error");
            }
            _ => {}
        }
        ErrorBody::response(status, self.kind(), self.to_string())
    }
}
