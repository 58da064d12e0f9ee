//! Gateway-injected tenant/user identity headers extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

/// Tenant and user identity injected by the gateway via `x-tenant-id` and
/// `x-user-id` headers.
///
/// Returns 401 if either header is absent or cannot be parsed as UUID.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct TenantHeaders {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for TenantHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let tenant_id = parts
            .headers
            .get("x-tenant-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        async move {
            let tenant_id = tenant_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { tenant_id, user_id })
        }
    }
}
