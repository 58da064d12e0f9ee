use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Uniform JSON error body shared by every service error type.
///
/// Services map their domain error enums onto `{kind, message}` responses
/// through [`ErrorBody::response`]; `kind` is a stable SCREAMING_SNAKE_CASE
/// discriminant, `message` the human-readable description.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, kind: &'static str, message: String) -> Response {
        (status, axum::Json(ErrorBody { kind, message })).into_response()
    }
}
