use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use board_core::BoardError;
use report_flow::{FailureKind, FlowError};

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 404 through the `anyhow::Error` chain for
/// conditions that are not a `BoardError` (e.g. no stored report yet).
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
///
/// Every error body is `{"error": <message>, "kind": <kind>}`; input
/// validation failures add `"field"`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

fn flow_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
        FailureKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::EmptyResponse
        | FailureKind::InvalidOutput
        | FailureKind::FormatError
        | FailureKind::Upstream => StatusCode::BAD_GATEWAY,
    }
}

fn board_status(e: &BoardError) -> (StatusCode, &'static str) {
    match e {
        BoardError::ProjectNotFound(_) | BoardError::TaskNotFound(_) => {
            (StatusCode::NOT_FOUND, "not_found")
        }
        BoardError::ProjectExists(_) => (StatusCode::CONFLICT, "conflict"),
        BoardError::NotInitialized
        | BoardError::InvalidSlug(_)
        | BoardError::InvalidStatus(_)
        | BoardError::InvalidPriority(_)
        | BoardError::EmptyTitle
        | BoardError::NoActiveProject => (StatusCode::BAD_REQUEST, "bad_request"),
        BoardError::Io(_) | BoardError::Yaml(_) | BoardError::Json(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "backend")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<FlowError>() {
            let kind = e.kind();
            let mut body = serde_json::json!({
                "error": e.to_string(),
                "kind": kind.as_str(),
                "message": kind.user_message(),
            });
            if let Some(field) = e.field() {
                body["field"] = serde_json::Value::from(field);
            }
            return (flow_status(kind), axum::Json(body)).into_response();
        }
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": n.0.clone(), "kind": "not_found" });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone(), "kind": "bad_request" });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let (status, kind) = match self.0.downcast_ref::<BoardError>() {
            Some(e) => board_status(e),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "backend"),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string(), "kind": kind });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
