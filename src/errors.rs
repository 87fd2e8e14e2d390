use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::upstream::CallError;

/// Application-specific error types.
///
/// Every variant renders as the uniform `{"result": false, "errors": [..]}`
/// envelope; the variant decides the status code and what gets logged.
#[derive(Debug)]
pub enum AppError {
    /// Bad request error (invalid input); the message is shown to the client.
    BadRequest(String),
    /// A primary upstream call was rejected with a non-2xx status; the
    /// upstream's status is propagated and its body wrapped in the message.
    UpstreamRejection { status: StatusCode, message: String },
    /// A primary upstream call never reached the service; the cause is
    /// logged, never echoed to the client.
    UpstreamUnreachable(String),
    /// Anything unexpected; the cause is logged, never echoed to the client.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::UpstreamRejection { status, message } => {
                write!(f, "Upstream rejection ({}): {}", status, message)
            }
            AppError::UpstreamUnreachable(cause) => write!(f, "Upstream unreachable: {}", cause),
            AppError::InternalError(cause) => write!(f, "Internal error: {}", cause),
        }
    }
}

impl AppError {
    /// Lifts a primary-call failure into a client-facing error.
    ///
    /// `label` names the upstream in the wrapped message ("Listing service",
    /// "User service"). Fan-out lookups never go through here; they are
    /// absorbed inside the aggregation engine.
    pub fn from_primary(err: CallError, label: &str) -> Self {
        match err {
            CallError::Status { status, body } => AppError::UpstreamRejection {
                status,
                message: format!("{} error: {}", label, body),
            },
            CallError::Transport(cause) => AppError::UpstreamUnreachable(cause.to_string()),
            CallError::Decode(cause) => {
                AppError::InternalError(format!("Failed to parse {} response: {}", label, cause))
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into the uniform JSON error envelope.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UpstreamRejection { status, message } => {
                tracing::error!("Service communication error ({}): {}", status, message);
                (status, message)
            }
            AppError::UpstreamUnreachable(cause) => {
                tracing::error!("Upstream service unreachable: {}", cause);
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream service unreachable.".to_string(),
                )
            }
            AppError::InternalError(cause) => {
                tracing::error!("Internal error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "result": false,
            "errors": [message],
        }));

        (status, body).into_response()
    }
}
