#![forbid(unsafe_code)]

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mims_storage::StoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The request never reached a handler body: bad path, query or JSON.
    #[error("{0}")]
    Rejection(String),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Store(err) => match err.code() {
                "INVALID_INPUT" | "SEED_INVALID" => (StatusCode::BAD_REQUEST, err.code()),
                "UNKNOWN_ID" => (StatusCode::NOT_FOUND, err.code()),
                "REVISION_MISMATCH" => (StatusCode::CONFLICT, err.code()),
                "RESET_REQUIRED" => (StatusCode::SERVICE_UNAVAILABLE, err.code()),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
            },
            Self::Rejection(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejection(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejection(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejection(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        // Data-access failures are logged in full but answered generically.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
            "internal server error".to_string()
        } else {
            tracing::debug!(error = %self, code, "request rejected");
            self.to_string()
        };
        (
            status,
            Json(ErrorBody {
                error: code,
                message,
            }),
        )
            .into_response()
    }
}
