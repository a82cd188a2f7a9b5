//! Handler error type and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Body returned for a probabilistic failure on `/work`.
pub const INJECTED_FAILURE_BODY: &str = "injected failure";

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A query parameter was malformed or outside its bounds.
    #[error("invalid query parameter '{param}': {message}")]
    Validation { param: &'static str, message: String },

    /// The query string could not be decoded into the endpoint's parameters.
    #[error("invalid query string: {0}")]
    MalformedQuery(String),

    /// Deliberate failure requested through `fail_prob`.
    #[error("injected failure")]
    InjectedFailure,

    /// Anything else that went wrong while serving the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(param: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            param,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::MalformedQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InjectedFailure | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation { .. } | AppError::MalformedQuery(_) => {
                (status, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            AppError::InjectedFailure => (status, INJECTED_FAILURE_BODY).into_response(),
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (status, "Internal Server Error").into_response()
            }
        }
    }
}
