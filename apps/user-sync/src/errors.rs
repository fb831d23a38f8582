use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::webhook::event::PayloadError;
use crate::webhook::signature::WebhookError;

/// Which repository mutation a sync failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Create,
    Update,
}

impl SyncOperation {
    fn verb(self) -> &'static str {
        match self {
            SyncOperation::Create => "creating",
            SyncOperation::Update => "updating",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No svix headers found")]
    MissingSvixHeaders,

    #[error("Webhook verification failed: {0}")]
    Verification(#[from] WebhookError),

    #[error("Invalid webhook payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("Error {} user: {source}", .operation.verb())]
    UserSync {
        operation: SyncOperation,
        #[source]
        source: anyhow::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingSvixHeaders | AppError::Verification(_) | AppError::Payload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UserSync { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::MissingSvixHeaders => ("MISSING_HEADERS", self.to_string()),
            AppError::Verification(e) => {
                tracing::warn!("Error verifying webhook: {e}");
                ("VERIFICATION_FAILED", "Error occurred".to_string())
            }
            AppError::Payload(e) => {
                tracing::warn!("Rejected webhook payload: {e}");
                ("INVALID_PAYLOAD", e.to_string())
            }
            AppError::UserSync { operation, source } => {
                tracing::error!("Error {} user: {source:?}", operation.verb());
                (
                    "USER_SYNC_ERROR",
                    format!("Error {} user", operation.verb()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
