//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! Clients only ever see a generic message; the detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every rejected payload
pub const INVALID_ORDER_MESSAGE: &str = "Invalid order payload";

/// Message returned for every server-side failure
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process order";

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Payload is not an object or lacks `items`, `email` or `phone`
    #[error("Invalid order payload: {0}")]
    InvalidOrder(String),

    /// Error occurred while reading or writing the order store
    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::state::PersistenceError),

    /// Stored order could not be rendered for notification
    #[error("Summary error: {0}")]
    Summary(#[from] crate::orders::SummaryError),

    /// A required notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(#[from] crate::notify::NotificationError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::orders::OrderValidationError> for AppError {
    fn from(err: crate::orders::OrderValidationError) -> Self {
        AppError::InvalidOrder(err.to_string())
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Summary(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = if status.is_client_error() {
            tracing::warn!(error = %self, "Rejected order request");
            INVALID_ORDER_MESSAGE
        } else {
            tracing::error!(error = %self, "Order API error");
            PROCESSING_FAILED_MESSAGE
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
