//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as the JSON
//! envelope `{"ok": false, "error": "..."}`; server-side failures are
//! captured to Sentry before responding.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use branch_stock_core::{LookupError, StockError};
use serde_json::json;
use thiserror::Error;

use crate::shopify::AdminShopifyError;

/// Application-level error type for the proxy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(AdminShopifyError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Shopify rejected the values we tried to write.
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    /// The stored field is in a shape this route must not overwrite.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Route exists but does not serve this method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    /// Report remote validation errors with `status` instead of 400.
    #[must_use]
    pub fn with_validation_status(self, status: StatusCode) -> Self {
        match self {
            Self::Validation { message, .. } => Self::Validation { status, message },
            other => other,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation { status, .. } => *status,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Message safe to show the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        // Don't expose internal error details to clients
        match self {
            Self::Shopify(_) => "External service error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<AdminShopifyError> for AppError {
    fn from(err: AdminShopifyError) -> Self {
        match err {
            AdminShopifyError::NotFound(what) => Self::NotFound(what),
            AdminShopifyError::UserError(message) => Self::Validation {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            other => Self::Shopify(other),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::MatrixField => Self::Conflict(err.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Shopify(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = json!({ "ok": false, "error": self.client_message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
