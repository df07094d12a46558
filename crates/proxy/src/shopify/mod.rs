//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **CRITICAL: This module holds the high-privilege Shopify Admin API token.**
//!
//! The token can rewrite any metafield in the store. It never leaves the
//! process and is redacted from `Debug` output.
//!
//! # Architecture
//!
//! - Every operation implements `graphql_client::GraphQLQuery` (see `queries`)
//! - One generic `execute::<Q>` sends it with retry and a hard timeout
//! - Direct API calls to Shopify (no local storage, no caching)
//!
//! # Example
//!
//! ```rust,ignore
//! use branch_stock_proxy::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify)?;
//!
//! let product = client
//!     .resolve_product(&Lookup::Handle("cama-luton".into()), SkuMatch::PreferExact)
//!     .await?;
//! let raw = client
//!     .get_metafield(product.id.as_str(), "custom", "sucursales")
//!     .await?;
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid metafield value).
    #[error("User error: {0}")]
    UserError(String),
}

impl AdminShopifyError {
    /// Whether another attempt could succeed.
    ///
    /// Transport failures, 5xx and 429 are transient. GraphQL and user errors
    /// describe the request itself and are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_decode() && !e.is_builder(),
            Self::Status(status) => status.is_server_error(),
            Self::RateLimited(_) => true,
            Self::GraphQL(_)
            | Self::Parse(_)
            | Self::NotFound(_)
            | Self::Unauthorized(_)
            | Self::UserError(_) => false,
        }
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_shopify_error_display() {
        let err = AdminShopifyError::NotFound("handle 'cama-luton'".to_string());
        assert_eq!(err.to_string(), "Not found: handle 'cama-luton'");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = AdminShopifyError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(AdminShopifyError::RateLimited(2).is_transient());
        assert!(AdminShopifyError::Status(reqwest::StatusCode::BAD_GATEWAY).is_transient());
        assert!(!AdminShopifyError::Status(reqwest::StatusCode::FORBIDDEN).is_transient());
        assert!(!AdminShopifyError::UserError("Value is invalid".to_string()).is_transient());
        assert!(!AdminShopifyError::GraphQL(vec![]).is_transient());
        assert!(!AdminShopifyError::NotFound("x".to_string()).is_transient());
    }

    #[test]
    fn test_user_error() {
        let err = AdminShopifyError::UserError("Value must be an integer".to_string());
        assert_eq!(err.to_string(), "User error: Value must be an integer");
    }
}
