//! Shopify Admin API GraphQL client.
//!
//! This module provides a type-safe client for the Shopify Admin API using
//! GraphQL. Authenticates with a static Admin API access token.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{instrument, warn};

use crate::config::{RetryPolicy, ShopifyAdminConfig};

use super::{AdminShopifyError, GraphQLError, GraphQLErrorLocation};

mod conversions;
mod identity;
mod metafields;
pub mod queries;

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; all clones share one connection pool.
///
/// # Security
///
/// This client holds the Admin API token, which has write access to every
/// product in the store.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    retry: RetryPolicy,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify Admin API configuration
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, AdminShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("branch-stock-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint: config.graphql_endpoint(),
                access_token: config.access_token.clone(),
                retry: config.retry,
            }),
        })
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL operation, retrying transient failures.
    #[instrument(skip_all, fields(operation = tracing::field::Empty))]
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);
        tracing::Span::current().record("operation", body.operation_name);
        let payload = serde_json::to_vec(&body)?;

        let attempts = self.inner.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.send::<Q::ResponseData>(&payload).await {
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        operation = body.operation_name,
                        attempt,
                        error = %e,
                        "Shopify request failed, retrying"
                    );
                    tokio::time::sleep(self.inner.retry.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Send one request and decode the GraphQL envelope.
    async fn send<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T, AdminShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid Admin API access token".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(AdminShopifyError::Status(status));
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<T> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }
}
