//! Integration tests for the branch stock proxy.
//!
//! Each test starts a `wiremock` server standing in for the Shopify Admin
//! GraphQL endpoint and drives the real router with `tower::ServiceExt`.
//! No network access or credentials are needed.
//!
//! ```bash
//! cargo test -p branch-stock-integration-tests
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use branch_stock_proxy::config::{
    CorsConfig, ProxyConfig, RetryPolicy, ShopifyAdminConfig, StockConfig,
};
use branch_stock_proxy::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_VERSION: &str = "2025-01";
pub const GRAPHQL_PATH: &str = "/admin/api/2025-01/graphql.json";

/// A proxy wired to a stub Shopify.
pub struct TestContext {
    pub shopify: MockServer,
    pub config: ProxyConfig,
}

impl TestContext {
    /// Default configuration, no retries.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Default configuration adjusted by `customize`.
    pub async fn with_config(customize: impl FnOnce(&mut ProxyConfig)) -> Self {
        let shopify = MockServer::start().await;
        let mut config = ProxyConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            shopify: ShopifyAdminConfig {
                store: "mundo-in.myshopify.com".to_string(),
                base_url: shopify.uri(),
                api_version: API_VERSION.to_string(),
                access_token: SecretString::from("shpat_integration_token"),
                timeout: Duration::from_secs(5),
                retry: RetryPolicy {
                    attempts: 1,
                    delay: Duration::ZERO,
                },
            },
            stock: StockConfig::default(),
            cors: CorsConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        customize(&mut config);
        Self { shopify, config }
    }

    fn app(&self) -> Router {
        let state = AppState::new(self.config.clone()).expect("Failed to build state");
        branch_stock_proxy::app(state)
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self.app().oneshot(request).await.expect("Router failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    // =========================================================================
    // Stub Shopify
    // =========================================================================

    /// Answer `operation` with `data`.
    pub async fn mount_operation(&self, operation: &str, data: Value) {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(json!({ "operationName": operation })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&self.shopify)
            .await;
    }

    /// A product findable by handle (and by id).
    pub async fn mount_product(&self, id: u64, handle: &str) {
        let product = product_json(id, handle);
        self.mount_operation("ProductByHandle", json!({ "productByIdentifier": product }))
            .await;
        self.mount_operation("ProductById", json!({ "product": product }))
            .await;
    }

    /// No product for any handle.
    pub async fn mount_no_product(&self) {
        self.mount_operation("ProductByHandle", json!({ "productByIdentifier": null }))
            .await;
        self.mount_operation("ProductStockDocument", json!({ "productByIdentifier": null }))
            .await;
        self.mount_operation("VariantsBySku", json!({ "productVariants": { "nodes": [] } }))
            .await;
    }

    /// The list-shaped field of `owner_gid`, or unset with `None`.
    pub async fn mount_list_field(&self, owner_gid: &str, value: Option<&str>) {
        let metafield = value.map(|v| json!({ "value": v }));
        self.mount_operation(
            "OwnerMetafield",
            json!({ "node": { "id": owner_gid, "metafield": metafield } }),
        )
        .await;
    }

    /// A successful `metafieldsSet`.
    pub async fn mount_set_ok(&self) {
        self.mount_operation(
            "MetafieldsSet",
            json!({ "metafieldsSet": { "metafields": [], "userErrors": [] } }),
        )
        .await;
    }

    /// A `metafieldsSet` rejected with `message`.
    pub async fn mount_set_rejected(&self, message: &str) {
        self.mount_operation(
            "MetafieldsSet",
            json!({ "metafieldsSet": {
                "metafields": null,
                "userErrors": [{ "field": ["metafields", "0", "value"], "message": message, "code": "INVALID_VALUE" }]
            }}),
        )
        .await;
    }

    /// GraphQL bodies Shopify received for `operation`, in order.
    pub async fn requests_for(&self, operation: &str) -> Vec<Value> {
        self.shopify
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter(|body| body["operationName"] == operation)
            .collect()
    }

    /// The `metafields` input of every `metafieldsSet` call.
    pub async fn written_metafields(&self) -> Vec<Value> {
        self.requests_for("MetafieldsSet")
            .await
            .into_iter()
            .flat_map(|body| {
                body["variables"]["metafields"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}

pub fn product_gid(id: u64) -> String {
    format!("gid://shopify/Product/{id}")
}

pub fn product_json(id: u64, handle: &str) -> Value {
    json!({ "id": product_gid(id), "handle": handle, "title": handle.replace('-', " ") })
}

pub fn variant_json(id: u64, sku: &str, product_id: u64, handle: &str) -> Value {
    json!({
        "id": format!("gid://shopify/ProductVariant/{id}"),
        "sku": sku,
        "product": product_json(product_id, handle),
    })
}
