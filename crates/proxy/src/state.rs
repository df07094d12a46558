//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::shopify::{AdminClient, AdminShopifyError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and is read-only after
/// construction.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ProxyConfig,
    shopify: AdminClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Admin API HTTP client cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, AdminShopifyError> {
        let shopify = AdminClient::new(&config.shopify)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, shopify }),
        })
    }

    /// Get a reference to the proxy configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }
}

/// State pointing at a stub Shopify server, with retries disabled.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_state(base_url: &str, customize: impl FnOnce(&mut ProxyConfig)) -> AppState {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use secrecy::SecretString;

    use crate::config::{CorsConfig, RetryPolicy, ShopifyAdminConfig, StockConfig};

    let mut config = ProxyConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        shopify: ShopifyAdminConfig {
            store: "mundo-in.myshopify.com".to_string(),
            base_url: base_url.to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test_token"),
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
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    customize(&mut config);
    AppState::new(config).unwrap()
}
