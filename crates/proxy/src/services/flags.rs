//! Boolean product flags (e.g. `buen_fin`) set by SKU.

use branch_stock_core::{MatchedBy, ProductGid};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::config::StockConfig;
use crate::error::{AppError, Result};
use crate::shopify::{AdminClient, MetafieldWrite};
use crate::state::AppState;

/// A flag written on one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagOutcome {
    pub product_gid: ProductGid,
    pub matched_strategy: MatchedBy,
}

/// Result of one SKU in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub sku: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct FlagService<'a> {
    shopify: &'a AdminClient,
    stock: &'a StockConfig,
}

impl<'a> FlagService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            shopify: state.shopify(),
            stock: &state.config().stock,
        }
    }

    /// Set the flag on the product owning the variant with `sku`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when no variant matches and
    /// `AppError::Validation` when Shopify rejects the write.
    #[instrument(skip(self))]
    pub async fn set_by_sku(&self, sku: &str, value: bool) -> Result<FlagOutcome> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(AppError::BadRequest("sku cannot be empty".to_string()));
        }

        let variant = self.shopify.variant_by_sku(sku, self.stock.sku_match).await?;
        let product = variant.product;

        let write = MetafieldWrite::boolean(
            product.id.as_str(),
            &self.stock.namespace,
            &self.stock.flag_key,
            value,
        );
        self.shopify.set_metafields(&[write]).await?;

        Ok(FlagOutcome {
            product_gid: product.id,
            matched_strategy: variant.matched_by,
        })
    }

    /// Set the flag for each SKU in turn, collecting per-item results.
    ///
    /// One failing SKU does not stop the rest.
    #[instrument(skip(self, skus), fields(count = skus.len()))]
    pub async fn set_many(&self, skus: &[String], value: bool) -> Vec<BatchItem> {
        let mut results = Vec::with_capacity(skus.len());
        for sku in skus {
            let item = match self.set_by_sku(sku, value).await {
                Ok(_) => BatchItem {
                    sku: sku.clone(),
                    ok: true,
                    error: None,
                },
                Err(e) => {
                    warn!(sku = %sku, error = %e, "Flag write failed");
                    BatchItem {
                        sku: sku.clone(),
                        ok: false,
                        error: Some(e.client_message()),
                    }
                }
            };
            results.push(item);
        }
        results
    }
}
