//! Flat stock: one `number_integer` metafield per branch key.

use branch_stock_core::stock::wire::decode_flat_value;
use branch_stock_core::{FlatVocabulary, Lookup, coerce_quantity};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::StockConfig;
use crate::error::Result;
use crate::shopify::{AdminClient, MetafieldWrite, ResolvedProduct};
use crate::state::AppState;

pub struct FlatStockService<'a> {
    shopify: &'a AdminClient,
    stock: &'a StockConfig,
}

impl<'a> FlatStockService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            shopify: state.shopify(),
            stock: &state.config().stock,
        }
    }

    fn vocabulary(&self) -> &FlatVocabulary {
        &self.stock.flat_fields
    }

    /// Resolve the product a flat-stock request targets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when nothing matches.
    pub async fn resolve(&self, lookup: &Lookup) -> Result<ResolvedProduct> {
        Ok(self
            .shopify
            .resolve_product(lookup, self.stock.sku_match)
            .await?)
    }

    /// Every vocabulary key with its quantity; unset fields read as 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify read fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn read(&self, product: &ResolvedProduct) -> Result<Map<String, Value>> {
        let keys: Vec<&str> = self
            .vocabulary()
            .iter()
            .map(|f| f.metafield_key.as_str())
            .collect();
        let entries = self
            .shopify
            .get_metafields(product.id.as_str(), &self.stock.namespace, &keys)
            .await?;

        Ok(self
            .vocabulary()
            .iter()
            .map(|field| {
                let raw = entries
                    .iter()
                    .find(|e| e.key == field.metafield_key)
                    .map(|e| e.value.as_str());
                (field.key.clone(), Value::from(decode_flat_value(raw)))
            })
            .collect())
    }

    /// Write the vocabulary keys present in `stocks`.
    ///
    /// Keys outside the vocabulary and "no change" values are skipped.
    /// Returns the keys written, in vocabulary order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when any value is not a whole,
    /// non-negative number (nothing is written), and `AppError::Validation`
    /// when Shopify rejects the write.
    #[instrument(skip(self, product, stocks), fields(product_id = %product.id))]
    pub async fn write(
        &self,
        product: &ResolvedProduct,
        stocks: &Map<String, Value>,
    ) -> Result<Vec<String>> {
        for key in stocks.keys().filter(|k| self.vocabulary().get(k).is_none()) {
            debug!(key = %key, "Skipping key outside the flat vocabulary");
        }

        let mut written = Vec::new();
        let mut writes = Vec::new();
        for field in self.vocabulary().iter() {
            let Some(value) = stocks.get(&field.key) else {
                continue;
            };
            if let Some(quantity) = coerce_quantity(&field.key, value)? {
                writes.push(MetafieldWrite::integer(
                    product.id.as_str(),
                    &self.stock.namespace,
                    &field.metafield_key,
                    quantity,
                ));
                written.push(field.key.clone());
            }
        }

        if !writes.is_empty() {
            self.shopify.set_metafields(&writes).await?;
        }
        Ok(written)
    }
}
