//! Whole stock documents addressed by product handle.
//!
//! Writes replace the list/matrix metafield with a client-supplied JSON
//! document; reads decode the matrix shape (branches × variants).

use branch_stock_core::stock::wire::decode_matrix;
use branch_stock_core::{BranchMatrix, ProductGid, normalize_handle};
use serde_json::Value;
use tracing::instrument;

use crate::config::StockConfig;
use crate::error::{AppError, Result};
use crate::shopify::{AdminClient, MetafieldWrite};
use crate::state::AppState;

/// A product's matrix-shaped stock.
#[derive(Debug, Clone)]
pub struct ProductMatrix {
    pub handle: String,
    pub title: String,
    pub matrix: BranchMatrix,
}

pub struct StockDocumentService<'a> {
    shopify: &'a AdminClient,
    stock: &'a StockConfig,
}

impl<'a> StockDocumentService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            shopify: state.shopify(),
            stock: &state.config().stock,
        }
    }

    /// Overwrite the stock metafield of the product with `handle`.
    ///
    /// `value` may be a JSON object or array, or a string holding JSON.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for a value that is not JSON,
    /// `AppError::NotFound` for an unknown handle, and `AppError::Validation`
    /// when Shopify rejects the document.
    #[instrument(skip(self, value))]
    pub async fn replace(&self, handle: &str, value: &Value) -> Result<ProductGid> {
        let encoded = encode_document(value)?;
        let product = self.shopify.product_by_handle(&normalize_handle(handle)).await?;

        let write = MetafieldWrite::json(
            product.id.as_str(),
            &self.stock.namespace,
            &self.stock.key,
            encoded,
        );
        self.shopify.set_metafields(&[write]).await?;
        Ok(product.id)
    }

    /// Read the matrix-shaped stock document of the product with `handle`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown handle and
    /// `AppError::BadRequest` when the metafield is unset or malformed.
    #[instrument(skip(self))]
    pub async fn read_matrix(&self, handle: &str) -> Result<ProductMatrix> {
        let document = self
            .shopify
            .get_product_stock_document(&normalize_handle(handle), &self.stock.namespace, &self.stock.key)
            .await?;

        let raw = document.value.ok_or_else(|| {
            AppError::BadRequest(format!(
                "product has no '{}.{}' metafield",
                self.stock.namespace, self.stock.key
            ))
        })?;

        Ok(ProductMatrix {
            handle: document.handle,
            title: document.title,
            matrix: decode_matrix(&raw)?,
        })
    }
}

/// Encode a client-supplied document as a metafield value.
fn encode_document(value: &Value) -> Result<String> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value.to_string()),
        Value::String(raw) => {
            serde_json::from_str::<Value>(raw)
                .map_err(|e| AppError::BadRequest(format!("value is not valid JSON: {e}")))?;
            Ok(raw.clone())
        }
        Value::Null => Err(AppError::BadRequest("value is required".to_string())),
        Value::Bool(_) | Value::Number(_) => Err(AppError::BadRequest(
            "value must be a JSON object, array or JSON string".to_string(),
        )),
    }
}
