//! Metafield conversion functions.

use crate::shopify::types::{MetafieldEntry, ProductStockDocument};

use super::super::queries::{owner_metafields, product_stock_document};

pub fn convert_metafield_entries(
    connection: Option<owner_metafields::OwnerMetafieldsConnection>,
) -> Vec<MetafieldEntry> {
    connection
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .map(|m| MetafieldEntry {
            key: m.key,
            value: m.value,
        })
        .collect()
}

pub fn convert_stock_document(
    product: product_stock_document::ProductStockDocumentProduct,
) -> ProductStockDocument {
    ProductStockDocument {
        id: product.id,
        handle: product.handle,
        title: product.title,
        value: product.metafield.map(|m| m.value),
    }
}
