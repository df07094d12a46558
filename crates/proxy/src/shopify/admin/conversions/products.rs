//! Product and variant conversion functions.

use branch_stock_core::{MatchedBy, ProductGid, VariantGid};

use crate::shopify::types::{ResolvedProduct, ResolvedVariant};

use super::super::queries::fragments::{ProductSummary, VariantSummary};

pub fn convert_product(product: ProductSummary, matched_by: MatchedBy) -> ResolvedProduct {
    ResolvedProduct {
        id: ProductGid::from_remote(product.id),
        handle: product.handle,
        title: product.title,
        matched_by,
    }
}

/// The variant's product inherits `matched_by` from the variant.
pub fn convert_variant(variant: VariantSummary, matched_by: MatchedBy) -> ResolvedVariant {
    ResolvedVariant {
        id: VariantGid::from_remote(variant.id),
        sku: variant.sku.filter(|s| !s.is_empty()),
        product: convert_product(variant.product, matched_by),
        matched_by,
    }
}
