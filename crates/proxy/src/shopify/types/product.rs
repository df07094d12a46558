//! Resolved product and variant identities.

use branch_stock_core::{MatchedBy, ProductGid, VariantGid};
use serde::Serialize;

// =============================================================================
// Product Types
// =============================================================================

/// A product found by handle, id or SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProduct {
    /// Product GID.
    pub id: ProductGid,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// How the product was found.
    pub matched_by: MatchedBy,
}

/// A variant found by id or SKU, with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVariant {
    /// Variant GID.
    pub id: VariantGid,
    /// SKU code.
    pub sku: Option<String>,
    /// Owning product.
    pub product: ResolvedProduct,
    /// How the variant was found.
    pub matched_by: MatchedBy,
}

// =============================================================================
// Owner
// =============================================================================

/// The entity a metafield belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Product(ResolvedProduct),
    Variant(ResolvedVariant),
}

impl Owner {
    /// GID used as `ownerId` in metafield operations.
    #[must_use]
    pub fn gid(&self) -> &str {
        match self {
            Self::Product(p) => p.id.as_str(),
            Self::Variant(v) => v.id.as_str(),
        }
    }

    /// Handle of the product (or of the variant's product).
    #[must_use]
    pub fn handle(&self) -> &str {
        match self {
            Self::Product(p) => &p.handle,
            Self::Variant(v) => &v.product.handle,
        }
    }
}
