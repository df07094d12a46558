//! Identity types for Shopify entities.

pub mod id;
pub mod lookup;

pub use id::*;
pub use lookup::{
    IdParam, Lookup, LookupError, LookupParams, MatchedBy, OwnerScope, SkuMatch, normalize_handle,
    select_by_sku,
};
