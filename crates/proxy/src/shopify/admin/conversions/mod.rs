//! Type conversions from GraphQL response types to domain types.
//!
//! These functions convert the raw response structs declared in `queries`
//! into our clean domain types.

mod metafields;
mod products;

pub use metafields::{convert_metafield_entries, convert_stock_document};
pub use products::{convert_product, convert_variant};
