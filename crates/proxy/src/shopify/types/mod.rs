//! Domain types for Shopify Admin API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! response types declared next to each query.

pub mod metafield;
pub mod product;

// Re-export all types for convenience
pub use metafield::*;
pub use product::*;
