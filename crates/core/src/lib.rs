//! Branch Stock Core - Shared types library.
//!
//! This crate provides the types and pure algorithms behind the branch stock
//! proxy:
//! - `types` - Shopify global IDs and identity lookups (handle, SKU, numeric id)
//! - `stock` - The canonical "stock by branch" representation, its wire shapes,
//!   quantity coercion and merge policies
//!
//! # Architecture
//!
//! The core crate contains only types and algorithms - no I/O, no HTTP
//! clients. Everything that talks to Shopify lives in `branch-stock-proxy`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stock;
pub mod types;

pub use stock::*;
pub use types::*;
