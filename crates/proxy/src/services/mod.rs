//! Business logic services for the proxy.
//!
//! # Services
//!
//! - `branch_stock` - List-shaped stock field: read, merge, persist
//! - `flat_stock` - One integer metafield per branch key
//! - `document` - Raw and matrix-shaped stock documents by handle
//! - `flags` - Boolean product flags set by SKU

pub mod branch_stock;
pub mod document;
pub mod flags;
pub mod flat_stock;

pub use branch_stock::BranchStockService;
pub use document::StockDocumentService;
pub use flags::{FlagOutcome, FlagService};
pub use flat_stock::FlatStockService;
