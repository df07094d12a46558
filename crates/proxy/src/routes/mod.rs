//! HTTP route handlers for the proxy.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//!
//! # List-shaped branch stock
//! GET  /api/branch-stock            - Read branch quantities
//! POST /api/branch-stock            - Merge a change set and write it back
//!
//! # Flat stock (one integer metafield per branch key)
//! GET  /api/stock                   - Read every vocabulary key
//! POST /api/stock                   - Write the given keys
//!
//! # Whole documents by handle
//! POST /api/metafield-by-handle     - Replace the stock document
//! GET  /api/product-variants        - Read the branch × variant matrix
//!
//! # Flags
//! POST /api/flag-by-sku             - Set a boolean flag for one or many SKUs
//! ```
//!
//! Every `/api` route answers `OPTIONS` with 200, unknown methods with a
//! JSON 405, and carries its own CORS layer.

pub mod branch_stock;
pub mod flags;
pub mod metafield_by_handle;
pub mod product_variants;
pub mod stock;

use axum::{
    Router,
    http::{Method, StatusCode, header},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Build the complete API router.
pub fn routes(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .merge(branch_stock::router(cors))
        .merge(stock::router(cors))
        .merge(metafield_by_handle::router(cors))
        .merge(product_variants::router(cors))
        .merge(flags::router(cors))
}

/// CORS layer for one route, limited to the methods it serves.
pub(crate) fn cors_layer(cors: &CorsConfig, methods: &[Method]) -> CorsLayer {
    let origin = cors
        .allowed_origin
        .clone()
        .map_or_else(AllowOrigin::any, AllowOrigin::exact);

    let mut allowed = methods.to_vec();
    allowed.push(Method::OPTIONS);

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(allowed)
        .allow_headers([header::CONTENT_TYPE])
}

/// `OPTIONS` without preflight headers.
pub(crate) async fn options() -> StatusCode {
    StatusCode::OK
}

pub(crate) async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Trimmed, non-empty string parameter.
pub(crate) fn required(value: Option<&str>, name: &str) -> Result<String, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}
