//! Branch × variant stock matrix route handler.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::Method,
    routing::get,
};
use branch_stock_core::VariantStock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{config::CorsConfig, error::Result, services::StockDocumentService, state::AppState};

use super::{cors_layer, method_not_allowed, options, required};

pub fn router(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/product-variants",
            get(product_variants)
                .options(options)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(cors, &[Method::GET]))
}

#[derive(Debug, Deserialize)]
pub struct HandleQuery {
    pub handle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub handle: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct VariantRow {
    pub sku: Option<String>,
    pub options: Map<String, Value>,
    pub cantidades: Vec<u64>,
}

impl From<VariantStock> for VariantRow {
    fn from(v: VariantStock) -> Self {
        Self {
            sku: v.sku,
            options: v.options,
            cantidades: v.quantities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductVariantsResponse {
    pub ok: bool,
    pub product: ProductSummary,
    pub sucursales: Vec<String>,
    pub variants: Vec<VariantRow>,
}

/// Read a product's stock matrix.
///
/// # Errors
///
/// Returns 400 for a missing handle or an unset/malformed metafield and 404
/// for an unknown handle.
#[instrument(skip(state, query))]
pub async fn product_variants(
    State(state): State<AppState>,
    query: std::result::Result<Query<HandleQuery>, QueryRejection>,
) -> Result<Json<ProductVariantsResponse>> {
    let Query(query) = query?;
    let handle = required(query.handle.as_deref(), "handle")?;

    let document = StockDocumentService::new(&state).read_matrix(&handle).await?;

    Ok(Json(ProductVariantsResponse {
        ok: true,
        product: ProductSummary {
            handle: document.handle,
            title: document.title,
        },
        sucursales: document.matrix.branches,
        variants: document.matrix.variants.into_iter().map(VariantRow::from).collect(),
    }))
}
