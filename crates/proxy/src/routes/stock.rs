//! Flat stock route handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    http::Method,
    routing::get,
};
use branch_stock_core::LookupParams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    config::CorsConfig,
    error::{AppError, Result},
    services::FlatStockService,
    state::AppState,
};

use super::{cors_layer, method_not_allowed, options};

/// Build the flat stock router.
pub fn router(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/stock",
            get(read_stock)
                .post(write_stock)
                .options(options)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(cors, &[Method::GET, Method::POST]))
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    #[serde(flatten)]
    pub lookup: LookupParams,
    pub stocks: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub ok: bool,
    pub handle: String,
    pub stocks: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct StockUpdateResponse {
    pub ok: bool,
    pub handle: String,
    pub written: Vec<String>,
}

/// Read every flat stock key of a product.
///
/// # Errors
///
/// Returns 400 without a usable identifier and 404 when nothing matches.
#[instrument(skip(state, query))]
pub async fn read_stock(
    State(state): State<AppState>,
    query: std::result::Result<Query<LookupParams>, QueryRejection>,
) -> Result<Json<StockResponse>> {
    let Query(params) = query?;
    let lookup = params.into_lookup()?;

    let service = FlatStockService::new(&state);
    let product = service.resolve(&lookup).await?;
    let stocks = service.read(&product).await?;

    Ok(Json(StockResponse {
        ok: true,
        handle: product.handle,
        stocks,
    }))
}

/// Write flat stock keys of a product.
///
/// # Errors
///
/// Returns 400 when `stocks` is missing or holds an invalid quantity, 404
/// when nothing matches, and 400 when Shopify rejects a value.
#[instrument(skip(state, body))]
pub async fn write_stock(
    State(state): State<AppState>,
    body: std::result::Result<Json<StockUpdate>, JsonRejection>,
) -> Result<Json<StockUpdateResponse>> {
    let Json(body) = body?;
    let stocks = body
        .stocks
        .ok_or_else(|| AppError::BadRequest("stocks is required".to_string()))?;
    let lookup = body.lookup.into_lookup()?;

    let service = FlatStockService::new(&state);
    let product = service.resolve(&lookup).await?;
    let written = service.write(&product, &stocks).await?;

    Ok(Json(StockUpdateResponse {
        ok: true,
        handle: product.handle,
        written,
    }))
}
