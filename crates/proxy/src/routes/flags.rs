//! Boolean flag route handler.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::Method,
    response::{IntoResponse, Response},
    routing::post,
};
use branch_stock_core::{MatchedBy, ProductGid};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    config::CorsConfig,
    error::{AppError, Result},
    services::{FlagService, flags::BatchItem},
    state::AppState,
};

use super::{cors_layer, method_not_allowed, options};

pub fn router(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/flag-by-sku",
            post(flag_by_sku)
                .options(options)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(cors, &[Method::POST]))
}

/// `sku` for one product or `skus` for a batch; `value` defaults to true.
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub sku: Option<String>,
    pub skus: Option<Vec<String>>,
    pub value: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub ok: bool,
    pub product_gid: ProductGid,
    pub matched_strategy: MatchedBy,
}

#[derive(Debug, Serialize)]
pub struct BatchFlagResponse {
    pub ok: bool,
    pub results: Vec<BatchItem>,
}

/// Set the flag on the products owning the given SKUs.
///
/// # Errors
///
/// Single mode returns 404 when the SKU matches nothing. Batch mode always
/// answers 200 with per-SKU results.
#[instrument(skip(state, body))]
pub async fn flag_by_sku(
    State(state): State<AppState>,
    body: std::result::Result<Json<FlagRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body?;
    let value = body.value.unwrap_or(true);
    let service = FlagService::new(&state);

    if let Some(skus) = body.skus.filter(|s| !s.is_empty()) {
        let results = service.set_many(&skus, value).await;
        let ok = results.iter().all(|r| r.ok);
        return Ok(Json(BatchFlagResponse { ok, results }).into_response());
    }

    let sku = body
        .sku
        .ok_or_else(|| AppError::BadRequest("sku or skus is required".to_string()))?;
    let outcome = service.set_by_sku(&sku, value).await?;

    Ok(Json(FlagResponse {
        ok: true,
        product_gid: outcome.product_gid,
        matched_strategy: outcome.matched_strategy,
    })
    .into_response())
}
