//! Replace a product's stock document by handle.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode},
    routing::post,
};
use branch_stock_core::ProductGid;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::{config::CorsConfig, error::Result, services::StockDocumentService, state::AppState};

use super::{cors_layer, method_not_allowed, options, required};

pub fn router(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/metafield-by-handle",
            post(replace_by_handle)
                .options(options)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(cors, &[Method::POST]))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceRequest {
    pub handle: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct ReplaceResponse {
    pub ok: bool,
    pub gid: ProductGid,
}

/// Overwrite the stock metafield of the product with `handle`.
///
/// # Errors
///
/// Returns 400 for a missing handle or non-JSON value, 404 for an unknown
/// handle, and 422 when Shopify rejects the document.
#[instrument(skip(state, body))]
pub async fn replace_by_handle(
    State(state): State<AppState>,
    body: std::result::Result<Json<ReplaceRequest>, JsonRejection>,
) -> Result<Json<ReplaceResponse>> {
    let Json(body) = body?;
    let handle = required(body.handle.as_deref(), "handle")?;

    let gid = StockDocumentService::new(&state)
        .replace(&handle, &body.value)
        .await
        .map_err(|e| e.with_validation_status(StatusCode::UNPROCESSABLE_ENTITY))?;

    Ok(Json(ReplaceResponse { ok: true, gid }))
}
