//! List-shaped branch stock route handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    http::Method,
    routing::get,
};
use branch_stock_core::{BranchStock, ChangeSet, LookupParams, OwnerScope};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    config::CorsConfig,
    error::{AppError, Result},
    services::BranchStockService,
    state::AppState,
};

use super::{cors_layer, method_not_allowed, options};

/// Build the branch stock router.
pub fn router(cors: &CorsConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/branch-stock",
            get(read_branch_stock)
                .post(update_branch_stock)
                .options(options)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(cors, &[Method::GET, Method::POST]))
}

/// Query parameters for reading.
#[derive(Debug, Deserialize)]
pub struct BranchStockQuery {
    #[serde(flatten)]
    pub lookup: LookupParams,
    pub owner: Option<OwnerScope>,
}

/// Body for updating.
///
/// Either `cambios` (`{branch: quantity}`) or the single-branch shorthand
/// `sucursal` + `cantidad`.
#[derive(Debug, Deserialize)]
pub struct BranchStockUpdate {
    #[serde(flatten)]
    pub lookup: LookupParams,
    pub owner: Option<OwnerScope>,
    #[serde(alias = "changes")]
    pub cambios: Option<Map<String, Value>>,
    #[serde(alias = "branch")]
    pub sucursal: Option<String>,
    #[serde(alias = "quantity")]
    pub cantidad: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct BranchStockResponse {
    pub ok: bool,
    pub owner_id: String,
    pub handle: String,
    pub branches: Vec<BranchStock>,
}

#[derive(Debug, Serialize)]
pub struct BranchStockUpdateResponse {
    pub ok: bool,
    pub owner_id: String,
    pub branches: Vec<BranchStock>,
    pub updated: Vec<String>,
    pub appended: Vec<String>,
    pub ignored: Vec<String>,
}

impl BranchStockUpdate {
    fn change_set(&self) -> Result<ChangeSet> {
        if let Some(cambios) = &self.cambios {
            return Ok(ChangeSet::from_json(cambios)?);
        }
        match (&self.sucursal, &self.cantidad) {
            (Some(branch), Some(quantity)) => Ok(ChangeSet::single(branch, quantity)?),
            (Some(_), None) => Err(AppError::BadRequest(
                "cantidad is required with sucursal".to_string(),
            )),
            (None, _) => Err(AppError::BadRequest(
                "cambios or sucursal/cantidad is required".to_string(),
            )),
        }
    }
}

/// Read the branch quantities of a product or variant.
///
/// # Errors
///
/// Returns 400 without a usable identifier and 404 when nothing matches.
#[instrument(skip(state, query))]
pub async fn read_branch_stock(
    State(state): State<AppState>,
    query: std::result::Result<Query<BranchStockQuery>, QueryRejection>,
) -> Result<Json<BranchStockResponse>> {
    let Query(query) = query?;
    let lookup = query.lookup.into_lookup()?;
    let scope = query.owner.unwrap_or_else(|| OwnerScope::default_for(&lookup));

    let service = BranchStockService::new(&state);
    let owner = service.resolve_owner(&lookup, scope).await?;
    let levels = service.read(&owner).await?;

    Ok(Json(BranchStockResponse {
        ok: true,
        owner_id: owner.gid().to_string(),
        handle: owner.handle().to_string(),
        branches: levels.into_inner(),
    }))
}

/// Merge a change set into the stock field and write it back.
///
/// The whole change set is validated before anything is written.
///
/// # Errors
///
/// Returns 400 for invalid quantities or a missing identifier, 404 when
/// nothing matches, and 400 when Shopify rejects the value.
#[instrument(skip(state, body))]
pub async fn update_branch_stock(
    State(state): State<AppState>,
    body: std::result::Result<Json<BranchStockUpdate>, JsonRejection>,
) -> Result<Json<BranchStockUpdateResponse>> {
    let Json(body) = body?;
    let changes = body.change_set()?;
    let lookup = body.lookup.into_lookup()?;
    let scope = body.owner.unwrap_or_else(|| OwnerScope::default_for(&lookup));

    let service = BranchStockService::new(&state);
    let owner = service.resolve_owner(&lookup, scope).await?;
    let outcome = service.apply(&owner, &changes).await?;

    Ok(Json(BranchStockUpdateResponse {
        ok: true,
        owner_id: owner.gid().to_string(),
        branches: outcome.levels.into_inner(),
        updated: outcome.updated,
        appended: outcome.appended,
        ignored: outcome.ignored,
    }))
}
