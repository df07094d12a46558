//! Branch stock proxy library.
//!
//! HTTP handlers that read and write per-branch stock quantities kept in
//! Shopify product and variant metafields. The binary in `main.rs` only adds
//! process concerns (tracing, Sentry, signals) around [`app`].
//!
//! # Security
//!
//! This crate holds the HIGH PRIVILEGE Shopify Admin API token. It is read
//! once from the environment and never returned to clients.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Build the application router with tracing and request ids.
pub fn app(state: AppState) -> Router {
    let cors = state.config().cors.clone();

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(&cors))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not call Shopify.
async fn health() -> &'static str {
    "ok"
}
