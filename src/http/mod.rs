//! The HTTP adapter (spec §6): four handlers sharing one [`AppState`],
//! layered with request-size limiting, tracing, and CORS the way the
//! axum-based service in the broader example corpus fronts its own LLM
//! pipeline.

pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use state::AppState;

/// Build the full router for the service.
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_document_bytes;
    Router::new()
        .route("/check", post(handlers::scan_check))
        .route("/receipt", post(handlers::scan_receipt))
        .route("/process", post(handlers::scan_process))
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Seconds since the Unix epoch. Used by `GET /health`'s `timestamp`
/// field; the reference stack has no `chrono` dependency (see
/// `SPEC_FULL.md` §3), so we report a plain Unix timestamp rather than
/// an RFC-3339 string.
pub fn unix_timestamp_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
