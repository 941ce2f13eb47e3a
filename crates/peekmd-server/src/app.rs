//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", get(handlers::page::get_page))
        .route("/__assets__/{*path}", get(handlers::assets::get_asset))
        .route("/ping", get(handlers::lifecycle::ping))
        .route("/close", get(handlers::lifecycle::close))
        .fallback(not_found);

    security::with_preview_headers(router).with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
