// src/server/routes.rs
//! Axum router configuration for the mirror

use crate::server::handlers::{download, packages, register};
use crate::server::ServerState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_router(state: Arc<ServerState>) -> Router {
    // CORS configuration - the API is public and read-mostly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/v1/", get(packages::list_families))
        .route("/v1/info/:id", get(packages::get_info))
        .route("/v1/info/:id/:version", get(packages::get_info_version))
        .route("/v1/versions/:id", get(packages::get_versions))
        .route("/v1/latest/:id", get(download::download_latest))
        .route("/v1/download/:id/:version", get(download::download_version))
        .route("/v1/register", post(register::register))
        // Path historically used by registering clients
        .route("/v1/register/", post(register::register))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
