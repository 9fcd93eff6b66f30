// src/server/handlers/packages.rs
//! Package metadata endpoints
//!
//! - `GET /v1/` - display name to ModID for every family
//! - `GET /v1/info/:id[/:version]` - package descriptor
//! - `GET /v1/versions/:id` - version strings of a family

use super::{not_found, parse_mod_id};
use crate::server::ServerState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// List every family by display name
pub async fn list_families(State(state): State<Arc<ServerState>>) -> Response {
    Json(state.db.snapshot().list_families()).into_response()
}

/// Descriptor of a family's newest version
pub async fn get_info(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(mod_id) = parse_mod_id(&id) else {
        return not_found();
    };

    let snapshot = state.db.snapshot();
    match snapshot.newest(mod_id) {
        Some(package) => Json(&package.descriptor).into_response(),
        None => not_found(),
    }
}

/// Descriptor of one specific version
pub async fn get_info_version(
    State(state): State<Arc<ServerState>>,
    Path((id, version)): Path<(String, String)>,
) -> Response {
    let Some(mod_id) = parse_mod_id(&id) else {
        return not_found();
    };

    let snapshot = state.db.snapshot();
    match snapshot.get(mod_id, &version) {
        Some(package) => Json(&package.descriptor).into_response(),
        None => not_found(),
    }
}

/// All version strings of a family
pub async fn get_versions(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(mod_id) = parse_mod_id(&id) else {
        return not_found();
    };

    match state.db.snapshot().versions(mod_id) {
        Some(versions) => Json(versions).into_response(),
        None => not_found(),
    }
}
