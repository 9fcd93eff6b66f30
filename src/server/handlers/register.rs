// src/server/handlers/register.rs
//! Registration endpoint
//!
//! `POST /v1/register` with `{"id": N, "url": "...", "path": "..."}`. An id
//! of 0 (or none at all) registers a new family.

use super::ErrorBody;
use crate::manifest::ModId;
use crate::server::ServerState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub id: ModId,
    #[serde(default)]
    pub url: String,
    /// Descriptor path inside the archive
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub id: ModId,
}

pub async fn register(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let request: RegisterRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return invalid_data(format!("Malformed request body: {e}")),
    };

    let result = if request.id == 0 {
        state.db.register_new(&request.url, &request.path).await
    } else {
        state
            .db
            .register(request.id, &request.url, &request.path)
            .await
            .map(|()| request.id)
    };

    match result {
        Ok(id) => Json(RegisterResponse { success: true, id }).into_response(),
        Err(e) => {
            tracing::warn!("Rejected registration of {}: {}", request.url, e);
            invalid_data(e.to_string())
        }
    }
}

fn invalid_data(detail: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: "invalid data",
            detail: Some(detail),
        }),
    )
        .into_response()
}
