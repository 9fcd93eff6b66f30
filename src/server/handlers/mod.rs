// src/server/handlers/mod.rs
//! HTTP request handlers for the mirror

pub mod download;
pub mod packages;
pub mod register;

use crate::manifest::ModId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 404 with `{"error": "not found"}`
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not found",
            detail: None,
        }),
    )
        .into_response()
}

/// Parse a ModID path segment
///
/// Anything that is not a plain non-negative integer names no family.
pub fn parse_mod_id(raw: &str) -> Option<ModId> {
    raw.parse().ok()
}
