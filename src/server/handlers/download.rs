// src/server/handlers/download.rs
//! Archive download endpoints
//!
//! Archives are streamed straight from the blob store. The attachment name
//! is the package name, not the digest.

use super::{not_found, parse_mod_id};
use crate::index::IndexedPackage;
use crate::server::ServerState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Download the newest version of a family
pub async fn download_latest(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(mod_id) = parse_mod_id(&id) else {
        return not_found();
    };

    let snapshot = state.db.snapshot();
    match snapshot.newest(mod_id) {
        Some(package) => serve_archive(&state, package).await,
        None => not_found(),
    }
}

/// Download one specific version
pub async fn download_version(
    State(state): State<Arc<ServerState>>,
    Path((id, version)): Path<(String, String)>,
) -> Response {
    let Some(mod_id) = parse_mod_id(&id) else {
        return not_found();
    };

    let snapshot = state.db.snapshot();
    match snapshot.get(mod_id, &version) {
        Some(package) => serve_archive(&state, package).await,
        None => not_found(),
    }
}

async fn serve_archive(state: &ServerState, package: &IndexedPackage) -> Response {
    let path = match state.db.blob_store().blob_path(package.hash()) {
        Ok(path) => path,
        Err(_) => return not_found(),
    };

    let file = match File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Indexed blob {} is missing from disk", package.hash());
            return not_found();
        }
        Err(e) => {
            tracing::error!("Failed to open blob {}: {}", path.display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read package").into_response();
        }
    };

    let metadata = match file.metadata().await {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("Failed to stat blob {}: {}", path.display(), e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read package").into_response();
        }
    };

    tracing::info!(
        "Serving mod {} version {} ({} bytes)",
        package.entry.mod_id,
        package.version(),
        metadata.len()
    );

    let disposition = HeaderValue::from_str(&content_disposition(&package.descriptor.name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let body = Body::from_stream(ReaderStream::new(file));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_LENGTH, HeaderValue::from(metadata.len())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// `attachment; filename="<name>.zip"` with backslashes and quotes escaped
pub fn content_disposition(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{escaped}.zip\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_escaping() {
        assert_eq!(
            content_disposition("simple-mod"),
            r#"attachment; filename="simple-mod.zip""#
        );
        assert_eq!(
            content_disposition(r#"say "hi"\now"#),
            r#"attachment; filename="say \"hi\"\\now.zip""#
        );
    }
}
