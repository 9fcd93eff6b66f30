// src/server/mod.rs
//! HTTP API for the package mirror
//!
//! This module provides an HTTP server that:
//! - Lists mod families and their versions
//! - Serves package descriptors
//! - Streams stored archives for download
//! - Accepts registrations of new versions
//!
//! The handlers only talk to [`PackageDb`]; they never touch the manifest
//! or blob files directly.

mod handlers;
mod routes;

pub use routes::create_router;

use crate::db::PackageDb;
use crate::fetch::Fetcher;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Data directory holding the manifest and blobs
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 8080).into(),
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Shared server state
pub struct ServerState {
    pub db: PackageDb,
}

impl ServerState {
    pub fn new(db: PackageDb) -> Self {
        Self { db }
    }
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(config: ServerConfig, fetcher: Arc<dyn Fetcher>) -> Result<()> {
    tracing::info!("Starting mirror on {}", config.bind_addr);
    tracing::info!("Data directory: {:?}", config.data_dir);

    let data_dir = config.data_dir.clone();
    let db = tokio::task::spawn_blocking(move || PackageDb::open(&data_dir, fetcher))
        .await
        .context("Index rebuild task failed")?
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    let state = Arc::new(ServerState::new(db));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Mirror is ready to serve");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Mirror stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
