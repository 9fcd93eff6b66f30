// src/lib.rs

//! CrossCode mod package mirror
//!
//! Mirrors mod archives fetched from their publishers' URLs, stores them
//! content-addressed on disk, and serves metadata and downloads.
//!
//! # Architecture
//!
//! - Manifest-first: the append-only manifest log is the only source of truth
//! - Content-addressed blobs: archives are named by their SHA-256
//! - Derived index: family/version lookups are rebuilt from the log at startup
//! - Single writer: registrations are serialized, reads use index snapshots

pub mod config;
pub mod db;
mod error;
pub mod fetch;
pub mod filesystem;
pub mod hash;
pub mod index;
pub mod manifest;
pub mod packages;
pub mod version;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod test_support;

pub use db::PackageDb;
pub use error::{Error, ErrorKind, Result};
pub use fetch::{Fetcher, HttpFetcher, MemoryFetcher};
pub use filesystem::BlobStore;
pub use index::{IndexedPackage, PackageFamily, PackageIndex};
pub use manifest::{ManifestEntry, ManifestLog, ModId};
pub use packages::PackageDescriptor;
