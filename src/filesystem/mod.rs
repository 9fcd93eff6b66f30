// src/filesystem/mod.rs

//! On-disk storage for package archives
//!
//! Archives are stored by the SHA-256 hash of their bytes and never
//! modified afterwards. The manifest log refers to them by digest.

mod cas;

pub use cas::BlobStore;
