// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use ccmod_mirror::{MemoryFetcher, PackageDb};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Build a zip archive from (path, contents) pairs.
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A mod archive with its descriptor at `descriptor_path`.
pub fn mod_archive_at(
    descriptor_path: &str,
    name: &str,
    version: &str,
    display: Option<&str>,
) -> Vec<u8> {
    let mut descriptor = serde_json::json!({
        "name": name,
        "version": version,
        "ccmodDependencies": {"crosscode": "^1.4.0"},
    });
    if let Some(display) = display {
        descriptor["ccmodHumanName"] = serde_json::Value::from(display);
    }
    let descriptor = serde_json::to_vec(&descriptor).unwrap();
    zip_archive(&[
        (descriptor_path, descriptor.as_slice()),
        ("assets/data.json", b"{}".as_slice()),
    ])
}

/// A mod archive with its descriptor at `package.json`.
pub fn mod_archive(name: &str, version: &str, display: Option<&str>) -> Vec<u8> {
    mod_archive_at("package.json", name, version, display)
}

/// A fresh data directory with an in-memory fetcher.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct Mirror {
    pub dir: TempDir,
    pub fetcher: Arc<MemoryFetcher>,
    pub db: PackageDb,
}

impl Mirror {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        PackageDb::init(dir.path()).unwrap();
        let fetcher = Arc::new(MemoryFetcher::new());
        let db = PackageDb::open(dir.path(), fetcher.clone()).unwrap();
        Self { dir, fetcher, db }
    }

    /// Publish a mod archive and return its URL.
    pub fn publish(&self, name: &str, version: &str, display: Option<&str>) -> String {
        let url = format!("https://mods.example/{name}/{version}.zip");
        self.fetcher.insert(&url, mod_archive(name, version, display));
        url
    }

    /// Reopen the same data directory, rebuilding the index from disk.
    pub fn reopen(&self) -> PackageDb {
        reopen(self.dir.path(), self.fetcher.clone())
    }
}

pub fn reopen(data_dir: &Path, fetcher: Arc<MemoryFetcher>) -> PackageDb {
    PackageDb::open(data_dir, fetcher).unwrap()
}
