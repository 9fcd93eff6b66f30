// src/db/mod.rs

//! The package database
//!
//! [`PackageDb`] owns the three pieces of mirror state and is the only thing
//! that mutates them:
//!
//! - the [`BlobStore`] holding every fetched archive
//! - the [`ManifestLog`], the durable record of registrations
//! - the [`PackageIndex`], rebuilt from the log at open time
//!
//! Readers take a snapshot of the index ([`PackageDb::snapshot`]) and never
//! wait on a registration. Registrations are serialized by the lock around
//! the manifest log and publish a new index only after the log is saved.

pub mod paths;
mod registrar;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::filesystem::BlobStore;
use crate::index::PackageIndex;
use crate::manifest::{ManifestEntry, ManifestLog};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Handle to an open mirror data directory
pub struct PackageDb {
    data_dir: PathBuf,
    store: BlobStore,
    /// Writer lock; held for the whole commit step of a registration
    log: Arc<tokio::sync::Mutex<ManifestLog>>,
    /// Published index snapshot, replaced only while the writer lock is held
    index: Arc<RwLock<Arc<PackageIndex>>>,
    fetcher: Arc<dyn Fetcher>,
}

impl PackageDb {
    /// Create the data directory and an empty manifest if they do not exist
    pub fn init<P: AsRef<Path>>(data_dir: P) -> Result<()> {
        let data_dir = data_dir.as_ref();
        BlobStore::new(paths::blob_dir(data_dir))?;
        ManifestLog::init(paths::manifest_path(data_dir))?;
        info!("Initialized data directory {}", data_dir.display());
        Ok(())
    }

    /// Open a data directory, replaying its manifest into a fresh index
    ///
    /// Fails if the manifest is missing or malformed, or if any entry cannot
    /// be indexed.
    pub fn open<P: AsRef<Path>>(data_dir: P, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let store = BlobStore::new(paths::blob_dir(&data_dir))?;
        let log = ManifestLog::load(paths::manifest_path(&data_dir))?;
        let index = PackageIndex::build_from_manifest(log.entries(), &store)?;

        info!(
            "Opened package database at {} ({} families, fetcher: {})",
            data_dir.display(),
            index.len(),
            fetcher.name()
        );

        Ok(Self {
            data_dir,
            store,
            log: Arc::new(tokio::sync::Mutex::new(log)),
            index: Arc::new(RwLock::new(Arc::new(index))),
            fetcher,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Current published index
    ///
    /// The snapshot stays valid and unchanged for as long as it is held,
    /// even while registrations publish newer ones.
    pub fn snapshot(&self) -> Arc<PackageIndex> {
        Arc::clone(&self.index.read())
    }

    pub fn blob_store(&self) -> &BlobStore {
        &self.store
    }

    /// Open a stored archive for download
    pub fn open_blob(&self, digest: &str) -> Result<File> {
        self.store.open(digest)
    }

    /// Number of entries in the manifest log
    pub async fn manifest_len(&self) -> usize {
        self.log.lock().await.len()
    }

    /// Entries of the manifest log in registration order
    pub async fn manifest_entries(&self) -> Vec<ManifestEntry> {
        self.log.lock().await.entries().to_vec()
    }

    /// Re-hash every blob the manifest refers to
    ///
    /// Blobs behind versions that were later overwritten are checked too.
    pub async fn verify_blobs(&self) -> Result<VerifyReport> {
        let digests: BTreeSet<String> = self
            .manifest_entries()
            .await
            .into_iter()
            .map(|entry| entry.hash)
            .collect();

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let mut report = VerifyReport::default();
            for digest in digests {
                match store.verify(&digest) {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!("Blob {} does not match its digest", digest);
                        report.corrupt.push(digest);
                    }
                    Err(e) if e.is_not_found() => {
                        warn!("Blob {} is missing", digest);
                        report.missing.push(digest);
                    }
                    Err(e) => return Err(e),
                }
                report.checked += 1;
            }
            Ok(report)
        })
        .await
        .map_err(|e| Error::IoError(format!("Verification task failed: {e}")))?
    }
}

/// Outcome of [`PackageDb::verify_blobs`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Distinct digests examined
    pub checked: usize,
    /// Digests whose content no longer hashes to their name
    pub corrupt: Vec<String>,
    pub missing: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt.is_empty() && self.missing.is_empty()
    }
}
