// src/db/registrar.rs

//! Registration of new package versions
//!
//! A registration runs in two phases. Staging fetches the archive, stores
//! it and parses its descriptor without holding any lock; nothing a reader
//! can see changes, and a failure leaves at most an unreferenced blob.
//! Committing takes the writer lock, allocates the ModID if needed, appends
//! to the manifest log and publishes a new index.

use super::PackageDb;
use crate::error::{Error, Result};
use crate::index::{IndexedPackage, PackageIndex};
use crate::manifest::{ManifestEntry, ModId};
use crate::packages::PackageDescriptor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A fetched and stored archive whose descriptor has been read
struct Staged {
    hash: String,
    descriptor: PackageDescriptor,
}

impl PackageDb {
    /// Register a new version under an existing or chosen ModID
    ///
    /// If the family already exists the version is merged into it; a version
    /// that is already present is replaced.
    pub async fn register(&self, mod_id: ModId, url: &str, path: &str) -> Result<()> {
        self.register_package(Some(mod_id), url, path).await?;
        Ok(())
    }

    /// Register a version as a new family and return its ModID
    pub async fn register_new(&self, url: &str, path: &str) -> Result<ModId> {
        let package = self.register_package(None, url, path).await?;
        Ok(package.entry.mod_id)
    }

    /// Register a version, allocating the ModID when `mod_id` is `None`
    ///
    /// The ModID is only allocated once staging has succeeded, so a failed
    /// registration never consumes one.
    pub async fn register_package(
        &self,
        mod_id: Option<ModId>,
        url: &str,
        path: &str,
    ) -> Result<IndexedPackage> {
        let staged = match self.stage(url, path).await {
            Ok(staged) => staged,
            Err(e) => {
                warn!("Registration of {} failed: {}", url, e);
                return Err(e.context(format!("Registering {url}")));
            }
        };
        self.commit(mod_id, url, path, staged).await
    }

    async fn stage(&self, url: &str, path: &str) -> Result<Staged> {
        let bytes = self.fetcher.fetch(url).await?;
        debug!("Fetched {} bytes for {}", bytes.len(), url);

        let store = self.store.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || {
            let hash = store.put(&bytes)?;
            let descriptor = PackageIndex::read_descriptor(&store, &hash, &path)?;
            Ok::<_, Error>(Staged { hash, descriptor })
        })
        .await
        .map_err(|e| Error::IoError(format!("Staging task failed: {e}")))?
    }

    async fn commit(
        &self,
        mod_id: Option<ModId>,
        url: &str,
        path: &str,
        staged: Staged,
    ) -> Result<IndexedPackage> {
        let log = self.log.clone().lock_owned().await;
        let index = Arc::clone(&self.index);
        let url = url.to_string();
        let path = path.to_string();

        // Runs to completion even if the caller is dropped
        tokio::task::spawn_blocking(move || {
            let mut log = log;

            // Only writers replace the index, and we hold the writer lock
            let current = Arc::clone(&index.read());
            let mod_id = mod_id.unwrap_or_else(|| current.next_id());
            let entry = ManifestEntry::new(mod_id, url, path, staged.hash);
            log.add([entry.clone()])?;

            let package = IndexedPackage {
                entry,
                descriptor: staged.descriptor,
            };
            let mut next = PackageIndex::clone(&current);
            next.insert(package.clone());
            *index.write() = Arc::new(next);
            drop(log);

            info!(
                "Registered mod {} version {} ({})",
                mod_id,
                package.version(),
                package.hash()
            );
            Ok::<_, Error>(package)
        })
        .await
        .map_err(|e| Error::PersistError(format!("Manifest write task failed: {e}")))?
    }
}
