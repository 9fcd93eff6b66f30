// src/index/mod.rs

//! In-memory package index
//!
//! The index maps ModID -> version -> package and is a pure function of the
//! manifest log and the blob store: [`PackageIndex::build_from_manifest`]
//! replays the log in order, reading each entry's descriptor out of its
//! archive. Nothing in the index is persisted; on restart it is rebuilt.
//!
//! Families are held behind `Arc` so that cloning an index to publish a new
//! snapshot only copies the family map. [`PackageIndex::insert`] then clones
//! just the family it touches.

mod family;

pub use family::{IndexedPackage, PackageFamily};

use crate::error::Result;
use crate::filesystem::BlobStore;
use crate::manifest::{ManifestEntry, ModId};
use crate::packages::PackageDescriptor;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// ModID allocated to the first family of an empty log
pub const FIRST_MOD_ID: ModId = 1;

/// Package families keyed by ModID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIndex {
    families: BTreeMap<ModId, Arc<PackageFamily>>,
    /// One more than the greatest ModID ever indexed
    next_id: ModId,
}

impl Default for PackageIndex {
    fn default() -> Self {
        Self {
            families: BTreeMap::new(),
            next_id: FIRST_MOD_ID,
        }
    }
}

impl PackageIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index by replaying every manifest entry in order
    ///
    /// The first entry whose descriptor cannot be read or parsed aborts the
    /// whole rebuild. A mirror with a broken entry refuses to start rather
    /// than serving a silently incomplete index.
    pub fn build_from_manifest(entries: &[ManifestEntry], store: &BlobStore) -> Result<Self> {
        let mut index = Self::new();

        for (position, entry) in entries.iter().enumerate() {
            let package = Self::resolve_entry(store, entry).map_err(|e| {
                e.context(format!(
                    "manifest entry #{position} (mod {}, blob {})",
                    entry.mod_id, entry.hash
                ))
            })?;
            index.insert(package);
        }

        info!(
            "Indexed {} packages in {} families from {} manifest entries (next id {})",
            index.package_count(),
            index.len(),
            entries.len(),
            index.next_id
        );
        Ok(index)
    }

    /// Read and parse the descriptor for one manifest entry
    ///
    /// This is the per-entry step of a rebuild; registration runs it too,
    /// before anything is committed.
    pub fn resolve_entry(store: &BlobStore, entry: &ManifestEntry) -> Result<IndexedPackage> {
        let descriptor = Self::read_descriptor(store, &entry.hash, &entry.path)?;

        debug!(
            "Resolved mod {} version {} from {}",
            entry.mod_id, descriptor.version, entry.hash
        );
        Ok(IndexedPackage {
            entry: entry.clone(),
            descriptor,
        })
    }

    /// Extract and parse the descriptor at `path` inside blob `hash`
    pub fn read_descriptor(store: &BlobStore, hash: &str, path: &str) -> Result<PackageDescriptor> {
        let raw = store.extract_entry(hash, path)?;
        PackageDescriptor::from_json(&raw)
    }

    /// Add a package under its ModID and version
    ///
    /// Creates the family on first use, replaces an existing package with
    /// the same version, and advances `next_id` past the ModID.
    pub fn insert(&mut self, package: IndexedPackage) -> Option<IndexedPackage> {
        let mod_id = package.entry.mod_id;
        if self.next_id <= mod_id {
            self.next_id = mod_id.saturating_add(1);
        }

        let family = self.families.entry(mod_id).or_default();
        Arc::make_mut(family).insert(package)
    }

    /// The ModID the next auto-allocated registration will receive
    pub fn next_id(&self) -> ModId {
        self.next_id
    }

    pub fn family(&self, mod_id: ModId) -> Option<&PackageFamily> {
        self.families.get(&mod_id).map(Arc::as_ref)
    }

    /// Families in ModID order
    pub fn families(&self) -> impl Iterator<Item = (ModId, &PackageFamily)> {
        self.families.iter().map(|(id, family)| (*id, family.as_ref()))
    }

    /// Newest version of a family, or `None` if the family does not exist
    pub fn newest(&self, mod_id: ModId) -> Option<&IndexedPackage> {
        self.family(mod_id)?.newest()
    }

    /// Package for an exact (ModID, version) pair
    pub fn get(&self, mod_id: ModId, version: &str) -> Option<&IndexedPackage> {
        self.family(mod_id)?.get(version)
    }

    /// All version strings of a family, lexically sorted
    pub fn versions(&self, mod_id: ModId) -> Option<Vec<String>> {
        self.family(mod_id)
            .map(|family| family.versions().map(str::to_string).collect())
    }

    /// Map each family's display name to its ModID
    ///
    /// The display name comes from the family's newest version. When two
    /// families share a display name the lower ModID wins.
    pub fn list_families(&self) -> BTreeMap<String, ModId> {
        let mut result = BTreeMap::new();
        for (mod_id, family) in self.families() {
            if let Some(newest) = family.newest() {
                result
                    .entry(newest.display_name().to_string())
                    .or_insert(mod_id);
            }
        }
        result
    }

    /// Number of families
    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Number of indexed (ModID, version) pairs
    pub fn package_count(&self) -> usize {
        self.families.values().map(|f| f.len()).sum()
    }
}
