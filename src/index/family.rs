// src/index/family.rs

//! All indexed versions of one mod

use crate::manifest::ManifestEntry;
use crate::packages::PackageDescriptor;
use crate::version;
use std::collections::BTreeMap;

/// A manifest entry together with the descriptor read from its blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPackage {
    pub entry: ManifestEntry,
    pub descriptor: PackageDescriptor,
}

impl IndexedPackage {
    pub fn version(&self) -> &str {
        &self.descriptor.version
    }

    /// Digest of the archive this version is served from
    pub fn hash(&self) -> &str {
        &self.entry.hash
    }

    pub fn display_name(&self) -> &str {
        self.descriptor.display_name()
    }
}

/// Versions registered under one ModID, keyed by version string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFamily {
    versions: BTreeMap<String, IndexedPackage>,
}

impl PackageFamily {
    /// Add a version, replacing any package already indexed under it
    pub(crate) fn insert(&mut self, package: IndexedPackage) -> Option<IndexedPackage> {
        self.versions
            .insert(package.descriptor.version.clone(), package)
    }

    /// Package for an exact version string
    pub fn get(&self, version: &str) -> Option<&IndexedPackage> {
        self.versions.get(version)
    }

    /// Package with the greatest version by semver precedence
    ///
    /// Only `None` for an empty family, which the index never holds.
    pub fn newest(&self) -> Option<&IndexedPackage> {
        version::newest(self.versions.keys().map(String::as_str))
            .and_then(|v| self.versions.get(v))
    }

    /// Version strings in lexical order
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    pub fn packages(&self) -> impl Iterator<Item = &IndexedPackage> {
        self.versions.values()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
