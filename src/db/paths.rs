// src/db/paths.rs
//! Centralized path derivation for the mirror's data directory

use std::path::{Path, PathBuf};

/// File name of the manifest log inside the data directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Get the manifest log path
pub fn manifest_path(data_dir: &Path) -> PathBuf {
    data_dir.join(MANIFEST_FILE)
}

/// Get the blob directory
///
/// Blobs live directly in the data directory next to the manifest.
pub fn blob_dir(data_dir: &Path) -> PathBuf {
    data_dir.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/srv/ccmod/data")),
            PathBuf::from("/srv/ccmod/data/manifest.json")
        );
    }

    #[test]
    fn test_blob_dir() {
        assert_eq!(
            blob_dir(Path::new("/srv/ccmod/data")),
            PathBuf::from("/srv/ccmod/data")
        );
    }
}
