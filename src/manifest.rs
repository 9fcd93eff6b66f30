// src/manifest.rs

//! Append-only registration log
//!
//! The manifest is the source of truth for the mirror: one entry per
//! registration, in registration order. It is persisted as a single JSON
//! array and rewritten in full on every append:
//!
//! ```json
//! [{"ModID":1,"URL":"https://...","Path":"package.json","Hash":"<sha256>","Approved":false}]
//! ```
//!
//! The package index is derived from this log and can always be rebuilt
//! from it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifier of a package family (all versions of one mod)
pub type ModId = u64;

/// One registration fact
///
/// Field names on the wire keep the historical capitalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "ModID")]
    pub mod_id: ModId,
    /// Where the archive was fetched from
    #[serde(rename = "URL")]
    pub url: String,
    /// Location of the descriptor file inside the archive
    #[serde(rename = "Path")]
    pub path: String,
    /// Digest of the stored archive
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Reserved for moderation. Always written as false and never read.
    #[serde(rename = "Approved", default)]
    pub approved: bool,
}

impl ManifestEntry {
    /// Create an unapproved entry
    pub fn new(
        mod_id: ModId,
        url: impl Into<String>,
        path: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            mod_id,
            url: url.into(),
            path: path.into(),
            hash: hash.into(),
            approved: false,
        }
    }
}

/// The registration log and its backing file
#[derive(Debug, Clone)]
pub struct ManifestLog {
    path: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl ManifestLog {
    /// Load the log from `path`
    ///
    /// A missing file is an error: an absent manifest and an empty one are
    /// different situations, and only `init` may create one.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let raw = fs::read(&path).map_err(|e| {
            Error::IoError(format!("Failed to read manifest {}: {e}", path.display()))
        })?;

        // An empty log may have been written as `null`
        let entries: Option<Vec<ManifestEntry>> = serde_json::from_slice(&raw).map_err(|e| {
            Error::DecodeError(format!("Malformed manifest {}: {e}", path.display()))
        })?;
        let entries = entries.unwrap_or_default();

        debug!("Loaded {} manifest entries from {:?}", entries.len(), path);
        Ok(Self { path, entries })
    }

    /// Load the log at `path`, creating an empty one if it does not exist
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let log = Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        };
        log.save()?;
        Ok(log)
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing file with the current entries
    ///
    /// The new content is written to a temp file next to the manifest and
    /// renamed over it, so a crash leaves either the old or the new log.
    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_vec(&self.entries)
            .map_err(|e| Error::PersistError(format!("Failed to serialize manifest: {e}")))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let persist_err =
            |e: std::io::Error| Error::PersistError(format!("{}: {e}", self.path.display()));

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(persist_err)?;
        temp.write_all(&raw).map_err(persist_err)?;
        temp.as_file().sync_all().map_err(persist_err)?;
        temp.persist(&self.path).map_err(|e| persist_err(e.error))?;

        // Not every filesystem supports fsync on a directory
        if let Ok(dir) = File::open(dir) {
            let _ = dir.sync_all();
        }

        debug!(
            "Saved {} manifest entries to {:?}",
            self.entries.len(),
            self.path
        );
        Ok(())
    }

    /// Append entries and persist the whole log
    ///
    /// If the save fails the in-memory log is truncated back, so it never
    /// runs ahead of what is on disk.
    pub fn add<I>(&mut self, new_entries: I) -> Result<()>
    where
        I: IntoIterator<Item = ManifestEntry>,
    {
        let before = self.entries.len();
        self.entries.extend(new_entries);

        if let Err(e) = self.save() {
            self.entries.truncate(before);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn entry(mod_id: ModId, hash_byte: char) -> ManifestEntry {
        ManifestEntry::new(
            mod_id,
            format!("https://example.com/{mod_id}.zip"),
            "package.json",
            hash_byte.to_string().repeat(64),
        )
    }

    #[test]
    fn test_wire_format() {
        let e = entry(3, 'a');
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["ModID"], 3);
        assert_eq!(json["URL"], "https://example.com/3.zip");
        assert_eq!(json["Path"], "package.json");
        assert_eq!(json["Hash"], "a".repeat(64));
        assert_eq!(json["Approved"], false);
    }

    #[test]
    fn test_init_creates_empty_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data/manifest.json");

        let log = ManifestLog::init(&path).unwrap();
        assert!(log.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");

        let reloaded = ManifestLog::load(&path).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_add_persists_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");

        let mut log = ManifestLog::init(&path).unwrap();
        log.add([entry(1, 'a')]).unwrap();
        log.add([entry(2, 'b'), entry(1, 'c')]).unwrap();

        let reloaded = ManifestLog::load(&path).unwrap();
        assert_eq!(reloaded.entries(), log.entries());
        let ids: Vec<_> = reloaded.entries().iter().map(|e| e.mod_id).collect();
        assert_eq!(ids, vec![1, 2, 1]);
    }

    #[test]
    fn test_load_missing_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ManifestLog::load(temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_malformed_is_decode_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, b"{\"ModID\": 1").unwrap();

        let err = ManifestLog::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_load_null_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, b"null").unwrap();

        assert!(ManifestLog::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_without_approved_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let hash = "f".repeat(64);
        fs::write(
            &path,
            format!(r#"[{{"ModID":9,"URL":"u","Path":"p","Hash":"{hash}"}}]"#),
        )
        .unwrap();

        let log = ManifestLog::load(&path).unwrap();
        assert_eq!(log.entries()[0].mod_id, 9);
        assert!(!log.entries()[0].approved);
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_save_rolls_back() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("ro");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("manifest.json");

        let mut log = ManifestLog::init(&path).unwrap();
        log.add([entry(1, 'a')]).unwrap();

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();
        let result = log.add([entry(2, 'b')]);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        // Running as root ignores directory permissions
        if let Err(err) = result {
            assert_eq!(err.kind(), ErrorKind::Persist);
            assert_eq!(log.len(), 1);
            assert_eq!(ManifestLog::load(&path).unwrap().len(), 1);
        }
    }
}
