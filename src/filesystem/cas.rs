// src/filesystem/cas.rs

//! Content-addressable blob storage for package archives
//!
//! Every fetched archive is stored once under the SHA-256 of its bytes:
//!
//! ```text
//! <blob_dir>/
//!   <64-hex-digest>.zip
//! ```
//!
//! This is the same flat layout the mirror has always used, so an existing
//! data directory can be served without migration. Blobs are immutable;
//! storing the same bytes twice rewrites an identical file.

use crate::error::{Error, Result};
use crate::hash;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of stored blobs
const BLOB_EXTENSION: &str = "zip";

/// Largest archive entry that will be extracted (16 MiB)
pub const MAX_ENTRY_BYTES: u64 = 16 * 1024 * 1024;

/// Content-addressed store of package archives
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Directory holding one file per digest
    blob_dir: PathBuf,
}

impl BlobStore {
    /// Open a blob store rooted at `blob_dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(blob_dir: P) -> Result<Self> {
        let blob_dir = blob_dir.as_ref().to_path_buf();

        if !blob_dir.exists() {
            fs::create_dir_all(&blob_dir).map_err(|e| {
                Error::IoError(format!(
                    "Failed to create blob directory {}: {e}",
                    blob_dir.display()
                ))
            })?;
            debug!("Created blob directory: {:?}", blob_dir);
        }

        Ok(Self { blob_dir })
    }

    /// Directory holding the blobs
    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }

    /// Store archive bytes and return their digest
    ///
    /// The bytes are written to a temp file in the blob directory, synced,
    /// and renamed over `<digest>.zip`, so readers never observe a partial
    /// blob.
    pub fn put(&self, content: &[u8]) -> Result<String> {
        let digest = hash::sha256(content);
        let path = self.blob_path_unchecked(&digest);

        let mut temp = tempfile::NamedTempFile::new_in(&self.blob_dir)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| {
            Error::IoError(format!("Failed to move blob into {}: {}", path.display(), e.error))
        })?;

        debug!("Stored blob {} ({} bytes)", digest, content.len());
        Ok(digest)
    }

    /// Open a stored blob for reading
    pub fn open(&self, digest: &str) -> Result<File> {
        let path = self.blob_path(digest)?;
        File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(format!("Blob not found: {digest}")),
            _ => Error::IoError(format!("Failed to open blob {}: {e}", path.display())),
        })
    }

    /// Read one file out of a stored archive
    ///
    /// Any failure to locate the bytes (missing blob, not a zip, no entry
    /// at `inner_path`, unreadable or oversized entry) is reported as
    /// `NotFound`.
    pub fn extract_entry(&self, digest: &str, inner_path: &str) -> Result<Vec<u8>> {
        self.extract_entry_limited(digest, inner_path, MAX_ENTRY_BYTES)
    }

    /// [`extract_entry`](Self::extract_entry) with an explicit size cap
    ///
    /// The cap applies to the bytes actually decompressed; the size the
    /// archive declares for the entry is not trusted.
    pub fn extract_entry_limited(
        &self,
        digest: &str,
        inner_path: &str,
        limit: u64,
    ) -> Result<Vec<u8>> {
        let file = self.open(digest)?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            Error::NotFound(format!("Blob {digest} is not a readable archive: {e}"))
        })?;

        let entry = archive.by_name(inner_path).map_err(|e| {
            Error::NotFound(format!("'{inner_path}' not found in blob {digest}: {e}"))
        })?;

        let mut content = Vec::new();
        entry
            .take(limit.saturating_add(1))
            .read_to_end(&mut content)
            .map_err(|e| {
                Error::NotFound(format!("'{inner_path}' in blob {digest} is unreadable: {e}"))
            })?;

        if content.len() as u64 > limit {
            return Err(Error::NotFound(format!(
                "'{inner_path}' in blob {digest} exceeds {limit} bytes"
            )));
        }

        debug!(
            "Extracted {} from blob {} ({} bytes)",
            inner_path,
            digest,
            content.len()
        );
        Ok(content)
    }

    /// Check if a blob with the given digest exists
    pub fn exists(&self, digest: &str) -> bool {
        self.blob_path(digest).is_ok_and(|p| p.is_file())
    }

    /// Re-hash a stored blob and compare it with its name
    pub fn verify(&self, digest: &str) -> Result<bool> {
        let mut file = self.open(digest)?;
        let actual = hash::sha256_reader(&mut file)?;
        Ok(actual == digest)
    }

    /// Digests of every blob currently on disk, sorted
    pub fn digests(&self) -> Result<Vec<String>> {
        let mut digests = Vec::new();
        for entry in fs::read_dir(&self.blob_dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != BLOB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && hash::is_valid_sha256(stem)
            {
                digests.push(stem.to_string());
            }
        }
        digests.sort();
        Ok(digests)
    }

    /// Filesystem path of a blob
    ///
    /// The digest is validated first so that a request-supplied string can
    /// never address anything outside the blob directory.
    pub fn blob_path(&self, digest: &str) -> Result<PathBuf> {
        if !hash::is_valid_sha256(digest) {
            return Err(Error::NotFound(format!("Invalid blob digest: {digest}")));
        }
        Ok(self.blob_path_unchecked(digest))
    }

    fn blob_path_unchecked(&self, digest: &str) -> PathBuf {
        self.blob_dir.join(format!("{digest}.{BLOB_EXTENSION}"))
    }
}
