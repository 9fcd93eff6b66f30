// src/error.rs

//! Error types for the package database
//!
//! Every layer of the core returns [`Error`]. Collaborators that need to
//! branch on the failure (the HTTP layer mapping to status codes, the CLI
//! choosing an exit message) use [`Error::kind`] instead of matching on
//! message text.

use std::fmt;
use thiserror::Error;

/// Errors produced by the content store, manifest log, index and registrar
#[derive(Error, Debug)]
pub enum Error {
    /// A blob, archive entry, package family or version does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching a package archive failed (transport, timeout or HTTP status)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Filesystem read or write failed
    #[error("I/O error: {0}")]
    IoError(String),

    /// A descriptor or the manifest could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The manifest log could not be durably written
    #[error("Failed to persist manifest: {0}")]
    PersistError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Network,
    Io,
    Decode,
    Persist,
}

impl Error {
    /// Classify this error
    ///
    /// Raw I/O errors with `NotFound` kind classify as [`ErrorKind::NotFound`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NetworkError(_) => ErrorKind::Network,
            Self::IoError(_) => ErrorKind::Io,
            Self::DecodeError(_) => ErrorKind::Decode,
            Self::PersistError(_) => ErrorKind::Persist,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Prefix the message with context, keeping the error kind
    pub fn context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Self::NotFound(msg) => Self::NotFound(format!("{ctx}: {msg}")),
            Self::NetworkError(msg) => Self::NetworkError(format!("{ctx}: {msg}")),
            Self::IoError(msg) => Self::IoError(format!("{ctx}: {msg}")),
            Self::DecodeError(msg) => Self::DecodeError(format!("{ctx}: {msg}")),
            Self::PersistError(msg) => Self::PersistError(format!("{ctx}: {msg}")),
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::NotFound(format!("{ctx}: {e}"))
            }
            Self::Io(e) => Self::IoError(format!("{ctx}: {e}")),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::Io => "I/O error",
            Self::Decode => "decode error",
            Self::Persist => "persist error",
        };
        f.write_str(name)
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
