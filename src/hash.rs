// src/hash.rs

//! SHA-256 content addressing
//!
//! Blobs are named by the lowercase hex SHA-256 of their bytes. This module
//! owns the digest format: computing it and validating strings that claim
//! to be one.

use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Length of a hex-encoded SHA-256 digest
pub const SHA256_HEX_LEN: usize = 64;

/// Compute the hex SHA-256 of a byte slice
pub fn sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the hex SHA-256 of everything a reader yields
pub fn sha256_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check that a string is a well-formed digest: 64 lowercase hex characters
///
/// Uppercase is rejected because digests double as file names and the
/// store only ever writes lowercase.
pub fn is_valid_sha256(s: &str) -> bool {
    s.len() == SHA256_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
