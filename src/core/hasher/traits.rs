//! Fingerprint type and hasher trait.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Length of a hex-encoded SHA-256 digest
pub const HEX_DIGEST_LEN: usize = 64;

/// A fixed-length lowercase hex content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Build a hash from raw digest bytes
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Parse a hex digest as stored in the ledger.
    ///
    /// Uppercase input is normalised to lowercase. Returns `None` unless the
    /// input is exactly 64 hex characters.
    pub fn parse(hex: &str) -> Option<Self> {
        if hex.len() != HEX_DIGEST_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(hex.to_ascii_lowercase()))
    }

    /// The hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a {}-char hex digest: {:?}", HEX_DIGEST_LEN, value))
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Computes content fingerprints
///
/// Implement this trait to plug in a different digest (e.g., for testing).
pub trait ContentHasher: Send + Sync {
    /// Fingerprint an in-memory buffer
    fn hash_bytes(&self, bytes: &[u8]) -> ContentHash;

    /// Fingerprint everything `reader` yields until end of stream
    fn hash_reader(&self, reader: &mut dyn Read) -> io::Result<ContentHash>;

    /// Fingerprint a file, reading its full content once
    fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
        let io_error = |source| HashError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_error)?;
        self.hash_reader(&mut file).map_err(io_error)
    }
}
