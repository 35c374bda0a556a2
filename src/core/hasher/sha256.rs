//! SHA-256 content hasher.

use super::{ContentHash, ContentHasher};
use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Read buffer size for streaming a file through the digest
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Streams files through SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    /// Create a new hasher
    pub fn new() -> Self {
        Self
    }
}

impl ContentHasher for Sha256Hasher {
    fn hash_bytes(&self, bytes: &[u8]) -> ContentHash {
        ContentHash::from_digest(&Sha256::digest(bytes))
    }

    fn hash_reader(&self, reader: &mut dyn Read) -> io::Result<ContentHash> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(ContentHash::from_digest(&hasher.finalize()))
    }
}
