//! # Hasher Module
//!
//! Computes content fingerprints for media files.
//!
//! A fingerprint is the SHA-256 digest of the file's bytes, rendered as
//! 64 lowercase hex characters. It is the identity used by the ledger:
//! two files with the same fingerprint are the same media, whatever
//! their names.
//!
//! ## Example
//! ```rust,ignore
//! use media_batch_copier::core::hasher::{ContentHasher, Sha256Hasher};
//!
//! let hasher = Sha256Hasher::new();
//! let hash = hasher.hash_file(&path)?;
//! println!("{}", hash);
//! ```

mod sha256;
mod traits;

pub use sha256::Sha256Hasher;
pub use traits::{ContentHash, ContentHasher};
