//! # Core Module
//!
//! The UI-agnostic dedup-and-copy engine.
//!
//! ## Modules
//! - `hasher` - Content fingerprints (SHA-256)
//! - `ledger` - Durable record of every copy, keyed by fingerprint
//! - `scanner` - Discovers media files in the source tree
//! - `policy` - Name and hash collision rules
//! - `copier` - Copies bytes and file metadata
//! - `engine` - Orchestrates a batch-bounded run

pub mod copier;
pub mod engine;
pub mod hasher;
pub mod ledger;
pub mod policy;
pub mod scanner;

// Re-export commonly used types
pub use engine::{CopyConfig, CopyEngine, RunStatistics};
pub use hasher::ContentHash;
pub use ledger::{CsvLedger, LedgerBackend, LedgerRecord};
pub use scanner::MediaCandidate;
