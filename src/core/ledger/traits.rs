//! Ledger backend trait definition.

use super::LedgerRecord;
use crate::core::hasher::ContentHash;
use crate::error::LedgerError;

/// Trait for ledger backends
///
/// A backend is an append-only mapping from content hash to the record of
/// the copy that first brought that content into the destination.
pub trait LedgerBackend: Send {
    /// Whether content with this hash has already been copied. O(1).
    fn contains(&self, hash: &ContentHash) -> bool;

    /// The record stored for a hash, if any
    fn get(&self, hash: &ContentHash) -> Option<&LedgerRecord>;

    /// Persist a record and make it visible to `contains`.
    ///
    /// When this returns `Ok`, the record survives a process restart.
    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError>;

    /// Flush and release any underlying resource.
    ///
    /// Safe to call more than once.
    fn close(&mut self) -> Result<(), LedgerError>;

    /// Number of distinct hashes recorded
    fn len(&self) -> usize;

    /// Whether the ledger holds no records
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
