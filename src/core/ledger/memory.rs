//! In-memory ledger backend for testing.

use super::{LedgerBackend, LedgerRecord};
use crate::core::hasher::ContentHash;
use crate::error::LedgerError;
use std::collections::HashMap;

/// In-memory ledger backend
///
/// Useful for testing and dry runs where nothing should be persisted.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: HashMap<ContentHash, LedgerRecord>,
    /// Append order, for inspection in tests
    order: Vec<ContentHash>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = LedgerRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.insert(record);
        }
        ledger
    }

    /// Hashes in the order they were appended
    pub fn appended(&self) -> &[ContentHash] {
        &self.order
    }

    fn insert(&mut self, record: LedgerRecord) {
        let hash = record.content_hash.clone();
        if !self.records.contains_key(&hash) {
            self.order.push(hash.clone());
            self.records.insert(hash, record);
        }
    }
}

impl LedgerBackend for InMemoryLedger {
    fn contains(&self, hash: &ContentHash) -> bool {
        self.records.contains_key(hash)
    }

    fn get(&self, hash: &ContentHash) -> Option<&LedgerRecord> {
        self.records.get(hash)
    }

    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.insert(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
