//! # Policy Module
//!
//! Collision rules applied to each candidate, cheapest first:
//!
//! 1. **Name collision** - a file with the same leaf name already sits in
//!    the destination. Decided from the directory listing, no I/O on the
//!    candidate.
//! 2. **Hash collision** - the candidate's content is already in the
//!    ledger. Requires the file to have been hashed.
//!
//! Only a candidate that passes both is copied.

mod destination;

pub use destination::DestinationIndex;

use crate::core::hasher::ContentHash;
use crate::core::ledger::LedgerBackend;
use crate::core::scanner::MediaCandidate;
use serde::{Deserialize, Serialize};

/// Outcome of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No collision; continue processing
    Proceed,
    /// Name already present in the destination
    NameCollision,
    /// Content already recorded in the ledger
    HashCollision,
}

/// Applies the collision rules against the destination and the ledger
#[derive(Debug)]
pub struct CollisionPolicy {
    destination: DestinationIndex,
}

impl CollisionPolicy {
    /// Create a policy over a loaded destination listing
    pub fn new(destination: DestinationIndex) -> Self {
        Self { destination }
    }

    /// Step 1: is the candidate's name already taken in the destination?
    pub fn check_name(&self, candidate: &MediaCandidate) -> Verdict {
        if self.destination.contains(&candidate.name) {
            Verdict::NameCollision
        } else {
            Verdict::Proceed
        }
    }

    /// Step 2: has this content already been copied?
    pub fn check_hash(&self, ledger: &dyn LedgerBackend, hash: &ContentHash) -> Verdict {
        if ledger.contains(hash) {
            Verdict::HashCollision
        } else {
            Verdict::Proceed
        }
    }

    /// Record a completed copy so later candidates see the new name
    pub fn record_copy(&mut self, candidate: &MediaCandidate) {
        self.destination.insert(&candidate.name);
    }

    /// The destination listing
    pub fn destination(&self) -> &DestinationIndex {
        &self.destination
    }
}
