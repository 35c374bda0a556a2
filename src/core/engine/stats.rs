//! Per-run statistics.

use crate::events::RunSummary;
use serde::{Deserialize, Serialize};

/// What happened during one run. Returned to the caller, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Media files found by the scan
    pub total_candidates: usize,
    /// `relative_root/name` of every candidate skipped for a name collision, in order
    pub name_collisions: Vec<String>,
    /// Candidates skipped because their content was already in the ledger
    pub hash_collision_count: usize,
    /// Files copied and recorded
    pub copied_count: usize,
    /// Candidates not examined because the batch filled up
    pub remaining: usize,
    /// Non-fatal problems met while scanning
    pub scan_errors: Vec<String>,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl RunStatistics {
    /// Number of name collisions
    pub fn name_collision_count(&self) -> usize {
        self.name_collisions.len()
    }

    /// Whether candidates were left for a future run
    pub fn has_remaining(&self) -> bool {
        self.remaining > 0
    }

    /// Counters for the completion event
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_candidates: self.total_candidates,
            name_collisions: self.name_collision_count(),
            hash_collisions: self.hash_collision_count,
            copied: self.copied_count,
            remaining: self.remaining,
            duration_ms: self.duration_ms,
        }
    }
}
