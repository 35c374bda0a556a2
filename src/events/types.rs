//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted during a copy run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Run-level events
    Run(RunEvent),
    /// Scanning phase events
    Scan(ScanEvent),
    /// Copying phase events
    Copy(CopyEvent),
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// A run has started
    Started {
        source: PathBuf,
        destination: PathBuf,
        batch_size: usize,
    },
    /// Moving to a new phase
    PhaseChanged { phase: RunPhase },
    /// The run finished normally
    Completed { summary: RunSummary },
    /// The run stopped on a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Scanning,
    Copying,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Scanning => write!(f, "Scanning"),
            RunPhase::Copying => write!(f, "Copying"),
        }
    }
}

/// Counters reported when a run completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_candidates: usize,
    pub name_collisions: usize,
    pub hash_collisions: usize,
    pub copied: usize,
    pub remaining: usize,
    pub duration_ms: u64,
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// Progress update, sent once per directory
    Progress(ScanProgress),
    /// A media file was found
    CandidateFound { path: PathBuf },
    /// An entry could not be read; scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_candidates: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Directories visited so far
    pub directories_scanned: usize,
    /// Media files found so far
    pub candidates_found: usize,
    /// Directory being visited
    pub current_path: PathBuf,
}

/// Events during the copying phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CopyEvent {
    /// Copying has started
    Started {
        total_candidates: usize,
        batch_size: usize,
    },
    /// A file was copied and recorded
    Copied { relative_path: String, hash: String },
    /// Skipped: the name already exists in the destination
    NameCollision { relative_path: String },
    /// Skipped: the content is already in the ledger
    HashCollision { relative_path: String, hash: String },
    /// Progress update after each processed candidate
    Progress(CopyProgress),
    /// Copying stopped (batch full or candidates exhausted)
    Completed { copied: usize, remaining: usize },
}

/// Progress information during copying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyProgress {
    /// Files copied so far
    pub copied: usize,
    /// Maximum copies for this run
    pub batch_size: usize,
    /// Candidates examined so far
    pub processed: usize,
    /// Candidates found by the scan
    pub total_candidates: usize,
}
