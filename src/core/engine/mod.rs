//! # Engine Module
//!
//! Orchestrates one copy run.
//!
//! ## Run Stages
//! 1. **Open** - Replay the ledger kept in the source root
//! 2. **List** - Read the destination's flat listing
//! 3. **Scan** - Enumerate every media candidate up front
//! 4. **Copy** - For each candidate in order: name check, hash, hash check,
//!    copy, ledger append; stop once the batch is full
//! 5. **Close** - Flush the ledger on every exit path
//!
//! ## Resumability
//! Candidates left over when the batch fills are untouched. The next run
//! sees everything already copied as a name or hash collision and picks up
//! where this one stopped.

mod config;
mod executor;
mod stats;

pub use config::{CopyConfig, DEFAULT_BATCH_SIZE};
pub use executor::{CopyEngine, CopyEngineBuilder};
pub use stats::RunStatistics;
