//! # Media Batch Copier
//!
//! Incrementally copies photos and videos from a source tree into a flat
//! destination directory, skipping anything already copied.
//!
//! ## Core Rules
//! - **Content is identity** - a SHA-256 ledger in the source root remembers
//!   every file ever copied, so renamed duplicates are skipped
//! - **Never overwrite** - a name already present in the destination is
//!   reported and skipped
//! - **Bounded runs** - each invocation copies at most one batch; the next
//!   one resumes where it stopped
//!
//! ## Architecture
//! - `core` - The dedup-and-copy engine
//! - `events` - Event-driven progress reporting
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{BatchCopyError, Result};

/// Initialize tracing for the binary.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` is used. Calling
/// this twice is harmless.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
