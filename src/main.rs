//! # batch-copy CLI
//!
//! Command-line interface for the media batch copier.
//!
//! ## Usage
//! ```bash
//! batch-copy copy --input-path /Volumes/SDCARD --output-path ~/Pictures/Inbox --batch-size 500
//! batch-copy status --input-path /Volumes/SDCARD
//! ```

mod cli;

use media_batch_copier::Result;

fn main() -> Result<()> {
    cli::run()
}
