//! # Ledger Module
//!
//! Durable record of every file ever copied, keyed by content hash.
//!
//! ## Storage format
//! UTF-8 CSV with a fixed header row:
//!
//! ```text
//! relative_root,media_name,sha256,copy_timestamp
//! .,IMG_0001.jpg,9f86d0...,2024-05-01T09:30:12.123456+02:00
//! ```
//!
//! The file is append-only. Rows are never rewritten or compacted, and the
//! in-memory index is rebuilt by replaying every row at startup.
//!
//! ## Backends
//! - `CsvLedger` - Persistent storage next to the source tree
//! - `InMemoryLedger` - For testing

mod csv;
mod file;
mod memory;
mod traits;

pub use file::CsvLedger;
pub use memory::InMemoryLedger;
pub use traits::LedgerBackend;

use crate::core::hasher::ContentHash;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, SubsecRound};
use serde::{Deserialize, Serialize};

/// Default ledger file name, created inside the source root
pub const DEFAULT_LEDGER_FILE_NAME: &str = "_uploader_batch_copy.csv";

/// Column names written to new ledgers
pub const LEDGER_COLUMNS: [&str; 4] = ["relative_root", "media_name", "sha256", "copy_timestamp"];

/// Column names written by earlier releases, still accepted on read
pub const LEGACY_LEDGER_COLUMNS: [&str; 4] =
    ["relative_root", "image_name", "sha256", "copy_timestamp"];

/// One successfully copied file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Directory of the source file, relative to the source root
    pub relative_root: String,
    /// Leaf file name
    pub media_name: String,
    /// Content fingerprint
    pub content_hash: ContentHash,
    /// When the copy happened, local time with UTC offset
    pub copy_timestamp: DateTime<FixedOffset>,
}

impl LedgerRecord {
    /// Create a record stamped with the current local time.
    ///
    /// The timestamp is truncated to the microsecond precision the ledger
    /// stores, so a record compares equal to itself after a reload.
    pub fn now(
        relative_root: impl Into<String>,
        media_name: impl Into<String>,
        content_hash: ContentHash,
    ) -> Self {
        Self {
            relative_root: relative_root.into(),
            media_name: media_name.into(),
            content_hash,
            copy_timestamp: Local::now().fixed_offset().trunc_subsecs(6),
        }
    }

    /// The timestamp as written to the ledger (ISO-8601, microseconds, explicit offset)
    pub fn timestamp_string(&self) -> String {
        self.copy_timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Encode as a single CSV line, including the trailing newline
    pub(crate) fn to_csv_line(&self) -> String {
        let timestamp = self.timestamp_string();
        csv::encode_row(&[
            self.relative_root.as_str(),
            self.media_name.as_str(),
            self.content_hash.as_str(),
            timestamp.as_str(),
        ])
    }

    /// Decode from parsed CSV fields
    pub(crate) fn from_fields(fields: &[String]) -> Result<Self, String> {
        let [relative_root, media_name, hash, timestamp] = fields else {
            return Err(format!(
                "expected {} fields, found {}",
                LEDGER_COLUMNS.len(),
                fields.len()
            ));
        };

        let content_hash = ContentHash::parse(hash)
            .ok_or_else(|| format!("invalid sha256 digest {:?}", hash))?;
        let copy_timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| format!("invalid copy timestamp {:?}: {}", timestamp, e))?;

        Ok(Self {
            relative_root: relative_root.clone(),
            media_name: media_name.clone(),
            content_hash,
            copy_timestamp,
        })
    }
}

/// Header line for new ledgers
pub(crate) fn header_line() -> String {
    csv::encode_row(&LEDGER_COLUMNS)
}

/// Whether parsed header fields name a ledger this crate can read
pub(crate) fn is_known_header(fields: &[String]) -> bool {
    let matches = |columns: &[&str; 4]| {
        fields.len() == columns.len() && fields.iter().zip(columns).all(|(f, c)| f.trim() == *c)
    };
    matches(&LEDGER_COLUMNS) || matches(&LEGACY_LEDGER_COLUMNS)
}
