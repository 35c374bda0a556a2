//! CSV-file ledger backend.

use super::csv::parse_rows;
use super::{header_line, is_known_header, LedgerBackend, LedgerRecord};
use crate::core::hasher::ContentHash;
use crate::error::LedgerError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Persistent ledger stored as an append-only CSV file
///
/// The file handle is unbuffered: every append is a single `write_all`
/// followed by `sync_data`, so a crash can lose at most the row being
/// written.
pub struct CsvLedger {
    path: PathBuf,
    file: Option<File>,
    records: HashMap<ContentHash, LedgerRecord>,
    /// The last existing row had no line terminator
    needs_newline: bool,
}

impl CsvLedger {
    /// Open or create the ledger at `path`.
    ///
    /// A missing or zero-length file gets a fresh header. Otherwise every
    /// row is replayed into memory; any unreadable row is fatal.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| LedgerError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|source| LedgerError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut ledger = Self {
            path: path.to_path_buf(),
            file: Some(file),
            records: HashMap::new(),
            needs_newline: false,
        };

        if text.is_empty() {
            tracing::debug!(path = %path.display(), "Initialising new ledger");
            ledger.write_line(&header_line())?;
            return Ok(ledger);
        }

        for record in parse_records(path, &text)? {
            ledger.insert(record);
        }
        ledger.needs_newline = !text.ends_with('\n');

        tracing::debug!(
            path = %path.display(),
            records = ledger.records.len(),
            "Replayed ledger"
        );

        Ok(ledger)
    }

    /// Read every record without creating or modifying the file
    pub fn load(path: &Path) -> Result<Vec<LedgerRecord>, LedgerError> {
        let text = fs::read_to_string(path).map_err(|source| LedgerError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if text.is_empty() {
            return Ok(Vec::new());
        }

        parse_records(path, &text)
    }

    fn insert(&mut self, record: LedgerRecord) {
        // Keep the earliest copy if a hash was ever recorded twice
        if let Entry::Vacant(slot) = self.records.entry(record.content_hash.clone()) {
            slot.insert(record);
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), LedgerError> {
        let write_error = |source| LedgerError::Write {
            path: self.path.clone(),
            source,
        };

        let file = self.file.as_mut().ok_or_else(|| {
            write_error(std::io::Error::new(
                std::io::ErrorKind::Other,
                "ledger is already closed",
            ))
        })?;

        let mut bytes = Vec::with_capacity(line.len() + 1);
        if self.needs_newline {
            bytes.push(b'\n');
        }
        bytes.extend_from_slice(line.as_bytes());

        file.write_all(&bytes).map_err(write_error)?;
        file.sync_data().map_err(write_error)?;
        self.needs_newline = false;
        Ok(())
    }
}

impl LedgerBackend for CsvLedger {
    fn contains(&self, hash: &ContentHash) -> bool {
        self.records.contains_key(hash)
    }

    fn get(&self, hash: &ContentHash) -> Option<&LedgerRecord> {
        self.records.get(hash)
    }

    fn append(&mut self, record: LedgerRecord) -> Result<(), LedgerError> {
        self.write_line(&record.to_csv_line())?;
        self.insert(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LedgerError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Parse a full ledger document, header first
fn parse_records(path: &Path, text: &str) -> Result<Vec<LedgerRecord>, LedgerError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let rows = parse_rows(text).map_err(|e| LedgerError::MalformedRow {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })?;

    let mut rows = rows.into_iter();
    match rows.next() {
        Some(header) if is_known_header(&header.fields) => {}
        Some(header) => {
            return Err(LedgerError::MissingHeader {
                path: path.to_path_buf(),
                found: header.fields.join(","),
            })
        }
        None => {
            return Err(LedgerError::MissingHeader {
                path: path.to_path_buf(),
                found: String::new(),
            })
        }
    }

    rows.map(|row| {
        LedgerRecord::from_fields(&row.fields).map_err(|reason| LedgerError::MalformedRow {
            path: path.to_path_buf(),
            line: row.line,
            reason,
        })
    })
    .collect()
}
