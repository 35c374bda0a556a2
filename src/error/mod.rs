//! # Error Module
//!
//! Error types for the media batch copier.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, line numbers, what went wrong
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BatchCopyError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while walking the source tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid exclusion pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors that occur while fingerprinting a file
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the copy ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to open ledger at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read ledger at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ledger {path} has an unexpected header {found:?}. Restore the file from a backup or move it aside.")]
    MissingHeader { path: PathBuf, found: String },

    #[error("Ledger {path} is corrupted at line {line}: {reason}. Fix or remove that row and try again.")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to write ledger at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while copying into the destination
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Destination already has an entry named like {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Destination directory is missing or unreadable: {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, BatchCopyError>;
