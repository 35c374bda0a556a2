//! # Scanner Module
//!
//! Discovers media files in a source tree.
//!
//! ## Filtering
//! - Only files whose lowercased name ends with a recognised extension
//!   (images, camera raw formats, common video containers)
//! - Directories matching the exclusion rule (recycle bins by default)
//!   are pruned and never descended into
//!
//! ## Example
//! ```rust,ignore
//! use media_batch_copier::core::scanner::{ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Volumes/SDCARD"))?;
//! ```

mod exclusion;
mod filter;
mod walker;

pub use exclusion::ExclusionRule;
pub use filter::{MediaFilter, DEFAULT_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Relative root recorded for files directly inside the scan root
pub const ROOT_RELATIVE: &str = ".";

/// A media file discovered during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    /// Leaf file name
    pub name: String,
    /// Directory containing the file
    pub source_root: PathBuf,
    /// `source_root` relative to the scan root, `.` for the root itself
    pub relative_root: String,
}

impl MediaCandidate {
    /// Full path of the source file
    pub fn path(&self) -> PathBuf {
        self.source_root.join(&self.name)
    }

    /// `relative_root/name`, as reported for name collisions
    pub fn relative_path(&self) -> String {
        Path::new(&self.relative_root)
            .join(&self.name)
            .to_string_lossy()
            .into_owned()
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Candidates in enumeration order
    pub candidates: Vec<MediaCandidate>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
