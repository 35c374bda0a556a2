//! Path exclusion rules for pruning directories during a scan.

use crate::error::ScanError;
use regex::{Regex, RegexBuilder};

/// Substring excluded by default: matches `$RECYCLE.BIN`, `RECYCLER`, `Recycle Bin`
pub const DEFAULT_EXCLUDED_SUBSTRING: &str = "recycle";

/// Decides whether a directory should be skipped entirely
#[derive(Debug, Clone)]
pub enum ExclusionRule {
    /// Exclude nothing
    None,
    /// Case-insensitive substring of the directory path (stored lowercased)
    Substring(String),
    /// Case-insensitive regular expression matched against the directory path
    Pattern(Regex),
}

impl ExclusionRule {
    /// Case-insensitive substring rule
    pub fn substring(needle: &str) -> Self {
        Self::Substring(needle.to_lowercase())
    }

    /// Case-insensitive regular expression rule
    pub fn pattern(pattern: &str) -> Result<Self, ScanError> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Whether a directory path (relative to the scan root) is excluded
    pub fn is_excluded(&self, relative_dir: &str) -> bool {
        match self {
            Self::None => false,
            Self::Substring(needle) => {
                !needle.is_empty() && relative_dir.to_lowercase().contains(needle.as_str())
            }
            Self::Pattern(regex) => regex.is_match(relative_dir),
        }
    }
}

impl Default for ExclusionRule {
    fn default() -> Self {
        Self::substring(DEFAULT_EXCLUDED_SUBSTRING)
    }
}
