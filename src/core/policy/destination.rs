//! Flat listing of the destination directory.

use crate::error::CopyError;
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Names present directly inside the destination directory
///
/// Loaded once per run and kept current by the engine after every copy, so
/// it always reflects copies made earlier in the same run.
#[derive(Debug, Clone)]
pub struct DestinationIndex {
    dir: PathBuf,
    names: HashSet<OsString>,
}

impl DestinationIndex {
    /// List `dir` (not recursively). Files and subdirectories both count.
    pub fn load(dir: &Path) -> Result<Self, CopyError> {
        let unavailable = |source| CopyError::DestinationUnavailable {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = HashSet::new();
        for entry in fs::read_dir(dir).map_err(unavailable)? {
            names.insert(entry.map_err(unavailable)?.file_name());
        }

        tracing::debug!(dir = %dir.display(), entries = names.len(), "Loaded destination listing");

        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    /// Whether `name` exists in the destination
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(OsStr::new(name))
    }

    /// Note that `name` now exists in the destination
    pub fn insert(&mut self, name: &str) {
        self.names.insert(OsString::from(name));
    }

    /// The destination directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
