//! Extension filtering for the scanner.

use std::collections::HashSet;

/// Extensions recognised out of the box: still images, camera raw, video
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif",
    // camera raw
    "cr2", "cr3", "nef", "arw", "dng", "orf", "rw2", "raf", "srw", "pef",
    // video
    "mp4", "mov", "avi", "mkv", "m4v", "3gp", "mts", "m2ts", "wmv",
];

/// Decides whether a file name is a media file
#[derive(Debug, Clone)]
pub struct MediaFilter {
    /// Lowercased suffixes including the leading dot
    suffixes: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl MediaFilter {
    /// Create a new filter with the default extensions
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }

    /// Create a filter for a custom extension set.
    ///
    /// Extensions may be given with or without the leading dot and in any case.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .collect();

        Self {
            suffixes,
            include_hidden: true,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file name should be included
    pub fn should_include(&self, file_name: &str) -> bool {
        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        let lower = file_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lower.ends_with(suffix.as_str()))
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}
