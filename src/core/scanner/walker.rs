//! Directory walking implementation using walkdir.

use super::{ExclusionRule, MediaCandidate, MediaFilter, ScanResult, ROOT_RELATIVE};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanProgress};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Directories to prune
    pub exclusion: ExclusionRule,
    /// Visit directory entries in file-name order
    pub sort_by_name: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            extensions: None,
            exclusion: ExclusionRule::default(),
            sort_by_name: true,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: MediaFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = match config.extensions {
            Some(ref extensions) => MediaFilter::with_extensions(extensions),
            None => MediaFilter::new(),
        }
        .with_hidden(config.include_hidden);

        Self { config, filter }
    }

    /// Scan a directory tree
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    /// Scan with progress reporting via events
    ///
    /// Fails only if `root` is not a directory; problems below the root are
    /// collected in [`ScanResult::errors`].
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut candidates = Vec::new();
        let mut errors = Vec::new();
        let mut directories_scanned = 0;

        // Configure walkdir
        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        if self.config.sort_by_name {
            walker = walker.sort_by_file_name();
        }

        let walker = walker
            .into_iter()
            .filter_entry(|entry| !self.is_pruned(root, entry));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };

                    tracing::warn!(path = %path.display(), error = %error, "Skipping unreadable entry");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                directories_scanned += 1;
                events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                    directories_scanned,
                    candidates_found: candidates.len(),
                    current_path: entry.path().to_path_buf(),
                })));
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!(path = %entry.path().display(), "Skipping file with non UTF-8 name");
                continue;
            };

            if !self.filter.should_include(name) {
                continue;
            }

            let Some(source_root) = entry.path().parent() else {
                continue;
            };

            let candidate = MediaCandidate {
                name: name.to_string(),
                source_root: source_root.to_path_buf(),
                relative_root: relative_root(root, source_root),
            };

            events.send(Event::Scan(ScanEvent::CandidateFound {
                path: entry.path().to_path_buf(),
            }));

            candidates.push(candidate);
        }

        tracing::debug!(
            root = %root.display(),
            candidates = candidates.len(),
            errors = errors.len(),
            "Scan finished"
        );

        events.send(Event::Scan(ScanEvent::Completed {
            total_candidates: candidates.len(),
        }));

        Ok(ScanResult { candidates, errors })
    }

    /// Whether a directory entry should be skipped along with its subtree
    fn is_pruned(&self, root: &Path, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }

        if !self.config.include_hidden
            && entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
        {
            return true;
        }

        let relative = relative_root(root, entry.path());
        if self.config.exclusion.is_excluded(&relative) {
            tracing::debug!(path = %entry.path().display(), "Pruning excluded directory");
            return true;
        }

        false
    }
}

/// `dir` relative to `root`, `.` when they are the same
fn relative_root(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ROOT_RELATIVE.to_string(),
        Ok(relative) => relative.to_string_lossy().into_owned(),
        Err(_) => dir.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(name.as_bytes()).unwrap();
        path
    }

    fn names(result: &ScanResult) -> Vec<String> {
        result.candidates.iter().map(|c| c.relative_path()).collect()
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = WalkDirScanner::new(ScanConfig::default());

        let result = scanner.scan(temp_dir.path()).unwrap();

        assert!(result.candidates.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_records_relative_roots() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "root.jpg");
        create_test_file(&temp_dir.path().join("2023").join("summer"), "beach.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(names(&result), vec!["2023/summer/beach.png", "./root.jpg"]);
        let nested = &result.candidates[0];
        assert_eq!(nested.relative_root, "2023/summer");
        assert_eq!(nested.source_root, temp_dir.path().join("2023/summer"));
    }

    #[test]
    fn scan_excludes_non_media_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "photo.jpg");
        create_test_file(temp_dir.path(), "notes.txt");
        create_test_file(temp_dir.path(), "_uploader_batch_copy.csv");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(names(&result), vec!["./photo.jpg"]);
    }

    #[test]
    fn scan_prunes_recycle_bin() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "keep.jpg");
        create_test_file(&temp_dir.path().join("$RECYCLE.BIN").join("S-1-5"), "deleted.jpg");
        create_test_file(&temp_dir.path().join("old").join("Recycle Bin"), "gone.png");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(names(&result), vec!["./keep.jpg"]);
    }

    #[test]
    fn exclusion_ignores_the_root_path_itself() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("recycled-photos");
        create_test_file(&root, "a.jpg");

        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(&root).unwrap();

        assert_eq!(names(&result), vec!["./a.jpg"]);
    }

    #[test]
    fn exclusion_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir.path().join("$RECYCLE.BIN"), "deleted.jpg");

        let config = ScanConfig {
            exclusion: ExclusionRule::None,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();

        assert_eq!(result.candidates.len(), 1);
    }

    #[test]
    fn scan_respects_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "a.jpg");
        create_test_file(temp_dir.path(), "b.png");

        let config = ScanConfig {
            extensions: Some(vec!["png".to_string()]),
            ..Default::default()
        };
        let result = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();

        assert_eq!(names(&result), vec!["./b.png"]);
    }

    #[test]
    fn hidden_directories_skipped_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir.path().join(".thumbnails"), "t.jpg");
        create_test_file(temp_dir.path(), "a.jpg");

        let visible = WalkDirScanner::new(ScanConfig::default())
            .scan(temp_dir.path())
            .unwrap();
        assert_eq!(visible.candidates.len(), 2);

        let config = ScanConfig {
            include_hidden: false,
            ..Default::default()
        };
        let hidden = WalkDirScanner::new(config).scan(temp_dir.path()).unwrap();
        assert_eq!(names(&hidden), vec!["./a.jpg"]);
    }

    #[test]
    fn scan_nonexistent_directory_returns_error() {
        let scanner = WalkDirScanner::new(ScanConfig::default());
        let result = scanner.scan(Path::new("/nonexistent/path/12345"));

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_emits_found_and_completed_events() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "a.jpg");
        create_test_file(temp_dir.path(), "b.jpg");

        let (sender, receiver) = EventChannel::new();
        WalkDirScanner::new(ScanConfig::default())
            .scan_with_events(temp_dir.path(), &sender)
            .unwrap();
        drop(sender);

        let events: Vec<_> = receiver.iter().collect();
        let found = events
            .iter()
            .filter(|e| matches!(e, Event::Scan(ScanEvent::CandidateFound { .. })))
            .count();
        assert_eq!(found, 2);
        assert!(matches!(
            events.last(),
            Some(Event::Scan(ScanEvent::Completed { total_candidates: 2 }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entry_is_collected_and_siblings_still_found() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir.path().join("album"), "a.jpg");
        create_test_file(temp_dir.path(), "b.jpg");
        std::os::unix::fs::symlink(
            temp_dir.path().join("missing.jpg"),
            temp_dir.path().join("album").join("broken.jpg"),
        )
        .unwrap();

        let config = ScanConfig {
            follow_symlinks: true,
            ..Default::default()
        };
        let (sender, receiver) = EventChannel::new();
        let result = WalkDirScanner::new(config)
            .scan_with_events(temp_dir.path(), &sender)
            .unwrap();
        drop(sender);

        assert_eq!(names(&result), vec!["album/a.jpg", "./b.jpg"]);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ScanError::ReadDirectory { .. }));
        assert!(result.errors[0].to_string().contains("broken.jpg"));
        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Scan(ScanEvent::Error { .. }))));
    }
}
