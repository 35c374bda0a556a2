//! Copy run execution.

use super::{CopyConfig, RunStatistics};
use crate::core::copier::copy_with_metadata;
use crate::core::hasher::{ContentHash, ContentHasher, Sha256Hasher};
use crate::core::ledger::{CsvLedger, LedgerBackend, LedgerRecord};
use crate::core::policy::{CollisionPolicy, DestinationIndex, Verdict};
use crate::core::scanner::{ExclusionRule, MediaCandidate, WalkDirScanner};
use crate::error::{BatchCopyError, CopyError, ScanError};
use crate::events::{
    null_sender, CopyEvent, CopyProgress, Event, EventSender, RunEvent, RunPhase,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Builder for a copy engine
pub struct CopyEngineBuilder {
    source: Option<PathBuf>,
    destination: Option<PathBuf>,
    config: CopyConfig,
    hasher: Option<Box<dyn ContentHasher>>,
}

impl CopyEngineBuilder {
    /// Create a new engine builder
    pub fn new() -> Self {
        Self {
            source: None,
            destination: None,
            config: CopyConfig::default(),
            hasher: None,
        }
    }

    /// Source tree to copy from; also holds the ledger
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Flat destination directory
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: CopyConfig) -> Self {
        self.config = config;
        self
    }

    /// Maximum copies per run
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Media extensions to accept
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.scan.extensions = Some(extensions);
        self
    }

    /// Directories to prune while scanning
    pub fn exclusion(mut self, rule: ExclusionRule) -> Self {
        self.config.scan.exclusion = rule;
        self
    }

    /// Ledger file name inside the source root
    pub fn ledger_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.ledger_file_name = name.into();
        self
    }

    /// Use a different content hasher
    pub fn hasher(mut self, hasher: Box<dyn ContentHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> Result<CopyEngine, BatchCopyError> {
        let source = self
            .source
            .ok_or_else(|| BatchCopyError::Config("source directory is required".to_string()))?;
        let destination = self.destination.ok_or_else(|| {
            BatchCopyError::Config("destination directory is required".to_string())
        })?;
        self.config.validate()?;

        Ok(CopyEngine {
            source,
            destination,
            config: self.config,
            hasher: self.hasher.unwrap_or_else(|| Box::new(Sha256Hasher::new())),
        })
    }
}

impl Default for CopyEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The dedup-and-copy engine
pub struct CopyEngine {
    source: PathBuf,
    destination: PathBuf,
    config: CopyConfig,
    hasher: Box<dyn ContentHasher>,
}

impl CopyEngine {
    /// Create a new engine builder
    pub fn builder() -> CopyEngineBuilder {
        CopyEngineBuilder::new()
    }

    /// Where this engine keeps its ledger
    pub fn ledger_path(&self) -> PathBuf {
        self.source.join(&self.config.ledger_file_name)
    }

    /// Run against the CSV ledger in the source root, without events
    pub fn run(&self) -> Result<RunStatistics, BatchCopyError> {
        self.run_with_events(&null_sender())
    }

    /// Run against the CSV ledger in the source root, with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<RunStatistics, BatchCopyError> {
        let opened = if self.source.is_dir() {
            CsvLedger::open(&self.ledger_path()).map_err(BatchCopyError::from)
        } else {
            Err(ScanError::DirectoryNotFound {
                path: self.source.clone(),
            }
            .into())
        };

        match opened {
            Ok(mut ledger) => self.run_with_ledger(&mut ledger, events),
            Err(e) => {
                events.send(Event::Run(RunEvent::Error {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    /// Run against a caller-supplied ledger.
    ///
    /// The ledger is closed before this returns, on success and on error.
    /// Its in-memory index stays queryable afterwards.
    pub fn run_with_ledger(
        &self,
        ledger: &mut dyn LedgerBackend,
        events: &EventSender,
    ) -> Result<RunStatistics, BatchCopyError> {
        let start_time = Instant::now();

        tracing::info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            batch_size = self.config.batch_size,
            known_hashes = ledger.len(),
            "Starting copy run"
        );
        events.send(Event::Run(RunEvent::Started {
            source: self.source.clone(),
            destination: self.destination.clone(),
            batch_size: self.config.batch_size,
        }));

        let result = self.execute(ledger, events);
        let closed = ledger.close();

        let outcome = match (result, closed) {
            (Ok(mut stats), Ok(())) => {
                stats.duration_ms = start_time.elapsed().as_millis() as u64;
                Ok(stats)
            }
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), closed) => {
                if let Err(close_error) = closed {
                    tracing::error!(error = %close_error, "Failed to close ledger after error");
                }
                Err(e)
            }
        };

        match &outcome {
            Ok(stats) => {
                tracing::info!(
                    candidates = stats.total_candidates,
                    copied = stats.copied_count,
                    name_collisions = stats.name_collision_count(),
                    hash_collisions = stats.hash_collision_count,
                    remaining = stats.remaining,
                    duration_ms = stats.duration_ms,
                    "Copy run finished"
                );
                events.send(Event::Run(RunEvent::Completed {
                    summary: stats.summary(),
                }));
            }
            Err(e) => {
                tracing::error!(error = %e, "Copy run aborted");
                events.send(Event::Run(RunEvent::Error {
                    message: e.to_string(),
                }));
            }
        }

        outcome
    }

    fn execute(
        &self,
        ledger: &mut dyn LedgerBackend,
        events: &EventSender,
    ) -> Result<RunStatistics, BatchCopyError> {
        let mut policy = CollisionPolicy::new(DestinationIndex::load(&self.destination)?);
        let mut stats = RunStatistics::default();

        // Phase 1: Scanning
        events.send(Event::Run(RunEvent::PhaseChanged {
            phase: RunPhase::Scanning,
        }));

        let scanner = WalkDirScanner::new(self.config.scan.clone());
        let scan_result = scanner.scan_with_events(&self.source, events)?;

        stats.total_candidates = scan_result.candidates.len();
        stats.scan_errors = scan_result.errors.iter().map(|e| e.to_string()).collect();

        // Phase 2: Copying
        events.send(Event::Run(RunEvent::PhaseChanged {
            phase: RunPhase::Copying,
        }));
        events.send(Event::Copy(CopyEvent::Started {
            total_candidates: stats.total_candidates,
            batch_size: self.config.batch_size,
        }));

        let candidates = scan_result.candidates;
        for (index, candidate) in candidates.iter().enumerate() {
            if stats.copied_count >= self.config.batch_size {
                stats.remaining = candidates.len() - index;
                break;
            }

            self.process(candidate, ledger, &mut policy, &mut stats, events)?;

            events.send(Event::Copy(CopyEvent::Progress(CopyProgress {
                copied: stats.copied_count,
                batch_size: self.config.batch_size,
                processed: index + 1,
                total_candidates: stats.total_candidates,
            })));
        }

        events.send(Event::Copy(CopyEvent::Completed {
            copied: stats.copied_count,
            remaining: stats.remaining,
        }));

        Ok(stats)
    }

    /// Name check, hash, hash check, copy, record
    fn process(
        &self,
        candidate: &MediaCandidate,
        ledger: &mut dyn LedgerBackend,
        policy: &mut CollisionPolicy,
        stats: &mut RunStatistics,
        events: &EventSender,
    ) -> Result<(), BatchCopyError> {
        let relative_path = candidate.relative_path();

        if policy.check_name(candidate) == Verdict::NameCollision {
            tracing::debug!(path = %relative_path, "Name already in destination, skipping");
            report_name_collision(relative_path, stats, events);
            return Ok(());
        }

        let source_path = candidate.path();
        let hash = self.hasher.hash_file(&source_path)?;

        if policy.check_hash(ledger, &hash) == Verdict::HashCollision {
            log_previous_copy(ledger, &relative_path, &hash);
            report_hash_collision(relative_path, &hash, stats, events);
            return Ok(());
        }

        let target = policy.destination().dir().join(&candidate.name);
        let copied = match copy_with_metadata(&source_path, &target, self.hasher.as_ref()) {
            Ok(copied) => copied,
            Err(CopyError::AlreadyExists { .. }) => {
                // Not in the listing, but the filesystem matched it (case folding or a late writer)
                tracing::debug!(path = %relative_path, "Destination refused the name, skipping");
                policy.record_copy(candidate);
                report_name_collision(relative_path, stats, events);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if copied.hash != hash {
            tracing::warn!(
                path = %relative_path,
                hashed = %hash,
                copied = %copied.hash,
                "Source changed while copying, using the copied content"
            );
            if policy.check_hash(ledger, &copied.hash) == Verdict::HashCollision {
                remove_copy(&target, "Failed to remove duplicate copy");
                log_previous_copy(ledger, &relative_path, &copied.hash);
                report_hash_collision(relative_path, &copied.hash, stats, events);
                return Ok(());
            }
        }
        let hash = copied.hash;

        let record = LedgerRecord::now(
            candidate.relative_root.clone(),
            candidate.name.clone(),
            hash.clone(),
        );
        if let Err(e) = ledger.append(record) {
            // Without a ledger row the copy would be invisible to the next run
            remove_copy(&target, "Failed to remove unrecorded copy");
            return Err(e.into());
        }

        policy.record_copy(candidate);
        stats.copied_count += 1;

        tracing::info!(path = %relative_path, hash = %hash, "Copied");
        events.send(Event::Copy(CopyEvent::Copied {
            relative_path,
            hash: hash.to_string(),
        }));

        Ok(())
    }
}

fn report_name_collision(relative_path: String, stats: &mut RunStatistics, events: &EventSender) {
    events.send(Event::Copy(CopyEvent::NameCollision {
        relative_path: relative_path.clone(),
    }));
    stats.name_collisions.push(relative_path);
}

fn report_hash_collision(
    relative_path: String,
    hash: &ContentHash,
    stats: &mut RunStatistics,
    events: &EventSender,
) {
    events.send(Event::Copy(CopyEvent::HashCollision {
        relative_path,
        hash: hash.to_string(),
    }));
    stats.hash_collision_count += 1;
}

fn log_previous_copy(ledger: &dyn LedgerBackend, relative_path: &str, hash: &ContentHash) {
    if let Some(previous) = ledger.get(hash) {
        tracing::debug!(
            path = %relative_path,
            hash = %hash,
            first_copied_from = %Path::new(&previous.relative_root).join(&previous.media_name).display(),
            "Content already copied, skipping"
        );
    }
}

fn remove_copy(target: &Path, message: &str) {
    if let Err(e) = fs::remove_file(target) {
        tracing::warn!(path = %target.display(), error = %e, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::InMemoryLedger;
    use crate::core::scanner::ScanConfig;
    use crate::events::EventChannel;
    use crate::error::HashError;
    use tempfile::TempDir;

    struct Dirs {
        source: TempDir,
        destination: TempDir,
    }

    impl Dirs {
        fn new() -> Self {
            Self {
                source: TempDir::new().unwrap(),
                destination: TempDir::new().unwrap(),
            }
        }

        fn add(&self, relative: &str, content: &[u8]) -> PathBuf {
            let path = self.source.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn engine(&self, batch_size: usize) -> CopyEngine {
            CopyEngine::builder()
                .source(self.source.path())
                .destination(self.destination.path())
                .batch_size(batch_size)
                .build()
                .unwrap()
        }

        fn dest_file(&self, name: &str) -> PathBuf {
            self.destination.path().join(name)
        }
    }

    /// Hasher that fails on a chosen file name
    struct FailingHasher {
        fail_on: &'static str,
    }

    impl ContentHasher for FailingHasher {
        fn hash_bytes(&self, bytes: &[u8]) -> ContentHash {
            Sha256Hasher::new().hash_bytes(bytes)
        }

        fn hash_reader(&self, reader: &mut dyn std::io::Read) -> std::io::Result<ContentHash> {
            Sha256Hasher::new().hash_reader(reader)
        }

        fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
            if path.ends_with(self.fail_on) {
                return Err(HashError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "unreadable"),
                });
            }
            Sha256Hasher::new().hash_file(path)
        }
    }

    /// Hasher that runs `after_hash` once a chosen source file has been hashed,
    /// to change the filesystem between the hash and the copy
    struct InterleavingHasher<F: Fn(&Path) + Send + Sync> {
        on: &'static str,
        after_hash: F,
    }

    impl<F: Fn(&Path) + Send + Sync> ContentHasher for InterleavingHasher<F> {
        fn hash_bytes(&self, bytes: &[u8]) -> ContentHash {
            Sha256Hasher::new().hash_bytes(bytes)
        }

        fn hash_reader(&self, reader: &mut dyn std::io::Read) -> std::io::Result<ContentHash> {
            Sha256Hasher::new().hash_reader(reader)
        }

        fn hash_file(&self, path: &Path) -> Result<ContentHash, HashError> {
            let hash = Sha256Hasher::new().hash_file(path)?;
            if path.ends_with(self.on) {
                (self.after_hash)(path);
            }
            Ok(hash)
        }
    }

    /// Ledger that counts closes and can refuse appends
    #[derive(Default)]
    struct RecordingLedger {
        inner: InMemoryLedger,
        closes: usize,
        reject_appends: bool,
    }

    impl LedgerBackend for RecordingLedger {
        fn contains(&self, hash: &ContentHash) -> bool {
            self.inner.contains(hash)
        }

        fn get(&self, hash: &ContentHash) -> Option<&LedgerRecord> {
            self.inner.get(hash)
        }

        fn append(&mut self, record: LedgerRecord) -> Result<(), crate::error::LedgerError> {
            if self.reject_appends {
                return Err(crate::error::LedgerError::Write {
                    path: PathBuf::from("ledger.csv"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.append(record)
        }

        fn close(&mut self) -> Result<(), crate::error::LedgerError> {
            self.closes += 1;
            Ok(())
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn builder_requires_paths() {
        assert!(CopyEngine::builder().destination("/tmp").build().is_err());
        assert!(CopyEngine::builder().source("/tmp").build().is_err());
    }

    #[test]
    fn builder_rejects_zero_batch() {
        let result = CopyEngine::builder()
            .source("/src")
            .destination("/dst")
            .batch_size(0)
            .build();
        assert!(matches!(result, Err(BatchCopyError::Config(_))));
    }

    #[test]
    fn ledger_lives_in_source_root() {
        let engine = CopyEngine::builder()
            .source("/media/card")
            .destination("/media/library")
            .ledger_file_name("ledger.csv")
            .build()
            .unwrap();
        assert_eq!(engine.ledger_path(), PathBuf::from("/media/card/ledger.csv"));
    }

    #[test]
    fn empty_source_completes_with_zero_counts() {
        let dirs = Dirs::new();
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(10)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.total_candidates, 0);
        assert_eq!(stats.copied_count, 0);
        assert!(stats.name_collisions.is_empty());
        assert_eq!(stats.hash_collision_count, 0);
    }

    #[test]
    fn identical_content_is_copied_once() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"sunset");
        dirs.add("b.jpg", b"sunset");
        dirs.add("c.jpg", b"sunrise");
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(10)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.copied_count, 2);
        assert_eq!(stats.hash_collision_count, 1);
        assert!(dirs.dest_file("a.jpg").exists());
        assert!(!dirs.dest_file("b.jpg").exists());
        assert!(dirs.dest_file("c.jpg").exists());
    }

    #[test]
    fn every_copy_in_a_run_is_queryable() {
        let dirs = Dirs::new();
        let hasher = Sha256Hasher::new();
        let contents: Vec<Vec<u8>> = (0..4).map(|i| format!("photo {}", i).into_bytes()).collect();
        for (i, content) in contents.iter().enumerate() {
            dirs.add(&format!("{}.jpg", i), content);
        }
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(10)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.copied_count, 4);
        assert_eq!(ledger.len(), 4);
        for content in &contents {
            assert!(ledger.contains(&hasher.hash_bytes(content)));
        }
    }

    #[test]
    fn same_name_in_two_directories_collides_on_second() {
        let dirs = Dirs::new();
        dirs.add("a/img.jpg", b"first");
        dirs.add("b/img.jpg", b"second");
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(10)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.copied_count, 1);
        assert_eq!(stats.name_collisions, vec!["b/img.jpg".to_string()]);
        assert_eq!(fs::read(dirs.dest_file("img.jpg")).unwrap(), b"first");
    }

    #[test]
    fn batch_limit_stops_and_counts_remaining() {
        let dirs = Dirs::new();
        for i in 0..5 {
            dirs.add(&format!("{}.jpg", i), format!("content {}", i).as_bytes());
        }
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(2)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.copied_count, 2);
        assert_eq!(stats.remaining, 3);
        assert_eq!(ledger.len(), 2);
        assert!(dirs.dest_file("0.jpg").exists());
        assert!(dirs.dest_file("1.jpg").exists());
        assert!(!dirs.dest_file("2.jpg").exists());
    }

    #[test]
    fn collisions_do_not_count_toward_batch() {
        let dirs = Dirs::new();
        dirs.add("0.jpg", b"dup");
        dirs.add("1.jpg", b"dup");
        dirs.add("2.jpg", b"unique");
        fs::write(dirs.dest_file("3.jpg"), b"taken").unwrap();
        dirs.add("3.jpg", b"other");
        dirs.add("4.jpg", b"last");
        let mut ledger = InMemoryLedger::new();

        let stats = dirs
            .engine(3)
            .run_with_ledger(&mut ledger, &null_sender())
            .unwrap();

        assert_eq!(stats.copied_count, 3);
        assert_eq!(stats.hash_collision_count, 1);
        assert_eq!(stats.name_collisions, vec!["./3.jpg".to_string()]);
        assert_eq!(stats.remaining, 0);
    }

    #[test]
    fn hash_failure_aborts_run_and_closes_ledger() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"a");
        dirs.add("b.jpg", b"b");
        dirs.add("c.jpg", b"c");
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path())
            .batch_size(10)
            .hasher(Box::new(FailingHasher { fail_on: "b.jpg" }))
            .build()
            .unwrap();
        let mut ledger = RecordingLedger::default();

        let result = engine.run_with_ledger(&mut ledger, &null_sender());

        assert!(matches!(result, Err(BatchCopyError::Hash(_))));
        assert_eq!(ledger.closes, 1);
        assert_eq!(ledger.len(), 1);
        assert!(dirs.dest_file("a.jpg").exists());
        assert!(!dirs.dest_file("c.jpg").exists());
    }

    #[test]
    fn failed_append_removes_the_copy() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"a");
        let mut ledger = RecordingLedger {
            reject_appends: true,
            ..Default::default()
        };

        let result = dirs.engine(10).run_with_ledger(&mut ledger, &null_sender());

        assert!(matches!(result, Err(BatchCopyError::Ledger(_))));
        assert!(!dirs.dest_file("a.jpg").exists());
        assert_eq!(ledger.closes, 1);
    }

    #[test]
    fn missing_destination_is_fatal() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"a");
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path().join("missing"))
            .build()
            .unwrap();
        let mut ledger = RecordingLedger::default();

        let result = engine.run_with_ledger(&mut ledger, &null_sender());

        assert!(matches!(
            result,
            Err(BatchCopyError::Copy(CopyError::DestinationUnavailable { .. }))
        ));
        assert_eq!(ledger.closes, 1);
    }

    #[test]
    fn missing_source_is_fatal_without_creating_ledger() {
        let dirs = Dirs::new();
        let missing = dirs.source.path().join("missing");
        let engine = CopyEngine::builder()
            .source(&missing)
            .destination(dirs.destination.path())
            .build()
            .unwrap();

        let result = engine.run();

        assert!(matches!(result, Err(BatchCopyError::Scan(_))));
        assert!(!missing.exists());
    }

    #[test]
    fn run_emits_copy_events_in_order() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"same");
        dirs.add("b.jpg", b"same");
        let mut ledger = InMemoryLedger::new();
        let (sender, receiver) = EventChannel::new();

        dirs.engine(5).run_with_ledger(&mut ledger, &sender).unwrap();
        drop(sender);

        let outcomes: Vec<&'static str> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Copy(CopyEvent::Copied { .. }) => Some("copied"),
                Event::Copy(CopyEvent::HashCollision { .. }) => Some("hash"),
                Event::Copy(CopyEvent::NameCollision { .. }) => Some("name"),
                Event::Run(RunEvent::Completed { .. }) => Some("done"),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes, vec!["copied", "hash", "done"]);
    }

    #[test]
    fn name_refused_by_destination_counts_as_collision() {
        let dirs = Dirs::new();
        dirs.add("IMG1.jpg", b"first");
        dirs.add("IMG2.jpg", b"second");
        let destination = dirs.destination.path().to_path_buf();
        // Appears after the listing was read, as a case-folded match would
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path())
            .batch_size(10)
            .hasher(Box::new(InterleavingHasher {
                on: "IMG1.jpg",
                after_hash: move |_: &Path| fs::write(destination.join("IMG1.jpg"), b"already there").unwrap(),
            }))
            .build()
            .unwrap();
        let mut ledger = InMemoryLedger::new();
        let (sender, receiver) = EventChannel::new();

        let stats = engine.run_with_ledger(&mut ledger, &sender).unwrap();
        drop(sender);

        assert_eq!(stats.name_collisions, vec!["./IMG1.jpg".to_string()]);
        assert_eq!(stats.copied_count, 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(fs::read(dirs.dest_file("IMG1.jpg")).unwrap(), b"already there");
        assert_eq!(fs::read(dirs.dest_file("IMG2.jpg")).unwrap(), b"second");
        assert!(receiver
            .iter()
            .any(|e| matches!(e, Event::Copy(CopyEvent::NameCollision { .. }))));
    }

    #[test]
    fn ledger_records_the_bytes_actually_copied() {
        let dirs = Dirs::new();
        let source = dirs.add("a.jpg", b"before edit");
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path())
            .hasher(Box::new(InterleavingHasher {
                on: "a.jpg",
                after_hash: move |_: &Path| fs::write(&source, b"after edit").unwrap(),
            }))
            .build()
            .unwrap();
        let hasher = Sha256Hasher::new();
        let mut ledger = InMemoryLedger::new();

        let stats = engine.run_with_ledger(&mut ledger, &null_sender()).unwrap();

        assert_eq!(stats.copied_count, 1);
        assert_eq!(fs::read(dirs.dest_file("a.jpg")).unwrap(), b"after edit");
        assert!(ledger.contains(&hasher.hash_bytes(b"after edit")));
        assert!(!ledger.contains(&hasher.hash_bytes(b"before edit")));
    }

    #[test]
    fn source_rewritten_to_known_content_is_not_kept() {
        let dirs = Dirs::new();
        dirs.add("a.jpg", b"known");
        let rewritten = dirs.add("b.jpg", b"unique");
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path())
            .batch_size(10)
            .hasher(Box::new(InterleavingHasher {
                on: "b.jpg",
                after_hash: move |_: &Path| fs::write(&rewritten, b"known").unwrap(),
            }))
            .build()
            .unwrap();
        let mut ledger = InMemoryLedger::new();

        let stats = engine.run_with_ledger(&mut ledger, &null_sender()).unwrap();

        assert_eq!(stats.copied_count, 1);
        assert_eq!(stats.hash_collision_count, 1);
        assert_eq!(ledger.len(), 1);
        assert!(!dirs.dest_file("b.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_entry_below_root_is_reported_not_fatal() {
        let dirs = Dirs::new();
        dirs.add("album/a.jpg", b"a");
        dirs.add("b.jpg", b"b");
        std::os::unix::fs::symlink(
            dirs.source.path().join("gone.jpg"),
            dirs.source.path().join("album").join("broken.jpg"),
        )
        .unwrap();
        let config = CopyConfig {
            batch_size: 10,
            scan: ScanConfig {
                follow_symlinks: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = CopyEngine::builder()
            .source(dirs.source.path())
            .destination(dirs.destination.path())
            .config(config)
            .build()
            .unwrap();
        let mut ledger = InMemoryLedger::new();

        let stats = engine.run_with_ledger(&mut ledger, &null_sender()).unwrap();

        assert_eq!(stats.scan_errors.len(), 1);
        assert!(stats.scan_errors[0].contains("broken.jpg"));
        assert_eq!(stats.copied_count, 2);
        assert!(dirs.dest_file("a.jpg").exists());
        assert!(dirs.dest_file("b.jpg").exists());
    }
}
