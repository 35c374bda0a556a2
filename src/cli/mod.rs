//! # CLI Module
//!
//! Command-line interface for the media batch copier.
//!
//! ## Usage
//! ```bash
//! # Copy the next batch of new media
//! batch-copy copy --input-path /Volumes/SDCARD --output-path ~/Pictures/Inbox
//!
//! # Bigger batch, only JPEG and HEIC
//! batch-copy copy --input-path /Volumes/SDCARD --output-path ~/Pictures/Inbox \
//!     --batch-size 500 --extensions jpg,jpeg,heic
//!
//! # JSON report for scripting
//! batch-copy copy --input-path /Volumes/SDCARD --output-path ~/Pictures/Inbox --output json
//!
//! # What has been copied so far
//! batch-copy status --input-path /Volumes/SDCARD
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_batch_copier::core::engine::{CopyConfig, CopyEngine, RunStatistics, DEFAULT_BATCH_SIZE};
use media_batch_copier::core::ledger::{CsvLedger, LedgerRecord, DEFAULT_LEDGER_FILE_NAME};
use media_batch_copier::core::scanner::{ExclusionRule, ScanConfig};
use media_batch_copier::error::{BatchCopyError, Result};
use media_batch_copier::events::{CopyEvent, Event, EventChannel, RunEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Media Batch Copier - copy new photos and videos, a batch at a time
#[derive(Parser, Debug)]
#[command(name = "batch-copy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the next batch of new media into the destination
    Copy {
        /// Source directory tree (the ledger is kept here)
        #[arg(long = "input-path", alias = "input_path", value_name = "SOURCE")]
        source: PathBuf,

        /// Flat destination directory (must exist)
        #[arg(long = "output-path", alias = "output_path", value_name = "DESTINATION")]
        destination: PathBuf,

        /// Maximum number of files to copy in this run
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Media extensions to copy, comma separated (default: common image, raw and video types)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Option<Vec<String>>,

        /// Skip directories whose path contains this text (case-insensitive) [default: recycle]
        #[arg(long, conflicts_with_all = ["exclude_regex", "no_exclude"])]
        exclude: Option<String>,

        /// Skip directories whose path matches this regular expression (case-insensitive)
        #[arg(long, conflicts_with = "no_exclude")]
        exclude_regex: Option<String>,

        /// Do not skip any directories
        #[arg(long)]
        no_exclude: bool,

        /// Ledger file name inside the source directory
        #[arg(long, default_value = DEFAULT_LEDGER_FILE_NAME)]
        ledger_name: String,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show what the ledger has recorded so far
    Status {
        /// Source directory tree
        #[arg(long = "input-path", alias = "input_path", value_name = "SOURCE")]
        source: PathBuf,

        /// Ledger file name inside the source directory
        #[arg(long, default_value = DEFAULT_LEDGER_FILE_NAME)]
        ledger_name: String,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Copy {
            source,
            destination,
            batch_size,
            extensions,
            exclude,
            exclude_regex,
            no_exclude,
            ledger_name,
            output,
            verbose,
        } => {
            media_batch_copier::init_tracing(if verbose { "debug" } else { "warn" });

            let exclusion = if no_exclude {
                ExclusionRule::None
            } else if let Some(pattern) = exclude_regex {
                ExclusionRule::pattern(&pattern)?
            } else if let Some(needle) = exclude {
                ExclusionRule::substring(&needle)
            } else {
                ExclusionRule::default()
            };

            let config = CopyConfig {
                batch_size,
                ledger_file_name: ledger_name,
                scan: ScanConfig {
                    extensions,
                    exclusion,
                    ..Default::default()
                },
            };

            run_copy(source, destination, config, output, verbose)
        }
        Commands::Status {
            source,
            ledger_name,
            output,
        } => {
            media_batch_copier::init_tracing("warn");
            run_status(&source.join(ledger_name), output)
        }
    }
}

fn run_copy(
    source: PathBuf,
    destination: PathBuf,
    config: CopyConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Batch Copier").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let engine = CopyEngine::builder()
        .source(source)
        .destination(destination)
        .config(config)
        .build()?;

    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Render events on a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so the engine never notices a missing listener
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Run(RunEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Copy(CopyEvent::Started {
                    total_candidates,
                    batch_size,
                }) => {
                    pb.set_length(total_candidates.min(batch_size) as u64);
                }
                Event::Copy(CopyEvent::Progress(p)) => {
                    pb.set_position(p.copied as u64);
                }
                Event::Copy(CopyEvent::Copied { relative_path, .. }) if verbose => {
                    pb.set_message(relative_path);
                }
                Event::Run(RunEvent::Completed { .. }) | Event::Run(RunEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = engine.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stats = result?;

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &stats, &engine.ledger_path()),
        OutputFormat::Json => print_json(&stats)?,
    }

    Ok(())
}

fn print_pretty_results(term: &Term, stats: &RunStatistics, ledger_path: &Path) {
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} media files found",
        style(stats.total_candidates).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} name collisions",
        style(stats.name_collision_count()).yellow()
    ))
    .ok();
    term.write_line(&format!(
        "  {} hash collisions",
        style(stats.hash_collision_count).yellow()
    ))
    .ok();
    term.write_line(&format!(
        "  {} copied in {:.1}s",
        style(stats.copied_count).green(),
        stats.duration_ms as f64 / 1000.0
    ))
    .ok();

    if stats.has_remaining() {
        term.write_line(&format!(
            "  {} not yet examined, run again to continue",
            style(stats.remaining).cyan()
        ))
        .ok();
    }

    if !stats.scan_errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Unreadable entries:").bold().red()))
            .ok();
        for error in &stats.scan_errors {
            term.write_line(&format!("    {}", error)).ok();
        }
    }

    if !stats.name_collisions.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style("Name collisions:").bold().underlined()
        ))
        .ok();
        for path in &stats.name_collisions {
            term.write_line(&format!("    {} {}", style("○").dim(), path))
                .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Ledger: {}", ledger_path.display())).dim()
    ))
    .ok();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| BatchCopyError::Config(format!("failed to render JSON report: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn run_status(ledger_path: &Path, output: OutputFormat) -> Result<()> {
    let records = if ledger_path.exists() {
        CsvLedger::load(ledger_path)?
    } else {
        Vec::new()
    };

    let newest = records.iter().map(|r| r.copy_timestamp).max();

    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "ledger": ledger_path,
            "records": records.len(),
            "newest_copy": newest.map(|t| t.to_rfc3339()),
        })),
        OutputFormat::Pretty => {
            print_pretty_status(ledger_path, &records);
            Ok(())
        }
    }
}

fn print_pretty_status(ledger_path: &Path, records: &[LedgerRecord]) {
    let term = Term::stdout();

    term.write_line(&format!(
        "{} {}",
        style("Ledger").bold().cyan(),
        style(ledger_path.display()).dim()
    ))
    .ok();

    if records.is_empty() {
        term.write_line("  Nothing copied yet").ok();
        return;
    }

    term.write_line(&format!(
        "  {} files copied",
        style(records.len()).cyan()
    ))
    .ok();

    if let Some(last) = records.iter().max_by_key(|r| r.copy_timestamp) {
        term.write_line(&format!(
            "  last copy: {} ({})",
            style(last.timestamp_string()).green(),
            std::path::Path::new(&last.relative_root)
                .join(&last.media_name)
                .display()
        ))
        .ok();
    }
}
