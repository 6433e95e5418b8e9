//! Reporting of ranking-export reads.
//!
//! Every read of a regional export (a workbook with one sheet per event, or a single-event CSV)
//! ends in exactly one callback: `on_success` with the number of events and result rows found,
//! or `on_failure` with a severity. A pipeline run over a directory of exports therefore leaves
//! one line per file in the log, which is how a missing or corrupt region file is spotted before
//! the merged rankings are trusted.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::RankingError;

use super::unified::SourceFormat;

/// How bad a failed read is. Ordered, so an alert threshold is a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    Warning,
    /// The file was reachable but its content could not be used.
    Error,
    /// The file itself could not be opened or read.
    Critical,
}

/// Which export was being read.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The export file, e.g. `CAN-MB_2025_SCM_Men_11-12.xlsx`.
    pub path: PathBuf,
    /// Workbook or CSV, as inferred from the extension or forced by the caller.
    pub format: SourceFormat,
}

/// Size of a successfully read export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Event tables read: one per sheet, or one for a CSV file.
    pub events: usize,
    /// Rows across all events. A row taken as the header is not counted.
    pub rows: usize,
}

/// Receives the outcome of every workbook read.
pub trait IngestionObserver: Send + Sync {
    /// Called when an export was read. Per-sheet reads report only the sheets that succeeded.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when an export could not be read.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &RankingError) {}

    /// Called, after `on_failure`, when the severity reaches the configured threshold.
    /// Unless overridden this is treated as one more failure.
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards each outcome to several observers, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// One `[read]` line per export on stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[read][ok] format={:?} path={} events={} rows={}",
            ctx.format,
            ctx.path.display(),
            stats.events,
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        eprintln!(
            "[read][{severity:?}] format={:?} path={} err={error}",
            ctx.format,
            ctx.path.display(),
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        eprintln!(
            "[ALERT][read][{severity:?}] format={:?} path={} err={error}",
            ctx.format,
            ctx.path.display(),
        );
    }
}

/// Appends one line per export to a log file, next to the run's progress lines when the same
/// path is given to [`crate::execution::FileExecutionObserver`].
#[derive(Debug)]
pub struct FileObserver {
    log: LogFile,
}

impl FileObserver {
    /// The file is created on first write. Errors writing it are dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            log: LogFile::new(path),
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.log.append(&format!(
            "read ok format={:?} path={} events={} rows={}",
            ctx.format,
            ctx.path.display(),
            stats.events,
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        self.log.append(&format!(
            "read fail severity={severity:?} format={:?} path={} err={error}",
            ctx.format,
            ctx.path.display(),
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RankingError) {
        self.log.append(&format!(
            "read ALERT severity={severity:?} format={:?} path={} err={error}",
            ctx.format,
            ctx.path.display(),
        ));
    }
}

/// Append-only log with a unix timestamp on each line. Both file observers write through it, so
/// read outcomes and pipeline progress interleave in one file.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LogFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Append `line` prefixed with a unix timestamp.
    pub fn append(&self, line: &str) {
        let _serialized = self.lock.lock().ok();
        let file = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = file {
            let _ = writeln!(file, "{} {line}", unix_ts());
        }
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
