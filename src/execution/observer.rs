use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ingestion::LogFile;

/// Execution events emitted by the engine and the pipelines.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { stage: String, items: usize },
    ItemStarted { index: usize, label: String },
    ItemFinished { index: usize, label: String },
    ItemFailed { index: usize, label: String, error: String },
    /// A degraded path was taken (skipped group, unparsed file name, skipped projection, ...).
    Notice { message: String },
    RunFinished {
        stage: String,
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Logs execution events to stderr.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("{}", render(event));
    }
}

/// Appends execution events to a local log file.
#[derive(Debug)]
pub struct FileExecutionObserver {
    log: LogFile,
}

impl FileExecutionObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            log: LogFile::new(path),
        }
    }
}

impl ExecutionObserver for FileExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        self.log.append(&render(event));
    }
}

/// Forwards every event to each inner observer.
#[derive(Default)]
pub struct FanOutExecutionObserver {
    observers: Vec<Arc<dyn ExecutionObserver>>,
}

impl FanOutExecutionObserver {
    pub fn new(observers: Vec<Arc<dyn ExecutionObserver>>) -> Self {
        Self { observers }
    }
}

impl ExecutionObserver for FanOutExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

fn render(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted { stage, items } => format!("[{stage}] start items={items}"),
        ExecutionEvent::ItemStarted { index, label } => format!("[item {index}] start {label}"),
        ExecutionEvent::ItemFinished { index, label } => format!("[item {index}] ok {label}"),
        ExecutionEvent::ItemFailed { index, label, error } => {
            format!("[item {index}] FAILED {label}: {error}")
        }
        ExecutionEvent::Notice { message } => format!("[notice] {message}"),
        ExecutionEvent::RunFinished { stage, elapsed, metrics } => {
            format!("[{stage}] done in {elapsed:?} ({metrics})")
        }
    }
}

/// Real-time counters for an execution run.
///
/// The engine updates these during a run; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    items_started: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
    // Not reset per run: pipelines report skipped inputs before their run starts.
    notices: AtomicU64,

    active_items: AtomicUsize,
    max_active_items: AtomicUsize,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            items_started: AtomicU64::new(0),
            items_succeeded: AtomicU64::new(0),
            items_failed: AtomicU64::new(0),
            notices: AtomicU64::new(0),
            active_items: AtomicUsize::new(0),
            max_active_items: AtomicUsize::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.items_started.store(0, Ordering::SeqCst);
        self.items_succeeded.store(0, Ordering::SeqCst);
        self.items_failed.store(0, Ordering::SeqCst);
        self.active_items.store(0, Ordering::SeqCst);
        self.max_active_items.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_item_start(&self) {
        let _ = self.items_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_items.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.max_active_items.fetch_max(now, Ordering::SeqCst);
    }

    pub fn on_item_end(&self, ok: bool) {
        let counter = if ok { &self.items_succeeded } else { &self.items_failed };
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        let _ = self.active_items.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn on_notice(&self) {
        let _ = self.notices.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            items_started: self.items_started.load(Ordering::SeqCst),
            items_succeeded: self.items_succeeded.load(Ordering::SeqCst),
            items_failed: self.items_failed.load(Ordering::SeqCst),
            notices: self.notices.load(Ordering::SeqCst),
            max_active_items: self.max_active_items.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub items_started: u64,
    pub items_succeeded: u64,
    pub items_failed: u64,
    /// Notices since the engine was created.
    pub notices: u64,
    pub max_active_items: usize,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, items={}/{} ok, failed={}, notices={}, max_active_items={}, elapsed={:?}",
            self.run_id,
            self.items_succeeded,
            self.items_started,
            self.items_failed,
            self.notices,
            self.max_active_items,
            self.elapsed
        )
    }
}
