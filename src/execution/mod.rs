//! Execution engine for batch jobs over many files.
//!
//! Pipelines hand a list of files (or groups of files) to [`ExecutionEngine::run_items`]. Each
//! item runs on a dedicated rayon pool; a failing item is recorded in its [`ItemReport`] and the
//! others keep going. Reports come back in input order whatever order the work finished in.
//! Progress is published as [`ExecutionEvent`]s and counted in [`ExecutionMetrics`].

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{RankingError, RankingResult};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, FanOutExecutionObserver,
    FileExecutionObserver, StdErrExecutionObserver,
};

/// Engine settings.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Worker threads; `None` means one per available core.
    pub num_threads: Option<usize>,
}

/// Outcome of one item of a batch.
#[derive(Debug)]
pub struct ItemReport<T> {
    /// Position of the item in the input.
    pub index: usize,
    pub label: String,
    pub outcome: RankingResult<T>,
}

impl<T> ItemReport<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs independent items in parallel and reports each outcome.
pub struct ExecutionEngine {
    pool: ThreadPool,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Build the worker pool. Fails with [`RankingError::InvalidConfig`] for `num_threads == Some(0)` or when the
    /// pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> RankingResult<Self> {
        if opts.num_threads == Some(0) {
            return Err(RankingError::InvalidConfig {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| RankingError::InvalidConfig {
                message: format!("failed to build thread pool: {e}"),
            })?;

        Ok(Self {
            pool,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Publish run and item events to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Live counters, updated while a run is in progress.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run `work` on every item in parallel.
    ///
    /// `label` names an item in events and reports. The returned reports are in input order;
    /// an `Err` outcome only affects its own item.
    pub fn run_items<I, T, L, F>(&self, stage: &str, items: &[I], label: L, work: F) -> Vec<ItemReport<T>>
    where
        I: Sync,
        T: Send,
        L: Fn(&I) -> String + Sync,
        F: Fn(&I) -> RankingResult<T> + Sync,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            stage: stage.to_string(),
            items: items.len(),
        });

        let reports: Vec<ItemReport<T>> = self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| self.run_one(index, label(item), || work(item)))
                .collect()
        });

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(ExecutionEvent::RunFinished {
            stage: stage.to_string(),
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        reports
    }

    fn run_one<T>(&self, index: usize, label: String, work: impl FnOnce() -> RankingResult<T>) -> ItemReport<T> {
        self.metrics.on_item_start();
        self.emit(ExecutionEvent::ItemStarted {
            index,
            label: label.clone(),
        });

        let outcome = work();

        match &outcome {
            Ok(_) => self.emit(ExecutionEvent::ItemFinished {
                index,
                label: label.clone(),
            }),
            Err(e) => self.emit(ExecutionEvent::ItemFailed {
                index,
                label: label.clone(),
                error: e.to_string(),
            }),
        }
        self.metrics.on_item_end(outcome.is_ok());
        ItemReport { index, label, outcome }
    }

    /// Report a degraded path taken while processing.
    pub fn notice(&self, message: impl Into<String>) {
        self.metrics.on_notice();
        self.emit(ExecutionEvent::Notice {
            message: message.into(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
