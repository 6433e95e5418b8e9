//! Batch jobs over a directory of ranking exports.
//!
//! A [`Pipeline`] ties together reading ([`crate::ingestion`]), the numeric core
//! ([`crate::processing`]), parallel execution ([`crate::execution`]) and a [`ReportSink`]:
//!
//! - [`Pipeline::combine`]: merge the same age-group partition exported by several regions
//! - [`Pipeline::percentiles`]: one percentile summary per input file
//! - [`Pipeline::projections`]: event × age-group projection reports, split by gender
//!
//! Every job returns a [`RunSummary`]. Per-file failures are collected there; a job only returns
//! `Err` when the input directory itself cannot be listed.

pub mod combine;
pub mod percentiles;
pub mod projections;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::RankingConfig;
use crate::error::RankingResult;
use crate::execution::{ExecutionEngine, ItemReport};
use crate::ingestion::{list_workbooks, HeaderMode, IngestionObserver, IngestionOptions, SourceFormat};
use crate::output::ReportSink;

pub use combine::{plan_groups, CombineGroup, CombinePlan};
pub use percentiles::{summary_columns, summary_table, SUMMARY_SHEET};
pub use projections::ProjectionReport;

/// What a batch job produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written by the sink, in input order.
    pub written: Vec<PathBuf>,
    /// Items that failed, with the error message.
    pub failed: Vec<(String, String)>,
    /// Inputs that were skipped, with the reason.
    pub skipped: Vec<(String, String)>,
}

impl RunSummary {
    /// Fold engine reports into the summary.
    fn absorb(&mut self, reports: Vec<ItemReport<Vec<PathBuf>>>) {
        for report in reports {
            match report.outcome {
                Ok(paths) => self.written.extend(paths),
                Err(e) => self.failed.push((report.label, e.to_string())),
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared state of the batch jobs.
pub struct Pipeline {
    config: RankingConfig,
    engine: ExecutionEngine,
    sink: Arc<dyn ReportSink>,
    ingest_observer: Option<Arc<dyn IngestionObserver>>,
    file_pattern: Option<String>,
}

impl Pipeline {
    /// Fails with [`crate::RankingError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: RankingConfig, engine: ExecutionEngine, sink: Arc<dyn ReportSink>) -> RankingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine,
            sink,
            ingest_observer: None,
            file_pattern: None,
        })
    }

    /// Report every file read to `observer`.
    pub fn with_ingestion_observer(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.ingest_observer = Some(observer);
        self
    }

    /// Only consider input files whose name matches this glob (e.g. `CAN-*_2025_*`).
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn engine(&self) -> &ExecutionEngine {
        &self.engine
    }

    fn sink(&self) -> &dyn ReportSink {
        self.sink.as_ref()
    }

    fn ingestion_options(&self, header: HeaderMode) -> IngestionOptions {
        IngestionOptions {
            header,
            observer: self.ingest_observer.clone(),
            ..Default::default()
        }
    }

    /// Input files of `dir`, optionally restricted to spreadsheets.
    fn inputs(&self, dir: &Path, spreadsheets_only: bool) -> RankingResult<Vec<PathBuf>> {
        let files = list_workbooks(dir, self.file_pattern.as_deref())?;
        Ok(files
            .into_iter()
            .filter(|p| !spreadsheets_only || SourceFormat::from_path(p) == Some(SourceFormat::Excel))
            .collect())
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
