//! `swim-rankings` turns per-event swim ranking exports into merged rankings, percentile cut
//! times and projected target times.
//!
//! A ranking export is a workbook with one sheet per event (`50m Freestyle`, `200m IM`, ...).
//! Each sheet is read into a [`types::EventTable`] of untyped [`types::Value`] cells; the time
//! and rank cells are located by position through [`types::ColumnRoles`].
//!
//! ## What you can do
//!
//! - **Merge** the same event from several sources into one table sorted by time
//!   ([`processing::merge`])
//! - **Percentiles**: the time the fastest 10/12/15/17/20% of the field achieved, and how many
//!   swimmers are at or under it ([`processing::percentile`])
//! - **Projections**: take the time at a target rank (50th by default), add configured
//!   percentage offsets and find the actual rank closest to each projected time
//!   ([`processing::projection`])
//! - **Cross-tabs**: one row per event and one column cluster per age group
//!   ([`processing::crosstab`])
//!
//! Times are read from text like `"27.43"` or `"1:02.33"` by [`processing::time_codec`]; a cell
//! that is not a time is skipped, never an error.
//!
//! ## Quick example
//!
//! ```rust
//! use swim_rankings::config::RankingConfig;
//! use swim_rankings::processing::PercentileEngine;
//! use swim_rankings::types::{ColumnRoles, EventTable, ResultRow, Value};
//!
//! let config = RankingConfig {
//!     columns: ColumnRoles { time: 0, rank: 1 },
//!     ..Default::default()
//! };
//! let table = EventTable::new(
//!     "50m Freestyle",
//!     vec!["Time".into(), "Rank".into()],
//!     ["27.43", "27.90", "28.10", "DQ"]
//!         .iter()
//!         .map(|t| ResultRow::new(vec![Value::from(*t), Value::Null]))
//!         .collect(),
//! );
//!
//! let summary = PercentileEngine::new(&config).summarize(&table);
//! assert_eq!(summary.total_results, 3);
//! assert_eq!(summary.status.to_string(), "Success");
//! ```
//!
//! ## Batch jobs
//!
//! [`pipeline::Pipeline`] runs the same operations over a directory of exports in parallel
//! ([`execution`]), reading with [`ingestion`] and writing through an [`output::ReportSink`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use swim_rankings::config::RankingConfig;
//! use swim_rankings::execution::{ExecutionEngine, ExecutionOptions};
//! use swim_rankings::output::CsvSink;
//! use swim_rankings::pipeline::Pipeline;
//!
//! # fn main() -> Result<(), swim_rankings::RankingError> {
//! let engine = ExecutionEngine::new(ExecutionOptions::default())?;
//! let pipeline = Pipeline::new(RankingConfig::default(), engine, Arc::new(CsvSink::new("reports")))?;
//! let summary = pipeline.percentiles("data")?;
//! println!("{} reports written", summary.written.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: tables, rows, cells and grouping keys
//! - [`config`]: run settings with JSON overrides
//! - [`processing`]: the numeric core (pure, no I/O)
//! - [`ingestion`]: reading exports (CSV, and Excel behind the `excel` feature)
//! - [`output`]: report sinks (CSV, and `.xlsx` behind the `xlsx_writer` feature)
//! - [`execution`]: parallel batch runner with observer hooks
//! - [`pipeline`]: combine / percentiles / projections jobs
//! - [`error`]: the crate error type

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{RankingError, RankingResult};
