//! Table sources.
//!
//! Most callers should use [`ingest_workbook`] (from [`unified`]) which:
//!
//! - infers the format from the file extension (or you can override via [`IngestionOptions`])
//! - reads every event table of the file into a [`crate::types::ResultWorkbook`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)
//!
//! [`names`] parses grouping metadata out of ranking export file names.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod names;
pub mod observability;
pub mod unified;

pub use names::SourceName;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LogFile, StdErrObserver,
};
pub use unified::{
    ingest_sheets, ingest_workbook, list_workbooks, HeaderMode, IngestionOptions, SheetSelection, SourceFormat,
};
