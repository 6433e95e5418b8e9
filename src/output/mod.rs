//! Output sinks.
//!
//! The core never writes files; finished tables are handed to a [`ReportSink`]. Every table is
//! checked for a rectangular shape before anything is written, so a malformed report fails as a
//! whole with [`RankingError::ReportShape`].

pub mod csv;
#[cfg(feature = "xlsx_writer")]
pub mod xlsx;

use std::path::PathBuf;

use crate::error::{RankingError, RankingResult};
use crate::processing::crosstab::ReportTable;
use crate::types::{EventTable, Value};

pub use self::csv::CsvSink;
#[cfg(feature = "xlsx_writer")]
pub use self::xlsx::XlsxSink;

/// Persists finished report tables.
pub trait ReportSink: Send + Sync {
    /// Write `tables` as one output named `name` (no extension). Returns what was written.
    fn write(&self, name: &str, tables: &[ReportTable]) -> RankingResult<Vec<PathBuf>>;
}

/// Check that every row of every table is as wide as its column list.
///
/// Tables without columns (header-less data) are not checked.
pub fn validate_shape(tables: &[ReportTable]) -> RankingResult<()> {
    for table in tables {
        if table.columns.is_empty() {
            continue;
        }
        let expected = table.columns.len();
        if let Some((row, cells)) = table
            .rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != expected)
        {
            return Err(RankingError::ReportShape {
                sheet: table.name.clone(),
                row,
                expected,
                actual: cells.len(),
            });
        }
    }
    Ok(())
}

/// A merged event table as a report table; rows and header are padded to the table width.
pub fn event_table_report(table: &EventTable) -> ReportTable {
    let width = table.column_count();
    let columns = match &table.header {
        Some(header) => {
            let mut cols = header.clone();
            cols.resize(width, String::new());
            cols
        }
        None => Vec::new(),
    };
    let rows = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = r.cells.clone();
            cells.resize(width, Value::Null);
            cells
        })
        .collect();
    ReportTable {
        name: table.name.clone(),
        columns,
        rows,
    }
}

/// Replace characters that are not safe in file or sheet names.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '[' | ']' => '_',
            c => c,
        })
        .collect()
}
