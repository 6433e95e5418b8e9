//! Format-independent reading of result files.
//!
//! [`ingest_workbook`] turns a CSV file or a workbook into a [`crate::types::ResultWorkbook`],
//! picking the reader from the extension unless [`IngestionOptions::format`] forces one. Every
//! attempt is reported to the configured [`super::observability::IngestionObserver`].

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::{RankingError, RankingResult};
use crate::types::{EventTable, ResultWorkbook};

use super::csv;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// One event per comma-separated file.
    Csv,
    /// Spreadsheet/workbook formats, one event per sheet (feature-gated behind `excel`).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }
}

/// Whether the first non-empty row of each table is a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// First non-empty row holds column titles (default).
    #[default]
    FirstRow,
    /// Every row is data; consumers decide what to skip.
    None,
}

/// How to choose sheet(s) when reading a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// Read every sheet in workbook order (default).
    #[default]
    All,
    /// Read only the listed sheets, in order.
    Sheets(Vec<String>),
}

/// Read settings. The default reads every sheet with a header row and reports nowhere.
#[derive(Clone, Default)]
pub struct IngestionOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<SourceFormat>,
    pub header: HeaderMode,
    /// Ignored for CSV input.
    pub sheets: SheetSelection,
    /// Receives the outcome of the read.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity at which `on_alert` is invoked; `None` means never.
    pub alert_at_or_above: Option<IngestionSeverity>,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("header", &self.header)
            .field("sheets", &self.sheets)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Read a results file into a [`ResultWorkbook`].
///
/// A successful read reports its event and row counts through `on_success`. A failed read is
/// classified (I/O problems anywhere in the error chain are `Critical`, everything else
/// `Error`) and reported through `on_failure`, then through `on_alert` as well if the severity
/// reaches `options.alert_at_or_above`.
///
/// ```no_run
/// use swim_rankings::ingestion::{ingest_workbook, IngestionOptions};
///
/// # fn main() -> Result<(), swim_rankings::RankingError> {
/// let book = ingest_workbook("data/CAN-MB_2025_SCM_Men_11-12.xlsx", &IngestionOptions::default())?;
/// for event in &book.events {
///     println!("{}: {} results", event.name, event.row_count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn ingest_workbook(path: impl AsRef<Path>, options: &IngestionOptions) -> RankingResult<ResultWorkbook> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format(path)?,
    };

    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
    };

    let result = match format {
        SourceFormat::Csv => csv::read_table(path, options.header),
        SourceFormat::Excel => read_excel_dispatch(path, options),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(book) => obs.on_success(
                &ctx,
                IngestionStats {
                    events: book.events.len(),
                    rows: book.events.iter().map(|e| e.row_count()).sum(),
                },
            ),
            Err(e) => report_failure(obs.as_ref(), &ctx, options, e),
        }
    }

    result
}

/// Read a results file sheet by sheet, so one undecodable sheet does not sink the others.
///
/// Failing to open the file is still an error for the whole call and is reported to the
/// observer like [`ingest_workbook`]. On success the observer sees the sheets that could be read.
pub fn ingest_sheets(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> RankingResult<Vec<(String, RankingResult<EventTable>)>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format(path)?,
    };

    let result = match format {
        SourceFormat::Csv => csv::read_table(path, options.header)
            .map(|book| book.events.into_iter().map(|t| (t.name.clone(), Ok(t))).collect()),
        SourceFormat::Excel => read_excel_sheets_dispatch(path, options),
    };

    if let Some(obs) = options.observer.as_ref() {
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format,
        };
        match &result {
            Ok(sheets) => {
                let read: Vec<&EventTable> = sheets.iter().filter_map(|(_, t)| t.as_ref().ok()).collect();
                obs.on_success(
                    &ctx,
                    IngestionStats {
                        events: read.len(),
                        rows: read.iter().map(|t| t.row_count()).sum(),
                    },
                );
            }
            Err(e) => report_failure(obs.as_ref(), &ctx, options, e),
        }
    }

    result
}

fn report_failure(obs: &dyn IngestionObserver, ctx: &IngestionContext, options: &IngestionOptions, e: &RankingError) {
    let sev = severity_for_error(e);
    obs.on_failure(ctx, sev, e);
    if options.alert_at_or_above.is_some_and(|min| sev >= min) {
        obs.on_alert(ctx, sev, e);
    }
}

/// Severity of a read failure: I/O problems are critical, decoding problems are errors.
pub fn severity_for_error(e: &RankingError) -> IngestionSeverity {
    match e {
        RankingError::Io(_) => IngestionSeverity::Critical,
        RankingError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        RankingError::Excel(err) => {
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        _ => IngestionSeverity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format(path: &Path) -> RankingResult<SourceFormat> {
    SourceFormat::from_path(path).ok_or_else(|| RankingError::SchemaMismatch {
        message: format!("cannot infer source format for path ({})", path.display()),
    })
}

fn read_excel_dispatch(path: &Path, options: &IngestionOptions) -> RankingResult<ResultWorkbook> {
    #[cfg(feature = "excel")]
    {
        use super::excel;

        match &options.sheets {
            SheetSelection::All => excel::read_workbook(path, options.header, None),
            SheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                excel::read_workbook(path, options.header, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (path, options);
        Err(RankingError::SchemaMismatch {
            message: "excel reading not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

fn read_excel_sheets_dispatch(
    path: &Path,
    options: &IngestionOptions,
) -> RankingResult<Vec<(String, RankingResult<EventTable>)>> {
    #[cfg(feature = "excel")]
    {
        use super::excel;

        match &options.sheets {
            SheetSelection::All => excel::read_sheets(path, options.header, None),
            SheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                excel::read_sheets(path, options.header, Some(refs.as_slice()))
            }
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (path, options);
        Err(RankingError::SchemaMismatch {
            message: "excel reading not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

/// Results files directly inside `dir`, sorted by file name.
///
/// Only files with a recognized extension are returned; spreadsheet lock files (`~$...`) are
/// skipped. If `pattern` is given, the file name must also match that glob.
pub fn list_workbooks(dir: impl AsRef<Path>, pattern: Option<&str>) -> RankingResult<Vec<PathBuf>> {
    let pattern = pattern.map(glob::Pattern::new).transpose()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => RankingError::Io(io),
            None => RankingError::SchemaMismatch {
                message: "directory walk failed".to_string(),
            },
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('~') || SourceFormat::from_path(entry.path()).is_none() {
            continue;
        }
        if pattern.as_ref().is_some_and(|p| !p.matches(&name)) {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
