use thiserror::Error;

/// Convenience result type used across the crate.
pub type RankingResult<T> = Result<T, RankingError>;

/// Error type for the fatal outcomes of reading, configuring and writing.
///
/// Unparseable cells, narrow tables, events without numeric data and missing reference rows are
/// *not* errors; they degrade locally (see [`crate::processing`]).
#[derive(Debug, Error)]
pub enum RankingError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "xlsx_writer")]
    /// Workbook writing error (feature-gated behind `xlsx_writer`).
    #[error("xlsx write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A file-name filter pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The input does not have the shape a reader expects (no sheets, unsupported format, ...).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Configuration values are out of range or inconsistent.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// A report row does not match its column schema.
    #[error("report '{sheet}' row {row} has {actual} cells, expected {expected}")]
    ReportShape {
        sheet: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A file name does not follow the ranking export naming convention.
    #[error("unrecognized file name '{name}'")]
    UnrecognizedFileName { name: String },
}
