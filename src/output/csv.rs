//! CSV sink: one file per table.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RankingResult;
use crate::processing::crosstab::ReportTable;

use super::{sanitize_name, validate_shape, ReportSink};

/// Writes each table to `<dir>/<name>__<table>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for CsvSink {
    fn write(&self, name: &str, tables: &[ReportTable]) -> RankingResult<Vec<PathBuf>> {
        validate_shape(tables)?;
        fs::create_dir_all(&self.dir)?;

        let mut written = Vec::with_capacity(tables.len());
        for table in tables {
            let path = self
                .dir
                .join(format!("{}__{}.csv", sanitize_name(name), sanitize_name(&table.name)));
            let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
            if !table.columns.is_empty() {
                wtr.write_record(&table.columns)?;
            }
            for row in &table.rows {
                wtr.write_record(row.iter().map(|v| v.to_string()))?;
            }
            wtr.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}
