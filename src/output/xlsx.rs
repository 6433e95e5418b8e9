#![cfg(feature = "xlsx_writer")]

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::{RankingError, RankingResult};
use crate::processing::crosstab::ReportTable;
use crate::types::Value;

use super::{sanitize_name, validate_shape, ReportSink};

/// Excel's limit on worksheet name length.
const MAX_SHEET_NAME: usize = 31;

/// Writes all tables of one report into `<dir>/<name>.xlsx`, one worksheet per table.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    dir: PathBuf,
}

impl XlsxSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for XlsxSink {
    fn write(&self, name: &str, tables: &[ReportTable]) -> RankingResult<Vec<PathBuf>> {
        validate_shape(tables)?;
        if tables.is_empty() {
            return Err(RankingError::SchemaMismatch {
                message: format!("report '{name}' has no tables to write"),
            });
        }
        fs::create_dir_all(&self.dir)?;

        let header_format = Format::new().set_bold();
        let mut workbook = Workbook::new();
        for table in tables {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name(&table.name))?;
            write_table(sheet, table, &header_format)?;
            sheet.autofit();
        }

        let path = self.dir.join(format!("{}.xlsx", sanitize_name(name)));
        workbook.save(&path)?;
        Ok(vec![path])
    }
}

/// Sanitized and truncated to Excel's 31-character limit.
pub fn sheet_name(name: &str) -> String {
    sanitize_name(name).chars().take(MAX_SHEET_NAME).collect()
}

fn write_table(sheet: &mut Worksheet, table: &ReportTable, header_format: &Format) -> RankingResult<()> {
    let mut row_idx: u32 = 0;
    if !table.columns.is_empty() {
        for (c, title) in table.columns.iter().enumerate() {
            sheet.write_string_with_format(0, column(table, c)?, title, header_format)?;
        }
        row_idx = 1;
    }

    for cells in &table.rows {
        for (c, value) in cells.iter().enumerate() {
            let col = column(table, c)?;
            match value {
                Value::Null => {}
                Value::Int64(i) => {
                    sheet.write_number(row_idx, col, *i as f64)?;
                }
                Value::Float64(f) => {
                    sheet.write_number(row_idx, col, *f)?;
                }
                Value::Bool(b) => {
                    sheet.write_boolean(row_idx, col, *b)?;
                }
                Value::Utf8(s) => {
                    sheet.write_string(row_idx, col, s)?;
                }
            }
        }
        row_idx += 1;
    }
    Ok(())
}

fn column(table: &ReportTable, c: usize) -> RankingResult<u16> {
    u16::try_from(c).map_err(|_| RankingError::SchemaMismatch {
        message: format!("report '{}' is too wide for a worksheet ({} columns)", table.name, c + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_fit_excel_limits() {
        let long = "SCM_Women_Open_and_Senior_Masters_Band";
        assert_eq!(sheet_name(long).chars().count(), 31);
        assert_eq!(sheet_name("400m Free/Lap"), "400m Free_Lap");
    }
}
