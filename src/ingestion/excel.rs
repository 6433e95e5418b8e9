#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{RankingError, RankingResult};
use crate::types::{EventTable, ResultRow, ResultWorkbook, Value};

use super::HeaderMode;

/// Read a results workbook (`.xlsx`, `.xls`, `.ods`, etc.), one [`EventTable`] per sheet.
///
/// Behavior:
/// - If `sheet_names` is `None`, reads **all sheets** in workbook order; otherwise only those
///   sheets, in the given order
/// - Cells keep their spreadsheet column: a used range starting at column C still puts that
///   cell at index 2
/// - With [`HeaderMode::FirstRow`] the first non-empty row becomes the header
/// - Fully empty rows are dropped
pub fn read_workbook(
    path: impl AsRef<Path>,
    header: HeaderMode,
    sheet_names: Option<&[&str]>,
) -> RankingResult<ResultWorkbook> {
    let path = path.as_ref();
    let events = read_sheets(path, header, sheet_names)?
        .into_iter()
        .map(|(_, table)| table)
        .collect::<RankingResult<Vec<_>>>()?;
    Ok(ResultWorkbook::new(path, events))
}

/// Like [`read_workbook`], but a sheet that cannot be decoded fails on its own.
///
/// Opening the file is still all-or-nothing. Each entry pairs the sheet name with its table or
/// with the error that sheet produced.
pub fn read_sheets(
    path: impl AsRef<Path>,
    header: HeaderMode,
    sheet_names: Option<&[&str]>,
) -> RankingResult<Vec<(String, RankingResult<EventTable>)>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names().to_vec(),
    };
    if sheets.is_empty() {
        return Err(RankingError::SchemaMismatch {
            message: format!("workbook {} has no sheets", path.display()),
        });
    }

    Ok(sheets
        .into_iter()
        .map(|sheet| {
            let table = workbook
                .worksheet_range(&sheet)
                .map(|range| read_sheet_range(&sheet, &range, header))
                .map_err(RankingError::from);
            (sheet, table)
        })
        .collect())
}

fn read_sheet_range(sheet: &str, range: &calamine::Range<Data>, header: HeaderMode) -> EventTable {
    let col_offset = range.start().map_or(0, |(_, col)| col as usize);

    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            let mut cells = vec![Value::Null; col_offset];
            cells.extend(row.iter().map(convert_cell));
            ResultRow::new(cells)
        });

    match header {
        HeaderMode::FirstRow => {
            let header_cells = rows
                .next()
                .map(|r| r.cells.iter().map(Value::to_string).map(|h| h.trim().to_string()).collect())
                .unwrap_or_default();
            EventTable::new(sheet, header_cells, rows.collect())
        }
        HeaderMode::None => EventTable::headerless(sheet, rows.collect()),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(d) => Value::Utf8(d.to_string()),
        Data::DateTimeIso(s) => Value::Utf8(s.clone()),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(_) => Value::Null,
    }
}
