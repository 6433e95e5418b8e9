//! CSV table source.
//!
//! A CSV file holds a single event; the event name is the file stem. Fields are read as text
//! (or `Null` when empty) and converted to times only at the time-codec boundary.

use std::io::Read;
use std::path::Path;

use crate::error::RankingResult;
use crate::types::{EventTable, ResultRow, ResultWorkbook, Value};

use super::HeaderMode;

/// Read one CSV file as a single-event workbook.
pub fn read_table(path: impl AsRef<Path>, header: HeaderMode) -> RankingResult<ResultWorkbook> {
    let path = path.as_ref();
    let event = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let table = read_table_from_reader(&mut rdr, &event, header)?;
    Ok(ResultWorkbook::new(path, vec![table]))
}

/// Read an event table from an existing CSV reader.
///
/// The reader should be built with `has_headers(false)`; the header row, if any, is taken
/// according to `header`. Ragged rows are accepted when the reader is `flexible`.
pub fn read_table_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    event: &str,
    header: HeaderMode,
) -> RankingResult<EventTable> {
    let mut rows: Vec<ResultRow> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(ResultRow::new(record.iter().map(field_value).collect()));
    }

    Ok(match header {
        HeaderMode::FirstRow if !rows.is_empty() => {
            let titles = rows
                .remove(0)
                .cells
                .iter()
                .map(|c| c.to_string().trim().to_string())
                .collect();
            EventTable::new(event, titles, rows)
        }
        HeaderMode::FirstRow => EventTable::new(event, Vec::new(), rows),
        HeaderMode::None => EventTable::headerless(event, rows),
    })
}

fn field_value(raw: &str) -> Value {
    if raw.trim().is_empty() {
        Value::Null
    } else {
        Value::Utf8(raw.to_owned())
    }
}
