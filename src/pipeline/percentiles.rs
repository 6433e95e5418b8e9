//! Percentile summary per results file.

use std::path::{Path, PathBuf};

use crate::config::PercentileLevel;
use crate::error::RankingResult;
use crate::ingestion::{ingest_sheets, HeaderMode};
use crate::processing::{EventPercentiles, PercentileEngine, PercentileStatus, ReportTable};
use crate::types::Value;

use super::{file_label, Pipeline, RunSummary};

/// Name of the single sheet of a percentile report.
pub const SUMMARY_SHEET: &str = "Percentile Summary";

/// `Event Name`, `Total Results`, then per level its label and `Rank at <first word>`, then
/// `Status`.
pub fn summary_columns(levels: &[PercentileLevel]) -> Vec<String> {
    let mut cols = vec!["Event Name".to_string(), "Total Results".to_string()];
    for level in levels {
        cols.push(level.label.clone());
        cols.push(format!("Rank at {}", level.short_label()));
    }
    cols.push("Status".to_string());
    cols
}

fn summary_row(summary: &EventPercentiles, levels: &[PercentileLevel]) -> Vec<Value> {
    let mut row = vec![
        Value::from(summary.event.as_str()),
        Value::Int64(summary.total_results as i64),
    ];
    match summary.status {
        PercentileStatus::Success => {
            for (_, result) in &summary.levels {
                row.push(result.rounded_threshold().into());
                row.push(Value::Int64(result.count as i64));
            }
        }
        _ => row.extend(std::iter::repeat_n(Value::Null, 2 * levels.len())),
    }
    row.push(Value::from(summary.status.to_string()));
    row
}

/// The report table for one file's event summaries.
pub fn summary_table(summaries: &[EventPercentiles], levels: &[PercentileLevel]) -> ReportTable {
    ReportTable {
        name: SUMMARY_SHEET.to_string(),
        columns: summary_columns(levels),
        rows: summaries.iter().map(|s| summary_row(s, levels)).collect(),
    }
}

impl Pipeline {
    /// Write `<stem>_percentiles` for every results file in `input_dir`.
    ///
    /// Files are read without a header row, so the configured header skip applies. A sheet that
    /// cannot be decoded becomes an `Error: ...` row; a file that cannot be opened is a failed
    /// item and produces no report.
    pub fn percentiles(&self, input_dir: impl AsRef<Path>) -> RankingResult<RunSummary> {
        let files = self.inputs(input_dir.as_ref(), false)?;
        let engine = PercentileEngine::new(self.config());

        let reports = self.engine().run_items(
            "percentiles",
            &files,
            |p| file_label(p),
            |p| self.percentiles_for_file(&engine, p),
        );

        let mut summary = RunSummary::default();
        summary.absorb(reports);
        Ok(summary)
    }

    fn percentiles_for_file(&self, engine: &PercentileEngine, path: &Path) -> RankingResult<Vec<PathBuf>> {
        let sheets = ingest_sheets(path, &self.ingestion_options(HeaderMode::None))?;
        let summaries: Vec<EventPercentiles> = sheets
            .into_iter()
            .map(|(sheet, table)| match table {
                Ok(table) => engine.summarize(&table),
                Err(e) => EventPercentiles::failed(sheet, e.to_string()),
            })
            .collect();

        let ok = summaries
            .iter()
            .filter(|s| s.status == PercentileStatus::Success)
            .count();
        if ok < summaries.len() {
            self.engine().notice(format!(
                "{}: {} of {} events summarized",
                file_label(path),
                ok,
                summaries.len()
            ));
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = summary_table(&summaries, engine.levels());
        self.sink().write(&format!("{stem}_percentiles"), &[table])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::output::validate_shape;
    use crate::types::{ColumnRoles, EventTable, ResultRow};

    fn config() -> RankingConfig {
        RankingConfig {
            columns: ColumnRoles { time: 0, rank: 1 },
            percentile_levels: vec![PercentileLevel::new("90th Percentile (Top 10%)", 0.10)],
            ..Default::default()
        }
    }

    #[test]
    fn columns_pair_each_level_with_its_rank() {
        assert_eq!(
            summary_columns(&config().percentile_levels),
            vec![
                "Event Name",
                "Total Results",
                "90th Percentile (Top 10%)",
                "Rank at 90th",
                "Status"
            ]
        );
    }

    #[test]
    fn every_status_fills_the_full_row() {
        let cfg = config();
        let engine = PercentileEngine::new(&cfg);
        let good = EventTable::headerless(
            "50m Freestyle",
            ["Time", "27.00", "28.00", "29.00"]
                .iter()
                .map(|t| ResultRow::new(vec![Value::from(*t)]))
                .collect(),
        );
        let empty = EventTable::headerless("400m IM", vec![ResultRow::new(vec![Value::from("Time")])]);

        let summaries = vec![
            engine.summarize(&good),
            engine.summarize(&empty),
            EventPercentiles::failed("800m Freestyle", "bad sheet"),
        ];
        let table = summary_table(&summaries, engine.levels());
        validate_shape(std::slice::from_ref(&table)).unwrap();

        assert_eq!(table.rows[0][1], Value::Int64(3));
        assert_eq!(table.rows[0][2], Value::Float64(27.2));
        assert_eq!(table.rows[0][3], Value::Int64(1));
        assert_eq!(table.rows[0][4], Value::from("Success"));
        assert_eq!(table.rows[1][4], Value::from("No numeric data found"));
        assert_eq!(table.rows[2][2], Value::Null);
        assert_eq!(table.rows[2][4], Value::from("Error: bad sheet"));
    }
}
