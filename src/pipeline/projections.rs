//! Projection reports across age groups.

use std::path::{Path, PathBuf};

use crate::config::RankingConfig;
use crate::error::RankingResult;
use crate::ingestion::{ingest_workbook, HeaderMode, SourceName};
use crate::processing::crosstab::ordinal;
use crate::processing::{aggregate_by_gender, CrossTab, GroupResult, ProjectionSkip, ReportTable, TimeProjector};
use crate::types::{EventTable, Gender, GroupKey};

use super::{file_label, Pipeline, RunSummary};

/// Gender-partitioned cross-tabs built from every group's projections.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionReport {
    /// Men first; a gender with no input file is absent.
    pub crosstabs: Vec<(Gender, CrossTab)>,
    pub target_rank: i64,
}

impl ProjectionReport {
    /// `groups` are the groups of every recognized input, in input order. Each keeps its column
    /// cluster in the summary even if none of its events could be projected.
    pub fn build(groups: Vec<GroupKey>, results: Vec<GroupResult>, config: &RankingConfig) -> Self {
        Self {
            crosstabs: aggregate_by_gender(groups, results, &config.projection_offsets, config.target_rank),
            target_rank: config.target_rank,
        }
    }

    /// `true` when no event was projected for any group.
    pub fn is_empty(&self) -> bool {
        self.crosstabs.iter().all(|(_, tab)| tab.rows.is_empty())
    }

    /// Output name of the full report, e.g. `swim_rankings_50th_place_summary`.
    pub fn summary_name(&self) -> String {
        format!("swim_rankings_{}_place_summary", ordinal(self.target_rank))
    }

    /// One sheet per gender (`Men`, `Women`).
    pub fn summary_tables(&self) -> Vec<ReportTable> {
        self.crosstabs
            .iter()
            .map(|(gender, tab)| tab.to_table(gender.label()))
            .collect()
    }

    /// One sheet per age group, men's groups first.
    pub fn simplified_tables(&self) -> Vec<ReportTable> {
        self.crosstabs.iter().flat_map(|(_, tab)| tab.simplified()).collect()
    }
}

/// Project every event of one group's tables.
///
/// Events whose name contains an excluded token are ignored silently. Events that cannot be
/// projected are returned with the reason.
pub fn project_events(
    projector: &TimeProjector,
    config: &RankingConfig,
    group: &GroupKey,
    events: &[EventTable],
) -> (Vec<GroupResult>, Vec<(String, ProjectionSkip)>) {
    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for table in events.iter().filter(|t| !config.is_skipped_event(&t.name)) {
        match projector.project_event(table) {
            Ok(projection) => results.push(GroupResult::new(group.clone(), projection)),
            Err(reason) => skipped.push((table.name.clone(), reason)),
        }
    }
    (results, skipped)
}

impl Pipeline {
    /// Build the projection reports for every recognizable export in `input_dir`.
    ///
    /// Writes the full report (sheets `Men` and `Women`) and `swim_rankings_simplified` (one
    /// sheet per age group). Nothing is written when no event could be projected.
    pub fn projections(&self, input_dir: impl AsRef<Path>) -> RankingResult<RunSummary> {
        let files = self.inputs(input_dir.as_ref(), true)?;
        let mut summary = RunSummary::default();

        let mut sources: Vec<(SourceName, PathBuf)> = Vec::new();
        for path in files {
            match SourceName::require(&path) {
                Ok(name) => sources.push((name, path)),
                Err(e) => {
                    let label = file_label(&path);
                    self.engine().notice(format!("skipping {label}: {e}"));
                    summary.skipped.push((label, e.to_string()));
                }
            }
        }

        let groups: Vec<GroupKey> = sources.iter().map(|(name, _)| name.group_key()).collect();
        let projector = TimeProjector::new(self.config());
        let reports = self.engine().run_items(
            "projections",
            &sources,
            |(_, path)| file_label(path),
            |(name, path)| self.project_file(&projector, name, path),
        );

        let mut results = Vec::new();
        for report in reports {
            match report.outcome {
                Ok(r) => results.extend(r),
                Err(e) => summary.failed.push((report.label, e.to_string())),
            }
        }

        let report = ProjectionReport::build(groups, results, self.config());
        if report.is_empty() {
            self.engine().notice("no event could be projected; nothing written");
            return Ok(summary);
        }

        for (name, tables) in [
            (report.summary_name(), report.summary_tables()),
            ("swim_rankings_simplified".to_string(), report.simplified_tables()),
        ] {
            match self.sink().write(&name, &tables) {
                Ok(paths) => summary.written.extend(paths),
                Err(e) => summary.failed.push((name, e.to_string())),
            }
        }
        Ok(summary)
    }

    fn project_file(&self, projector: &TimeProjector, name: &SourceName, path: &Path) -> RankingResult<Vec<GroupResult>> {
        let book = ingest_workbook(path, &self.ingestion_options(HeaderMode::FirstRow))?;
        let group = name.group_key();
        let (results, skipped) = project_events(projector, self.config(), &group, &book.events);
        for (event, reason) in skipped {
            self.engine()
                .notice(format!("{} / {event}: not projected ({reason})", file_label(path)));
        }
        Ok(results)
    }
}
