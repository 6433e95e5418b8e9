//! Merge regional exports of the same partition into one ranking workbook.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::RankingResult;
use crate::ingestion::{ingest_workbook, HeaderMode, SourceName};
use crate::output::event_table_report;
use crate::processing::merge_workbooks;

use super::{file_label, Pipeline, RunSummary};

/// Files sharing one pairing key, ordered by region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineGroup {
    /// Partition key without the region, e.g. `2025_SCM_Men_11-12`.
    pub key: String,
    pub files: Vec<(SourceName, PathBuf)>,
}

impl CombineGroup {
    /// Output name: the joined regions plus the key, e.g. `CAN-MBSK_2025_SCM_Men_11-12`.
    pub fn output_name(&self) -> String {
        let regions: String = self
            .files
            .iter()
            .filter_map(|(name, _)| name.region.as_deref())
            .collect();
        if regions.is_empty() {
            format!("CAN_{}", self.key)
        } else {
            format!("CAN-{regions}_{}", self.key)
        }
    }
}

/// How a directory of exports splits into combine work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinePlan {
    /// Groups with at least two files, by key.
    pub groups: Vec<CombineGroup>,
    /// Groups with a single file.
    pub lonely: Vec<CombineGroup>,
    /// Files whose name does not follow the export convention.
    pub unrecognized: Vec<PathBuf>,
}

/// Group `files` by pairing key.
pub fn plan_groups(files: &[PathBuf]) -> CombinePlan {
    let mut by_key: BTreeMap<String, Vec<(SourceName, PathBuf)>> = BTreeMap::new();
    let mut plan = CombinePlan::default();

    for path in files {
        match SourceName::parse(path) {
            Some(name) => by_key.entry(name.pairing_key()).or_default().push((name, path.clone())),
            None => plan.unrecognized.push(path.clone()),
        }
    }

    for (key, mut files) in by_key {
        files.sort_by(|(a, _), (b, _)| a.region.cmp(&b.region));
        let group = CombineGroup { key, files };
        if group.files.len() < 2 {
            plan.lonely.push(group);
        } else {
            plan.groups.push(group);
        }
    }
    plan
}

impl Pipeline {
    /// Merge every partition exported by more than one region in `input_dir`.
    ///
    /// Each group's workbooks are merged event by event (see [`merge_workbooks`]) and written
    /// through the sink under [`CombineGroup::output_name`].
    pub fn combine(&self, input_dir: impl AsRef<Path>) -> RankingResult<RunSummary> {
        let files = self.inputs(input_dir.as_ref(), true)?;
        let plan = plan_groups(&files);
        let mut summary = RunSummary::default();

        for path in &plan.unrecognized {
            let label = file_label(path);
            self.engine().notice(format!("could not parse file name {label}"));
            summary.skipped.push((label, "unrecognized file name".to_string()));
        }
        for group in &plan.lonely {
            self.engine()
                .notice(format!("skipping {}: found {} file(s), need 2", group.key, group.files.len()));
            summary
                .skipped
                .push((group.key.clone(), format!("{} file(s) for key", group.files.len())));
        }

        let reports = self.engine().run_items(
            "combine",
            &plan.groups,
            |g| g.key.clone(),
            |g| self.combine_group(g),
        );
        summary.absorb(reports);
        Ok(summary)
    }

    fn combine_group(&self, group: &CombineGroup) -> RankingResult<Vec<PathBuf>> {
        let options = self.ingestion_options(HeaderMode::FirstRow);
        let books = group
            .files
            .iter()
            .map(|(_, path)| ingest_workbook(path, &options))
            .collect::<RankingResult<Vec<_>>>()?;

        let tables: Vec<_> = merge_workbooks(&books, &self.config().columns)
            .iter()
            .map(event_table_report)
            .collect();
        self.sink().write(&group.output_name(), &tables)
    }
}
