//! Percentile cut times over a ranking column.
//!
//! For swimming, lower is better, so the "90th percentile" cut is the time that the fastest 10%
//! of the field achieved: [`crate::config::PercentileLevel::fraction`] is `0.10` and the
//! threshold is the 10th percentile of the sorted times.

use std::fmt;

use crate::config::{PercentileLevel, RankingConfig};
use crate::types::{ColumnRoles, EventTable};

/// Outcome of one percentile cut.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileResult {
    /// Fraction the cut was computed for.
    pub fraction: f64,
    /// Threshold time in seconds, full precision. `None` if there was no numeric data.
    pub threshold: Option<f64>,
    /// How many valid times are at or below the threshold.
    pub count: usize,
    /// `Success`, or `NoNumericData` when the table had no usable time.
    pub status: PercentileStatus,
}

impl PercentileResult {
    /// `true` when the cut could not be computed for lack of usable times.
    pub fn is_empty(&self) -> bool {
        self.status == PercentileStatus::NoNumericData
    }

    /// Threshold rounded to hundredths, for reports only.
    pub fn rounded_threshold(&self) -> Option<f64> {
        self.threshold.map(round_hundredths)
    }
}

/// Per-event status of a percentile summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PercentileStatus {
    Success,
    /// No row had a usable time.
    NoNumericData,
    /// The event could not be processed; carries the reason.
    Failed(String),
}

impl fmt::Display for PercentileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentileStatus::Success => f.write_str("Success"),
            PercentileStatus::NoNumericData => f.write_str("No numeric data found"),
            PercentileStatus::Failed(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// Every configured cut for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPercentiles {
    pub event: String,
    /// Number of rows with a usable time.
    pub total_results: usize,
    /// One entry per configured level, in configuration order. Empty unless `Success`.
    pub levels: Vec<(PercentileLevel, PercentileResult)>,
    pub status: PercentileStatus,
}

impl EventPercentiles {
    /// A summary for an event that failed before any cut could be computed.
    pub fn failed(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            total_results: 0,
            levels: Vec::new(),
            status: PercentileStatus::Failed(reason.into()),
        }
    }
}

/// Computes percentile cuts with a fixed configuration.
#[derive(Debug, Clone)]
pub struct PercentileEngine {
    roles: ColumnRoles,
    levels: Vec<PercentileLevel>,
    header_skip_rows: usize,
}

impl PercentileEngine {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            roles: config.columns,
            levels: config.percentile_levels.clone(),
            header_skip_rows: config.header_skip_rows,
        }
    }

    /// Configured levels, in report order.
    pub fn levels(&self) -> &[PercentileLevel] {
        &self.levels
    }

    /// Usable times of `table` in table order.
    ///
    /// Tables read without a header row have their first `header_skip_rows` rows skipped.
    pub fn valid_times(&self, table: &EventTable) -> Vec<f64> {
        let skip = if table.header.is_none() {
            self.header_skip_rows
        } else {
            0
        };
        table
            .rows
            .iter()
            .skip(skip)
            .filter_map(|r| r.time_seconds(&self.roles))
            .collect()
    }

    /// The cut for `fraction` (fastest share of the field) over `table`.
    pub fn compute_threshold(&self, table: &EventTable, fraction: f64) -> PercentileResult {
        let mut times = self.valid_times(table);
        times.sort_by(f64::total_cmp);
        threshold_of_sorted(&times, fraction)
    }

    /// Every configured cut for one event.
    pub fn summarize(&self, table: &EventTable) -> EventPercentiles {
        let mut times = self.valid_times(table);
        if times.is_empty() {
            return EventPercentiles {
                event: table.name.clone(),
                total_results: 0,
                levels: Vec::new(),
                status: PercentileStatus::NoNumericData,
            };
        }
        times.sort_by(f64::total_cmp);

        let levels = self
            .levels
            .iter()
            .map(|level| (level.clone(), threshold_of_sorted(&times, level.fraction)))
            .collect();

        EventPercentiles {
            event: table.name.clone(),
            total_results: times.len(),
            levels,
            status: PercentileStatus::Success,
        }
    }
}

fn threshold_of_sorted(sorted: &[f64], fraction: f64) -> PercentileResult {
    match percentile_linear(sorted, fraction * 100.0) {
        Some(threshold) => PercentileResult {
            fraction,
            threshold: Some(threshold),
            count: count_at_or_below(sorted, threshold),
            status: PercentileStatus::Success,
        },
        None => PercentileResult {
            fraction,
            threshold: None,
            count: 0,
            status: PercentileStatus::NoNumericData,
        },
    }
}

/// Linear-interpolation percentile of already sorted values (`p` in 0..=100).
///
/// The position is `p/100 * (n - 1)`; the result interpolates between the two neighbouring
/// order statistics. Returns `None` for an empty slice.
pub fn percentile_linear(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        1 => Some(sorted[0]),
        _ => {
            let pos = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (pos.ceil() as usize).min(n - 1);
            if lo == hi {
                Some(sorted[lo])
            } else {
                let w = pos - lo as f64;
                Some(sorted[lo] + (sorted[hi] - sorted[lo]) * w)
            }
        }
    }
}

/// Number of values in `sorted` that are `<= threshold`.
pub fn count_at_or_below(sorted: &[f64], threshold: f64) -> usize {
    sorted.partition_point(|v| *v <= threshold)
}

/// Round to two decimal places.
pub fn round_hundredths(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
