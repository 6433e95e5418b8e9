//! Projected target times and nearest-rank lookup.
//!
//! A reference time is taken from the competitor at the configured target rank (50th by
//! default). Each configured offset produces a slower target time, and the projector reports
//! the rank of the actual result closest to that target.

use crate::config::RankingConfig;
use crate::processing::time_codec;
use crate::types::{ColumnRoles, EventTable, Value};

/// One projected target time and the rank nearest to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    /// Percent slower than the reference.
    pub offset: f64,
    /// Projected time in seconds.
    pub seconds: f64,
    /// Projected time formatted for reports.
    pub time: String,
    /// Rank cell of the row whose time is closest to `seconds`; `None` if no row has a time.
    pub rank: Option<Value>,
}

/// The reference row of an event plus every configured projection.
#[derive(Debug, Clone, PartialEq)]
pub struct EventProjection {
    pub event: String,
    /// The reference time cell as it appeared in the table.
    pub reference_text: String,
    pub reference_seconds: f64,
    /// One entry per configured offset, in configuration order.
    pub projections: Vec<ProjectionResult>,
}

/// Why an event produced no projection. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionSkip {
    /// The table is too narrow to contain both the time and the rank column.
    NarrowTable { columns: usize, required: usize },
    /// No row carries the target rank.
    NoReferenceRow { target_rank: i64 },
    /// The reference row's time cell is not a usable time.
    UnparseableReference { raw: String },
}

impl std::fmt::Display for ProjectionSkip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionSkip::NarrowTable { columns, required } => {
                write!(f, "table has {columns} columns, projection needs {required}")
            }
            ProjectionSkip::NoReferenceRow { target_rank } => {
                write!(f, "no row with rank {target_rank}")
            }
            ProjectionSkip::UnparseableReference { raw } => {
                write!(f, "reference time '{raw}' is not a time")
            }
        }
    }
}

/// `reference * (1 + offset / 100)`.
pub fn projected_seconds(reference: f64, offset: f64) -> f64 {
    reference * (1.0 + offset / 100.0)
}

/// Index of the row whose time is closest to `target`.
///
/// Rows without a usable time are ignored. On an exact tie the earlier row wins, which for a
/// merged table is the faster one.
pub fn nearest_row(table: &EventTable, roles: &ColumnRoles, target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, time) in table.times(roles).enumerate() {
        let Some(time) = time else { continue };
        let distance = (time - target).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Project `reference` by `offset` percent and look up the nearest actual rank in `table`.
///
/// ```rust
/// use swim_rankings::processing::projection::project;
/// use swim_rankings::types::{ColumnRoles, EventTable, ResultRow, Value};
///
/// let roles = ColumnRoles { time: 0, rank: 1 };
/// let rows = [("30.00", 1), ("33.10", 2), ("34.00", 3)]
///     .iter()
///     .map(|(t, r)| ResultRow::new(vec![Value::from(*t), Value::Int64(*r)]))
///     .collect();
/// let table = EventTable::headerless("50m Butterfly", rows);
///
/// let p = project(30.0, &table, &roles, 10.0);
/// assert_eq!(p.time, "33.00");
/// assert_eq!(p.rank, Some(Value::Int64(2)));
/// ```
pub fn project(reference: f64, table: &EventTable, roles: &ColumnRoles, offset: f64) -> ProjectionResult {
    let seconds = projected_seconds(reference, offset);
    let rank = nearest_row(table, roles, seconds)
        .and_then(|idx| table.rows[idx].get(roles.rank))
        .cloned();
    ProjectionResult {
        offset,
        seconds,
        time: time_codec::format_time(seconds),
        rank,
    }
}

/// Projects every configured offset for an event.
#[derive(Debug, Clone)]
pub struct TimeProjector {
    roles: ColumnRoles,
    offsets: Vec<f64>,
    target_rank: i64,
}

impl TimeProjector {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            roles: config.columns,
            offsets: config.projection_offsets.clone(),
            target_rank: config.target_rank,
        }
    }

    /// Index of the first row whose rank cell equals the target rank.
    ///
    /// Integer, float and numeric-text cells all match by value (`50`, `50.0`, `"50"`).
    pub fn reference_row(&self, table: &EventTable) -> Option<usize> {
        let target = self.target_rank as f64;
        table.rows.iter().position(|row| {
            row.rank(&self.roles)
                .and_then(Value::as_f64)
                .is_some_and(|r| r == target)
        })
    }

    /// Reference time plus all projections for one event.
    pub fn project_event(&self, table: &EventTable) -> Result<EventProjection, ProjectionSkip> {
        let required = self.roles.time.max(self.roles.rank) + 1;
        let columns = table.column_count();
        if columns < required {
            return Err(ProjectionSkip::NarrowTable { columns, required });
        }

        let idx = self.reference_row(table).ok_or(ProjectionSkip::NoReferenceRow {
            target_rank: self.target_rank,
        })?;
        let cell = table.rows[idx].get(self.roles.time).cloned().unwrap_or(Value::Null);
        let reference_seconds = time_codec::time_from_cell(&cell).ok_or_else(|| {
            ProjectionSkip::UnparseableReference {
                raw: cell.to_string(),
            }
        })?;

        let projections = self
            .offsets
            .iter()
            .map(|&offset| project(reference_seconds, table, &self.roles, offset))
            .collect();

        Ok(EventProjection {
            event: table.name.clone(),
            reference_text: cell.to_string(),
            reference_seconds,
            projections,
        })
    }
}
