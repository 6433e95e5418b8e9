//! The numeric core: time parsing, merging, percentiles, projections and cross-tabs.
//!
//! Everything here is a pure function of in-memory tables and a [`crate::config::RankingConfig`];
//! no module performs I/O.
//!
//! - [`time_codec`]: text ⇄ seconds
//! - [`merge`]: combine same-event tables and sort by time
//! - [`percentile`]: percentile cut times and counts
//! - [`projection`]: projected target times and the nearest actual rank
//! - [`crosstab`]: event × group report assembly
//!
//! ## Example: merge then project
//!
//! ```rust
//! use swim_rankings::config::RankingConfig;
//! use swim_rankings::processing::{merge_event, TimeProjector};
//! use swim_rankings::types::{ColumnRoles, EventTable, ResultRow, Value};
//!
//! let config = RankingConfig {
//!     columns: ColumnRoles { time: 0, rank: 1 },
//!     target_rank: 2,
//!     ..Default::default()
//! };
//! let region_a = EventTable::headerless("50m Freestyle", vec![
//!     ResultRow::new(vec![Value::from("27.43"), Value::Int64(1)]),
//!     ResultRow::new(vec![Value::from("30.40"), Value::Int64(3)]),
//! ]);
//! let region_b = EventTable::headerless("50m Freestyle", vec![
//!     ResultRow::new(vec![Value::from("27.90"), Value::Int64(2)]),
//! ]);
//!
//! let merged = merge_event("50m Freestyle", &[&region_a, &region_b], &config.columns);
//! let projection = TimeProjector::new(&config).project_event(&merged).unwrap();
//! assert_eq!(projection.reference_text, "27.90");
//! assert_eq!(projection.projections[0].time, "30.69");
//! assert_eq!(projection.projections[0].rank, Some(Value::Int64(3)));
//! ```

pub mod crosstab;
pub mod merge;
pub mod percentile;
pub mod projection;
pub mod time_codec;

pub use crosstab::{aggregate, aggregate_by_gender, CrossTab, GroupResult, ReportRow, ReportTable};
pub use merge::{merge_event, merge_workbooks};
pub use percentile::{EventPercentiles, PercentileEngine, PercentileResult, PercentileStatus};
pub use projection::{project, EventProjection, ProjectionResult, ProjectionSkip, TimeProjector};
pub use time_codec::{format_time, parse_time, time_from_cell};
