//! Run configuration.
//!
//! Every engine takes its settings from one [`RankingConfig`] value. The defaults reproduce the
//! settings used for the national age-group rankings; any subset can be overridden from JSON:
//!
//! ```rust
//! use swim_rankings::config::RankingConfig;
//!
//! let cfg = RankingConfig::from_json_str(r#"{ "target_rank": 25, "projection_offsets": [5, 10] }"#)
//!     .unwrap();
//! assert_eq!(cfg.target_rank, 25);
//! assert_eq!(cfg.projection_offsets, vec![5.0, 10.0]);
//! assert_eq!(cfg.columns.time, 9);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RankingError, RankingResult};
use crate::types::ColumnRoles;

/// A named percentile cut.
///
/// `fraction` is the fastest share of the field the cut should capture, so the
/// "90th Percentile (Top 10%)" level has `fraction = 0.10`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileLevel {
    pub label: String,
    pub fraction: f64,
}

impl PercentileLevel {
    pub fn new(label: impl Into<String>, fraction: f64) -> Self {
        Self {
            label: label.into(),
            fraction,
        }
    }

    /// First word of the label (`"90th"`), used for the rank column title.
    pub fn short_label(&self) -> &str {
        self.label.split_whitespace().next().unwrap_or(&self.label)
    }
}

/// Settings shared by the percentile engine, the time projector and the pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Positions of the time and rank cells.
    pub columns: ColumnRoles,
    /// Percentile cuts, reported in this order.
    pub percentile_levels: Vec<PercentileLevel>,
    /// Percent slower than the reference time, reported in this order.
    pub projection_offsets: Vec<f64>,
    /// Rank whose time is the projection reference.
    pub target_rank: i64,
    /// Leading rows skipped by the percentile engine when a table was read without a header.
    pub header_skip_rows: usize,
    /// Events whose name contains any of these tokens are left out of projections.
    pub skip_events_containing: Vec<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            columns: ColumnRoles::default(),
            percentile_levels: vec![
                PercentileLevel::new("80th Percentile (Top 20%)", 0.20),
                PercentileLevel::new("83rd Percentile (Top 17%)", 0.17),
                PercentileLevel::new("85th Percentile (Top 15%)", 0.15),
                PercentileLevel::new("88th Percentile (Top 12%)", 0.12),
                PercentileLevel::new("90th Percentile (Top 10%)", 0.10),
            ],
            projection_offsets: vec![10.0, 11.0, 11.5, 12.0, 12.5],
            target_rank: 50,
            header_skip_rows: 1,
            skip_events_containing: vec!["Lap".to_string()],
        }
    }
}

impl RankingConfig {
    /// Parse and validate a JSON configuration. Missing keys keep their defaults.
    pub fn from_json_str(input: &str) -> RankingResult<Self> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_path(path: impl AsRef<Path>) -> RankingResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check value ranges and internal consistency.
    pub fn validate(&self) -> RankingResult<()> {
        if self.percentile_levels.is_empty() {
            return Err(invalid("at least one percentile level is required"));
        }
        for level in &self.percentile_levels {
            if !(level.fraction > 0.0 && level.fraction <= 1.0) {
                return Err(invalid(format!(
                    "percentile level '{}' has fraction {} outside (0, 1]",
                    level.label, level.fraction
                )));
            }
        }
        if let Some(bad) = self
            .projection_offsets
            .iter()
            .find(|o| !o.is_finite() || **o < 0.0)
        {
            return Err(invalid(format!("projection offset {bad} must be a finite percentage >= 0")));
        }
        if self.columns.time == self.columns.rank {
            return Err(invalid(format!(
                "time and rank columns must differ (both are {})",
                self.columns.time
            )));
        }
        Ok(())
    }

    /// Returns `true` if `event` should be left out of projections.
    pub fn is_skipped_event(&self, event: &str) -> bool {
        self.skip_events_containing
            .iter()
            .any(|token| !token.is_empty() && event.contains(token.as_str()))
    }
}

fn invalid(message: impl Into<String>) -> RankingError {
    RankingError::InvalidConfig {
        message: message.into(),
    }
}
