//! Core data model for ranking tables.
//!
//! A results workbook is read into an ordered list of [`EventTable`]s (one per sheet/event). Rows
//! are untyped [`Value`] cells; the two cells the pipeline cares about (time and rank) are located
//! by position through [`ColumnRoles`] and converted to numbers in exactly one place,
//! [`crate::processing::time_codec::time_from_cell`].

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::processing::time_codec;

/// A single untyped cell as supplied by a table source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string (kept exactly as read, untrimmed).
    Utf8(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`] and for strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell: integers and floats as-is, numeric text parsed.
    ///
    /// This is used for rank matching, not for times (see [`time_codec::time_from_cell`]).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(i) => Some(*i as f64),
            Value::Float64(f) if f.is_finite() => Some(*f),
            Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float64(x)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Fixed column positions (0-based) of the privileged fields in a result row.
///
/// The defaults match the national rankings export: time in column J, rank in column M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    /// Position of the swim time.
    pub time: usize,
    /// Position of the overall rank.
    pub rank: usize,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self { time: 9, rank: 12 }
    }
}

/// One competitor's result within an event table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Cells in column order.
    pub cells: Vec<Value>,
}

impl ResultRow {
    /// Create a row from cells.
    pub fn new(cells: Vec<Value>) -> Self {
        Self { cells }
    }

    /// Cell at `idx`, if the row is that wide.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.cells.get(idx)
    }

    /// Canonical time of the time cell, `None` if absent or unparseable.
    pub fn time_seconds(&self, roles: &ColumnRoles) -> Option<f64> {
        self.get(roles.time).and_then(time_codec::time_from_cell)
    }

    /// The rank cell, if present and non-blank.
    pub fn rank(&self, roles: &ColumnRoles) -> Option<&Value> {
        self.get(roles.rank).filter(|v| !v.is_blank())
    }
}

impl From<Vec<Value>> for ResultRow {
    fn from(cells: Vec<Value>) -> Self {
        Self::new(cells)
    }
}

/// An ordered list of results for one event (one sheet of a results workbook).
#[derive(Debug, Clone, PartialEq)]
pub struct EventTable {
    /// Event identity (the sheet name, e.g. `50m Freestyle`).
    pub name: String,
    /// Column titles when the source had a header row; `None` for raw, header-less reads.
    pub header: Option<Vec<String>>,
    /// Rows in table order.
    pub rows: Vec<ResultRow>,
}

impl EventTable {
    /// Create a table with a header row.
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<ResultRow>) -> Self {
        Self {
            name: name.into(),
            header: Some(header),
            rows,
        }
    }

    /// Create a table read without a header row.
    pub fn headerless(name: impl Into<String>, rows: Vec<ResultRow>) -> Self {
        Self {
            name: name.into(),
            header: None,
            rows,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the table: the header width or the widest row, whichever is larger.
    pub fn column_count(&self) -> usize {
        let widest = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        self.header.as_ref().map_or(0, Vec::len).max(widest)
    }

    /// Canonical times of every row, in table order.
    pub fn times(&self, roles: &ColumnRoles) -> impl Iterator<Item = Option<f64>> + '_ {
        let roles = *roles;
        self.rows.iter().map(move |r| r.time_seconds(&roles))
    }
}

/// All event tables read from one source file, in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultWorkbook {
    /// Where the workbook was read from.
    pub path: PathBuf,
    /// Event tables in sheet order.
    pub events: Vec<EventTable>,
}

impl ResultWorkbook {
    /// Create a workbook from already-read tables.
    pub fn new(path: impl Into<PathBuf>, events: Vec<EventTable>) -> Self {
        Self {
            path: path.into(),
            events,
        }
    }

    /// Look up an event table by name.
    pub fn event(&self, name: &str) -> Option<&EventTable> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Event names in sheet order.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.name.as_str())
    }
}

/// Gender partition of a ranking file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    /// Parse the label used in ranking file names.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Men" => Some(Gender::Men),
            "Women" => Some(Gender::Women),
            _ => None,
        }
    }

    /// Label used in file names and report sheet names.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one course/gender/age partition; keys the cross-tab columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Pool course, e.g. `SCM` or `LCM`.
    pub course: String,
    pub gender: Gender,
    /// Age-band label, e.g. `12` for the 11-12 band.
    pub age_band: String,
}

impl GroupKey {
    pub fn new(course: impl Into<String>, gender: Gender, age_band: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            gender,
            age_band: age_band.into(),
        }
    }

    /// Column-cluster label, e.g. `SCM_Men_12`.
    pub fn label(&self) -> String {
        format!("{}_{}_{}", self.course, self.gender, self.age_band)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_uses_widest_of_header_and_rows() {
        let t = EventTable::new(
            "50m Freestyle",
            vec!["a".into(), "b".into()],
            vec![ResultRow::new(vec![Value::Null; 4])],
        );
        assert_eq!(t.column_count(), 4);
        assert_eq!(EventTable::headerless("x", vec![]).column_count(), 0);
    }

    #[test]
    fn rank_ignores_blank_cells() {
        let roles = ColumnRoles { time: 0, rank: 1 };
        let row = ResultRow::new(vec![Value::from("27.43"), Value::from("  ")]);
        assert_eq!(row.rank(&roles), None);
        assert_eq!(row.time_seconds(&roles), Some(27.43));
    }

    #[test]
    fn value_numeric_view() {
        assert_eq!(Value::Int64(50).as_f64(), Some(50.0));
        assert_eq!(Value::from(" 50 ").as_f64(), Some(50.0));
        assert_eq!(Value::from("DQ").as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn group_key_label() {
        let k = GroupKey::new("SCM", Gender::Women, "14");
        assert_eq!(k.label(), "SCM_Women_14");
    }
}
