//! Merging same-event tables from several sources into one ranking.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::types::{ColumnRoles, EventTable, ResultRow, ResultWorkbook};

/// Merge tables for one event into a single table sorted by time.
///
/// - Rows are concatenated in source order, then row order within each source.
/// - If the merged table is too narrow to hold the time column, it is returned unsorted.
/// - Otherwise rows are stable-sorted fastest first; rows without a usable time go last and keep
///   their relative order.
/// - Duplicates are kept.
///
/// The header is taken from the first source that has one. Cells are not modified.
///
/// ```rust
/// use swim_rankings::processing::merge::merge_event;
/// use swim_rankings::types::{ColumnRoles, EventTable, ResultRow, Value};
///
/// let roles = ColumnRoles { time: 0, rank: 1 };
/// let a = EventTable::headerless("50m Freestyle", vec![
///     ResultRow::new(vec![Value::from("28.10"), Value::Null]),
/// ]);
/// let b = EventTable::headerless("50m Freestyle", vec![
///     ResultRow::new(vec![Value::from("27.90"), Value::Null]),
/// ]);
/// let merged = merge_event("50m Freestyle", &[&a, &b], &roles);
/// assert_eq!(merged.rows[0].cells[0], Value::from("27.90"));
/// ```
pub fn merge_event(event: &str, sources: &[&EventTable], roles: &ColumnRoles) -> EventTable {
    let header = sources.iter().find_map(|t| t.header.clone());
    let rows: Vec<ResultRow> = sources
        .iter()
        .flat_map(|t| t.rows.iter().cloned())
        .collect();

    let mut merged = EventTable {
        name: event.to_string(),
        header,
        rows,
    };

    if merged.column_count() > roles.time {
        sort_by_time(&mut merged.rows, roles);
    }
    merged
}

/// Stable ascending sort by canonical time with missing times last.
pub fn sort_by_time(rows: &mut Vec<ResultRow>, roles: &ColumnRoles) {
    let mut keyed: Vec<(Option<f64>, ResultRow)> = rows
        .drain(..)
        .map(|r| (r.time_seconds(roles), r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_times(*a, *b));
    rows.extend(keyed.into_iter().map(|(_, r)| r));
}

/// Ordering of canonical times: defined times ascending, then `None`.
pub fn compare_times(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge every event found in `books`.
///
/// Events are returned in ascending name order; each one is merged from the books that contain
/// it, in book order.
pub fn merge_workbooks(books: &[ResultWorkbook], roles: &ColumnRoles) -> Vec<EventTable> {
    let names: BTreeSet<&str> = books.iter().flat_map(ResultWorkbook::event_names).collect();

    names
        .into_iter()
        .map(|name| {
            let sources: Vec<&EventTable> = books.iter().filter_map(|b| b.event(name)).collect();
            merge_event(name, &sources, roles)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    const ROLES: ColumnRoles = ColumnRoles { time: 9, rank: 12 };

    fn row(name: &str, time: &str) -> ResultRow {
        let mut cells = vec![Value::Null; 13];
        cells[0] = Value::from(name);
        cells[9] = Value::from(time);
        ResultRow::new(cells)
    }

    fn names(t: &EventTable) -> Vec<String> {
        t.rows.iter().map(|r| r.cells[0].to_string()).collect()
    }

    fn table(rows: Vec<ResultRow>) -> EventTable {
        EventTable::new("50m Freestyle", (0..13).map(|i| format!("c{i}")).collect(), rows)
    }

    #[test]
    fn sorts_ascending_with_missing_times_last() {
        let a = table(vec![row("a", "DQ"), row("b", "1:02.33"), row("c", "58.10")]);
        let b = table(vec![row("d", ""), row("e", "59.00")]);
        let merged = merge_event("50m Freestyle", &[&a, &b], &ROLES);
        assert_eq!(names(&merged), vec!["c", "e", "b", "a", "d"]);
    }

    #[test]
    fn equal_times_keep_source_then_row_order() {
        let a = table(vec![row("a1", "30.00"), row("a2", "30.00")]);
        let b = table(vec![row("b1", "30.00"), row("b2", "29.00")]);
        let merged = merge_event("50m Freestyle", &[&a, &b], &ROLES);
        assert_eq!(names(&merged), vec!["b2", "a1", "a2", "b1"]);
    }

    #[test]
    fn keeps_duplicates() {
        let a = table(vec![row("same", "30.00")]);
        let merged = merge_event("50m Freestyle", &[&a, &a], &ROLES);
        assert_eq!(merged.row_count(), 2);
    }

    #[test]
    fn narrow_tables_are_concatenated_unsorted() {
        let narrow = |n: &str, t: &str| ResultRow::new(vec![Value::from(n), Value::from(t)]);
        let a = EventTable::new("x", vec!["name".into(), "time".into()], vec![narrow("a", "40.0")]);
        let b = EventTable::new("x", vec!["name".into(), "time".into()], vec![narrow("b", "30.0")]);
        let merged = merge_event("x", &[&a, &b], &ROLES);
        assert_eq!(names(&merged), vec!["a", "b"]);
        assert_eq!(merged.header.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn merges_workbooks_by_event_name() {
        let mut free = table(vec![row("a", "27.43")]);
        let mut back = table(vec![row("b", "31.00")]);
        back.name = "50m Backstroke".into();
        let book1 = ResultWorkbook::new("one.xlsx", vec![free.clone(), back]);
        free.rows = vec![row("c", "27.00")];
        let book2 = ResultWorkbook::new("two.xlsx", vec![free]);

        let merged = merge_workbooks(&[book1, book2], &ROLES);
        let events: Vec<&str> = merged.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(events, vec!["50m Backstroke", "50m Freestyle"]);
        assert_eq!(names(&merged[1]), vec!["c", "a"]);
        assert_eq!(names(&merged[0]), vec!["b"]);
    }
}
