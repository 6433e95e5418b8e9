//! Wide event × group report of projections.
//!
//! Each input is the projection of one event for one [`GroupKey`] (one source file). The
//! aggregate has one row per event and one column cluster per group; every row has the same
//! columns, with blank clusters where a group has no data for that event.

use std::collections::HashMap;

use crate::processing::projection::EventProjection;
use crate::types::{Gender, GroupKey, Value};

/// Projection of one event for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResult {
    pub group: GroupKey,
    pub projection: EventProjection,
}

impl GroupResult {
    pub fn new(group: GroupKey, projection: EventProjection) -> Self {
        Self { group, projection }
    }
}

/// One event's row: one cluster per group, in [`CrossTab::groups`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub event: String,
    /// `None` where the group has no data for this event.
    pub clusters: Vec<Option<EventProjection>>,
}

/// Events × groups.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    /// Groups in first-seen order.
    pub groups: Vec<GroupKey>,
    /// Offsets shared by every cluster, in configuration order.
    pub offsets: Vec<f64>,
    /// Rank the reference time was taken from, used for the reference column title.
    pub target_rank: i64,
    /// Rows in first-seen event order.
    pub rows: Vec<ReportRow>,
}

/// A titled table with a rectangular body, ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Build the cross-tab for a stream of results.
///
/// `observed` lists the groups read from the inputs; each gets a column cluster even when it
/// produced no result. Groups first seen in `results` are appended after them. Events keep the
/// order in which they are first seen. A later result for the same (event, group) replaces an
/// earlier one.
pub fn aggregate<G, I>(observed: G, results: I, offsets: &[f64], target_rank: i64) -> CrossTab
where
    G: IntoIterator<Item = GroupKey>,
    I: IntoIterator<Item = GroupResult>,
{
    let mut groups: Vec<GroupKey> = Vec::new();
    for group in observed {
        position_or_push(&mut groups, group);
    }
    let mut events: Vec<String> = Vec::new();
    let mut cells: HashMap<(usize, usize), EventProjection> = HashMap::new();

    for GroupResult { group, projection } in results {
        let g = position_or_push(&mut groups, group);
        let e = position_or_push(&mut events, projection.event.clone());
        cells.insert((e, g), projection);
    }

    let rows = events
        .into_iter()
        .enumerate()
        .map(|(e, event)| ReportRow {
            event,
            clusters: (0..groups.len()).map(|g| cells.remove(&(e, g))).collect(),
        })
        .collect();

    CrossTab {
        groups,
        offsets: offsets.to_vec(),
        target_rank,
        rows,
    }
}

/// Build one independent cross-tab per gender (men first).
///
/// An event or group seen only for one gender never adds a row or a column to the other's
/// report. A gender with neither observed groups nor results is left out.
pub fn aggregate_by_gender<G, I>(observed: G, results: I, offsets: &[f64], target_rank: i64) -> Vec<(Gender, CrossTab)>
where
    G: IntoIterator<Item = GroupKey>,
    I: IntoIterator<Item = GroupResult>,
{
    let (men_groups, women_groups): (Vec<GroupKey>, Vec<GroupKey>) =
        observed.into_iter().partition(|g| g.gender == Gender::Men);
    let (men, women): (Vec<GroupResult>, Vec<GroupResult>) =
        results.into_iter().partition(|r| r.group.gender == Gender::Men);

    [(Gender::Men, men_groups, men), (Gender::Women, women_groups, women)]
        .into_iter()
        .filter(|(_, gs, rs)| !gs.is_empty() || !rs.is_empty())
        .map(|(gender, gs, rs)| (gender, aggregate(gs, rs, offsets, target_rank)))
        .collect()
}

fn position_or_push<T: PartialEq>(items: &mut Vec<T>, item: T) -> usize {
    match items.iter().position(|x| *x == item) {
        Some(idx) => idx,
        None => {
            items.push(item);
            items.len() - 1
        }
    }
}

/// Offset as it appears in column titles: `10`, `11_5`.
pub fn offset_label(offset: f64) -> String {
    format!("{offset}").replace('.', "_")
}

/// English ordinal: `1st`, `2nd`, `3rd`, `11th`, `50th`.
pub fn ordinal(n: i64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

impl CrossTab {
    /// Column titles: `Event`, then per group the reference time and a time/rank pair per offset.
    pub fn columns(&self) -> Vec<String> {
        let reference = ordinal(self.target_rank);
        let mut cols = vec!["Event".to_string()];
        for group in &self.groups {
            let g = group.label();
            cols.push(format!("{g}_{reference}"));
            for &offset in &self.offsets {
                let o = offset_label(offset);
                cols.push(format!("{g}_+{o}%"));
                cols.push(format!("{g}_+{o}%_Rank"));
            }
        }
        cols
    }

    /// Width of every row, equal to `columns().len()`.
    pub fn width(&self) -> usize {
        1 + self.groups.len() * (1 + 2 * self.offsets.len())
    }

    /// Row cells in [`Self::columns`] order; blank clusters are `Value::Null`.
    pub fn row_values(&self, row: &ReportRow) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.width());
        out.push(Value::from(row.event.as_str()));
        for cluster in &row.clusters {
            match cluster {
                Some(p) => {
                    out.push(Value::from(p.reference_text.as_str()));
                    for &offset in &self.offsets {
                        match p.projections.iter().find(|r| r.offset == offset) {
                            Some(r) => {
                                out.push(Value::from(r.time.as_str()));
                                out.push(r.rank.clone().unwrap_or(Value::Null));
                            }
                            None => out.extend([Value::Null, Value::Null]),
                        }
                    }
                }
                None => {
                    out.extend(std::iter::repeat_n(Value::Null, 1 + 2 * self.offsets.len()));
                }
            }
        }
        out
    }

    /// The whole report as one table named `name`.
    pub fn to_table(&self, name: impl Into<String>) -> ReportTable {
        ReportTable {
            name: name.into(),
            columns: self.columns(),
            rows: self.rows.iter().map(|r| self.row_values(r)).collect(),
        }
    }

    /// One table per group listing only the events that group has data for.
    ///
    /// Columns are `Event` and one `+{offset}%` time column per offset; ranks are left out.
    pub fn simplified(&self) -> Vec<ReportTable> {
        let mut columns = vec!["Event".to_string()];
        columns.extend(self.offsets.iter().map(|o| format!("+{o}%")));

        self.groups
            .iter()
            .enumerate()
            .map(|(g, group)| {
                let rows = self
                    .rows
                    .iter()
                    .filter_map(|row| {
                        let p = row.clusters[g].as_ref()?;
                        let mut cells = vec![Value::from(row.event.as_str())];
                        cells.extend(p.projections.iter().map(|r| Value::from(r.time.as_str())));
                        Some(cells)
                    })
                    .collect();
                ReportTable {
                    name: group.label(),
                    columns: columns.clone(),
                    rows,
                }
            })
            .filter(|t| !t.rows.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::projection::ProjectionResult;

    const OFFSETS: [f64; 2] = [10.0, 11.5];

    fn projection(event: &str, reference: f64) -> EventProjection {
        EventProjection {
            event: event.to_string(),
            reference_text: format!("{reference:.2}"),
            reference_seconds: reference,
            projections: OFFSETS
                .iter()
                .map(|&offset| ProjectionResult {
                    offset,
                    seconds: reference,
                    time: format!("{reference:.2}"),
                    rank: Some(Value::Int64(60)),
                })
                .collect(),
        }
    }

    fn no_groups() -> Vec<GroupKey> {
        Vec::new()
    }

    fn key(gender: Gender, age: &str) -> GroupKey {
        GroupKey::new("SCM", gender, age)
    }

    #[test]
    fn keeps_first_seen_order_and_fills_blanks() {
        let results = vec![
            GroupResult::new(key(Gender::Men, "12"), projection("50m Freestyle", 30.0)),
            GroupResult::new(key(Gender::Men, "12"), projection("100m Freestyle", 65.0)),
            GroupResult::new(key(Gender::Men, "10"), projection("100m Freestyle", 70.0)),
            GroupResult::new(key(Gender::Men, "10"), projection("200m IM", 160.0)),
        ];
        let tab = aggregate(no_groups(), results, &OFFSETS, 50);

        let events: Vec<&str> = tab.rows.iter().map(|r| r.event.as_str()).collect();
        assert_eq!(events, vec!["50m Freestyle", "100m Freestyle", "200m IM"]);
        assert_eq!(tab.groups, vec![key(Gender::Men, "12"), key(Gender::Men, "10")]);

        assert!(tab.rows[0].clusters[1].is_none());
        assert!(tab.rows[2].clusters[0].is_none());

        let width = tab.columns().len();
        assert_eq!(width, tab.width());
        for row in &tab.rows {
            assert_eq!(tab.row_values(row).len(), width);
        }
        let first = tab.row_values(&tab.rows[0]);
        assert!(first[6..].iter().all(|v| *v == Value::Null));
    }

    #[test]
    fn column_titles_follow_group_and_offset() {
        let tab = aggregate(
            no_groups(),
            vec![GroupResult::new(key(Gender::Women, "14"), projection("50m Back", 33.0))],
            &OFFSETS,
            50,
        );
        assert_eq!(
            tab.columns(),
            vec![
                "Event",
                "SCM_Women_14_50th",
                "SCM_Women_14_+10%",
                "SCM_Women_14_+10%_Rank",
                "SCM_Women_14_+11_5%",
                "SCM_Women_14_+11_5%_Rank",
            ]
        );
    }

    #[test]
    fn later_result_replaces_earlier() {
        let k = key(Gender::Men, "12");
        let tab = aggregate(
            no_groups(),
            vec![
                GroupResult::new(k.clone(), projection("50m Fly", 30.0)),
                GroupResult::new(k, projection("50m Fly", 31.0)),
            ],
            &OFFSETS,
            50,
        );
        assert_eq!(tab.rows.len(), 1);
        assert_eq!(tab.rows[0].clusters[0].as_ref().unwrap().reference_seconds, 31.0);
    }

    #[test]
    fn genders_are_independent() {
        let results = vec![
            GroupResult::new(key(Gender::Women, "12"), projection("800m Freestyle", 600.0)),
            GroupResult::new(key(Gender::Men, "12"), projection("1500m Freestyle", 1100.0)),
        ];
        let tabs = aggregate_by_gender(no_groups(), results, &OFFSETS, 50);
        assert_eq!(tabs.len(), 2);
        let (g0, men) = &tabs[0];
        let (g1, women) = &tabs[1];
        assert_eq!((*g0, *g1), (Gender::Men, Gender::Women));
        assert_eq!(men.rows.len(), 1);
        assert_eq!(men.rows[0].event, "1500m Freestyle");
        assert_eq!(women.groups, vec![key(Gender::Women, "12")]);
    }

    #[test]
    fn simplified_lists_only_events_with_data() {
        let results = vec![
            GroupResult::new(key(Gender::Men, "12"), projection("50m Freestyle", 30.0)),
            GroupResult::new(key(Gender::Men, "10"), projection("100m Freestyle", 70.0)),
        ];
        let tables = aggregate(no_groups(), results, &OFFSETS, 50).simplified();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "SCM_Men_12");
        assert_eq!(tables[0].columns, vec!["Event", "+10%", "+11.5%"]);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[0].rows[0][0], Value::from("50m Freestyle"));
    }

    #[test]
    fn observed_group_without_results_gets_a_blank_cluster() {
        let observed = vec![key(Gender::Men, "12"), key(Gender::Men, "14"), key(Gender::Women, "12")];
        let results = vec![GroupResult::new(key(Gender::Men, "12"), projection("50m Freestyle", 30.0))];
        let tabs = aggregate_by_gender(observed, results, &OFFSETS, 50);

        assert_eq!(tabs.len(), 2);
        let (_, men) = &tabs[0];
        assert_eq!(men.groups, vec![key(Gender::Men, "12"), key(Gender::Men, "14")]);
        assert_eq!(&men.columns()[6..], ["SCM_Men_14_50th", "SCM_Men_14_+10%", "SCM_Men_14_+10%_Rank", "SCM_Men_14_+11_5%", "SCM_Men_14_+11_5%_Rank"]);
        let values = men.row_values(&men.rows[0]);
        assert_eq!(values.len(), men.width());
        assert!(values[6..].iter().all(|v| *v == Value::Null));
        assert_eq!(men.simplified().len(), 1);

        let (gender, women) = &tabs[1];
        assert_eq!(*gender, Gender::Women);
        assert_eq!(women.groups, vec![key(Gender::Women, "12")]);
        assert!(women.rows.is_empty());
    }

    #[test]
    fn observed_groups_come_before_groups_first_seen_in_results() {
        let results = vec![GroupResult::new(key(Gender::Men, "10"), projection("50m Back", 40.0))];
        let tab = aggregate([key(Gender::Men, "12")], results, &OFFSETS, 50);
        assert_eq!(tab.groups, vec![key(Gender::Men, "12"), key(Gender::Men, "10")]);
        assert!(tab.rows[0].clusters[0].is_none());
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(50), "50th");
        assert_eq!(ordinal(113), "113th");
    }
}
