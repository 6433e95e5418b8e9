#![cfg(all(feature = "excel", feature = "xlsx_writer"))]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use swim_rankings::config::{PercentileLevel, RankingConfig};
use swim_rankings::execution::{ExecutionEngine, ExecutionEvent, ExecutionObserver, ExecutionOptions};
use swim_rankings::output::CsvSink;
use swim_rankings::pipeline::Pipeline;

const HEADER: [&str; 13] = [
    "Name", "Age", "Club", "Province", "Meet", "Date", "Course", "Event", "Round", "Time", "Points",
    "Age Rank", "Rank",
];

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let seq = DIR_SEQ.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("swim-rankings-{name}-{nanos}-{seq}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a ranking export: one sheet per event, `(time, rank)` per result row.
fn write_export(path: &Path, events: &[(&str, Vec<(&str, u32)>)]) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    for (event, results) in events {
        let ws = wb.add_worksheet();
        ws.set_name(*event).unwrap();
        for (c, title) in HEADER.iter().enumerate() {
            ws.write_string(0, c as u16, *title).unwrap();
        }
        for (i, (time, rank)) in results.iter().enumerate() {
            let r = i as u32 + 1;
            ws.write_string(r, 0, format!("Swimmer {r}")).unwrap();
            ws.write_string(r, 7, *event).unwrap();
            ws.write_string(r, 9, *time).unwrap();
            ws.write_number(r, 12, *rank).unwrap();
        }
    }
    wb.save(path).unwrap();
}

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl ExecutionObserver for Notices {
    fn on_event(&self, event: &ExecutionEvent) {
        if let ExecutionEvent::Notice { message } = event {
            self.0.lock().unwrap().push(message.clone());
        }
    }
}

fn pipeline(config: RankingConfig, out: &Path) -> (Pipeline, Arc<Notices>) {
    let notices = Arc::new(Notices::default());
    let engine = ExecutionEngine::new(ExecutionOptions { num_threads: Some(2) })
        .unwrap()
        .with_observer(notices.clone());
    let p = Pipeline::new(config, engine, Arc::new(CsvSink::new(out))).unwrap();
    (p, notices)
}

fn lines(path: PathBuf) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

fn time_column(lines: &[String]) -> Vec<String> {
    lines[1..]
        .iter()
        .map(|l| l.split(',').nth(9).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn combine_merges_regions_and_skips_unpaired_keys() {
    let input = tmp_dir("combine-in");
    let output = tmp_dir("combine-out");
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_11-12.xlsx"),
        &[
            ("50m Freestyle", vec![("27.43", 1), ("28.10", 2)]),
            ("100m Back", vec![("1:10.20", 1)]),
        ],
    );
    write_export(
        &input.join("CAN-SK_2025_SCM_Men_11-12.xlsx"),
        &[("50m Freestyle", vec![("27.90", 1), ("DQ", 2)])],
    );
    write_export(
        &input.join("CAN-MB_2025_SCM_Women_11-12.xlsx"),
        &[("50m Freestyle", vec![("29.00", 1)])],
    );
    fs::write(input.join("notes.txt"), "not an export").unwrap();

    let (p, notices) = pipeline(RankingConfig::default(), &output);
    let summary = p.combine(&input).unwrap();

    assert!(summary.is_clean(), "{:?}", summary.failed);
    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].0, "2025_SCM_Women_11-12");
    assert!(notices.0.lock().unwrap().iter().any(|n| n.contains("2025_SCM_Women_11-12")));

    let free = lines(output.join("CAN-MBSK_2025_SCM_Men_11-12__50m Freestyle.csv"));
    assert_eq!(free[0], HEADER.join(","));
    assert_eq!(time_column(&free), vec!["27.43", "27.90", "28.10", "DQ"]);

    let back = lines(output.join("CAN-MBSK_2025_SCM_Men_11-12__100m Back.csv"));
    assert_eq!(time_column(&back), vec!["1:10.20"]);

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn percentiles_write_one_summary_per_file() {
    let input = tmp_dir("pct-in");
    let output = tmp_dir("pct-out");
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_11-12.xlsx"),
        &[
            ("50m Freestyle", vec![("27.00", 1), ("28.00", 2), ("29.00", 3), ("NT", 4)]),
            ("400m IM", vec![("DQ", 1)]),
        ],
    );

    let config = RankingConfig {
        percentile_levels: vec![PercentileLevel::new("90th Percentile (Top 10%)", 0.10)],
        ..Default::default()
    };
    let (p, notices) = pipeline(config, &output);
    let summary = p.percentiles(&input).unwrap();

    assert!(summary.is_clean(), "{:?}", summary.failed);
    let report = lines(output.join("CAN-MB_2025_SCM_Men_11-12_percentiles__Percentile Summary.csv"));
    assert_eq!(
        report,
        vec![
            "Event Name,Total Results,90th Percentile (Top 10%),Rank at 90th,Status",
            "50m Freestyle,3,27.2,1,Success",
            "400m IM,0,,,No numeric data found",
        ]
    );
    assert_eq!(notices.0.lock().unwrap().len(), 1);

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn a_broken_file_fails_alone() {
    let input = tmp_dir("broken-in");
    let output = tmp_dir("broken-out");
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_11-12.xlsx"),
        &[("50m Freestyle", vec![("27.00", 1)])],
    );
    fs::write(input.join("CAN-SK_2025_SCM_Men_11-12.xlsx"), "not a zip").unwrap();

    let (p, _) = pipeline(RankingConfig::default(), &output);
    let summary = p.percentiles(&input).unwrap();

    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "CAN-SK_2025_SCM_Men_11-12.xlsx");

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn projections_build_gender_reports_and_simplified_tabs() {
    let input = tmp_dir("proj-in");
    let output = tmp_dir("proj-out");
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_11-12.xlsx"),
        &[
            ("50m Freestyle", vec![("30.00", 1), ("31.00", 2), ("34.00", 3)]),
            ("100m Freestyle Lap", vec![("1:10.00", 1), ("1:11.00", 2)]),
        ],
    );
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_13-14.xlsx"),
        &[
            ("200m IM", vec![("2:20.00", 1), ("2:30.00", 2), ("2:45.00", 3)]),
            ("50m Freestyle", vec![("26.00", 1)]),
        ],
    );
    write_export(
        &input.join("CAN-MB_2025_SCM_Women_11-12.xlsx"),
        &[("50m Freestyle", vec![("31.00", 1), ("32.00", 2), ("35.00", 3)])],
    );
    write_export(&input.join("summary.xlsx"), &[("50m Freestyle", vec![("30.00", 2)])]);

    let config = RankingConfig {
        projection_offsets: vec![10.0],
        target_rank: 2,
        ..Default::default()
    };
    let (p, notices) = pipeline(config, &output);
    let summary = p.projections(&input).unwrap();

    assert!(summary.is_clean(), "{:?}", summary.failed);
    assert_eq!(summary.skipped, vec![("summary.xlsx".to_string(), "unrecognized file name 'summary.xlsx'".to_string())]);
    // 13-14 has no 2nd place in 50m Freestyle.
    assert!(notices.0.lock().unwrap().iter().any(|n| n.contains("50m Freestyle") && n.contains("rank 2")));

    let men = lines(output.join("swim_rankings_2nd_place_summary__Men.csv"));
    assert_eq!(
        men,
        vec![
            "Event,SCM_Men_12_2nd,SCM_Men_12_+10%,SCM_Men_12_+10%_Rank,SCM_Men_14_2nd,SCM_Men_14_+10%,SCM_Men_14_+10%_Rank",
            "50m Freestyle,31.00,34.10,3,,,",
            "200m IM,,,,2:30.00,2:45.00,3",
        ]
    );

    let women = lines(output.join("swim_rankings_2nd_place_summary__Women.csv"));
    assert_eq!(women[1], "50m Freestyle,32.00,35.20,3");

    let simplified = lines(output.join("swim_rankings_simplified__SCM_Men_14.csv"));
    assert_eq!(simplified, vec!["Event,+10%", "200m IM,2:45.00"]);

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}

#[test]
fn an_age_group_with_nothing_to_project_keeps_blank_columns() {
    let input = tmp_dir("proj-blank-in");
    let output = tmp_dir("proj-blank-out");
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_11-12.xlsx"),
        &[("50m Freestyle", vec![("30.00", 1), ("31.00", 2)])],
    );
    write_export(
        &input.join("CAN-MB_2025_SCM_Men_13-14.xlsx"),
        &[("50m Freestyle", vec![("26.00", 1)])],
    );

    let config = RankingConfig {
        projection_offsets: vec![10.0],
        target_rank: 2,
        ..Default::default()
    };
    let (p, _) = pipeline(config, &output);
    let summary = p.projections(&input).unwrap();
    assert!(summary.is_clean(), "{:?}", summary.failed);

    let men = lines(output.join("swim_rankings_2nd_place_summary__Men.csv"));
    assert_eq!(
        men,
        vec![
            "Event,SCM_Men_12_2nd,SCM_Men_12_+10%,SCM_Men_12_+10%_Rank,SCM_Men_14_2nd,SCM_Men_14_+10%,SCM_Men_14_+10%_Rank",
            "50m Freestyle,31.00,34.10,2,,,",
        ]
    );
    assert!(!output.join("swim_rankings_simplified__SCM_Men_14.csv").exists());

    let _ = fs::remove_dir_all(&input);
    let _ = fs::remove_dir_all(&output);
}
