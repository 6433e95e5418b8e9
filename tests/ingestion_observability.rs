use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use swim_rankings::ingestion::{
    ingest_sheets, ingest_workbook, FileObserver, IngestionContext, IngestionObserver, IngestionOptions,
    IngestionSeverity, IngestionStats, SourceFormat,
};
use swim_rankings::RankingError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &RankingError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &RankingError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        format: Some(SourceFormat::Csv),
        observer: Some(obs.clone()),
        alert_at_or_above: Some(IngestionSeverity::Critical),
        ..Default::default()
    };

    let _ = ingest_workbook("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn no_alert_below_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: None,
        ..Default::default()
    };

    let err = ingest_workbook("tests/fixtures/results.parquet", &opts).unwrap_err();
    assert!(matches!(err, RankingError::SchemaMismatch { .. }));
    // Format inference fails before any read is attempted.
    assert!(obs.failures.lock().unwrap().is_empty());
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn success_reports_event_and_row_counts() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let _ = ingest_workbook("tests/fixtures/200m IM.csv", &opts).unwrap();
    let sheets = ingest_sheets("tests/fixtures/region_a/50m Freestyle.csv", &opts).unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].0, "50m Freestyle");

    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![IngestionStats { events: 1, rows: 5 }, IngestionStats { events: 1, rows: 2 }]
    );
}

#[test]
fn file_observer_appends_lines() {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let log = std::env::temp_dir().join(format!("swim-rankings-read-{nanos}.log"));
    let opts = IngestionOptions {
        observer: Some(Arc::new(FileObserver::new(&log))),
        alert_at_or_above: Some(IngestionSeverity::Error),
        ..Default::default()
    };

    let _ = ingest_workbook("tests/fixtures/200m IM.csv", &opts).unwrap();
    let _ = ingest_workbook("tests/fixtures/missing.csv", &opts).unwrap_err();

    let text = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("read ok") && lines[0].contains("rows=5"));
    assert!(lines[1].contains("read fail severity=Critical"));
    assert!(lines[2].contains("read ALERT"));

    let _ = std::fs::remove_file(&log);
}
