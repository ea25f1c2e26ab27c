use std::sync::{Arc, Mutex};

use dpa_engine::frame::{Column, Frame};
use dpa_engine::io::{
    load_with, save_with, CompositeObserver, FileObserver, Format, IoContext, IoObserver,
    IoOperation, IoOptions, IoSeverity, IoStats,
};
use dpa_engine::types::{DataType, Field, Schema};
use dpa_engine::EngineError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(IoOperation, IoStats)>>,
    failures: Mutex<Vec<IoSeverity>>,
    alerts: Mutex<Vec<IoSeverity>>,
}

impl IoObserver for RecordingObserver {
    fn on_success(&self, ctx: &IoContext, stats: IoStats) {
        self.successes.lock().unwrap().push((ctx.operation, stats));
    }

    fn on_failure(&self, _ctx: &IoContext, severity: IoSeverity, _error: &EngineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IoContext, severity: IoSeverity, _error: &EngineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn missing_file_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IoOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let _ = load_with("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IoSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IoSeverity::Critical]);
}

#[test]
fn schema_mismatch_is_error_without_alert() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IoOptions {
        schema: Some(Schema::new(vec![Field::new("definitely_missing", DataType::Utf8)])),
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let _ = load_with("tests/fixtures/people.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IoSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IoOptions {
        format: Some(Format::Parquet),
        observer: Some(obs.clone()),
        alert_at_or_above: IoSeverity::Error,
        ..Default::default()
    };

    // CSV text read as Parquet: corrupt structure, not an I/O failure.
    let _ = load_with("tests/fixtures/people.csv", &opts).unwrap_err();
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IoSeverity::Error]);
}

#[test]
fn successes_report_shape_for_load_and_save() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IoOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };
    let frame = load_with("tests/fixtures/people.csv", &opts).unwrap();

    let dir = tempfile::tempdir().unwrap();
    save_with(&frame, dir.path().join("people.parquet"), &opts).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 2);
    assert_eq!(successes[0].0, IoOperation::Load);
    assert_eq!(successes[1].0, IoOperation::Save);
    assert_eq!(successes[1].1, IoStats { rows: 3, columns: 5 });
}

#[test]
fn composite_fans_out_to_file_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("io.log");
    let recorder = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        recorder.clone(),
        Arc::new(FileObserver::new(&log)),
    ]);
    let opts = IoOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let frame = Frame::new(vec![Column::from_i64("id", vec![Some(1)])]).unwrap();
    save_with(&frame, dir.path().join("x.csv"), &opts).unwrap();
    let _ = load_with(dir.path().join("missing.csv"), &opts).unwrap_err();

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(*recorder.alerts.lock().unwrap(), vec![IoSeverity::Critical]);
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.lines().count() >= 2, "{text}");
}
