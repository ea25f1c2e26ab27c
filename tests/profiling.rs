use dpa_engine::execution::{ExecutionEngine, ExecutionOptions};
use dpa_engine::io::load;
use dpa_engine::profile::{profile, ProfileOptions};

#[test]
fn transactions_profile_scenario() {
    let frame = load("tests/fixtures/transactions_small.csv").unwrap();
    let p = profile(&frame, &ProfileOptions::default());
    let map = p.to_map();

    assert_eq!(map["rows"], "100");
    assert_eq!(map["columns"], "5");
    assert_eq!(map["nulls:country"], "3");
    assert_eq!(map["nulls:amount"], "0");
    assert_eq!(map["dtype:user_id"], "Int64");
    assert_eq!(map["dtype:amount"], "Float64");
    assert_eq!(map["dtype:country"], "String");
    assert_eq!(map["dtype:timestamp"], "Int64");
    assert_eq!(map["dtype:channel"], "String");
    assert!(!map.contains_key("min:amount"));

    let pct: f64 = map["null_percentage"].parse().unwrap();
    assert!((pct - 100.0 * 3.0 / 500.0).abs() < 1e-9);
    let mb: f64 = map["memory_mb"].parse().unwrap();
    assert!(mb > 0.0 && mb < 1.0);
}

#[test]
fn detailed_profile_reports_numeric_stats_only() {
    let frame = load("tests/fixtures/transactions_small.csv").unwrap();
    let map = profile(&frame, &ProfileOptions::detailed()).to_map();

    assert_eq!(map["min:amount"], "-42.5");
    assert_eq!(map["min:user_id"], "1000.0");
    assert_eq!(map["max:user_id"], "1099.0");
    assert_eq!(map["mean:user_id"], "1049.5");
    assert!(map.contains_key("std:amount"));
    assert!(!map.contains_key("min:country"));
    assert!(!map.contains_key("mean:channel"));
}

#[test]
fn sample_size_truncates_rows() {
    let frame = load("tests/fixtures/transactions_small.csv").unwrap();
    let opts = ProfileOptions {
        sample_size: Some(10),
        detailed: true,
    };
    let p = profile(&frame, &opts);
    assert_eq!(p.rows, 10);
    // Row 10 is the first empty country, so the first ten rows have none.
    assert_eq!(p.column("country").unwrap().null_count, 0);
    assert_eq!(p.to_map()["max:user_id"], "1009.0");

    let all = profile(&frame, &ProfileOptions { sample_size: Some(1_000), detailed: false });
    assert_eq!(all.rows, 100);
}

#[test]
fn parallel_profile_equals_sequential() {
    let frame = load("tests/fixtures/transactions_small.csv").unwrap();
    let engine = ExecutionEngine::new(ExecutionOptions::default()).unwrap();
    let opts = ProfileOptions::detailed();
    assert_eq!(engine.profile(&frame, &opts), profile(&frame, &opts));
}
