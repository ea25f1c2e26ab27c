use std::collections::HashSet;

use dpa_engine::frame::Frame;
use dpa_engine::io::load;
use dpa_engine::sampling::{sample, split, SampleMethod};
use dpa_engine::types::Value;
use dpa_engine::ErrorKind;

fn transactions() -> Frame {
    load("tests/fixtures/transactions_small.csv").unwrap()
}

fn user_ids(frame: &Frame) -> Vec<i64> {
    (0..frame.row_count())
        .map(|i| match frame.value(i, "user_id").unwrap() {
            Value::Int64(v) => v,
            other => panic!("unexpected user_id {other:?}"),
        })
        .collect()
}

#[test]
fn head_and_tail_are_positional() {
    let f = transactions();
    let head = sample(&f, SampleMethod::Head, 5, None, None).unwrap();
    assert_eq!(user_ids(&head), vec![1000, 1001, 1002, 1003, 1004]);
    let tail = sample(&f, SampleMethod::Tail, 3, None, None).unwrap();
    assert_eq!(user_ids(&tail), vec![1097, 1098, 1099]);
}

#[test]
fn seeded_random_sample_is_reproducible() {
    let f = transactions();
    let a = sample(&f, SampleMethod::Random, 20, None, Some(1234)).unwrap();
    let b = sample(&f, SampleMethod::Random, 20, None, Some(1234)).unwrap();
    assert_eq!(a, b);
    let ids: HashSet<i64> = user_ids(&a).into_iter().collect();
    assert_eq!(ids.len(), 20);

    let c = sample(&f, SampleMethod::Random, 20, None, Some(4321)).unwrap();
    assert_ne!(user_ids(&a), user_ids(&c));
}

#[test]
fn stratified_sample_covers_every_stratum() {
    let f = transactions();
    let out = sample(&f, SampleMethod::Stratified, 30, Some("channel"), Some(9)).unwrap();
    assert!(out.row_count().abs_diff(30) <= 3);
    let channels: HashSet<String> = (0..out.row_count())
        .map(|i| out.value(i, "channel").unwrap().to_string())
        .collect();
    assert_eq!(channels.len(), 3);

    let again = sample(&f, SampleMethod::Stratified, 30, Some("channel"), Some(9)).unwrap();
    assert_eq!(out, again);
}

#[test]
fn sampling_argument_errors() {
    let f = transactions();
    let err = "reservoir".parse::<SampleMethod>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert!(err.to_string().contains("Unknown sampling method"));

    let err = sample(&f, SampleMethod::Stratified, 10, None, Some(1)).unwrap_err();
    assert!(err.to_string().contains("stratify column required"));

    let err = sample(&f, SampleMethod::Random, 101, None, Some(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

#[test]
fn split_partitions_all_rows() {
    let f = transactions();
    let (train, test) = split(&f, 0.2, None, Some(42)).unwrap();
    assert_eq!(train.row_count() + test.row_count(), 100);
    assert_eq!(test.row_count(), 20);

    let train_ids: HashSet<i64> = user_ids(&train).into_iter().collect();
    let test_ids: HashSet<i64> = user_ids(&test).into_iter().collect();
    assert!(train_ids.is_disjoint(&test_ids));
    assert_eq!(train_ids.len() + test_ids.len(), 100);

    assert_eq!(split(&f, 0.2, None, Some(42)).unwrap(), (train, test));
}

#[test]
fn stratified_split_keeps_strata_proportional() {
    let f = transactions();
    let (train, test) = split(&f, 0.3, Some("country"), Some(8)).unwrap();
    assert_eq!(train.row_count() + test.row_count(), 100);
    let ratio = test.row_count() as f64 / 100.0;
    assert!((ratio - 0.3).abs() <= 0.05, "ratio={ratio}");
}
