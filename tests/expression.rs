use dpa_engine::expr::{self, parse};
use dpa_engine::frame::{Column, Frame};
use dpa_engine::io::load;
use dpa_engine::processing::filter;
use dpa_engine::types::Value;
use dpa_engine::{EngineError, ErrorKind};

fn transactions() -> Frame {
    load("tests/fixtures/transactions_small.csv").unwrap()
}

fn amounts(frame: &Frame) -> Vec<f64> {
    (0..frame.row_count())
        .map(|i| match frame.value(i, "amount").unwrap() {
            Value::Float64(v) => v,
            other => panic!("unexpected amount {other:?}"),
        })
        .collect()
}

#[test]
fn filter_amount_over_100_is_sound() {
    let f = transactions();
    let out = filter(&f, "amount > 100", None).unwrap();
    assert_eq!(out.row_count(), 77);
    assert!(amounts(&out).iter().all(|a| *a > 100.0));
    assert_eq!(out.column_names(), f.column_names());
}

#[test]
fn filter_is_idempotent_on_fixture() {
    let f = transactions();
    for e in [
        "amount > 100",
        "country IN ('US', 'DE') AND NOT channel = 'web'",
        "country IS NULL OR amount < 0",
        "amount >= 0 AND amount <= 1000 AND timestamp > 1700100000",
    ] {
        let once = filter(&f, e, None).unwrap();
        let twice = filter(&once, e, None).unwrap();
        assert_eq!(once, twice, "{e}");
    }
}

#[test]
fn null_cells_never_match_even_under_not() {
    let f = transactions();
    let eq = filter(&f, "country = 'US'", None).unwrap().row_count();
    let not_eq = filter(&f, "NOT country = 'US'", None).unwrap().row_count();
    let nulls = filter(&f, "country IS NULL", None).unwrap().row_count();
    assert_eq!(nulls, 3);
    assert_eq!(eq + not_eq + nulls, 100);
}

#[test]
fn projection_after_filter() {
    let f = transactions();
    let out = filter(&f, "amount < 0", Some(&["user_id", "amount"])).unwrap();
    assert_eq!(out.column_names(), vec!["user_id", "amount"]);
    assert_eq!(
        out.row(0),
        vec![Value::Int64(1017), Value::Float64(-42.5)]
    );
    assert_eq!(out.row(1), vec![Value::Int64(1058), Value::Float64(-7.25)]);
}

#[test]
fn precedence_not_and_or() {
    let f = Frame::new(vec![
        Column::from_bool("a", vec![Some(true), Some(true), Some(false), Some(false)]),
        Column::from_bool("b", vec![Some(true), Some(false), Some(true), Some(false)]),
    ])
    .unwrap();
    // NOT a OR a AND b  ==  (NOT a) OR (a AND b)
    assert_eq!(
        expr::mask(&f, "NOT a OR a AND b").unwrap(),
        vec![true, false, true, true]
    );
    assert_eq!(
        expr::mask(&f, "NOT (a OR b)").unwrap(),
        vec![false, false, false, true]
    );
}

#[test]
fn syntax_errors_carry_token_position() {
    match parse("amount > 10 AND (country = 'US'") {
        Err(EngineError::Syntax { position, .. }) => assert_eq!(position, 31),
        other => panic!("expected syntax error, got {other:?}"),
    }
    match parse("amount >> 3") {
        Err(EngineError::Syntax { position, .. }) => assert_eq!(position, 8),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn binding_errors_are_raised_before_evaluation() {
    let f = transactions();
    assert_eq!(
        filter(&f, "nope > 1", None).unwrap_err().kind(),
        ErrorKind::ColumnNotFound
    );
    assert_eq!(
        filter(&f, "amount = 'lots'", None).unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        filter(&f, "country > 3", None).unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        filter(&f, "amount > 1 AND", None).unwrap_err().kind(),
        ErrorKind::Parse
    );
}
