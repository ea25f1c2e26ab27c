//! Text-to-type inference shared by the delimited-text and JSON loaders.
//!
//! A column's dtype is decided once from all of its non-null raw values, in the order
//! Int64, Float64, Timestamp, Bool, then String as the fallback.

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnBuilder};
use crate::types::{parse_timestamp, DataType, Value};

/// `true` when a raw field represents a missing value (empty or whitespace-only).
pub fn is_null_text(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Integer literal: optional sign followed by ASCII digits, fitting in `i64`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Numeric literal: anything `f64` parses that contains a digit, or exactly `NaN`/`inf`/`+inf`/`-inf`.
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim();
    match s {
        "NaN" => return Some(f64::NAN),
        "inf" | "+inf" => return Some(f64::INFINITY),
        "-inf" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Boolean literal (case-insensitive): `true`/`false`, `t`/`f`, `yes`/`no`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" => Some(true),
        "false" | "f" | "no" => Some(false),
        _ => None,
    }
}

/// Infer a dtype from raw text values. Null values are skipped; an all-null input is String.
pub fn infer_dtype<'a>(values: impl IntoIterator<Item = &'a str>) -> DataType {
    let mut int = true;
    let mut float = true;
    let mut ts = true;
    let mut boolean = true;
    let mut any = false;

    for v in values {
        if is_null_text(v) {
            continue;
        }
        any = true;
        int = int && parse_int(v).is_some();
        float = float && parse_float(v).is_some();
        ts = ts && parse_timestamp(v).is_some();
        boolean = boolean && parse_bool(v).is_some();
        if !(int || float || ts || boolean) {
            return DataType::Utf8;
        }
    }

    match (any, int, float, ts, boolean) {
        (false, ..) => DataType::Utf8,
        (_, true, ..) => DataType::Int64,
        (_, _, true, ..) => DataType::Float64,
        (_, _, _, true, _) => DataType::Timestamp,
        (_, _, _, _, true) => DataType::Bool,
        _ => DataType::Utf8,
    }
}

/// Parse one non-null raw value into `data_type`. Strings keep the raw text unchanged.
pub fn parse_value(raw: &str, data_type: DataType) -> Result<Value, String> {
    if is_null_text(raw) {
        return Ok(Value::Null);
    }
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_string())),
        DataType::Int64 => parse_int(raw)
            .map(Value::Int64)
            .ok_or_else(|| "expected integer".to_string()),
        DataType::Float64 => parse_float(raw)
            .map(Value::Float64)
            .ok_or_else(|| "expected number".to_string()),
        DataType::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| "expected bool (true/false/t/f/yes/no)".to_string()),
        DataType::Timestamp => parse_timestamp(raw)
            .map(Value::Timestamp)
            .ok_or_else(|| "expected timestamp".to_string()),
    }
}

/// Build a typed column from raw text cells.
///
/// With `forced = None` the dtype is inferred; otherwise every value must parse as `forced`.
/// `first_row` is the user-facing row number of `cells[0]`, used in parse errors.
pub fn column_from_text<S: AsRef<str>>(
    name: &str,
    cells: &[S],
    forced: Option<DataType>,
    first_row: usize,
) -> EngineResult<Column> {
    let data_type = forced.unwrap_or_else(|| infer_dtype(cells.iter().map(AsRef::as_ref)));
    let mut builder = ColumnBuilder::with_capacity(data_type, cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let raw = cell.as_ref();
        let value = parse_value(raw, data_type).map_err(|message| EngineError::ParseError {
            row: first_row + i,
            column: name.to_string(),
            raw: raw.to_string(),
            message,
        })?;
        builder
            .push(&value)
            .map_err(|message| EngineError::type_mismatch(format!("column '{name}': {message}")))?;
    }
    builder.finish(name)
}

#[cfg(test)]
mod tests {
    use super::{column_from_text, infer_dtype, parse_bool, parse_float, parse_int};
    use crate::error::ErrorKind;
    use crate::types::{DataType, Value};

    #[test]
    fn inference_order() {
        assert_eq!(infer_dtype(["1", "-2", "+3"]), DataType::Int64);
        assert_eq!(infer_dtype(["1", "2.5"]), DataType::Float64);
        assert_eq!(infer_dtype(["1", "NaN", "inf"]), DataType::Float64);
        assert_eq!(infer_dtype(["2024-01-01", "2024-02-01 10:00"]), DataType::Timestamp);
        assert_eq!(infer_dtype(["yes", "No", "TRUE"]), DataType::Bool);
        assert_eq!(infer_dtype(["1", "x"]), DataType::Utf8);
        assert_eq!(infer_dtype(["", "  "]), DataType::Utf8);
        assert_eq!(infer_dtype(Vec::<&str>::new()), DataType::Utf8);
    }

    #[test]
    fn zero_and_one_are_integers_not_bools() {
        assert_eq!(infer_dtype(["0", "1"]), DataType::Int64);
        assert_eq!(parse_bool("1"), None);
    }

    #[test]
    fn literal_shapes() {
        assert_eq!(parse_int(" 42 "), Some(42));
        assert_eq!(parse_int("4.0"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("infinity"), None);
        assert_eq!(parse_float("."), None);
    }

    #[test]
    fn text_columns_keep_nulls_and_raw_strings() {
        let c = column_from_text("s", &[" a", "", "b "], None, 2).unwrap();
        assert_eq!(c.data_type(), DataType::Utf8);
        assert_eq!(c.value(0), Value::Utf8(" a".into()));
        assert_eq!(c.value(1), Value::Null);
        assert_eq!(c.null_count(), 1);
    }

    #[test]
    fn forced_dtype_reports_row_and_raw() {
        let err = column_from_text("n", &["1", "oops"], Some(DataType::Int64), 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        match err {
            crate::EngineError::ParseError { row, column, raw, .. } => {
                assert_eq!((row, column.as_str(), raw.as_str()), (3, "n", "oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
