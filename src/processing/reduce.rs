//! Single-column reductions.

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnData, Frame};
use crate::types::Value;

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count non-null values (any dtype).
    Count,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values as `Float64`, ignoring nulls.
    Mean,
}

/// Reduce a column of `frame` using a built-in [`ReduceOp`].
///
/// - Fails with `ColumnNotFound` if `column` does not exist.
/// - `Sum`/`Min`/`Max` keep `Int64` for integer columns; `Mean` is always `Float64`.
/// - For everything but `Count`, returns `Value::Null` if there are no non-null values.
pub fn reduce(frame: &Frame, column: &str, op: ReduceOp) -> EngineResult<Value> {
    reduce_column(frame.column(column)?, op)
}

/// Reduce one column.
pub fn reduce_column(column: &Column, op: ReduceOp) -> EngineResult<Value> {
    if op == ReduceOp::Count {
        return Ok(Value::Int64((column.len() - column.null_count()) as i64));
    }
    let valid = |i: &usize| !column.is_null(*i);

    match column.data() {
        ColumnData::Int64(v) => {
            let mut acc: Option<i64> = None;
            let mut total: f64 = 0.0;
            let mut n = 0usize;
            for i in (0..v.len()).filter(valid) {
                let x = v[i];
                n += 1;
                total += x as f64;
                acc = Some(match (op, acc) {
                    (ReduceOp::Sum, Some(a)) => a.checked_add(x).ok_or_else(|| {
                        EngineError::type_mismatch(format!(
                            "integer overflow summing column '{}'",
                            column.name()
                        ))
                    })?,
                    (ReduceOp::Min, Some(a)) => a.min(x),
                    (ReduceOp::Max, Some(a)) => a.max(x),
                    (_, Some(a)) => a,
                    (_, None) => x,
                });
            }
            Ok(match (op, acc) {
                (_, None) => Value::Null,
                (ReduceOp::Mean, Some(_)) => Value::Float64(total / n as f64),
                (_, Some(a)) => Value::Int64(a),
            })
        }
        ColumnData::Float64(v) => {
            let mut acc: Option<f64> = None;
            let mut n = 0usize;
            for i in (0..v.len()).filter(valid) {
                let x = v[i];
                n += 1;
                acc = Some(match (op, acc) {
                    (ReduceOp::Min, Some(a)) => a.min(x),
                    (ReduceOp::Max, Some(a)) => a.max(x),
                    (_, Some(a)) => a + x,
                    (_, None) => x,
                });
            }
            Ok(match (op, acc) {
                (_, None) => Value::Null,
                (ReduceOp::Mean, Some(a)) => Value::Float64(a / n as f64),
                (_, Some(a)) => Value::Float64(a),
            })
        }
        _ => Err(EngineError::type_mismatch(format!(
            "{op:?} requires a numeric column; '{}' is {}",
            column.name(),
            column.data_type()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, ReduceOp};
    use crate::error::ErrorKind;
    use crate::frame::{Column, Frame};
    use crate::types::Value;

    fn numeric_frame_with_nulls() -> Frame {
        Frame::new(vec![
            Column::from_i64("id", vec![Some(1), Some(2), Some(3)]),
            Column::from_f64("score", vec![Some(10.0), None, Some(5.5)]),
            Column::from_strs("name", vec![Some("a"), None, Some("c")]),
        ])
        .unwrap()
    }

    #[test]
    fn count_ignores_nulls() {
        let f = numeric_frame_with_nulls();
        assert_eq!(reduce(&f, "score", ReduceOp::Count).unwrap(), Value::Int64(2));
        assert_eq!(reduce(&f, "id", ReduceOp::Count).unwrap(), Value::Int64(3));
        assert_eq!(reduce(&f, "name", ReduceOp::Count).unwrap(), Value::Int64(2));
    }

    #[test]
    fn sum_ignores_nulls_and_preserves_type() {
        let f = numeric_frame_with_nulls();
        assert_eq!(reduce(&f, "score", ReduceOp::Sum).unwrap(), Value::Float64(15.5));
        assert_eq!(reduce(&f, "id", ReduceOp::Sum).unwrap(), Value::Int64(6));
    }

    #[test]
    fn min_max_mean() {
        let f = numeric_frame_with_nulls();
        assert_eq!(reduce(&f, "score", ReduceOp::Min).unwrap(), Value::Float64(5.5));
        assert_eq!(reduce(&f, "score", ReduceOp::Max).unwrap(), Value::Float64(10.0));
        assert_eq!(reduce(&f, "id", ReduceOp::Min).unwrap(), Value::Int64(1));
        assert_eq!(reduce(&f, "id", ReduceOp::Max).unwrap(), Value::Int64(3));
        assert_eq!(reduce(&f, "id", ReduceOp::Mean).unwrap(), Value::Float64(2.0));
        assert_eq!(reduce(&f, "score", ReduceOp::Mean).unwrap(), Value::Float64(7.75));
    }

    #[test]
    fn errors_for_missing_or_non_numeric() {
        let f = numeric_frame_with_nulls();
        assert_eq!(
            reduce(&f, "missing", ReduceOp::Sum).unwrap_err().kind(),
            ErrorKind::ColumnNotFound
        );
        assert_eq!(
            reduce(&f, "name", ReduceOp::Sum).unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn all_null_reduces_to_null() {
        let f = Frame::new(vec![Column::from_f64("score", vec![None, None])]).unwrap();
        for op in [ReduceOp::Sum, ReduceOp::Min, ReduceOp::Max, ReduceOp::Mean] {
            assert_eq!(reduce(&f, "score", op).unwrap(), Value::Null);
        }
    }
}
