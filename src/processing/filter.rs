//! Expression-driven row filtering for [`Frame`].

use crate::error::EngineResult;
use crate::expr;
use crate::frame::Frame;

/// Rows of `frame` where `where_expr` is true, in original order.
///
/// When `select` is given, those columns (in that order) are projected after filtering.
/// Rows for which the expression is unknown because of nulls are dropped.
pub fn filter(frame: &Frame, where_expr: &str, select: Option<&[&str]>) -> EngineResult<Frame> {
    let bound = expr::compile(where_expr, frame)?;
    let mask = bound.evaluate(frame)?;
    let out = frame.filter_mask(&mask)?;
    match select {
        Some(names) => out.select(names),
        None => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::error::ErrorKind;
    use crate::frame::{Column, Frame};
    use crate::types::Value;

    fn sample_frame() -> Frame {
        Frame::new(vec![
            Column::from_i64("id", vec![Some(1), Some(2), Some(3)]),
            Column::from_bool("active", vec![Some(true), Some(false), Some(true)]),
            Column::from_strs("name", vec![Some("a"), Some("b"), Some("c")]),
        ])
        .unwrap()
    }

    #[test]
    fn filter_rows_by_numeric_predicate() {
        let f = sample_frame();
        let out = filter(&f, "id > 1", None).unwrap();
        assert_eq!(out.schema(), f.schema());
        assert_eq!(out.row_count(), 2);
        assert_eq!(
            out.row(0),
            vec![Value::Int64(2), Value::Bool(false), Value::Utf8("b".into())]
        );
        // Original unchanged
        assert_eq!(f.row_count(), 3);
    }

    #[test]
    fn filter_then_project() {
        let f = sample_frame();
        let out = filter(&f, "active", Some(&["name"])).unwrap();
        assert_eq!(out.column_names(), vec!["name"]);
        assert_eq!(out.value(1, "name").unwrap(), Value::Utf8("c".into()));
    }

    #[test]
    fn filter_can_return_empty_frame() {
        let f = sample_frame();
        let out = filter(&f, "id > 100", None).unwrap();
        assert_eq!(out.schema(), f.schema());
        assert!(out.is_empty());
    }

    #[test]
    fn filter_is_idempotent() {
        let f = sample_frame();
        let once = filter(&f, "id >= 2 OR name = 'a'", None).unwrap();
        let twice = filter(&once, "id >= 2 OR name = 'a'", None).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_projection_column() {
        let f = sample_frame();
        let err = filter(&f, "id > 1", Some(&["nope"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
    }
}
