//! Column projection for [`Frame`].

use crate::error::EngineResult;
use crate::frame::Frame;

/// Returns a new [`Frame`] with exactly `names`, in the requested order.
///
/// This is a convenience wrapper around [`Frame::select`].
pub fn select<S: AsRef<str>>(frame: &Frame, names: &[S]) -> EngineResult<Frame> {
    frame.select(names)
}

#[cfg(test)]
mod tests {
    use super::select;
    use crate::frame::{Column, Frame};

    #[test]
    fn select_is_exact_and_ordered() {
        let f = Frame::new(vec![
            Column::from_i64("a", vec![Some(1)]),
            Column::from_i64("b", vec![Some(2)]),
            Column::from_i64("c", vec![Some(3)]),
        ])
        .unwrap();
        let out = select(&f, &["c", "a"]).unwrap();
        assert_eq!(out.column_names(), vec!["c", "a"]);
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.column("c").unwrap(), f.column("c").unwrap());
    }
}
