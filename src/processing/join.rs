//! Hash join of two frames on one key column.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnBuilder, Frame, GroupKey};

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinHow {
    /// Only left rows with at least one matching right row.
    Inner,
    /// Every left row; unmatched rows get nulls in the right-hand columns.
    Left,
}

impl FromStr for JoinHow {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(Self::Inner),
            "left" => Ok(Self::Left),
            other => Err(EngineError::argument(format!(
                "unsupported join how={other}; only 'inner' and 'left' are supported"
            ))),
        }
    }
}

/// Join `left` and `right` on column `on`.
///
/// - Key dtypes must match.
/// - Null keys never match.
/// - The right key column is dropped; other right columns whose names collide with a left column
///   get a `_right` suffix.
/// - Output rows follow left-row order, then right-match order.
pub fn join(left: &Frame, right: &Frame, on: &str, how: JoinHow) -> EngineResult<Frame> {
    let lkey = left.column(on)?;
    let rkey = right.column(on)?;
    if lkey.data_type() != rkey.data_type() {
        return Err(EngineError::type_mismatch(format!(
            "join key '{on}' is {} on the left but {} on the right",
            lkey.data_type(),
            rkey.data_type()
        )));
    }

    let mut index: HashMap<GroupKey, Vec<usize>> = HashMap::new();
    for i in 0..rkey.len() {
        let k = rkey.key(i);
        if k != GroupKey::Null {
            index.entry(k).or_default().push(i);
        }
    }

    let mut left_rows = Vec::new();
    let mut right_rows: Vec<Option<usize>> = Vec::new();
    for i in 0..lkey.len() {
        let k = lkey.key(i);
        match index.get(&k).filter(|_| k != GroupKey::Null) {
            Some(matches) => {
                for &j in matches {
                    left_rows.push(i);
                    right_rows.push(Some(j));
                }
            }
            None if how == JoinHow::Left => {
                left_rows.push(i);
                right_rows.push(None);
            }
            None => {}
        }
    }

    let mut columns: Vec<Column> = left
        .columns()
        .iter()
        .map(|c| c.take(&left_rows))
        .collect();
    for c in right.columns().iter().filter(|c| c.name() != on) {
        let name = if left.column_index(c.name()).is_some() {
            format!("{}_right", c.name())
        } else {
            c.name().to_string()
        };
        columns.push(take_optional(c, &right_rows, name)?);
    }
    Frame::new(columns)
}

fn take_optional(column: &Column, rows: &[Option<usize>], name: String) -> EngineResult<Column> {
    let mut builder = ColumnBuilder::with_capacity(column.data_type(), rows.len());
    for r in rows {
        match r {
            Some(i) => builder
                .push(&column.value(*i))
                .map_err(EngineError::type_mismatch)?,
            None => builder.push_null(),
        }
    }
    builder.finish(name)
}
