//! Binding a parsed expression to a frame, and evaluating it into a row mask.
//!
//! Binding resolves column names to positions and coerces every literal to the dtype of the
//! column it is compared with, so evaluation never fails. Evaluation follows three-valued logic:
//! comparisons involving a null cell are unknown, and unknown collapses to `false` only at the
//! mask boundary.

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnData, Frame};
use crate::io::infer::{parse_bool, parse_float, parse_int};
use crate::types::{parse_timestamp, DataType, Schema};

use super::ast::{CmpOp, Expr, Literal, Operand};

/// Literal coerced to a column's dtype.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Timestamp(i64),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(Option<bool>),
    BoolColumn(usize),
    CompareScalar {
        column: usize,
        op: CmpOp,
        rhs: Scalar,
    },
    CompareColumns {
        left: usize,
        op: CmpOp,
        right: usize,
    },
    InList {
        column: usize,
        set: Vec<Scalar>,
        has_null: bool,
        negated: bool,
    },
    IsNull {
        column: usize,
        negated: bool,
    },
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

/// An expression bound to a frame's columns.
///
/// It evaluates against any frame whose schema equals the one it was bound to; other frames are
/// rejected with a shape error.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundExpr {
    root: Node,
    schema: Schema,
}

impl Expr {
    /// Resolve columns and coerce literals against `frame`.
    ///
    /// Fails with `ColumnNotFound` for unknown columns and `TypeMismatch` for literals or column
    /// pairs that cannot be compared.
    pub fn bind(&self, frame: &Frame) -> EngineResult<BoundExpr> {
        Ok(BoundExpr {
            root: bind_node(self, frame)?,
            schema: frame.schema(),
        })
    }
}

impl BoundExpr {
    /// Three-valued truth of row `row`; `None` means unknown.
    pub fn truth(&self, frame: &Frame, row: usize) -> EngineResult<Option<bool>> {
        self.check(frame)?;
        if row >= frame.row_count() {
            return Err(EngineError::shape(format!(
                "row {row} out of bounds for a frame of {} rows",
                frame.row_count()
            )));
        }
        Ok(eval(&self.root, frame.columns(), row))
    }

    /// Collapsed mask over all rows (unknown becomes `false`).
    pub fn evaluate(&self, frame: &Frame) -> EngineResult<Vec<bool>> {
        self.check(frame)?;
        Ok(self.evaluate_range(frame, 0..frame.row_count()))
    }

    /// Collapsed mask over `rows` of a frame already accepted by [`Self::check`].
    pub(crate) fn evaluate_range(&self, frame: &Frame, rows: Range<usize>) -> Vec<bool> {
        let columns = frame.columns();
        rows.map(|r| eval(&self.root, columns, r).unwrap_or(false))
            .collect()
    }

    /// Fails unless `frame` has exactly the bound column names and dtypes.
    pub(crate) fn check(&self, frame: &Frame) -> EngineResult<()> {
        let same = frame.column_count() == self.schema.fields.len()
            && frame
                .columns()
                .iter()
                .zip(&self.schema.fields)
                .all(|(c, f)| c.name() == f.name && c.data_type() == f.data_type);
        if same {
            Ok(())
        } else {
            Err(EngineError::shape(format!(
                "expression was bound to columns {:?}, frame has {:?}",
                self.schema.field_names().collect::<Vec<_>>(),
                frame.column_names()
            )))
        }
    }
}

fn bind_node(expr: &Expr, frame: &Frame) -> EngineResult<Node> {
    match expr {
        Expr::Operand(Operand::Literal(lit)) => match lit {
            Literal::Bool(b) => Ok(Node::Const(Some(*b))),
            Literal::Null => Ok(Node::Const(None)),
            other => Err(EngineError::type_mismatch(format!(
                "literal {other} is not a boolean predicate"
            ))),
        },
        Expr::Operand(Operand::Column(name)) => {
            let idx = resolve(frame, name)?;
            let dt = frame.columns()[idx].data_type();
            if dt != DataType::Bool {
                return Err(EngineError::type_mismatch(format!(
                    "column '{name}' is {dt}, not Bool, and cannot be used as a predicate"
                )));
            }
            Ok(Node::BoolColumn(idx))
        }
        Expr::Compare { left, op, right } => bind_compare(left, *op, right, frame),
        Expr::InList {
            operand,
            list,
            negated,
        } => {
            let Operand::Column(name) = operand else {
                return Err(EngineError::type_mismatch(
                    "IN requires a column on its left-hand side",
                ));
            };
            let column = resolve(frame, name)?;
            let dt = frame.columns()[column].data_type();
            let mut set = Vec::with_capacity(list.len());
            let mut has_null = false;
            for lit in list {
                match coerce(lit, dt, name)? {
                    Scalar::Null => has_null = true,
                    s => set.push(s),
                }
            }
            Ok(Node::InList {
                column,
                set,
                has_null,
                negated: *negated,
            })
        }
        Expr::IsNull { operand, negated } => match operand {
            Operand::Column(name) => Ok(Node::IsNull {
                column: resolve(frame, name)?,
                negated: *negated,
            }),
            Operand::Literal(lit) => {
                let is_null = matches!(lit, Literal::Null);
                Ok(Node::Const(Some(is_null != *negated)))
            }
        },
        Expr::Not(inner) => Ok(Node::Not(Box::new(bind_node(inner, frame)?))),
        Expr::And(l, r) => Ok(Node::And(
            Box::new(bind_node(l, frame)?),
            Box::new(bind_node(r, frame)?),
        )),
        Expr::Or(l, r) => Ok(Node::Or(
            Box::new(bind_node(l, frame)?),
            Box::new(bind_node(r, frame)?),
        )),
    }
}

fn bind_compare(left: &Operand, op: CmpOp, right: &Operand, frame: &Frame) -> EngineResult<Node> {
    match (left, right) {
        (Operand::Column(l), Operand::Column(r)) => {
            let li = resolve(frame, l)?;
            let ri = resolve(frame, r)?;
            let (ldt, rdt) = (
                frame.columns()[li].data_type(),
                frame.columns()[ri].data_type(),
            );
            if ldt != rdt && !(ldt.is_numeric() && rdt.is_numeric()) {
                return Err(EngineError::type_mismatch(format!(
                    "cannot compare column '{l}' ({ldt}) with column '{r}' ({rdt})"
                )));
            }
            Ok(Node::CompareColumns {
                left: li,
                op,
                right: ri,
            })
        }
        (Operand::Column(name), Operand::Literal(lit)) => {
            column_vs_literal(frame, name, op, lit)
        }
        (Operand::Literal(lit), Operand::Column(name)) => {
            column_vs_literal(frame, name, op.flipped(), lit)
        }
        (Operand::Literal(a), Operand::Literal(b)) => Ok(Node::Const(compare_literals(a, op, b)?)),
    }
}

fn column_vs_literal(frame: &Frame, name: &str, op: CmpOp, lit: &Literal) -> EngineResult<Node> {
    let column = resolve(frame, name)?;
    let rhs = coerce(lit, frame.columns()[column].data_type(), name)?;
    if rhs == Scalar::Null {
        return Ok(Node::Const(None));
    }
    Ok(Node::CompareScalar { column, op, rhs })
}

fn resolve(frame: &Frame, name: &str) -> EngineResult<usize> {
    frame.column_index(name).ok_or_else(|| frame.not_found(name))
}

/// Coerce a literal to `dt`, the dtype of column `name`.
fn coerce(lit: &Literal, dt: DataType, name: &str) -> EngineResult<Scalar> {
    let scalar = match (dt, lit) {
        (_, Literal::Null) => Some(Scalar::Null),
        (DataType::Int64, Literal::Int(v)) => Some(Scalar::Int(*v)),
        (DataType::Int64, Literal::Float(v)) => Some(Scalar::Float(*v)),
        (DataType::Int64, Literal::Str(s)) => parse_int(s)
            .map(Scalar::Int)
            .or_else(|| parse_float(s).map(Scalar::Float)),
        (DataType::Float64, Literal::Int(v)) => Some(Scalar::Float(*v as f64)),
        (DataType::Float64, Literal::Float(v)) => Some(Scalar::Float(*v)),
        (DataType::Float64, Literal::Str(s)) => parse_float(s).map(Scalar::Float),
        (DataType::Bool, Literal::Bool(b)) => Some(Scalar::Bool(*b)),
        (DataType::Bool, Literal::Str(s)) => parse_bool(s).map(Scalar::Bool),
        (DataType::Utf8, Literal::Str(s)) => Some(Scalar::Str(s.clone())),
        (DataType::Timestamp, Literal::Str(s)) => parse_timestamp(s).map(Scalar::Timestamp),
        _ => None,
    };
    scalar.ok_or_else(|| {
        EngineError::type_mismatch(format!(
            "literal {lit} cannot be compared with column '{name}' of type {dt}"
        ))
    })
}

fn compare_literals(a: &Literal, op: CmpOp, b: &Literal) -> EngineResult<Option<bool>> {
    let ord = match (a, b) {
        (Literal::Null, _) | (_, Literal::Null) => return Ok(None),
        (Literal::Int(x), Literal::Int(y)) => Some(x.cmp(y)),
        (Literal::Int(x), Literal::Float(y)) => cmp_int_float(*x, *y),
        (Literal::Float(x), Literal::Int(y)) => cmp_int_float(*y, *x).map(Ordering::reverse),
        (Literal::Float(x), Literal::Float(y)) => x.partial_cmp(y),
        (Literal::Str(x), Literal::Str(y)) => Some(x.cmp(y)),
        (Literal::Bool(x), Literal::Bool(y)) => Some(x.cmp(y)),
        _ => {
            return Err(EngineError::type_mismatch(format!(
                "cannot compare literal {a} with literal {b}"
            )));
        }
    };
    Ok(ord.map(|o| op.holds(o)))
}

fn eval(node: &Node, columns: &[Column], row: usize) -> Option<bool> {
    match node {
        Node::Const(v) => *v,
        Node::BoolColumn(c) => {
            let col = &columns[*c];
            match col.data() {
                ColumnData::Bool(v) if !col.is_null(row) => Some(v[row]),
                _ => None,
            }
        }
        Node::CompareScalar { column, op, rhs } => {
            cmp_scalar(&columns[*column], row, rhs).map(|o| op.holds(o))
        }
        Node::CompareColumns { left, op, right } => {
            cmp_cells(&columns[*left], &columns[*right], row).map(|o| op.holds(o))
        }
        Node::InList {
            column,
            set,
            has_null,
            negated,
        } => {
            let col = &columns[*column];
            if col.is_null(row) {
                return None;
            }
            let found = set
                .iter()
                .any(|s| cmp_scalar(col, row, s) == Some(Ordering::Equal));
            let membership = if found {
                Some(true)
            } else if *has_null {
                None
            } else {
                Some(false)
            };
            if *negated {
                membership.map(|m| !m)
            } else {
                membership
            }
        }
        Node::IsNull { column, negated } => Some(columns[*column].is_null(row) != *negated),
        Node::Not(inner) => eval(inner, columns, row).map(|v| !v),
        Node::And(l, r) => match (eval(l, columns, row), eval(r, columns, row)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Node::Or(l, r) => match (eval(l, columns, row), eval(r, columns, row)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    }
}

fn cmp_scalar(col: &Column, row: usize, rhs: &Scalar) -> Option<Ordering> {
    if col.is_null(row) {
        return None;
    }
    match (col.data(), rhs) {
        (ColumnData::Int64(v), Scalar::Int(x)) => Some(v[row].cmp(x)),
        (ColumnData::Int64(v), Scalar::Float(x)) => cmp_int_float(v[row], *x),
        (ColumnData::Float64(v), Scalar::Float(x)) => v[row].partial_cmp(x),
        (ColumnData::Bool(v), Scalar::Bool(x)) => Some(v[row].cmp(x)),
        (ColumnData::Utf8(v), Scalar::Str(x)) => Some(v[row].as_str().cmp(x.as_str())),
        (ColumnData::Timestamp(v), Scalar::Timestamp(x)) => Some(v[row].cmp(x)),
        _ => None,
    }
}

fn cmp_cells(left: &Column, right: &Column, row: usize) -> Option<Ordering> {
    if left.is_null(row) || right.is_null(row) {
        return None;
    }
    match (left.data(), right.data()) {
        (ColumnData::Int64(a), ColumnData::Int64(b))
        | (ColumnData::Timestamp(a), ColumnData::Timestamp(b)) => Some(a[row].cmp(&b[row])),
        (ColumnData::Bool(a), ColumnData::Bool(b)) => Some(a[row].cmp(&b[row])),
        (ColumnData::Utf8(a), ColumnData::Utf8(b)) => Some(a[row].cmp(&b[row])),
        (ColumnData::Int64(a), ColumnData::Float64(b)) => cmp_int_float(a[row], b[row]),
        (ColumnData::Float64(a), ColumnData::Int64(b)) => {
            cmp_int_float(b[row], a[row]).map(Ordering::reverse)
        }
        _ => left.f64_at(row)?.partial_cmp(&right.f64_at(row)?),
    }
}

/// Exact ordering of an integer against a float, with no rounding of `i` through `f64`.
fn cmp_int_float(i: i64, x: f64) -> Option<Ordering> {
    // 2^63: the first float above every i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_nan() {
        return None;
    }
    if x >= LIMIT {
        return Some(Ordering::Less);
    }
    if x < -LIMIT {
        return Some(Ordering::Greater);
    }
    let floor = x.floor();
    match i.cmp(&(floor as i64)) {
        Ordering::Equal if x > floor => Some(Ordering::Less),
        ord => Some(ord),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::expr::parse;
    use crate::frame::{Column, Frame};

    fn frame() -> Frame {
        Frame::new(vec![
            Column::from_i64("x", vec![Some(1), Some(5), None, Some(10)]),
            Column::from_f64("y", vec![Some(1.0), Some(2.0), Some(3.0), None]),
            Column::from_strs("s", vec![Some("a"), Some("b"), None, Some("a")]),
            Column::from_bool("b", vec![Some(true), None, Some(false), Some(true)]),
            Column::from_timestamps(
                "t",
                vec![Some(0), Some(86_400_000_000), None, Some(172_800_000_000)],
            ),
        ])
        .unwrap()
    }

    fn mask(text: &str) -> Vec<bool> {
        let f = frame();
        parse(text).unwrap().bind(&f).unwrap().evaluate(&f).unwrap()
    }

    #[test]
    fn null_cells_never_match() {
        assert_eq!(mask("x > 1"), vec![false, true, false, true]);
        assert_eq!(mask("NOT (x > 1)"), vec![true, false, false, false]);
    }

    #[test]
    fn kleene_or_rescues_unknown() {
        assert_eq!(mask("x > 100 OR s = 'a'"), vec![true, false, false, true]);
        assert_eq!(mask("x IS NULL OR x < 2"), vec![true, false, true, false]);
    }

    #[test]
    fn literal_coercion() {
        assert_eq!(mask("x = 5.0"), vec![false, true, false, false]);
        assert_eq!(mask("x = '5'"), vec![false, true, false, false]);
        assert_eq!(mask("y >= 2"), vec![false, true, true, false]);
        assert_eq!(mask("b = 'yes'"), vec![true, false, false, true]);
        assert_eq!(mask("t >= '1970-01-02'"), vec![false, true, false, true]);
        assert_eq!(mask("1 < x"), vec![false, true, false, true]);
    }

    #[test]
    fn in_lists_with_nulls() {
        assert_eq!(mask("s IN ('a', 'z')"), vec![true, false, false, true]);
        assert_eq!(mask("s NOT IN ('a')"), vec![false, true, false, false]);
        assert_eq!(mask("s NOT IN ('a', NULL)"), vec![false, false, false, false]);
    }

    #[test]
    fn column_to_column() {
        assert_eq!(mask("x >= y"), vec![true, true, false, false]);
    }

    #[test]
    fn bool_column_as_predicate() {
        assert_eq!(mask("b"), vec![true, false, false, true]);
        assert_eq!(mask("NOT b"), vec![false, false, true, false]);
    }

    #[test]
    fn bind_errors() {
        let f = frame();
        let kind = |t: &str| parse(t).unwrap().bind(&f).unwrap_err().kind();
        assert_eq!(kind("nope > 1"), ErrorKind::ColumnNotFound);
        assert_eq!(kind("x = 'abc'"), ErrorKind::TypeMismatch);
        assert_eq!(kind("s > 1"), ErrorKind::TypeMismatch);
        assert_eq!(kind("s = x"), ErrorKind::TypeMismatch);
        assert_eq!(kind("t = 'not a date'"), ErrorKind::TypeMismatch);
        assert_eq!(kind("x"), ErrorKind::TypeMismatch);
        assert_eq!(kind("b = 1"), ErrorKind::TypeMismatch);
    }

    #[test]
    fn comparisons_with_null_literal_are_unknown() {
        assert_eq!(mask("x = NULL"), vec![false; 4]);
        assert_eq!(mask("NOT (x = NULL)"), vec![false; 4]);
    }

    #[test]
    fn large_integers_compare_exactly_against_floats() {
        let big = 9_007_199_254_740_993_i64; // 2^53 + 1
        let f = Frame::new(vec![
            Column::from_i64("n", vec![Some(big), Some(big - 1), Some(i64::MAX)]),
            Column::from_f64("g", vec![Some(9_007_199_254_740_992.0); 3]),
        ])
        .unwrap();
        let m = |t: &str| parse(t).unwrap().bind(&f).unwrap().evaluate(&f).unwrap();

        assert_eq!(m("n > 9007199254740992.0"), vec![true, false, true]);
        assert_eq!(m("n = 9007199254740992.0"), vec![false, true, false]);
        assert_eq!(m("n > g"), vec![true, false, true]);
        assert_eq!(m("g < n"), vec![true, false, true]);
        assert_eq!(m("n < 9223372036854775807.0"), vec![true, true, true]);
        assert_eq!(m("n >= 2.5"), vec![true, true, true]);
        assert_eq!(m("9007199254740993 > 9007199254740992.0"), vec![true; 3]);
    }

    #[test]
    fn bound_expression_rejects_other_schemas() {
        let f = frame();
        let bound = parse("x > 1").unwrap().bind(&f).unwrap();

        let narrow = Frame::new(vec![Column::from_i64("x", vec![Some(3)])]).unwrap();
        assert_eq!(bound.evaluate(&narrow).unwrap_err().kind(), ErrorKind::Shape);
        assert_eq!(bound.truth(&narrow, 0).unwrap_err().kind(), ErrorKind::Shape);
        assert_eq!(bound.truth(&f, 4).unwrap_err().kind(), ErrorKind::Shape);

        assert_eq!(bound.truth(&f, 1).unwrap(), Some(true));
        assert_eq!(bound.truth(&f, 2).unwrap(), None);
        let same = f.take(&[3, 0]).unwrap();
        assert_eq!(bound.evaluate(&same).unwrap(), vec![true, false]);
    }
}
