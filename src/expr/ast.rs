//! Parsed (unbound) where-expression tree.

use std::cmp::Ordering;
use std::fmt;

use crate::types::format_float;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=` / `==`
    Eq,
    /// `!=` / `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CmpOp {
    /// Canonical operator text.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    /// Whether `left <op> right` holds given `left.cmp(right)`.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::NotEq => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::LtEq => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::GtEq => ord != Ordering::Less,
        }
    }

    /// The operator with its operands swapped (`1 < x` is `x > 1`).
    pub fn flipped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            other => other,
        }
    }
}

/// Literal as written in the expression, before coercion to a column dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Single-quoted string.
    Str(String),
    /// `TRUE` / `FALSE`.
    Bool(bool),
    /// `NULL`.
    Null,
}

/// Renders expression text that parses back to the same literal.
///
/// Floats always carry a point or exponent. Infinities render as `1e999` / `-1e999`, which parse
/// to infinity. NaN has no literal form and renders as `NULL`: both make every comparison unknown.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_nan() => f.write_str("NULL"),
            Self::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "1e999" } else { "-1e999" })
            }
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

/// Operand of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Column reference.
    Column(String),
    /// Literal value.
    Literal(Literal),
}

/// Boolean expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bare operand used as a predicate (a Bool column or a boolean/null literal).
    Operand(Operand),
    /// `left <op> right`.
    Compare {
        /// Left operand.
        left: Operand,
        /// Operator.
        op: CmpOp,
        /// Right operand.
        right: Operand,
    },
    /// `operand [NOT] IN (lit, ...)`.
    InList {
        /// Tested operand.
        operand: Operand,
        /// Candidate literals.
        list: Vec<Literal>,
        /// `NOT IN`.
        negated: bool,
    },
    /// `operand IS [NOT] NULL`.
    IsNull {
        /// Tested operand.
        operand: Operand,
        /// `IS NOT NULL`.
        negated: bool,
    },
    /// `NOT expr`.
    Not(Box<Expr>),
    /// `left AND right`.
    And(Box<Expr>, Box<Expr>),
    /// `left OR right`.
    Or(Box<Expr>, Box<Expr>),
}
