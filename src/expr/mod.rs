//! Restricted boolean expression language used by `filter` and by `sql` validation rules.
//!
//! Supported:
//!
//! - literals: integers, floats, single-quoted strings (`''` escapes a quote), `TRUE`, `FALSE`,
//!   `NULL`, and a leading `-` on numbers
//! - column references: bare identifiers or double-quoted names (`"unit price"`)
//! - comparisons `= != < <= > >=` (also `==` and `<>`)
//! - `col [NOT] IN (lit, ...)` and `col IS [NOT] NULL`
//! - `NOT`, `AND`, `OR` (tightest to loosest) and parentheses
//!
//! Keywords are case-insensitive.
//!
//! ```rust
//! use dpa_engine::expr;
//! use dpa_engine::frame::{Column, Frame};
//!
//! let frame = Frame::new(vec![
//!     Column::from_i64("amount", vec![Some(5), Some(-2), None]),
//!     Column::from_strs("country", vec![Some("US"), Some("DE"), Some("US")]),
//! ])
//! .unwrap();
//!
//! let mask = expr::mask(&frame, "amount > 0 AND country = 'US'").unwrap();
//! assert_eq!(mask, vec![true, false, false]);
//! ```

pub mod ast;
mod eval;
mod lexer;
mod parser;

use crate::error::EngineResult;
use crate::frame::Frame;

pub use ast::{CmpOp, Expr, Literal, Operand};
pub use eval::BoundExpr;
pub use parser::parse;

/// Parse and bind `text` against `frame`.
pub fn compile(text: &str, frame: &Frame) -> EngineResult<BoundExpr> {
    parse(text)?.bind(frame)
}

/// Row mask of `text` over `frame`: `true` where the expression is true, `false` for false or unknown.
pub fn mask(frame: &Frame, text: &str) -> EngineResult<Vec<bool>> {
    compile(text, frame)?.evaluate(frame)
}
