//! Named validation rules: `range` bounds and `sql` where-expressions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::expr;
use crate::frame::{Column, Frame};
use crate::io::infer::parse_float;

use super::{Severity, Violation};

/// How a rule's `expression` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// `"lo,hi"`: values outside the inclusive interval are flagged.
    Range,
    /// Where-expression: rows where it is not true are flagged.
    Sql,
}

/// A rule as declared in a rules file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub column: String,
    pub rule_type: RuleType,
    pub expression: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Severity,
}

/// Evaluate one rule over every row of `frame`.
///
/// Returns `None` when no row is flagged.
pub fn check_rule(frame: &Frame, rule: &Rule) -> EngineResult<Option<Violation>> {
    let column = frame.column(&rule.column)?;
    let (rows, default_message) = match rule.rule_type {
        RuleType::Range => {
            let (lo, hi) = parse_range(&rule.expression)?;
            (
                out_of_range(column, lo, hi)?,
                format!("{} outside [{}, {}]", rule.column, lo, hi),
            )
        }
        RuleType::Sql => {
            let mask = expr::mask(frame, &rule.expression)?;
            (
                mask.iter()
                    .enumerate()
                    .filter_map(|(i, keep)| (!keep).then_some(i))
                    .collect(),
                format!("expression not satisfied: {}", rule.expression),
            )
        }
    };
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(Violation {
        name: rule.name.clone(),
        column: rule.column.clone(),
        severity: rule.severity,
        message: rule.message.clone().unwrap_or(default_message),
        row_count: rows.len(),
        rows,
    }))
}

/// Parse `"lo,hi"` into inclusive bounds.
fn parse_range(text: &str) -> EngineResult<(f64, f64)> {
    let Some((lo_raw, hi_raw)) = text.split_once(',') else {
        return Err(EngineError::syntax(
            0,
            format!("range expression '{text}' must be \"lo,hi\""),
        ));
    };
    let bound = |raw: &str, position: usize| {
        parse_float(raw.trim())
            .filter(|v| !v.is_nan())
            .ok_or_else(|| EngineError::syntax(position, format!("invalid range bound '{}'", raw.trim())))
    };
    let lo = bound(lo_raw, 0)?;
    let hi = bound(hi_raw, lo_raw.len() + 1)?;
    if lo > hi {
        return Err(EngineError::syntax(
            0,
            format!("range lower bound {lo} exceeds upper bound {hi}"),
        ));
    }
    Ok((lo, hi))
}

fn out_of_range(column: &Column, lo: f64, hi: f64) -> EngineResult<Vec<usize>> {
    if !column.data_type().is_numeric() {
        return Err(EngineError::type_mismatch(format!(
            "range rule needs a numeric column; '{}' is {}",
            column.name(),
            column.data_type()
        )));
    }
    Ok((0..column.len())
        .filter(|&i| column.f64_at(i).is_some_and(|x| !(lo..=hi).contains(&x)))
        .collect())
}

/// Parse a rules declaration: a JSON array of rule objects.
pub fn parse_rules(text: &str) -> EngineResult<Vec<Rule>> {
    Ok(serde_json::from_str(text)?)
}

/// Read and parse a rules declaration file.
pub fn load_rules(path: impl AsRef<Path>) -> EngineResult<Vec<Rule>> {
    parse_rules(&fs::read_to_string(path)?)
}
