//! Schema and rule validation.
//!
//! Validation is collect-all: every declared column and every rule is checked and the findings are
//! merged into one [`ValidationReport`]. Violations are data, not errors; an `Err` from
//! [`validate()`] means the declarations themselves are unusable (unknown column, malformed range,
//! bad expression).

mod rules;
mod schema;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::frame::Frame;
use crate::types::Schema;

pub use rules::{check_rule, load_rules, parse_rules, Rule, RuleType};
pub use schema::{check_schema, load_schema, parse_schema};

/// Severity of a violation. Only `Error` makes a report invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One violation record: a failed schema declaration or a rule with at least one flagged row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Rule name, or `schema:<column>` for schema violations.
    pub name: String,
    pub column: String,
    pub severity: Severity,
    pub message: String,
    /// Flagged rows (1 for a schema violation).
    pub row_count: usize,
    /// Flagged row indices, ascending. Empty for schema violations.
    pub rows: Vec<usize>,
}

/// Outcome of [`validate()`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Flagged rows summed over error-severity records.
    pub error_count: usize,
    /// Flagged rows summed over warning-severity records.
    pub warning_count: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// `true` when no error-severity violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// Sorted, de-duplicated rows carrying at least one error-severity rule violation.
    pub fn error_rows(&self) -> Vec<usize> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .flat_map(|v| v.rows.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        match violation.severity {
            Severity::Error => self.error_count += violation.row_count,
            Severity::Warning => self.warning_count += violation.row_count,
        }
        self.violations.push(violation);
    }
}

/// Check `frame` against an optional declared schema and a list of rules.
///
/// Schema violations come first (in declaration order), then rule violations (in rule order).
/// Rules with no flagged rows produce no record.
pub fn validate(
    frame: &Frame,
    schema: Option<&Schema>,
    rules: &[Rule],
) -> EngineResult<ValidationReport> {
    let mut report = ValidationReport::default();
    if let Some(schema) = schema {
        for v in check_schema(frame, schema) {
            report.push(v);
        }
    }
    for rule in rules {
        if let Some(v) = check_rule(frame, rule)? {
            report.push(v);
        }
    }
    Ok(report)
}
