//! Group-by aggregation on a single key column.

use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnBuilder, Frame};
use crate::types::{DataType, Value};

use super::reduce::{reduce_column, ReduceOp};

/// Aggregation applied to each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// `sum_<col>`: sum of non-null values (numeric columns).
    Sum,
    /// `mean_<col>`: mean of non-null values as `Float64` (numeric columns).
    Mean,
    /// `count_<col>`: number of non-null values (any column).
    Count,
}

impl AggFunc {
    fn prefix(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
        }
    }

    fn reduce_op(self) -> ReduceOp {
        match self {
            Self::Sum => ReduceOp::Sum,
            Self::Mean => ReduceOp::Mean,
            Self::Count => ReduceOp::Count,
        }
    }

    fn output_type(self, input: DataType) -> DataType {
        match self {
            Self::Sum => input,
            Self::Mean => DataType::Float64,
            Self::Count => DataType::Int64,
        }
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for AggFunc {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "mean" | "avg" => Ok(Self::Mean),
            "count" => Ok(Self::Count),
            other => Err(EngineError::argument(format!(
                "unknown aggregation '{other}' (expected sum, mean or count)"
            ))),
        }
    }
}

/// One requested output column: `func` applied to `column`, named `<func>_<column>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Source column.
    pub column: String,
    /// Aggregation function.
    pub func: AggFunc,
}

impl Aggregation {
    /// Create an aggregation.
    pub fn new(func: AggFunc, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            func,
        }
    }

    /// Output column name.
    pub fn output_name(&self) -> String {
        format!("{}_{}", self.func, self.column)
    }
}

/// Group `frame` by `group_by` and compute `aggs` per group.
///
/// Output: the key column followed by one column per aggregation, one row per distinct key, in
/// order of first appearance. Null keys form their own group.
pub fn aggregate(frame: &Frame, group_by: &str, aggs: &[Aggregation]) -> EngineResult<Frame> {
    if aggs.is_empty() {
        return Err(EngineError::argument(
            "no aggregations provided; use sum, mean or count",
        ));
    }
    let key = frame.column(group_by)?;
    let sources = aggs
        .iter()
        .map(|a| {
            let c = frame.column(&a.column)?;
            if a.func != AggFunc::Count && !c.data_type().is_numeric() {
                return Err(EngineError::type_mismatch(format!(
                    "{} requires a numeric column; '{}' is {}",
                    a.func,
                    c.name(),
                    c.data_type()
                )));
            }
            Ok(c)
        })
        .collect::<EngineResult<Vec<&Column>>>()?;

    let groups = key.groups();
    let firsts: Vec<usize> = groups.iter().map(|(_, rows)| rows[0]).collect();
    let mut columns = vec![key.take(&firsts)];

    for (agg, source) in aggs.iter().zip(&sources) {
        let mut builder = ColumnBuilder::with_capacity(
            agg.func.output_type(source.data_type()),
            groups.len(),
        );
        for (_, rows) in &groups {
            let value: Value = reduce_column(&source.take(rows), agg.func.reduce_op())?;
            builder.push(&value).map_err(EngineError::type_mismatch)?;
        }
        columns.push(builder.finish(agg.output_name())?);
    }

    Frame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::{aggregate, AggFunc, Aggregation};
    use crate::error::ErrorKind;
    use crate::frame::{Column, Frame};
    use crate::types::Value;

    fn sales() -> Frame {
        Frame::new(vec![
            Column::from_strs("region", vec![Some("eu"), Some("us"), Some("eu"), None]),
            Column::from_i64("units", vec![Some(1), Some(2), Some(3), Some(4)]),
            Column::from_f64("price", vec![Some(1.0), None, Some(2.0), Some(8.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let out = aggregate(
            &sales(),
            "region",
            &[
                Aggregation::new(AggFunc::Sum, "units"),
                Aggregation::new(AggFunc::Mean, "price"),
                Aggregation::new(AggFunc::Count, "price"),
            ],
        )
        .unwrap();
        assert_eq!(
            out.column_names(),
            vec!["region", "sum_units", "mean_price", "count_price"]
        );
        assert_eq!(out.row_count(), 3);
        assert_eq!(
            out.row(0),
            vec![
                Value::Utf8("eu".into()),
                Value::Int64(4),
                Value::Float64(1.5),
                Value::Int64(2)
            ]
        );
        assert_eq!(
            out.row(1),
            vec![Value::Utf8("us".into()), Value::Int64(2), Value::Null, Value::Int64(0)]
        );
        assert_eq!(out.value(2, "region").unwrap(), Value::Null);
    }

    #[test]
    fn rejects_empty_or_non_numeric() {
        assert_eq!(
            aggregate(&sales(), "region", &[]).unwrap_err().kind(),
            ErrorKind::Argument
        );
        assert_eq!(
            aggregate(&sales(), "units", &[Aggregation::new(AggFunc::Sum, "region")])
                .unwrap_err()
                .kind(),
            ErrorKind::TypeMismatch
        );
    }
}
