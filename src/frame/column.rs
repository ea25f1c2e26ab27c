//! Typed, dtype-homogeneous column storage.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::types::{DataType, Value};

use super::bitmap::Bitmap;

/// Cell storage for one column. Null slots hold the type's default value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// 64-bit signed integers.
    Int64(Vec<i64>),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// Booleans.
    Bool(Vec<bool>),
    /// UTF-8 strings.
    Utf8(Vec<String>),
    /// Microseconds since the Unix epoch (UTC).
    Timestamp(Vec<i64>),
}

impl ColumnData {
    /// Logical type of the storage.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int64(_) => DataType::Int64,
            Self::Float64(_) => DataType::Float64,
            Self::Bool(_) => DataType::Bool,
            Self::Utf8(_) => DataType::Utf8,
            Self::Timestamp(_) => DataType::Timestamp,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Int64(v) | Self::Timestamp(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Utf8(v) => v.len(),
        }
    }

    /// `true` when there are no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::Int64(v) => Self::Int64(indices.iter().map(|&i| v[i]).collect()),
            Self::Float64(v) => Self::Float64(indices.iter().map(|&i| v[i]).collect()),
            Self::Bool(v) => Self::Bool(indices.iter().map(|&i| v[i]).collect()),
            Self::Utf8(v) => Self::Utf8(indices.iter().map(|&i| v[i].clone()).collect()),
            Self::Timestamp(v) => Self::Timestamp(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Hashable identity of a cell, used for grouping (strata, group-by, join keys).
///
/// Floats are keyed by bit pattern, so `0.0` and `-0.0` are distinct groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Null cell.
    Null,
    /// Integer or timestamp cell.
    Int(i64),
    /// Float cell, by bit pattern.
    Float(u64),
    /// Boolean cell.
    Bool(bool),
    /// String cell.
    Str(String),
}

/// A named, typed column with a null bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
    validity: Bitmap,
    null_count: usize,
}

impl Column {
    /// Create a column from storage and an optional validity bitmap (`None` means no nulls).
    ///
    /// Fails with a shape error if the bitmap length differs from the data length.
    pub fn new(
        name: impl Into<String>,
        data: ColumnData,
        validity: Option<Bitmap>,
    ) -> EngineResult<Self> {
        let name = name.into();
        let validity = validity.unwrap_or_else(|| Bitmap::new_valid(data.len()));
        if validity.len() != data.len() {
            return Err(EngineError::shape(format!(
                "column '{name}' has {} values but a validity bitmap of {}",
                data.len(),
                validity.len()
            )));
        }
        let null_count = validity.count_unset();
        Ok(Self {
            name,
            data,
            validity,
            null_count,
        })
    }

    /// Build a column of `data_type` from scalar values; [`Value::Null`] becomes a null cell.
    ///
    /// `Int64` values are accepted into a `Float64` column; any other mismatch is a type error.
    pub fn from_values(
        name: impl Into<String>,
        data_type: DataType,
        values: &[Value],
    ) -> EngineResult<Self> {
        let name = name.into();
        let mut builder = ColumnBuilder::with_capacity(data_type, values.len());
        for v in values {
            builder.push(v).map_err(|message| {
                EngineError::type_mismatch(format!("column '{name}': {message}"))
            })?;
        }
        builder.finish(name)
    }

    /// Int64 column from optional values.
    pub fn from_i64(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let (data, validity): (Vec<i64>, Bitmap) = split_options(values);
        Self::assemble(name.into(), ColumnData::Int64(data), validity)
    }

    /// Float64 column from optional values.
    pub fn from_f64(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let (data, validity): (Vec<f64>, Bitmap) = split_options(values);
        Self::assemble(name.into(), ColumnData::Float64(data), validity)
    }

    /// Bool column from optional values.
    pub fn from_bool(name: impl Into<String>, values: impl IntoIterator<Item = Option<bool>>) -> Self {
        let (data, validity): (Vec<bool>, Bitmap) = split_options(values);
        Self::assemble(name.into(), ColumnData::Bool(data), validity)
    }

    /// String column from optional values.
    pub fn from_strs<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        let (data, validity): (Vec<String>, Bitmap) =
            split_options(values.into_iter().map(|v| v.map(Into::into)));
        Self::assemble(name.into(), ColumnData::Utf8(data), validity)
    }

    /// Timestamp column from optional microseconds since the epoch.
    pub fn from_timestamps(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<i64>>,
    ) -> Self {
        let (data, validity): (Vec<i64>, Bitmap) = split_options(values);
        Self::assemble(name.into(), ColumnData::Timestamp(data), validity)
    }

    fn assemble(name: String, data: ColumnData, validity: Bitmap) -> Self {
        let null_count = validity.count_unset();
        Self {
            name,
            data,
            validity,
            null_count,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column data type.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Underlying typed storage.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Validity bitmap.
    pub fn validity(&self) -> &Bitmap {
        &self.validity
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Whether row `i` is null.
    pub fn is_null(&self, i: usize) -> bool {
        !self.validity.get(i)
    }

    /// Scalar value at row `i` ([`Value::Null`] for null or out-of-range rows).
    pub fn value(&self, i: usize) -> Value {
        if self.is_null(i) {
            return Value::Null;
        }
        match &self.data {
            ColumnData::Int64(v) => Value::Int64(v[i]),
            ColumnData::Float64(v) => Value::Float64(v[i]),
            ColumnData::Bool(v) => Value::Bool(v[i]),
            ColumnData::Utf8(v) => Value::Utf8(v[i].clone()),
            ColumnData::Timestamp(v) => Value::Timestamp(v[i]),
        }
    }

    /// Numeric view of row `i` for Int64/Float64 columns; `None` for nulls and other types.
    pub fn f64_at(&self, i: usize) -> Option<f64> {
        if self.is_null(i) {
            return None;
        }
        match &self.data {
            ColumnData::Int64(v) => Some(v[i] as f64),
            ColumnData::Float64(v) => Some(v[i]),
            _ => None,
        }
    }

    /// Grouping key of row `i`.
    pub fn key(&self, i: usize) -> GroupKey {
        if self.is_null(i) {
            return GroupKey::Null;
        }
        match &self.data {
            ColumnData::Int64(v) | ColumnData::Timestamp(v) => GroupKey::Int(v[i]),
            ColumnData::Float64(v) => GroupKey::Float(v[i].to_bits()),
            ColumnData::Bool(v) => GroupKey::Bool(v[i]),
            ColumnData::Utf8(v) => GroupKey::Str(v[i].clone()),
        }
    }

    /// New column holding rows `indices` in that order. Indices must be in range.
    pub fn take(&self, indices: &[usize]) -> Self {
        let validity: Bitmap = indices.iter().map(|&i| self.validity.get(i)).collect();
        Self::assemble(self.name.clone(), self.data.take(indices), validity)
    }

    /// Same cells under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Row indices grouped by cell value, groups in order of first appearance.
    ///
    /// Null cells form their own group.
    pub fn groups(&self) -> Vec<(GroupKey, Vec<usize>)> {
        let mut slots: HashMap<GroupKey, usize> = HashMap::new();
        let mut out: Vec<(GroupKey, Vec<usize>)> = Vec::new();
        for i in 0..self.len() {
            let key = self.key(i);
            match slots.get(&key) {
                Some(&slot) => out[slot].1.push(i),
                None => {
                    slots.insert(key.clone(), out.len());
                    out.push((key, vec![i]));
                }
            }
        }
        out
    }
}

fn split_options<T: Default>(values: impl IntoIterator<Item = Option<T>>) -> (Vec<T>, Bitmap) {
    let mut data = Vec::new();
    let mut validity = Bitmap::default();
    for v in values {
        validity.push(v.is_some());
        data.push(v.unwrap_or_default());
    }
    (data, validity)
}

/// Incremental column builder used by loaders and by row-level operations.
#[derive(Debug)]
pub struct ColumnBuilder {
    data: ColumnData,
    validity: Bitmap,
}

impl ColumnBuilder {
    /// Start an empty column of `data_type`.
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Self {
        let data = match data_type {
            DataType::Int64 => ColumnData::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => ColumnData::Float64(Vec::with_capacity(capacity)),
            DataType::Bool => ColumnData::Bool(Vec::with_capacity(capacity)),
            DataType::Utf8 => ColumnData::Utf8(Vec::with_capacity(capacity)),
            DataType::Timestamp => ColumnData::Timestamp(Vec::with_capacity(capacity)),
        };
        Self {
            data,
            validity: Bitmap::default(),
        }
    }

    /// Append a null cell.
    pub fn push_null(&mut self) {
        match &mut self.data {
            ColumnData::Int64(v) | ColumnData::Timestamp(v) => v.push(0),
            ColumnData::Float64(v) => v.push(0.0),
            ColumnData::Bool(v) => v.push(false),
            ColumnData::Utf8(v) => v.push(String::new()),
        }
        self.validity.push(false);
    }

    /// Append a scalar. Returns a description of the mismatch if `value` does not fit.
    pub fn push(&mut self, value: &Value) -> Result<(), String> {
        match (&mut self.data, value) {
            (_, Value::Null) => {
                self.push_null();
                return Ok(());
            }
            (ColumnData::Int64(v), Value::Int64(x)) => v.push(*x),
            (ColumnData::Float64(v), Value::Float64(x)) => v.push(*x),
            (ColumnData::Float64(v), Value::Int64(x)) => v.push(*x as f64),
            (ColumnData::Bool(v), Value::Bool(x)) => v.push(*x),
            (ColumnData::Utf8(v), Value::Utf8(x)) => v.push(x.clone()),
            (ColumnData::Timestamp(v), Value::Timestamp(x)) => v.push(*x),
            (data, other) => {
                return Err(format!(
                    "cannot store {other:?} in a {} column",
                    data.data_type()
                ));
            }
        }
        self.validity.push(true);
        Ok(())
    }

    /// Finish into a named column.
    pub fn finish(self, name: impl Into<String>) -> EngineResult<Column> {
        Column::new(name, self.data, Some(self.validity))
    }
}
