//! In-memory tabular store.
//!
//! A [`Frame`] is an ordered list of equally long, uniquely named [`Column`]s. Frames are never
//! mutated after construction; every row- or column-level operation returns a new frame.

mod bitmap;
mod column;

use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};
use crate::types::{DataType, Field, Schema, Value};

pub use bitmap::Bitmap;
pub use column::{Column, ColumnBuilder, ColumnData, GroupKey};

/// Immutable columnar table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    rows: usize,
}

impl Frame {
    /// Build a frame from columns.
    ///
    /// Fails with a shape error when column lengths differ or a name appears twice.
    pub fn new(columns: Vec<Column>) -> EngineResult<Self> {
        let rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::with_capacity(columns.len());
        for c in &columns {
            if c.len() != rows {
                return Err(EngineError::shape(format!(
                    "column '{}' has {} rows, expected {rows}",
                    c.name(),
                    c.len()
                )));
            }
            if !seen.insert(c.name()) {
                return Err(EngineError::shape(format!(
                    "duplicate column name '{}'",
                    c.name()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> EngineResult<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| self.not_found(name))
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Column by position.
    pub fn column_at(&self, i: usize) -> Option<&Column> {
        self.columns.get(i)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `true` when the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Schema describing the columns.
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Field::new(c.name(), c.data_type()))
                .collect(),
        )
    }

    /// Data type of a column.
    pub fn dtype(&self, name: &str) -> EngineResult<DataType> {
        self.column(name).map(Column::data_type)
    }

    /// Scalar at (`row`, `column`). Out-of-range rows read as [`Value::Null`].
    pub fn value(&self, row: usize, column: &str) -> EngineResult<Value> {
        Ok(self.column(column)?.value(row))
    }

    /// All values of row `i`, in column order.
    pub fn row(&self, i: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value(i)).collect()
    }

    /// New frame with rows `indices`, in that order. Indices may repeat.
    pub fn take(&self, indices: &[usize]) -> EngineResult<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.rows) {
            return Err(EngineError::shape(format!(
                "row index {bad} out of range for {} rows",
                self.rows
            )));
        }
        Ok(self.take_unchecked(indices))
    }

    pub(crate) fn take_unchecked(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            rows: indices.len(),
        }
    }

    /// Rows whose mask entry is `true`, original order.
    pub fn filter_mask(&self, mask: &[bool]) -> EngineResult<Self> {
        if mask.len() != self.rows {
            return Err(EngineError::shape(format!(
                "mask length {} does not match {} rows",
                mask.len(),
                self.rows
            )));
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(self.take_unchecked(&indices))
    }

    /// `len` rows starting at `offset`, clamped to the frame.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let start = offset.min(self.rows);
        let end = start.saturating_add(len).min(self.rows);
        let indices: Vec<usize> = (start..end).collect();
        self.take_unchecked(&indices)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        self.slice(0, n)
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        let n = n.min(self.rows);
        self.slice(self.rows - n, n)
    }

    /// Exactly the named columns, in the requested order, with the row count unchanged.
    ///
    /// Unknown names fail with `ColumnNotFound`; repeated names fail with a shape error. An empty
    /// list yields a frame with no columns that still reports this frame's row count.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> EngineResult<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.column(name.as_ref())?.clone());
        }
        if columns.is_empty() {
            return Ok(Self {
                columns,
                rows: self.rows,
            });
        }
        Self::new(columns)
    }

    pub(crate) fn not_found(&self, name: &str) -> EngineError {
        EngineError::ColumnNotFound {
            column: name.to_string(),
            available: self.column_names(),
        }
    }
}
