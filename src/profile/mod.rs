//! Single-pass frame profiling.
//!
//! [`profile()`] walks every column once, counting nulls and (in detailed mode) accumulating
//! running numeric statistics. The result renders to the flat string map consumed by bindings via
//! [`Profile::to_map`].

use std::collections::BTreeMap;

use crate::frame::{Column, ColumnData, Frame};
use crate::types::{format_float, DataType};

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Profiling knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Profile only the first `n` rows. The frame is truncated, not re-sampled.
    pub sample_size: Option<usize>,
    /// Compute min/max/mean/std for numeric columns.
    pub detailed: bool,
}

impl ProfileOptions {
    /// Detailed profile over every row.
    pub fn detailed() -> Self {
        Self {
            sample_size: None,
            detailed: true,
        }
    }

    pub(crate) fn rows_for(&self, frame: &Frame) -> usize {
        match self.sample_size {
            Some(n) => n.min(frame.row_count()),
            None => frame.row_count(),
        }
    }
}

/// Welford accumulator for mean/variance with running min/max.
#[derive(Debug, Clone, Copy)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    /// Fold one observation in. NaN is ignored.
    pub fn update(&mut self, x: f64) {
        if x.is_nan() {
            return;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Number of observations folded in.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample variance; 0 for fewer than two observations.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Summary, or `None` when nothing was observed.
    pub fn finish(&self) -> Option<NumericStats> {
        (self.count > 0).then(|| NumericStats {
            min: self.min,
            max: self.max,
            mean: self.mean,
            std: self.variance().sqrt(),
        })
    }
}

/// Numeric summary of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
}

/// Per-column profile entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: DataType,
    pub null_count: usize,
    /// Estimated in-memory footprint in bytes over the profiled rows.
    pub bytes: usize,
    /// Present only for Int64/Float64 columns in detailed mode with at least one value.
    pub stats: Option<NumericStats>,
}

/// Result of [`profile()`].
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
    pub detailed: bool,
}

impl Profile {
    pub(crate) fn from_columns(rows: usize, columns: Vec<ColumnProfile>, detailed: bool) -> Self {
        Self {
            rows,
            columns,
            detailed,
        }
    }

    /// Number of profiled columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total null cells across all columns.
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    /// Nulls as a percentage of all cells; 0 for an empty frame.
    pub fn null_percentage(&self) -> f64 {
        let cells = self.rows * self.columns.len();
        if cells == 0 {
            return 0.0;
        }
        self.total_nulls() as f64 / cells as f64 * 100.0
    }

    /// Estimated memory in megabytes.
    pub fn memory_mb(&self) -> f64 {
        self.columns.iter().map(|c| c.bytes).sum::<usize>() as f64 / BYTES_PER_MB
    }

    /// Entry for `name`, if profiled.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Flat string rendering.
    ///
    /// Keys: `rows`, `columns`, `memory_mb`, `null_percentage`, `dtype:<col>`, `nulls:<col>` and,
    /// in detailed mode, `min:<col>`, `max:<col>`, `mean:<col>`, `std:<col>` for numeric columns
    /// that hold at least one value.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("rows".to_string(), self.rows.to_string());
        map.insert("columns".to_string(), self.columns.len().to_string());
        map.insert("memory_mb".to_string(), format_float(self.memory_mb()));
        map.insert(
            "null_percentage".to_string(),
            format_float(self.null_percentage()),
        );
        for c in &self.columns {
            map.insert(format!("dtype:{}", c.name), c.data_type.to_string());
            map.insert(format!("nulls:{}", c.name), c.null_count.to_string());
            if let Some(s) = c.stats.filter(|_| self.detailed) {
                map.insert(format!("min:{}", c.name), format_float(s.min));
                map.insert(format!("max:{}", c.name), format_float(s.max));
                map.insert(format!("mean:{}", c.name), format_float(s.mean));
                map.insert(format!("std:{}", c.name), format_float(s.std));
            }
        }
        map
    }
}

/// Profile `frame` sequentially.
///
/// See [`crate::execution::ExecutionEngine::profile`] for the parallel column scan; both produce
/// the same [`Profile`].
pub fn profile(frame: &Frame, options: &ProfileOptions) -> Profile {
    let rows = options.rows_for(frame);
    let columns = frame
        .columns()
        .iter()
        .map(|c| profile_column(c, rows, options.detailed))
        .collect();
    Profile::from_columns(rows, columns, options.detailed)
}

/// Scan the first `rows` cells of one column.
pub(crate) fn profile_column(column: &Column, rows: usize, detailed: bool) -> ColumnProfile {
    let rows = rows.min(column.len());
    let null_count = if rows == column.len() {
        column.null_count()
    } else {
        (0..rows).filter(|&i| column.is_null(i)).count()
    };

    let mut bytes = column.data_type().byte_width() * rows;
    if let ColumnData::Utf8(values) = column.data() {
        bytes += (0..rows)
            .filter(|&i| !column.is_null(i))
            .map(|i| values[i].len())
            .sum::<usize>();
    }

    let stats = if detailed && column.data_type().is_numeric() {
        let mut acc = RunningStats::default();
        for i in 0..rows {
            if let Some(x) = column.f64_at(i) {
                acc.update(x);
            }
        }
        acc.finish()
    } else {
        None
    };

    ColumnProfile {
        name: column.name().to_string(),
        data_type: column.data_type(),
        null_count,
        bytes,
        stats,
    }
}
