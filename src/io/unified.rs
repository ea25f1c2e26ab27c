//! Format-dispatching load/save entry points.
//!
//! - If [`IoOptions::format`] is `None`, the format is inferred from the file extension.
//! - If an [`IoObserver`] is provided, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;
use crate::types::Schema;

use super::csv::{read_csv, write_csv, CsvOptions};
use super::json::read_json;
use super::observability::{IoContext, IoObserver, IoOperation, IoSeverity, IoStats};
use super::parquet::{read_parquet, write_parquet};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated values.
    Csv,
    /// Apache Parquet.
    Parquet,
    /// JSON array-of-objects or NDJSON (read-only).
    Json,
}

impl Format {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                EngineError::schema_mismatch(format!(
                    "cannot infer format: path has no extension ({})",
                    path.display()
                ))
            })?;

        Self::from_extension(ext).ok_or_else(|| {
            EngineError::schema_mismatch(format!(
                "cannot infer format from extension '{ext}' for path ({})",
                path.display()
            ))
        })
    }
}

/// Options controlling load/save behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IoOptions {
    /// If `None`, detect the format from the file extension.
    pub format: Option<Format>,
    /// Declared dtypes for text formats (CSV/JSON); disables inference when set.
    pub schema: Option<Schema>,
    /// CSV field delimiter.
    pub delimiter: u8,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IoObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IoSeverity,
}

impl fmt::Debug for IoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoOptions")
            .field("format", &self.format)
            .field("schema", &self.schema)
            .field("delimiter", &(self.delimiter as char))
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            format: None,
            schema: None,
            delimiter: b',',
            observer: None,
            alert_at_or_above: IoSeverity::Critical,
        }
    }
}

impl IoOptions {
    fn resolve_format(&self, path: &Path) -> EngineResult<Format> {
        match self.format {
            Some(f) => Ok(f),
            None => Format::from_path(path),
        }
    }

    fn report(&self, ctx: IoContext, outcome: Result<(usize, usize), &EngineError>) {
        let Some(obs) = self.observer.as_ref() else {
            return;
        };
        match outcome {
            Ok((rows, columns)) => obs.on_success(&ctx, IoStats { rows, columns }),
            Err(e) => {
                let sev = IoSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= self.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }
}

/// Load a file into a [`Frame`], choosing the format by extension.
///
/// ```no_run
/// use dpa_engine::io::load;
///
/// # fn main() -> Result<(), dpa_engine::EngineError> {
/// let frame = load("transactions.csv")?;
/// println!("rows={} columns={}", frame.row_count(), frame.column_count());
/// # Ok(())
/// # }
/// ```
pub fn load(path: impl AsRef<Path>) -> EngineResult<Frame> {
    load_with(path, &IoOptions::default())
}

/// Load a file with explicit options.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use std::sync::Arc;
///
/// use dpa_engine::io::{load_with, IoOptions, IoSeverity, StdErrObserver};
/// use dpa_engine::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), dpa_engine::EngineError> {
/// let opts = IoOptions {
///     schema: Some(Schema::new(vec![Field::new("id", DataType::Int64)])),
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: IoSeverity::Critical,
///     ..Default::default()
/// };
/// let frame = load_with("people.csv", &opts)?;
/// # let _ = frame;
/// # Ok(())
/// # }
/// ```
pub fn load_with(path: impl AsRef<Path>, options: &IoOptions) -> EngineResult<Frame> {
    let path = path.as_ref();
    let format = options.resolve_format(path)?;

    let result = match format {
        Format::Csv => read_csv(
            path,
            &CsvOptions {
                delimiter: options.delimiter,
                schema: options.schema.clone(),
            },
        ),
        Format::Parquet => read_parquet(path),
        Format::Json => read_json(path, options.schema.as_ref()),
    };

    let ctx = IoContext {
        path: path.to_path_buf(),
        format,
        operation: IoOperation::Load,
    };
    options.report(
        ctx,
        result.as_ref().map(|f| (f.row_count(), f.column_count())),
    );
    result
}

/// Save a frame, choosing the format by extension.
pub fn save(frame: &Frame, path: impl AsRef<Path>) -> EngineResult<()> {
    save_with(frame, path, &IoOptions::default())
}

/// Save a frame in an explicit format, regardless of the path's extension.
pub fn save_as(frame: &Frame, path: impl AsRef<Path>, format: Format) -> EngineResult<()> {
    save_with(
        frame,
        path,
        &IoOptions {
            format: Some(format),
            ..Default::default()
        },
    )
}

/// Save a frame with explicit options. The write is atomic.
pub fn save_with(frame: &Frame, path: impl AsRef<Path>, options: &IoOptions) -> EngineResult<()> {
    let path = path.as_ref();
    let format = options.resolve_format(path)?;

    let result = match format {
        Format::Csv => write_csv(frame, path, options.delimiter),
        Format::Parquet => write_parquet(frame, path),
        Format::Json => Err(EngineError::schema_mismatch(
            "writing json is not supported; use .csv or .parquet",
        )),
    };

    let ctx = IoContext {
        path: path.to_path_buf(),
        format,
        operation: IoOperation::Save,
    };
    options.report(
        ctx,
        result.as_ref().map(|_| (frame.row_count(), frame.column_count())),
    );
    result
}

/// Load `input` and save it to `output`, each format chosen by extension.
///
/// Returns the converted frame.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> EngineResult<Frame> {
    let frame = load(input)?;
    save(&frame, output)?;
    Ok(frame)
}
