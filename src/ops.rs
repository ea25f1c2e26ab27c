//! Path-level operations: load, run one engine operation, write the result.
//!
//! These are the entry points a CLI or scripting binding calls. Every function takes explicit
//! output paths (see [`crate::config::EngineConfig`] for default substitution). Output paths are
//! checked before any input is read, and argument errors are raised before anything is written.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;
use crate::io::{self, parquet::read_parquet_schema, Format};
use crate::processing;
use crate::profile::{self, Profile, ProfileOptions};
use crate::sampling::{self, SampleMethod};
use crate::types::Schema;
use crate::validation::{self, ValidationReport};

/// Load `input` and write it to `output`, formats chosen by extension.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> EngineResult<Frame> {
    writable_format(output.as_ref())?;
    io::convert(input, output)
}

/// Project `columns` (in that order) from `input` into `output`.
pub fn select_to_path<S: AsRef<str>>(
    input: impl AsRef<Path>,
    columns: &[S],
    output: impl AsRef<Path>,
) -> EngineResult<Frame> {
    writable_format(output.as_ref())?;
    require_columns(columns)?;
    let frame = processing::select(&io::load(input)?, columns)?;
    io::save(&frame, output)?;
    Ok(frame)
}

/// Filter `input` by `where_expr`, optionally project, and write `output`.
pub fn filter_to_path(
    input: impl AsRef<Path>,
    where_expr: &str,
    select: Option<&[&str]>,
    output: impl AsRef<Path>,
) -> EngineResult<Frame> {
    writable_format(output.as_ref())?;
    if let Some(names) = select {
        require_columns(names)?;
    }
    let frame = processing::filter(&io::load(input)?, where_expr, select)?;
    io::save(&frame, output)?;
    Ok(frame)
}

/// Profile `input`.
pub fn profile_path(input: impl AsRef<Path>, options: &ProfileOptions) -> EngineResult<Profile> {
    Ok(profile::profile(&io::load(input)?, options))
}

/// Validate `input` against optional schema and rules declaration files.
///
/// With `error_rows_output`, rows carrying error-severity rule violations are written there
/// (in original order), even when there are none.
pub fn validate_path(
    input: impl AsRef<Path>,
    schema: Option<&Path>,
    rules: Option<&Path>,
    error_rows_output: Option<&Path>,
) -> EngineResult<ValidationReport> {
    if let Some(out) = error_rows_output {
        writable_format(out)?;
    }
    let schema = schema.map(validation::load_schema).transpose()?;
    let rules = rules.map(validation::load_rules).transpose()?.unwrap_or_default();
    let frame = io::load(input)?;
    let report = validation::validate(&frame, schema.as_ref(), &rules)?;
    if let Some(out) = error_rows_output {
        io::save(&frame.take(&report.error_rows())?, out)?;
    }
    Ok(report)
}

/// Sample `input` and write the rows to `output`.
pub fn sample_to_path(
    input: impl AsRef<Path>,
    method: SampleMethod,
    size: usize,
    stratify: Option<&str>,
    seed: Option<u64>,
    output: impl AsRef<Path>,
) -> EngineResult<Frame> {
    writable_format(output.as_ref())?;
    let frame = sampling::sample(&io::load(input)?, method, size, stratify, seed)?;
    io::save(&frame, output)?;
    Ok(frame)
}

/// Split `input` into `train` and `test` files. Returns `(train_rows, test_rows)`.
///
/// Either both files are written or neither is: the train file is staged beside its target and
/// only moved into place after the test file was saved.
pub fn split_to_paths(
    input: impl AsRef<Path>,
    train: impl AsRef<Path>,
    test: impl AsRef<Path>,
    test_fraction: f64,
    stratify: Option<&str>,
    seed: Option<u64>,
) -> EngineResult<(usize, usize)> {
    let (train, test) = (train.as_ref(), test.as_ref());
    let train_format = writable_format(train)?;
    writable_format(test)?;
    let (train_frame, test_frame) =
        sampling::split(&io::load(input)?, test_fraction, stratify, seed)?;

    let staged = io::staged_path(train)?;
    io::save_as(&train_frame, &staged, train_format)?;
    io::save(&test_frame, test)?;
    if let Err(e) = staged.persist(train) {
        let _ = fs::remove_file(test);
        return Err(EngineError::Io(e.error));
    }
    Ok((train_frame.row_count(), test_frame.row_count()))
}

/// Column names and dtypes of `input`.
///
/// Parquet schemas come from file metadata; text formats are loaded and inferred.
pub fn schema_of_path(input: impl AsRef<Path>) -> EngineResult<Schema> {
    let input = input.as_ref();
    match Format::from_path(input)? {
        Format::Parquet => read_parquet_schema(input),
        Format::Csv | Format::Json => Ok(io::load(input)?.schema()),
    }
}

/// First `n` rows of `input`.
pub fn head_of_path(input: impl AsRef<Path>, n: usize) -> EngineResult<Frame> {
    Ok(io::load(input)?.head(n))
}

/// A file needs at least one column to hold its rows.
fn require_columns<S: AsRef<str>>(columns: &[S]) -> EngineResult<()> {
    if columns.is_empty() {
        return Err(EngineError::argument(
            "projection must name at least one column",
        ));
    }
    Ok(())
}

fn writable_format(path: &Path) -> EngineResult<Format> {
    match Format::from_path(path)? {
        Format::Json => Err(EngineError::argument(format!(
            "cannot write json output ({}); use .csv or .parquet",
            path.display()
        ))),
        format => Ok(format),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::writable_format;
    use crate::error::ErrorKind;
    use crate::io::Format;

    #[test]
    fn output_formats() {
        assert_eq!(writable_format(Path::new("a.csv")).unwrap(), Format::Csv);
        assert_eq!(writable_format(Path::new("a.pq")).unwrap(), Format::Parquet);
        assert_eq!(
            writable_format(Path::new("a.json")).unwrap_err().kind(),
            ErrorKind::Argument
        );
        assert_eq!(
            writable_format(Path::new("a.txt")).unwrap_err().kind(),
            ErrorKind::Parse
        );
    }
}
