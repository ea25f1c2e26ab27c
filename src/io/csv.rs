//! Delimited-text (CSV) reading and writing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;
use crate::types::Schema;

use super::atomic::write_atomically;
use super::infer::column_from_text;

/// Options for reading and writing delimited text.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default `,`).
    pub delimiter: u8,
    /// When set, columns are parsed as these dtypes instead of being inferred, and the output
    /// holds exactly these columns in schema order.
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            schema: None,
        }
    }
}

/// Read a CSV file with a header row into a [`Frame`].
///
/// Rules:
///
/// - The first row names the columns.
/// - Every record must have as many fields as the header.
/// - Empty or whitespace-only fields are null.
/// - Without a schema each column's dtype is inferred from its values.
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> EngineResult<Frame> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .delimiter(options.delimiter)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr, options)
}

/// Read CSV data from an existing reader.
pub fn read_csv_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    options: &CsvOptions,
) -> EngineResult<Frame> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    // Data rows are reported 1-based, with the header as row 1.
    let first_row = 2;
    let columns = match &options.schema {
        None => headers
            .iter()
            .zip(&cells)
            .map(|(name, raw)| column_from_text(name, raw, None, first_row))
            .collect::<EngineResult<Vec<_>>>()?,
        Some(schema) => {
            let mut out = Vec::with_capacity(schema.fields.len());
            for field in &schema.fields {
                let idx = headers.iter().position(|h| *h == field.name).ok_or_else(|| {
                    EngineError::schema_mismatch(format!(
                        "missing required column '{}'. headers={headers:?}",
                        field.name
                    ))
                })?;
                out.push(column_from_text(
                    &field.name,
                    &cells[idx],
                    Some(field.data_type),
                    first_row,
                )?);
            }
            out
        }
    };

    Frame::new(columns)
}

/// Write a frame as CSV with a header row.
///
/// Nulls are written as empty fields, floats always carry a decimal point (or exponent) and
/// timestamps are rendered as `YYYY-MM-DD HH:MM:SS[.ffffff]`.
pub fn write_csv(frame: &Frame, path: impl AsRef<Path>, delimiter: u8) -> EngineResult<()> {
    write_atomically(path.as_ref(), |file| write_csv_to(frame, file, delimiter))
}

fn write_csv_to(frame: &Frame, file: &mut File, delimiter: u8) -> EngineResult<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(file);
    if frame.column_count() > 0 {
        w.write_record(frame.columns().iter().map(|c| c.name()))?;
    }
    for i in 0..frame.row_count() {
        w.write_record(frame.columns().iter().map(|c| c.value(i).to_string()))?;
    }
    w.flush()?;
    Ok(())
}
