//! JSON reading.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Columns follow key first-appearance order across all rows; a key missing from a row is null.
//! Scalars go through the same text inference as CSV; nested arrays/objects are kept as JSON text.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;
use crate::types::Schema;

use super::infer::column_from_text;

/// Read a JSON/NDJSON file into a [`Frame`].
pub fn read_json(path: impl AsRef<Path>, schema: Option<&Schema>) -> EngineResult<Frame> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text, schema)
}

/// Read JSON/NDJSON text into a [`Frame`].
pub fn read_json_from_str(input: &str, schema: Option<&Schema>) -> EngineResult<Frame> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::schema_mismatch("json input is empty"));
    }

    let values = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(v @ serde_json::Value::Object(_)) => vec![v],
        Ok(_) => {
            return Err(EngineError::schema_mismatch(
                "json must be an object, an array of objects, or NDJSON",
            ));
        }
        Err(_) => parse_ndjson(trimmed)?,
    };
    frame_from_objects(&values, schema)
}

fn parse_ndjson(input: &str) -> EngineResult<Vec<serde_json::Value>> {
    let mut values = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
            EngineError::schema_mismatch(format!("invalid ndjson at line {}: {e}", i + 1))
        })?;
        values.push(v);
    }
    Ok(values)
}

fn frame_from_objects(values: &[serde_json::Value], schema: Option<&Schema>) -> EngineResult<Frame> {
    let mut names: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<String>> = Vec::new();

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| {
            EngineError::schema_mismatch(format!("row {row_num} is not a json object"))
        })?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
                cells.push(vec![String::new(); idx0]);
            }
        }
        for (name, column) in names.iter().zip(cells.iter_mut()) {
            column.push(obj.get(name).map(cell_text).unwrap_or_default());
        }
    }

    let columns = match schema {
        None => names
            .iter()
            .zip(&cells)
            .map(|(name, raw)| column_from_text(name, raw, None, 1))
            .collect::<EngineResult<Vec<_>>>()?,
        Some(schema) => {
            let mut out = Vec::with_capacity(schema.fields.len());
            for field in &schema.fields {
                let idx = names.iter().position(|n| *n == field.name).ok_or_else(|| {
                    EngineError::schema_mismatch(format!(
                        "missing required field '{}'",
                        field.name
                    ))
                })?;
                out.push(column_from_text(
                    &field.name,
                    &cells[idx],
                    Some(field.data_type),
                    1,
                )?);
            }
            out
        }
    };
    Frame::new(columns)
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
