//! Declared-schema check and schema declaration loading.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{EngineError, EngineResult};
use crate::frame::Frame;
use crate::types::{DataType, Field, Schema};

use super::{Severity, Violation};

/// Compare declared dtypes against `frame`.
///
/// Each mismatching or absent declared column yields an error violation named `schema:<column>`.
/// Frame columns the schema does not declare are ignored.
pub fn check_schema(frame: &Frame, schema: &Schema) -> Vec<Violation> {
    schema
        .fields
        .iter()
        .filter_map(|field| {
            let message = match frame.dtype(&field.name) {
                Ok(actual) if actual == field.data_type => return None,
                Ok(actual) => format!(
                    "column '{}' declared {} but inferred {}",
                    field.name, field.data_type, actual
                ),
                Err(_) => format!(
                    "column '{}' declared {} but not present",
                    field.name, field.data_type
                ),
            };
            Some(Violation {
                name: format!("schema:{}", field.name),
                column: field.name.clone(),
                severity: Severity::Error,
                message,
                row_count: 1,
                rows: Vec::new(),
            })
        })
        .collect()
}

/// Parse a schema declaration: a JSON object mapping column name to dtype name.
///
/// Declaration order is preserved.
pub fn parse_schema(text: &str) -> EngineResult<Schema> {
    let value: JsonValue = serde_json::from_str(text)?;
    let JsonValue::Object(map) = value else {
        return Err(EngineError::schema_mismatch(
            "schema declaration must be a JSON object of column -> dtype",
        ));
    };
    let fields = map
        .into_iter()
        .map(|(name, dtype)| match dtype {
            JsonValue::String(s) => Ok(Field::new(name, s.parse::<DataType>()?)),
            other => Err(EngineError::schema_mismatch(format!(
                "dtype for column '{name}' must be a string, got {other}"
            ))),
        })
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(Schema::new(fields))
}

/// Read and parse a schema declaration file.
pub fn load_schema(path: impl AsRef<Path>) -> EngineResult<Schema> {
    parse_schema(&fs::read_to_string(path)?)
}
