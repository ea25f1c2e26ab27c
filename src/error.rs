use std::error::Error as StdError;

use thiserror::Error;

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type returned by every engine operation.
///
/// This is a single error enum shared across loading, saving, expression evaluation, validation
/// and sampling. Use [`EngineError::kind`] to classify an error into the engine's taxonomy.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying I/O error (e.g. file not found, permission denied, write failure).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Columnar binary (Parquet) reader/writer error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON error (JSON ingestion, schema/rules declarations).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the structure the operation requires (missing declared columns,
    /// unsupported nested layout, unknown extension, ...).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Malformed where-expression, range expression or dtype name.
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A referenced column does not exist.
    #[error("column '{column}' not found. available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// Columns of unequal length or colliding names.
    #[error("shape error: {message}")]
    Shape { message: String },

    /// A literal or column could not be coerced to the type an operation needs.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// Invalid argument (unknown sampling method, missing stratify column, bad fraction/size).
    #[error("invalid argument: {message}")]
    Argument { message: String },
}

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing/unreadable file or write failure.
    Io,
    /// Malformed text, binary structure, expression or declaration.
    Parse,
    /// Referenced column is absent.
    ColumnNotFound,
    /// Unequal column lengths or duplicate names.
    Shape,
    /// Coercion failure.
    TypeMismatch,
    /// Invalid caller-supplied argument.
    Argument,
}

impl EngineError {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Classify this error.
    ///
    /// Reader/writer errors that wrap an I/O failure are reported as [`ErrorKind::Io`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => ErrorKind::Io,
                _ => ErrorKind::Parse,
            },
            Self::Parquet(err) => {
                if error_chain_contains_io(err) {
                    ErrorKind::Io
                } else {
                    ErrorKind::Parse
                }
            }
            Self::Json(err) => {
                if err.is_io() {
                    ErrorKind::Io
                } else {
                    ErrorKind::Parse
                }
            }
            Self::SchemaMismatch { .. } | Self::ParseError { .. } | Self::Syntax { .. } => {
                ErrorKind::Parse
            }
            Self::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            Self::Shape { .. } => ErrorKind::Shape,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Argument { .. } => ErrorKind::Argument,
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
