//! Columnar binary (Apache Parquet) reading and writing.
//!
//! Written files use one OPTIONAL leaf column per frame column, so definition levels carry the
//! null bitmap. Dtypes are recovered on read from each leaf's physical and converted type.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::basic::{Compression, ConvertedType, Repetition, Type as PhysicalType};
use parquet::data_type::{BoolType, ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter};
use parquet::record::Field as ParquetField;
use parquet::schema::types::{ColumnDescriptor, Type};

use crate::error::{EngineError, EngineResult};
use crate::frame::{Column, ColumnBuilder, ColumnData, Frame};
use crate::types::{DataType, Schema, Value};

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Read a Parquet file into a [`Frame`].
///
/// Only flat files are supported: every top-level field must be a primitive column.
pub fn read_parquet(path: impl AsRef<Path>) -> EngineResult<Frame> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    let (names, dtypes) = flat_columns(&reader)?;

    let mut builders: Vec<ColumnBuilder> = dtypes
        .iter()
        .map(|&dt| ColumnBuilder::with_capacity(dt, 0))
        .collect();

    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;
        for (i, (_, field)) in row.get_column_iter().enumerate() {
            let (Some(builder), Some(&dt)) = (builders.get_mut(i), dtypes.get(i)) else {
                return Err(EngineError::schema_mismatch(format!(
                    "row {row_num} has more fields than the file schema"
                )));
            };
            let value = convert_parquet_field(field, dt).map_err(|message| {
                EngineError::ParseError {
                    row: row_num,
                    column: names[i].clone(),
                    raw: field.to_string(),
                    message,
                }
            })?;
            builder
                .push(&value)
                .map_err(|message| EngineError::type_mismatch(message))?;
        }
    }

    let columns = builders
        .into_iter()
        .zip(names)
        .map(|(b, name)| b.finish(name))
        .collect::<EngineResult<Vec<_>>>()?;
    Frame::new(columns)
}

/// Schema of a Parquet file, from metadata only.
pub fn read_parquet_schema(path: impl AsRef<Path>) -> EngineResult<Schema> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    let (names, dtypes) = flat_columns(&reader)?;
    Ok(Schema::new(
        names
            .into_iter()
            .zip(dtypes)
            .map(|(n, dt)| crate::types::Field::new(n, dt))
            .collect(),
    ))
}

fn flat_columns<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> EngineResult<(Vec<String>, Vec<DataType>)> {
    let descr = reader.metadata().file_metadata().schema_descr();
    for field in descr.root_schema().get_fields() {
        if !field.is_primitive() {
            return Err(EngineError::schema_mismatch(format!(
                "nested column '{}' is not supported",
                field.name()
            )));
        }
    }
    let names = descr.columns().iter().map(|c| c.name().to_string()).collect();
    let dtypes = descr.columns().iter().map(|c| dtype_for_leaf(c)).collect();
    Ok((names, dtypes))
}

fn dtype_for_leaf(col: &ColumnDescriptor) -> DataType {
    match (col.physical_type(), col.converted_type()) {
        (
            _,
            ConvertedType::TIMESTAMP_MICROS | ConvertedType::TIMESTAMP_MILLIS | ConvertedType::DATE,
        ) => DataType::Timestamp,
        (PhysicalType::INT96, _) => DataType::Timestamp,
        (PhysicalType::BOOLEAN, _) => DataType::Bool,
        (PhysicalType::INT32 | PhysicalType::INT64, ConvertedType::DECIMAL) => DataType::Float64,
        (PhysicalType::INT32 | PhysicalType::INT64, _) => DataType::Int64,
        (PhysicalType::FLOAT | PhysicalType::DOUBLE, _) => DataType::Float64,
        _ => DataType::Utf8,
    }
}

fn convert_parquet_field(f: &ParquetField, data_type: DataType) -> Result<Value, String> {
    if matches!(f, ParquetField::Null) {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Bool => match f {
            ParquetField::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err("expected bool".to_string()),
        },
        DataType::Int64 => match f {
            ParquetField::Byte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Short(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Int(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Long(v) => Ok(Value::Int64(*v)),
            ParquetField::UByte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UShort(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UInt(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::ULong(v) => i64::try_from(*v)
                .map(Value::Int64)
                .map_err(|_| "u64 out of range for i64".to_string()),
            _ => Err("expected integer".to_string()),
        },
        DataType::Float64 => match f {
            ParquetField::Float(v) => Ok(Value::Float64(f64::from(*v))),
            ParquetField::Double(v) => Ok(Value::Float64(*v)),
            ParquetField::Decimal(_) => f
                .to_string()
                .parse()
                .map(Value::Float64)
                .map_err(|_| "unreadable decimal".to_string()),
            _ => Err("expected number".to_string()),
        },
        DataType::Timestamp => match f {
            ParquetField::TimestampMicros(v) => Ok(Value::Timestamp(*v)),
            ParquetField::TimestampMillis(v) => v
                .checked_mul(1_000)
                .map(Value::Timestamp)
                .ok_or_else(|| "timestamp out of range".to_string()),
            ParquetField::Date(days) => Ok(Value::Timestamp(i64::from(*days) * MICROS_PER_DAY)),
            _ => Err("expected timestamp".to_string()),
        },
        DataType::Utf8 => match f {
            ParquetField::Str(s) => Ok(Value::Utf8(s.clone())),
            ParquetField::Bytes(b) => Ok(Value::Utf8(String::from_utf8_lossy(b.data()).into_owned())),
            other => Ok(Value::Utf8(other.to_string())),
        },
    }
}

/// Write a frame as a Snappy-compressed Parquet file with a single row group.
pub fn write_parquet(frame: &Frame, path: impl AsRef<Path>) -> EngineResult<()> {
    if frame.column_count() == 0 {
        return Err(EngineError::schema_mismatch(
            "cannot write a frame without columns as parquet",
        ));
    }
    let schema = Arc::new(parquet_schema(frame)?);
    super::atomic::write_atomically(path.as_ref(), |file| write_parquet_to(frame, schema, file))
}

fn parquet_schema(frame: &Frame) -> EngineResult<Type> {
    let mut fields = Vec::with_capacity(frame.column_count());
    for c in frame.columns() {
        let (physical, converted) = match c.data_type() {
            DataType::Int64 => (PhysicalType::INT64, ConvertedType::NONE),
            DataType::Float64 => (PhysicalType::DOUBLE, ConvertedType::NONE),
            DataType::Bool => (PhysicalType::BOOLEAN, ConvertedType::NONE),
            DataType::Utf8 => (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8),
            DataType::Timestamp => (PhysicalType::INT64, ConvertedType::TIMESTAMP_MICROS),
        };
        let field = Type::primitive_type_builder(c.name(), physical)
            .with_repetition(Repetition::OPTIONAL)
            .with_converted_type(converted)
            .build()?;
        fields.push(Arc::new(field));
    }
    Ok(Type::group_type_builder("schema").with_fields(fields).build()?)
}

fn write_parquet_to(frame: &Frame, schema: Arc<Type>, file: &mut File) -> EngineResult<()> {
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build(),
    );
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    for column in frame.columns() {
        let Some(mut col_writer) = row_group.next_column()? else {
            return Err(EngineError::schema_mismatch(format!(
                "parquet writer has no slot for column '{}'",
                column.name()
            )));
        };
        write_column(&mut col_writer, column)?;
        col_writer.close()?;
    }
    row_group.close()?;
    writer.close()?;
    Ok(())
}

fn write_column(w: &mut SerializedColumnWriter<'_>, column: &Column) -> EngineResult<()> {
    let defs: Vec<i16> = column.validity().iter().map(i16::from).collect();
    let valid = |i: &usize| column.validity().get(*i);
    match column.data() {
        ColumnData::Int64(v) | ColumnData::Timestamp(v) => {
            let vals: Vec<i64> = (0..v.len()).filter(valid).map(|i| v[i]).collect();
            w.typed::<Int64Type>().write_batch(&vals, Some(&defs), None)?;
        }
        ColumnData::Float64(v) => {
            let vals: Vec<f64> = (0..v.len()).filter(valid).map(|i| v[i]).collect();
            w.typed::<DoubleType>().write_batch(&vals, Some(&defs), None)?;
        }
        ColumnData::Bool(v) => {
            let vals: Vec<bool> = (0..v.len()).filter(valid).map(|i| v[i]).collect();
            w.typed::<BoolType>().write_batch(&vals, Some(&defs), None)?;
        }
        ColumnData::Utf8(v) => {
            let vals: Vec<ByteArray> = (0..v.len())
                .filter(valid)
                .map(|i| ByteArray::from(v[i].as_str()))
                .collect();
            w.typed::<ByteArrayType>().write_batch(&vals, Some(&defs), None)?;
        }
    }
    Ok(())
}
