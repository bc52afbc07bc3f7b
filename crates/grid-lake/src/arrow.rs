//! Dynamic JSON rows to Arrow IPC encoding.
//!
//! The contract schema drives one typed column builder per declared column;
//! missing keys and JSON nulls become Arrow nulls. Dates land as `Date32`,
//! timestamps as microsecond UTC timestamps, so the published files are
//! Arrow-native rather than string-typed.
//!
//! Type mismatches here are hard errors: the quality gate runs before
//! publication, so a mismatch reaching this point is caller misuse, not
//! upstream drift.

use std::sync::Arc;

use arrow_array::builder::{
    BooleanBuilder, Date32Builder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_ipc::writer::FileWriter;
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::NaiveDate;
use grid_core::enums::SemanticType;
use grid_registry::ColumnSpec;
use serde_json::Value;

use crate::error::LakeError;

const UNIX_EPOCH_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(d) => d,
    None => panic!("invalid epoch date"),
};

/// Arrow field for one contract column. Every column is nullable; key
/// coverage is the quality gate's concern, not the encoder's.
fn field_for(column: &ColumnSpec) -> Field {
    let data_type = match column.ty {
        SemanticType::Str => DataType::Utf8,
        SemanticType::Int => DataType::Int64,
        SemanticType::Float => DataType::Float64,
        SemanticType::Bool => DataType::Boolean,
        SemanticType::Date => DataType::Date32,
        SemanticType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
    };
    Field::new(column.name.clone(), data_type, true)
}

/// Encode rows into a single-batch Arrow IPC file.
///
/// # Errors
///
/// Returns [`LakeError::Encode`] on a value incompatible with its declared
/// column type, or [`LakeError::Arrow`] on batch/IPC failures.
pub(crate) fn encode_ipc(columns: &[ColumnSpec], rows: &[Value]) -> Result<Vec<u8>, LakeError> {
    let fields: Vec<Field> = columns.iter().map(field_for).collect();
    let schema = Arc::new(Schema::new(fields));

    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|column| build_column(column, rows))
        .collect::<Result<_, _>>()?;

    let batch = RecordBatch::try_new(Arc::clone(&schema), arrays)?;

    let mut buf = Vec::new();
    {
        let mut writer = FileWriter::try_new(&mut buf, &schema)?;
        writer.write(&batch)?;
        writer.finish()?;
    }
    Ok(buf)
}

fn mismatch(column: &ColumnSpec, row: usize, value: &Value) -> LakeError {
    LakeError::Encode(format!(
        "column '{}' row {row}: expected {}, got {value}",
        column.name, column.ty
    ))
}

#[allow(clippy::too_many_lines)]
fn build_column(column: &ColumnSpec, rows: &[Value]) -> Result<ArrayRef, LakeError> {
    let cell = |row: &Value| row.get(&column.name).cloned().unwrap_or(Value::Null);

    match column.ty {
        SemanticType::Str => {
            let mut builder = StringBuilder::new();
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::String(s) => builder.append_value(s),
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        SemanticType::Int => {
            let mut builder = Int64Builder::new();
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::Number(n) => match n.as_i64() {
                        Some(v) => builder.append_value(v),
                        None => return Err(mismatch(column, i, &Value::Number(n))),
                    },
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        SemanticType::Float => {
            let mut builder = Float64Builder::new();
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::Number(n) => match n.as_f64() {
                        Some(v) => builder.append_value(v),
                        None => return Err(mismatch(column, i, &Value::Number(n))),
                    },
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        SemanticType::Bool => {
            let mut builder = BooleanBuilder::new();
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::Bool(b) => builder.append_value(b),
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        SemanticType::Date => {
            let mut builder = Date32Builder::new();
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::String(s) => {
                        let date = NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                            .map_err(|_| mismatch(column, i, &Value::String(s.clone())))?;
                        #[allow(clippy::cast_possible_truncation)]
                        let days = date.signed_duration_since(UNIX_EPOCH_DATE).num_days() as i32;
                        builder.append_value(days);
                    }
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        SemanticType::Timestamp => {
            let mut builder = TimestampMicrosecondBuilder::new().with_timezone("UTC");
            for (i, row) in rows.iter().enumerate() {
                match cell(row) {
                    Value::Null => builder.append_null(),
                    Value::String(s) => {
                        let ts = chrono::DateTime::parse_from_rfc3339(&s)
                            .map_err(|_| mismatch(column, i, &Value::String(s.clone())))?;
                        builder.append_value(ts.timestamp_micros());
                    }
                    other => return Err(mismatch(column, i, &other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Array, Date32Array, Int64Array, StringArray};
    use arrow_ipc::reader::FileReader;
    use serde_json::json;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("player_id", SemanticType::Str),
            ColumnSpec::new("week", SemanticType::Int),
            ColumnSpec::new("points", SemanticType::Float),
            ColumnSpec::new("active", SemanticType::Bool),
            ColumnSpec::new("game_date", SemanticType::Date),
        ]
    }

    fn read_back(bytes: &[u8]) -> RecordBatch {
        let mut reader = FileReader::try_new(std::io::Cursor::new(bytes.to_vec()), None).unwrap();
        reader.next().unwrap().unwrap()
    }

    #[test]
    fn roundtrips_typed_columns() {
        let rows = vec![
            json!({"player_id": "P1", "week": 5, "points": 21.4, "active": true, "game_date": "2024-10-01"}),
            json!({"player_id": "P2", "week": 5, "points": 3, "active": false, "game_date": null}),
        ];
        let bytes = encode_ipc(&columns(), &rows).unwrap();
        let batch = read_back(&bytes);

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 5);

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(ids.value(0), "P1");

        let weeks = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(weeks.value(1), 5);

        let dates = batch
            .column(4)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(dates.value(0), 19_997); // days from 1970-01-01 to 2024-10-01
        assert!(dates.is_null(1));
    }

    #[test]
    fn missing_keys_become_nulls() {
        let rows = vec![json!({"player_id": "P1"})];
        let bytes = encode_ipc(&columns(), &rows).unwrap();
        let batch = read_back(&bytes);
        assert!(batch.column(1).is_null(0));
        assert!(batch.column(4).is_null(0));
    }

    #[test]
    fn ints_accepted_as_floats_but_not_reverse() {
        let cols = vec![ColumnSpec::new("points", SemanticType::Float)];
        assert!(encode_ipc(&cols, &[json!({"points": 3})]).is_ok());

        let cols = vec![ColumnSpec::new("week", SemanticType::Int)];
        let err = encode_ipc(&cols, &[json!({"week": 3.5})]).unwrap_err();
        assert!(matches!(err, LakeError::Encode(_)));
    }

    #[test]
    fn bad_date_is_an_encode_error() {
        let cols = vec![ColumnSpec::new("d", SemanticType::Date)];
        let err = encode_ipc(&cols, &[json!({"d": "10/01/2024"})]).unwrap_err();
        assert!(matches!(err, LakeError::Encode(_)));
    }

    #[test]
    fn empty_batch_encodes() {
        let bytes = encode_ipc(&columns(), &[]).unwrap();
        let batch = read_back(&bytes);
        assert_eq!(batch.num_rows(), 0);
    }

    #[test]
    fn identical_rows_encode_identically() {
        let rows = vec![json!({"player_id": "P1", "week": 1, "points": 9.9, "active": true, "game_date": "2024-09-08"})];
        let a = encode_ipc(&columns(), &rows).unwrap();
        let b = encode_ipc(&columns(), &rows).unwrap();
        assert_eq!(a, b, "content addressing depends on deterministic encoding");
    }
}
