//! Conversion of raw BigQuery REST rows into JSON records.
//!
//! BigQuery's REST surface returns every scalar cell as a string, with the
//! column types carried separately in the result schema. [`rows_to_records`]
//! reunites the two into ordered column-name → typed-value records, which is
//! exactly what goes on the wire to HTTP callers.

use gcp_bigquery_client::model::field_type::FieldType;
use gcp_bigquery_client::model::table_field_schema::TableFieldSchema;
use gcp_bigquery_client::model::table_row::TableRow;
use gcp_bigquery_client::model::table_schema::TableSchema;
use indexmap::IndexMap;
use serde_json::Value;

use crate::client::BigQueryError;

/// One result row: column name → JSON value, in result-set column order.
pub type Record = IndexMap<String, Value>;

/// Convert raw REST rows into records using the result schema.
///
/// A missing schema is only an error when there are rows to interpret;
/// statements like DDL legitimately return neither.
pub fn rows_to_records(
    schema: Option<&TableSchema>,
    rows: &[TableRow],
) -> Result<Vec<Record>, BigQueryError> {
    let fields = match schema.and_then(|s| s.fields.as_ref()) {
        Some(fields) => fields,
        None if rows.is_empty() => return Ok(Vec::new()),
        None => {
            return Err(BigQueryError::Unexpected(
                "result rows returned without a schema".into(),
            ))
        }
    };

    rows.iter().map(|row| row_to_record(fields, row)).collect()
}

fn row_to_record(
    fields: &[TableFieldSchema],
    row: &TableRow,
) -> Result<Record, BigQueryError> {
    let cells = row.columns.as_deref().unwrap_or_default();
    if cells.len() != fields.len() {
        return Err(BigQueryError::Unexpected(format!(
            "row has {} cells but the schema declares {} columns",
            cells.len(),
            fields.len()
        )));
    }

    let mut record = Record::with_capacity(fields.len());
    for (field, cell) in fields.iter().zip(cells) {
        let value = match cell.value.as_ref() {
            Some(v) => convert_value(field, v),
            None => Value::Null,
        };
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}

/// REPEATED fields arrive as arrays of `{"v": ...}` wrappers, RECORDs as
/// nested `{"f": [...]}` objects, and scalars as strings. Unparseable values
/// fall back to the raw string rather than failing the whole row.
fn convert_value(field: &TableFieldSchema, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    if field.mode.as_deref() == Some("REPEATED") {
        let items = match value.as_array() {
            Some(items) => items,
            None => return value.clone(),
        };
        return Value::Array(
            items
                .iter()
                .map(|item| {
                    let inner = item.get("v").unwrap_or(item);
                    convert_scalar(field, inner)
                })
                .collect(),
        );
    }

    convert_scalar(field, value)
}

fn convert_scalar(field: &TableFieldSchema, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match field.r#type {
        FieldType::Record | FieldType::Struct => {
            let sub_fields = field.fields.as_deref().unwrap_or_default();
            let cells = value
                .get("f")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut nested = serde_json::Map::new();
            for (sub_field, cell) in sub_fields.iter().zip(cells) {
                let inner = cell.get("v").unwrap_or(cell);
                nested.insert(sub_field.name.clone(), convert_value(sub_field, inner));
            }
            Value::Object(nested)
        }
        _ => match value.as_str() {
            Some(text) => convert_text(field, text),
            None => value.clone(),
        },
    }
}

fn convert_text(field: &TableFieldSchema, text: &str) -> Value {
    match field.r#type {
        FieldType::Integer | FieldType::Int64 => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        FieldType::Float | FieldType::Float64 => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        FieldType::Boolean | FieldType::Bool => match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        FieldType::Json => serde_json::from_str(text)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        // Strings, bytes, numerics, timestamps, dates, geography: passed
        // through exactly as BigQuery returned them.
        _ => Value::String(text.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
