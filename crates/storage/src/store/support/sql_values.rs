#![forbid(unsafe_code)]

use rusqlite::types::Value;
use tp_core::model::FieldValue;

pub(in crate::store) fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(value) => Value::Integer(*value),
        FieldValue::Text(value) => Value::Text(value.clone()),
    }
}

pub(in crate::store) fn from_sql_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Integer(value) => FieldValue::Integer(value),
        // Columns are declared INTEGER or TEXT; reals only appear through raw writes.
        Value::Real(value) => FieldValue::Integer(value as i64),
        Value::Text(value) => FieldValue::Text(value),
        Value::Blob(bytes) => FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
