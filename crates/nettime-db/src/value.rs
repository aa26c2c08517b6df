//! Conversions between JSON rows and SQLite values.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde_json::{Map, Number, Value};

use crate::error::{DbError, DbResult};

/// A row keyed by column name.
pub type Row = Map<String, Value>;

pub(crate) fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect()),
    }
}

pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        nested => SqlValue::Text(nested.to_string()),
    }
}

/// Quote a table or column name after checking it is a plain identifier.
///
/// `schema.table` is accepted and each part quoted separately; deeper
/// nesting is not.
pub(crate) fn quote_ident(name: &str) -> DbResult<String> {
    if name.matches('.').count() > 1 {
        return Err(DbError::InvalidIdentifier(name.to_string()));
    }

    let parts = name
        .split('.')
        .map(|part| {
            let mut chars = part.chars();
            let valid = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
            if valid {
                Ok(format!("\"{part}\""))
            } else {
                Err(DbError::InvalidIdentifier(name.to_string()))
            }
        })
        .collect::<DbResult<Vec<_>>>()?;

    Ok(parts.join("."))
}
