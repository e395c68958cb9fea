use serde_json::Value;
use std::borrow::Cow;

use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::{Record, ID_FIELD};

/// Converts a JSON value into a record. Only objects are records.
pub fn into_record(value: Value) -> JsonDbResult<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => {
            log::error!("Expected a JSON object as record, found {}", type_name(&other));
            Err(JsonDbError::new(
                &format!("A record must be a JSON object, found {}", type_name(&other)),
                ErrorKind::InvalidOperation,
            ))
        }
    }
}

/// Borrows the fields of a set-clause.
pub(crate) fn set_clause_fields(set_clause: &Value) -> JsonDbResult<&Record> {
    match set_clause {
        Value::Object(fields) => Ok(fields),
        other => {
            log::error!("SET clause should be an object, found {}", type_name(other));
            Err(JsonDbError::new(
                "SET clause should be an object.",
                ErrorKind::InvalidOperation,
            ))
        }
    }
}

/// Shallow merge: each field of the set-clause replaces the record's field.
/// The record id is never overwritten.
pub fn merge_set_clause(record: &mut Record, set_fields: &Record) {
    for (key, value) in set_fields {
        if key == ID_FIELD {
            continue;
        }
        record.insert(key.clone(), value.clone());
    }
}

/// Text a search keyword is matched against: strings as they are, anything
/// else as its JSON text.
pub fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
