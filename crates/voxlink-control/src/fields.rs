use serde_json::{Map, Value};

use crate::error::{ControlMessageError, Result};

pub(crate) fn as_object<'a>(value: &'a Value, field: &'static str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or(ControlMessageError::TypeMismatch {
        field,
        expected: "an object",
    })
}

pub(crate) fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
    obj.get(field).ok_or(ControlMessageError::MissingField(field))
}

pub(crate) fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a str> {
    required(obj, field)?
        .as_str()
        .ok_or(ControlMessageError::TypeMismatch {
            field,
            expected: "a string",
        })
}

pub(crate) fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or(ControlMessageError::TypeMismatch {
                field,
                expected: "a string",
            }),
    }
}

pub(crate) fn optional_u32(obj: &Map<String, Value>, field: &'static str) -> Result<Option<u32>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or(ControlMessageError::TypeMismatch {
                field,
                expected: "an unsigned 32-bit integer",
            }),
    }
}

pub(crate) fn optional_bool(obj: &Map<String, Value>, field: &'static str) -> Result<Option<bool>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or(ControlMessageError::TypeMismatch {
                field,
                expected: "a boolean",
            }),
    }
}
