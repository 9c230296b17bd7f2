//! Shared coercion helpers.
//!
//! Every generated mapping function is a sequence of calls into this module:
//! one [object] call to get a [FieldView] of the input, then one call per
//! field to [scalar_field], [repeated_field] or [message_field]. Paths are
//! threaded through as plain strings (`value.amount[0].denom`) so an error
//! anywhere in the walk names the exact field that failed.

use crate::{
    error::{describe, CoerceError},
    kind::ScalarKind,
    value::Value,
};

use base64::Engine;
use serde_json::{Map, Value as Json};

/// Label used for the root of an error path when the caller supplies none.
pub const DEFAULT_LABEL: &str = "value";

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

const MAX_NANOS: i64 = 999_999_999;

/// What to do when a field is absent from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// A missing field is an error.
    Required,
    /// A missing field takes its kind's default value.
    OrDefault,
}

pub fn child_path(parent: &str, field: &str) -> String {
    format!("{}.{}", parent, field)
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// Read-only access to an input object that accepts either spelling of a
/// field name.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    fields: &'a Map<String, Json>,
}

impl<'a> FieldView<'a> {
    /// Looks up `camel` first, then `original`. `null` counts as absent.
    pub fn get(&self, camel: &str, original: &str) -> Option<&'a Json> {
        self.fields
            .get(camel)
            .filter(|v| !v.is_null())
            .or_else(|| self.fields.get(original).filter(|v| !v.is_null()))
    }
}

/// The input to a mapping function must be an object.
pub fn object<'a>(input: &'a Json, path: &str) -> Result<FieldView<'a>, CoerceError> {
    match input {
        Json::Object(fields) => Ok(FieldView { fields }),
        other => Err(CoerceError::wrong_kind(path, "object", other)),
    }
}

pub fn scalar_field(
    kind: ScalarKind,
    input: Option<&Json>,
    path: &str,
    policy: Policy,
) -> Result<Value, CoerceError> {
    match (input, policy) {
        (Some(value), _) => scalar(kind, value, path),
        (None, Policy::OrDefault) => Ok(Value::default_for(kind)),
        (None, Policy::Required) => Err(CoerceError::missing(path, kind.keyword())),
    }
}

/// Applies `item` to each element, threading `path[i]` into every call.
pub fn repeated_field<F>(
    input: Option<&Json>,
    path: &str,
    policy: Policy,
    expected: &str,
    mut item: F,
) -> Result<Value, CoerceError>
where
    F: FnMut(&Json, &str) -> Result<Value, CoerceError>,
{
    let items = match (input, policy) {
        (Some(Json::Array(items)), _) => items,
        (Some(other), _) => {
            return Err(CoerceError::wrong_kind(
                path,
                &format!("array of {}", expected),
                other,
            ))
        }
        (None, Policy::OrDefault) => return Ok(Value::Array(vec![])),
        (None, Policy::Required) => {
            return Err(CoerceError::missing(path, &format!("array of {}", expected)))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, value)| item(value, &index_path(path, i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Recurses into a nested message's mapping function.
pub fn message_field<F>(
    input: Option<&Json>,
    path: &str,
    policy: Policy,
    expected: &str,
    map: F,
) -> Result<Value, CoerceError>
where
    F: FnOnce(&Json, &str) -> Result<Value, CoerceError>,
{
    match (input, policy) {
        (Some(value), _) => map(value, path),
        (None, Policy::OrDefault) => Ok(Value::Null),
        (None, Policy::Required) => Err(CoerceError::missing(path, expected)),
    }
}

/// Coerces one present value to `kind`.
pub fn scalar(kind: ScalarKind, input: &Json, path: &str) -> Result<Value, CoerceError> {
    match kind {
        ScalarKind::String => match input {
            Json::String(s) => Ok(Value::String(s.clone())),
            other => Err(CoerceError::wrong_kind(path, "string", other)),
        },
        ScalarKind::Bytes => bytes(input, path).map(Value::Bytes),
        ScalarKind::Bool => match input {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(CoerceError::wrong_kind(path, "bool", other)),
        },
        ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 | ScalarKind::Enum => {
            let n = integer(input, path, kind)?;
            i32::try_from(n)
                .map(Value::Int32)
                .map_err(|_| out_of_range(path, kind, n))
        }
        ScalarKind::UInt32 | ScalarKind::Fixed32 => {
            let n = integer(input, path, kind)?;
            u32::try_from(n)
                .map(Value::UInt32)
                .map_err(|_| out_of_range(path, kind, n))
        }
        ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => {
            let n = integer(input, path, kind)?;
            i64::try_from(n)
                .map(Value::Int64)
                .map_err(|_| out_of_range(path, kind, n))
        }
        ScalarKind::UInt64 | ScalarKind::Fixed64 => {
            let n = integer(input, path, kind)?;
            u64::try_from(n)
                .map(Value::UInt64)
                .map_err(|_| out_of_range(path, kind, n))
        }
        ScalarKind::Float => {
            let f = float(input, path, kind)?;
            if f.abs() > f32::MAX as f64 {
                return Err(CoerceError::OutOfRange {
                    path:     path.to_string(),
                    expected: kind.keyword().to_string(),
                    value:    f.to_string(),
                });
            }
            Ok(Value::Float(f as f32))
        }
        ScalarKind::Double => float(input, path, kind).map(Value::Double),
        ScalarKind::Duration => {
            let (seconds, nanos) = seconds_and_nanos(input, path, kind)?;
            if (seconds > 0 && nanos < 0) || (seconds < 0 && nanos > 0) {
                return Err(CoerceError::InvalidDuration {
                    path:     path.to_string(),
                    expected: kind.keyword().to_string(),
                    reason:   format!(
                        "nanos {} must have the same sign as seconds {}",
                        nanos, seconds
                    ),
                });
            }
            Ok(Value::Duration { seconds, nanos })
        }
        ScalarKind::Timestamp => {
            let (seconds, nanos) = seconds_and_nanos(input, path, kind)?;
            Ok(Value::Timestamp { seconds, nanos })
        }
    }
}

/// Accepts a base64 string or an array of byte values.
fn bytes(input: &Json, path: &str) -> Result<Vec<u8>, CoerceError> {
    match input {
        Json::String(s) => base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(|_| CoerceError::InvalidBase64 {
                path:  path.to_string(),
                found: describe(input),
            }),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| CoerceError::wrong_kind(&index_path(path, i), "byte", item))
            })
            .collect(),
        other => Err(CoerceError::wrong_kind(path, "bytes", other)),
    }
}

/// Reads an integer from a JSON number or a decimal string.
///
/// Integral JSON numbers are exact. Fractional-form numbers (`42.0`) are
/// accepted only when integral, and for 64-bit kinds only inside the range a
/// double represents exactly.
fn integer(input: &Json, path: &str, kind: ScalarKind) -> Result<i128, CoerceError> {
    match input {
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i as i128);
            }
            if let Some(u) = n.as_u64() {
                return Ok(u as i128);
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(CoerceError::wrong_kind(path, kind.keyword(), input));
            }
            if f.abs() > MAX_SAFE_INTEGER {
                if kind.is_wide() {
                    return Err(CoerceError::OutOfRange {
                        path:     path.to_string(),
                        expected: format!("{} (unsafe integer, pass a string)", kind.keyword()),
                        value:    n.to_string(),
                    });
                }
                return Err(CoerceError::OutOfRange {
                    path:     path.to_string(),
                    expected: kind.keyword().to_string(),
                    value:    n.to_string(),
                });
            }
            Ok(f as i128)
        }
        Json::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix(&['-', '+'][..]).unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoerceError::wrong_kind(path, kind.keyword(), input));
            }
            trimmed.parse::<i128>().map_err(|_| CoerceError::OutOfRange {
                path:     path.to_string(),
                expected: kind.keyword().to_string(),
                value:    trimmed.to_string(),
            })
        }
        other => Err(CoerceError::wrong_kind(path, kind.keyword(), other)),
    }
}

fn float(input: &Json, path: &str, kind: ScalarKind) -> Result<f64, CoerceError> {
    match input {
        Json::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoerceError::wrong_kind(path, kind.keyword(), input)),
        Json::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| CoerceError::wrong_kind(path, kind.keyword(), input)),
        other => Err(CoerceError::wrong_kind(path, kind.keyword(), other)),
    }
}

/// Decomposes `{seconds, nanos}` and range-checks the nanosecond fraction.
fn seconds_and_nanos(
    input: &Json,
    path: &str,
    kind: ScalarKind,
) -> Result<(i64, i32), CoerceError> {
    let view = match input {
        Json::Object(fields) => FieldView { fields },
        other => {
            return Err(CoerceError::wrong_kind(
                path,
                &format!("{} object with seconds and nanos", kind.keyword()),
                other,
            ))
        }
    };

    let seconds_path = child_path(path, "seconds");
    let seconds = match view.get("seconds", "seconds") {
        Some(v) => integer(v, &seconds_path, ScalarKind::Int64)?,
        None => return Err(CoerceError::missing(&seconds_path, "int64")),
    };
    let seconds = i64::try_from(seconds)
        .map_err(|_| out_of_range(&seconds_path, ScalarKind::Int64, seconds))?;

    let nanos_path = child_path(path, "nanos");
    let nanos = match view.get("nanos", "nanos") {
        Some(v) => integer(v, &nanos_path, ScalarKind::Int32)?,
        None => return Err(CoerceError::missing(&nanos_path, "int32")),
    };
    if nanos < -(MAX_NANOS as i128) || nanos > MAX_NANOS as i128 {
        return Err(CoerceError::InvalidDuration {
            path:     path.to_string(),
            expected: kind.keyword().to_string(),
            reason:   format!(
                "nanos {} is outside [-{}, {}]",
                nanos, MAX_NANOS, MAX_NANOS
            ),
        });
    }

    Ok((seconds, nanos as i32))
}

fn out_of_range(path: &str, kind: ScalarKind, value: i128) -> CoerceError {
    CoerceError::OutOfRange {
        path:     path.to_string(),
        expected: kind.keyword().to_string(),
        value:    value.to_string(),
    }
}
