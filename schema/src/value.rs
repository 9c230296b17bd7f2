use crate::{
    bb::{ByteBufferMut, WireType},
    error::CoerceError,
    kind::ScalarKind,
    schema::{Field, FieldType, Schema},
};

use std::collections::BTreeMap;
use std::fmt;

/// A coerced, schema-exact value.
///
/// Produced by the coercion helpers from untyped input and consumed by
/// [Schema::encode](struct.Schema.html#method.encode). Objects are keyed by
/// the camelCase field name. `Null` marks an absent optional field (an unset
/// nested message, duration or timestamp).
#[derive(Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Duration { seconds: i64, nanos: i32 },
    Timestamp { seconds: i64, nanos: i32 },
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// The value a missing field of `kind` takes under the default-filling
    /// policy.
    pub fn default_for(kind: ScalarKind) -> Value {
        match kind {
            ScalarKind::String => Value::String(String::new()),
            ScalarKind::Bytes => Value::Bytes(vec![]),
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::Int32 | ScalarKind::SInt32 | ScalarKind::SFixed32 | ScalarKind::Enum => {
                Value::Int32(0)
            }
            ScalarKind::UInt32 | ScalarKind::Fixed32 => Value::UInt32(0),
            ScalarKind::Int64 | ScalarKind::SInt64 | ScalarKind::SFixed64 => Value::Int64(0),
            ScalarKind::UInt64 | ScalarKind::Fixed64 => Value::UInt64(0),
            ScalarKind::Float => Value::Float(0.0),
            ScalarKind::Double => Value::Double(0.0),
            ScalarKind::Duration | ScalarKind::Timestamp => Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A convenience method to extract a field out of an [Object](#variant.Object).
    /// Returns `None` for other value kinds or if the field isn't present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Object(ref fields) => fields.get(name),
            _ => None,
        }
    }

    /// Name of this value's variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match *self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::UInt32(_) => "uint32",
            Value::Int64(_) => "int64",
            Value::UInt64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Duration { .. } => "duration",
            Value::Timestamp { .. } => "timestamp",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// `true` when an implicit-presence scalar holds its zero value and is
    /// therefore left off the wire.
    fn is_wire_default(&self) -> bool {
        match *self {
            Value::Null => true,
            Value::Bool(value) => !value,
            Value::Int32(value) => value == 0,
            Value::UInt32(value) => value == 0,
            Value::Int64(value) => value == 0,
            Value::UInt64(value) => value == 0,
            Value::Float(value) => value == 0.0,
            Value::Double(value) => value == 0.0,
            Value::String(ref value) => value.is_empty(),
            Value::Bytes(ref value) => value.is_empty(),
            _ => false,
        }
    }

    /// Encodes this value as an instance of `schema.defs[def_index]`.
    pub fn encode_message(
        &self,
        schema: &Schema,
        def_index: usize,
        path: &str,
    ) -> Result<Vec<u8>, CoerceError> {
        let mut bb = ByteBufferMut::new();
        self.encode_message_bb(schema, def_index, path, &mut bb)?;
        Ok(bb.data())
    }

    /// Writes every field of this object to the end of `bb`, in declaration
    /// order. Fields missing from the object are skipped.
    pub fn encode_message_bb(
        &self,
        schema: &Schema,
        def_index: usize,
        path: &str,
        bb: &mut ByteBufferMut,
    ) -> Result<(), CoerceError> {
        let fields = match *self {
            Value::Object(ref fields) => fields,
            _ => return Err(shape_error(path, "object", self)),
        };
        let def = &schema.defs[def_index];
        for field in &def.fields {
            if let Some(value) = fields.get(field.name.as_str()) {
                let field_path = format!("{}.{}", path, field.name);
                value.encode_field_bb(schema, field, &field_path, bb)?;
            }
        }
        Ok(())
    }

    fn encode_field_bb(
        &self,
        schema: &Schema,
        field: &Field,
        path: &str,
        bb: &mut ByteBufferMut,
    ) -> Result<(), CoerceError> {
        if self.is_null() {
            return Ok(());
        }

        if !field.is_array {
            if let Value::Array(_) = *self {
                return Err(shape_error(path, field.type_name(schema), self));
            }
            if let FieldType::Scalar(kind) = field.field_type {
                let explicit = matches!(kind, ScalarKind::Duration | ScalarKind::Timestamp);
                if !explicit && self.is_wire_default() {
                    return Ok(());
                }
            }
            return self.encode_single_bb(schema, field, path, bb);
        }

        let items = match *self {
            Value::Array(ref items) => items,
            _ => return Err(shape_error(path, "array", self)),
        };
        if items.is_empty() {
            return Ok(());
        }

        match field.field_type {
            FieldType::Scalar(kind) if kind.is_packable() => {
                let mut packed = ByteBufferMut::new();
                for (i, item) in items.iter().enumerate() {
                    item.write_scalar_payload(kind, &format!("{}[{}]", path, i), &mut packed)?;
                }
                bb.write_tag(field.tag, WireType::LengthDelimited);
                bb.write_length_delimited(&packed.data());
            }
            _ => {
                for (i, item) in items.iter().enumerate() {
                    item.encode_single_bb(schema, field, &format!("{}[{}]", path, i), bb)?;
                }
            }
        }
        Ok(())
    }

    fn encode_single_bb(
        &self,
        schema: &Schema,
        field: &Field,
        path: &str,
        bb: &mut ByteBufferMut,
    ) -> Result<(), CoerceError> {
        match field.field_type {
            FieldType::Scalar(kind) => {
                bb.write_tag(field.tag, kind.wire_type());
                self.write_scalar_payload(kind, path, bb)
            }
            FieldType::Message(def_index) => {
                let body = self.encode_message(schema, def_index, path)?;
                bb.write_tag(field.tag, WireType::LengthDelimited);
                bb.write_length_delimited(&body);
                Ok(())
            }
        }
    }

    /// Writes the payload of a scalar (everything after the field key).
    fn write_scalar_payload(
        &self,
        kind: ScalarKind,
        path: &str,
        bb: &mut ByteBufferMut,
    ) -> Result<(), CoerceError> {
        match (kind, self) {
            (ScalarKind::String, Value::String(value)) => bb.write_string(value),
            (ScalarKind::Bytes, Value::Bytes(value)) => bb.write_length_delimited(value),
            (ScalarKind::Bool, Value::Bool(value)) => bb.write_bool(*value),
            (ScalarKind::Int32 | ScalarKind::Enum, Value::Int32(value)) => bb.write_var_int(*value),
            (ScalarKind::SInt32, Value::Int32(value)) => bb.write_zigzag(*value),
            (ScalarKind::SFixed32, Value::Int32(value)) => bb.write_fixed32(*value as u32),
            (ScalarKind::UInt32, Value::UInt32(value)) => bb.write_var_uint(*value),
            (ScalarKind::Fixed32, Value::UInt32(value)) => bb.write_fixed32(*value),
            (ScalarKind::Int64, Value::Int64(value)) => bb.write_var_int64(*value),
            (ScalarKind::SInt64, Value::Int64(value)) => bb.write_zigzag64(*value),
            (ScalarKind::SFixed64, Value::Int64(value)) => bb.write_fixed64(*value as u64),
            (ScalarKind::UInt64, Value::UInt64(value)) => bb.write_var_uint64(*value),
            (ScalarKind::Fixed64, Value::UInt64(value)) => bb.write_fixed64(*value),
            (ScalarKind::Float, Value::Float(value)) => bb.write_float(*value),
            (ScalarKind::Double, Value::Double(value)) => bb.write_double(*value),
            (ScalarKind::Duration, Value::Duration { seconds, nanos })
            | (ScalarKind::Timestamp, Value::Timestamp { seconds, nanos }) => {
                // Both well-known types are `{ int64 seconds = 1; int32 nanos = 2; }`.
                let mut body = ByteBufferMut::new();
                if *seconds != 0 {
                    body.write_tag(1, WireType::Varint);
                    body.write_var_int64(*seconds);
                }
                if *nanos != 0 {
                    body.write_tag(2, WireType::Varint);
                    body.write_var_int(*nanos);
                }
                bb.write_length_delimited(&body.data());
            }
            _ => return Err(shape_error(path, kind.keyword(), self)),
        }
        Ok(())
    }
}

fn shape_error(path: &str, expected: &str, found: &Value) -> CoerceError {
    CoerceError::Shape {
        path:     path.to_string(),
        expected: expected.to_string(),
        found:    found.kind_name().to_string(),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => value.fmt(f),
            Value::Int32(value) => value.fmt(f),
            Value::UInt32(value) => value.fmt(f),
            Value::Int64(value) => write!(f, "{}n", value),
            Value::UInt64(value) => write!(f, "{}n", value),
            Value::Float(value) => value.fmt(f),
            Value::Double(value) => value.fmt(f),
            Value::String(ref value) => value.fmt(f),
            Value::Bytes(ref value) => write!(f, "bytes{:?}", value),
            Value::Duration { seconds, nanos } => write!(f, "{}s{}ns", seconds, nanos),
            Value::Timestamp { seconds, nanos } => write!(f, "@{}s{}ns", seconds, nanos),
            Value::Array(ref values) => values.fmt(f),
            Value::Object(ref fields) => {
                let mut first = true;
                write!(f, "{{")?;
                for (key, value) in fields {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Def, Field};

    fn object(pairs: Vec<(&str, Value)>) -> Value {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn value_lookup_and_debug() {
        let value = Value::Array(vec![
            Value::Bool(true),
            Value::Int32(-1),
            Value::UInt64(7),
            Value::String("abc".to_owned()),
            object(vec![("key1", Value::String("value1".to_owned()))]),
        ]);

        assert_eq!(value.get("key1"), None);
        let inner = object(vec![("key1", Value::String("value1".to_owned()))]);
        assert_eq!(inner.get("key1"), Some(&Value::String("value1".to_owned())));
        assert!(Value::Null.is_null());
        assert_eq!(
            format!("{:?}", value),
            "[true, -1, 7n, \"abc\", {key1: \"value1\"}]"
        );
    }

    #[test]
    fn default_fields_are_left_off_the_wire() {
        let schema = Schema::new(vec![Def::new(
            "demo.Flags",
            vec![
                Field::scalar("on", 1, ScalarKind::Bool, false),
                Field::scalar("name", 2, ScalarKind::String, false),
                Field::scalar("ids", 3, ScalarKind::UInt64, true),
            ],
        )]);
        let value = object(vec![
            ("on", Value::Bool(false)),
            ("name", Value::String(String::new())),
            ("ids", Value::Array(vec![])),
        ]);
        assert_eq!(value.encode_message(&schema, 0, "value").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn repeated_numbers_are_packed_and_strings_are_not() {
        let schema = Schema::new(vec![Def::new(
            "demo.Lists",
            vec![
                Field::scalar("ids", 1, ScalarKind::UInt64, true),
                Field::scalar("tags", 2, ScalarKind::String, true),
            ],
        )]);
        let value = object(vec![
            ("ids", Value::Array(vec![Value::UInt64(1), Value::UInt64(0), Value::UInt64(300)])),
            (
                "tags",
                Value::Array(vec![Value::String("a".into()), Value::String(String::new())]),
            ),
        ]);
        assert_eq!(
            value.encode_message(&schema, 0, "value").unwrap(),
            [0x0a, 4, 1, 0, 0xac, 0x02, 0x12, 1, b'a', 0x12, 0]
        );
    }

    #[test]
    fn nested_messages_and_durations_are_length_delimited() {
        let schema = Schema::new(vec![
            Def::new(
                "demo.Outer",
                vec![
                    Field::message("inner", 1, 1, false),
                    Field::scalar("wait", 2, ScalarKind::Duration, false),
                ],
            ),
            Def::new("demo.Inner", vec![Field::scalar("n", 1, ScalarKind::Int32, false)]),
        ]);
        let value = object(vec![
            ("inner", object(vec![("n", Value::Int32(0))])),
            ("wait", Value::Duration { seconds: 1, nanos: 0 }),
        ]);
        assert_eq!(
            value.encode_message(&schema, 0, "value").unwrap(),
            [0x0a, 0, 0x12, 2, 0x08, 1]
        );
    }

    #[test]
    fn mismatched_value_is_a_shape_error() {
        let schema = Schema::new(vec![Def::new(
            "demo.Str",
            vec![Field::scalar("s", 1, ScalarKind::String, false)],
        )]);
        let err = object(vec![("s", Value::Int32(3))])
            .encode_message(&schema, 0, "value")
            .unwrap_err();
        assert_eq!(
            err,
            CoerceError::Shape {
                path:     "value.s".into(),
                expected: "string".into(),
                found:    "int32".into(),
            }
        );
    }
}
