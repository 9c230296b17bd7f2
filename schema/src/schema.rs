use crate::{error::CoerceError, kind::ScalarKind, value::Value};

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarKind),
    /// Index into [Schema::defs](struct.Schema.html#structfield.defs).
    Message(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// camelCase name; the key used in coerced [Value](enum.Value.html) objects.
    pub name:       String,
    pub tag:        u32,
    pub field_type: FieldType,
    pub is_array:   bool,
}

impl Field {
    pub fn scalar(name: &str, tag: u32, kind: ScalarKind, is_array: bool) -> Field {
        Field {
            name: name.to_string(),
            tag,
            field_type: FieldType::Scalar(kind),
            is_array,
        }
    }

    pub fn message(name: &str, tag: u32, def_index: usize, is_array: bool) -> Field {
        Field {
            name: name.to_string(),
            tag,
            field_type: FieldType::Message(def_index),
            is_array,
        }
    }

    /// Human-readable type of this field, for error messages.
    pub fn type_name<'a>(&self, schema: &'a Schema) -> &'a str {
        match self.field_type {
            FieldType::Scalar(kind) => kind.keyword(),
            FieldType::Message(index) => schema.defs[index].name.as_str(),
        }
    }
}

/// One message type: its fully-qualified name and declaration-ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Def {
    pub name:   String,
    pub fields: Vec<Field>,
}

impl Def {
    pub fn new(name: &str, fields: Vec<Field>) -> Def {
        Def {
            name: name.to_string(),
            fields,
        }
    }
}

/// Wire-level description of a set of message types. Stands in for the
/// per-type `encode`/`fromPartial` pair a schema compiler would emit.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub defs:              Vec<Def>,
    pub def_name_to_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(defs: Vec<Def>) -> Schema {
        let def_name_to_index = defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Schema {
            defs,
            def_name_to_index,
        }
    }

    pub fn def_index(&self, name: &str) -> Option<usize> {
        self.def_name_to_index.get(name).copied()
    }

    /// Fills in structural defaults the way a generated `fromPartial` does:
    /// every declared field is present afterwards, scalars at their zero
    /// value, repeated fields as empty arrays, and unset messages as
    /// [Value::Null](enum.Value.html#variant.Null). Keys the definition does
    /// not declare are dropped.
    pub fn from_partial(&self, def_index: usize, value: &Value) -> Value {
        let def = &self.defs[def_index];
        let mut out = BTreeMap::new();
        for field in &def.fields {
            let given = value.get(&field.name).filter(|v| !v.is_null());
            let filled = match (given, field.is_array) {
                (Some(Value::Array(items)), true) => Value::Array(
                    items.iter().map(|item| self.fill_single(field, item)).collect(),
                ),
                (Some(v), _) => self.fill_single(field, v),
                (None, true) => Value::Array(vec![]),
                (None, false) => match field.field_type {
                    FieldType::Scalar(kind) => Value::default_for(kind),
                    FieldType::Message(_) => Value::Null,
                },
            };
            out.insert(field.name.clone(), filled);
        }
        Value::Object(out)
    }

    fn fill_single(&self, field: &Field, value: &Value) -> Value {
        match field.field_type {
            FieldType::Message(index) => self.from_partial(index, value),
            FieldType::Scalar(_) => value.clone(),
        }
    }

    /// Structural defaults followed by wire encoding, for the message named
    /// `name`.
    pub fn encode(&self, name: &str, value: &Value) -> Result<Vec<u8>, CoerceError> {
        let index = self
            .def_index(name)
            .ok_or_else(|| CoerceError::UnknownTypeUrl(format!("/{}", name)))?;
        self.from_partial(index, value)
            .encode_message(self, index, crate::coerce::DEFAULT_LABEL)
    }
}
