//! Encoder plans: the per-message coercion rules both the generated Rust
//! encoders and the in-process [EncoderTable] are driven by.

use std::collections::{BTreeMap, BTreeSet};

use protosign_schema::{
    coerce::{self, child_path, Policy},
    CoerceError, Def, Field, Json, Schema, Value, DEFAULT_LABEL,
};
use tracing::info;

use crate::{
    config::GeneratorConfig,
    error::CodegenError,
    resolver::TypeClass,
    types::{type_url, Corpus},
};

/// How one field of one message is coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name:        String,
    pub camel_name:  String,
    pub tag:         u32,
    pub class:       TypeClass,
    pub is_repeated: bool,
    pub policy:      Policy,
}

impl FieldRule {
    /// Kind name used in "expected ..." error text.
    pub fn expected(&self) -> &str {
        match &self.class {
            TypeClass::Scalar(kind) => kind.keyword(),
            TypeClass::Message(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePlan {
    pub full_name: String,
    /// Declaration order; the wire encoder writes fields in this order.
    pub fields:    Vec<FieldRule>,
}

/// Plans for every message in the closure of the request types, plus the
/// wire schema the composed encoders finish with.
#[derive(Debug, Clone)]
pub struct EncoderPlans {
    messages: BTreeMap<String, MessagePlan>,
    requests: BTreeSet<String>,
    schema:   Schema,
}

/// Parameters messages fill missing fields with defaults. Request types
/// never do, even when they end in the suffix (`MsgUpdateParams`).
pub fn is_params_message(local_name: &str, config: &GeneratorConfig) -> bool {
    local_name.ends_with(&config.params_suffix) && !local_name.starts_with(&config.message_prefix)
}

pub fn plan_encoders(corpus: &Corpus, config: &GeneratorConfig) -> Result<EncoderPlans, CodegenError> {
    let closure = corpus.full_closure()?;

    let mut messages = BTreeMap::new();
    for full_name in &closure {
        let message = corpus.message(full_name)?;
        let params = is_params_message(&message.name, config);
        let fields = corpus
            .resolved_fields(full_name)?
            .into_iter()
            .map(|field| {
                let policy = if params || config.has_field_default(full_name, &field.camel_name) {
                    Policy::OrDefault
                } else {
                    Policy::Required
                };
                FieldRule {
                    name: field.name,
                    camel_name: field.camel_name,
                    tag: field.tag,
                    class: field.class,
                    is_repeated: field.is_repeated,
                    policy,
                }
            })
            .collect();
        messages.insert(
            full_name.clone(),
            MessagePlan {
                full_name: full_name.clone(),
                fields,
            },
        );
    }

    let schema = wire_schema(&messages)?;
    info!(
        messages = messages.len(),
        requests = corpus.request_types.len(),
        "planned value encoders"
    );

    Ok(EncoderPlans {
        messages,
        requests: corpus.request_types.clone(),
        schema,
    })
}

/// One definition per plan, in plan-name order. Message fields point at the
/// definition index of their type.
fn wire_schema(messages: &BTreeMap<String, MessagePlan>) -> Result<Schema, CodegenError> {
    let index: BTreeMap<&str, usize> = messages
        .keys()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let defs = messages
        .values()
        .map(|plan| {
            let fields = plan
                .fields
                .iter()
                .map(|rule| match &rule.class {
                    TypeClass::Scalar(kind) => Ok(Field::scalar(
                        &rule.camel_name,
                        rule.tag,
                        *kind,
                        rule.is_repeated,
                    )),
                    TypeClass::Message(name) => index
                        .get(name.as_str())
                        .map(|&i| Field::message(&rule.camel_name, rule.tag, i, rule.is_repeated))
                        .ok_or_else(|| CodegenError::MissingMessage(name.clone())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Def::new(&plan.full_name, fields))
        })
        .collect::<Result<Vec<_>, CodegenError>>()?;

    Ok(Schema::new(defs))
}

impl EncoderPlans {
    pub fn messages(&self) -> impl Iterator<Item = &MessagePlan> {
        self.messages.values()
    }

    pub fn message(&self, full_name: &str) -> Option<&MessagePlan> {
        self.messages.get(full_name)
    }

    pub fn requests(&self) -> impl Iterator<Item = &str> {
        self.requests.iter().map(String::as_str)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Coerces `input` into the value shape of `full_name`. `label` roots
    /// every error path and defaults to `value`.
    pub fn map(&self, full_name: &str, input: &Json, label: Option<&str>) -> Result<Value, CoerceError> {
        self.map_at(full_name, input, label.unwrap_or(DEFAULT_LABEL))
    }

    fn map_at(&self, full_name: &str, input: &Json, path: &str) -> Result<Value, CoerceError> {
        let plan = self
            .messages
            .get(full_name)
            .ok_or_else(|| CoerceError::UnknownTypeUrl(type_url(full_name)))?;
        let view = coerce::object(input, path)?;

        let mut out = BTreeMap::new();
        for rule in &plan.fields {
            let field_path = child_path(path, &rule.camel_name);
            let raw = view.get(&rule.camel_name, &rule.name);
            let value = match (&rule.class, rule.is_repeated) {
                (TypeClass::Scalar(kind), false) => {
                    coerce::scalar_field(*kind, raw, &field_path, rule.policy)?
                }
                (TypeClass::Scalar(kind), true) => {
                    coerce::repeated_field(raw, &field_path, rule.policy, kind.keyword(), |v, p| {
                        coerce::scalar(*kind, v, p)
                    })?
                }
                (TypeClass::Message(nested), false) => {
                    coerce::message_field(raw, &field_path, rule.policy, nested, |v, p| {
                        self.map_at(nested, v, p)
                    })?
                }
                (TypeClass::Message(nested), true) => {
                    coerce::repeated_field(raw, &field_path, rule.policy, nested, |v, p| {
                        self.map_at(nested, v, p)
                    })?
                }
            };
            out.insert(rule.camel_name.clone(), value);
        }

        Ok(Value::Object(out))
    }

    /// Mapping followed by structural defaults and wire encoding.
    pub fn encode(&self, full_name: &str, input: &Json) -> Result<Vec<u8>, CoerceError> {
        let value = self.map(full_name, input, None)?;
        self.schema.encode(full_name, &value)
    }
}

/// Type URL -> composed encoder, for request types only.
#[derive(Debug, Clone)]
pub struct EncoderTable {
    plans: EncoderPlans,
}

/// A composed encoder bound to one request type.
#[derive(Debug, Clone, Copy)]
pub struct PayloadEncoder<'a> {
    plans:     &'a EncoderPlans,
    full_name: &'a str,
}

impl<'a> PayloadEncoder<'a> {
    pub fn full_name(&self) -> &'a str {
        self.full_name
    }

    pub fn encode(&self, input: &Json) -> Result<Vec<u8>, CoerceError> {
        self.plans.encode(self.full_name, input)
    }
}

impl EncoderTable {
    pub fn new(plans: EncoderPlans) -> Self {
        EncoderTable { plans }
    }

    pub fn plans(&self) -> &EncoderPlans {
        &self.plans
    }

    pub fn get(&self, type_url: &str) -> Option<PayloadEncoder<'_>> {
        let full_name = type_url.strip_prefix('/')?;
        self.plans
            .requests
            .get(full_name)
            .map(|full_name| PayloadEncoder {
                plans:     &self.plans,
                full_name: full_name.as_str(),
            })
    }

    pub fn encode(&self, type_url: &str, input: &Json) -> Result<Vec<u8>, CoerceError> {
        self.get(type_url)
            .ok_or_else(|| CoerceError::UnknownTypeUrl(type_url.to_string()))?
            .encode(input)
    }

    pub fn type_urls(&self) -> Vec<String> {
        self.plans.requests().map(type_url).collect()
    }

    pub fn len(&self) -> usize {
        self.plans.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, MessageDef, ParsedFile};
    use serde_json::json;
    use std::path::PathBuf;

    fn field(name: &str, type_ref: &str, is_repeated: bool, tag: u32) -> FieldDef {
        FieldDef {
            name: name.into(),
            type_ref: type_ref.into(),
            is_repeated,
            tag,
        }
    }

    fn plans(config: &GeneratorConfig) -> EncoderPlans {
        let message = |name: &str, fields| MessageDef {
            package: "demo.v1".into(),
            name: name.into(),
            fields,
            source: PathBuf::from("tx.proto"),
            legacy_name: None,
        };
        let file = ParsedFile {
            path:     PathBuf::from("tx.proto"),
            package:  "demo.v1".into(),
            messages: vec![
                message(
                    "MsgUpdateParams",
                    vec![field("authority", "string", false, 1), field("params", "Params", false, 2)],
                ),
                message(
                    "Params",
                    vec![field("enabled", "bool", false, 1), field("max_items", "uint32", false, 2)],
                ),
                message(
                    "MsgTag",
                    vec![
                        field("owner", "string", false, 1),
                        field("tags", "string", true, 2),
                        field("memo", "string", false, 3),
                    ],
                ),
            ],
            enums:    vec![],
            requests: vec!["MsgUpdateParams".into(), "MsgTag".into()],
        };
        plan_encoders(&Corpus::build(vec![file]), config).unwrap()
    }

    #[test]
    fn params_messages_default_missing_fields() {
        let config = GeneratorConfig::default();
        assert!(is_params_message("Params", &config));
        assert!(is_params_message("ModuleParams", &config));
        assert!(!is_params_message("MsgUpdateParams", &config));

        let plans = plans(&config);
        let value = plans.map("demo.v1.Params", &json!({}), None).unwrap();
        assert_eq!(value.get("enabled"), Some(&Value::Bool(false)));
        assert_eq!(value.get("maxItems"), Some(&Value::UInt32(0)));

        let err = plans
            .map("demo.v1.MsgTag", &json!({"tags": []}), None)
            .unwrap_err();
        assert_eq!(
            err,
            CoerceError::MissingField {
                path:     "value.owner".into(),
                expected: "string".into(),
            }
        );
    }

    #[test]
    fn field_defaults_relax_single_fields() {
        let mut config = GeneratorConfig::default();
        config.field_defaults.insert("demo.v1.MsgTag.memo".into());
        let plans = plans(&config);

        let value = plans
            .map("demo.v1.MsgTag", &json!({"owner": "a", "tags": []}), None)
            .unwrap();
        assert_eq!(value.get("memo"), Some(&Value::String(String::new())));
    }

    #[test]
    fn errors_carry_the_full_path() {
        let plans = plans(&GeneratorConfig::default());
        let err = plans
            .map(
                "demo.v1.MsgTag",
                &json!({"owner": "a", "tags": [1, "ok"], "memo": ""}),
                Some("tx"),
            )
            .unwrap_err();
        assert_eq!(err.path(), Some("tx.tags[0]"));

        let err = plans
            .map(
                "demo.v1.MsgUpdateParams",
                &json!({"authority": "gov", "params": {"max_items": -1}}),
                None,
            )
            .unwrap_err();
        assert_eq!(err.path(), Some("value.params.maxItems"));
    }

    #[test]
    fn table_encodes_by_type_url() {
        let table = EncoderTable::new(plans(&GeneratorConfig::default()));
        assert_eq!(
            table.type_urls(),
            ["/demo.v1.MsgTag", "/demo.v1.MsgUpdateParams"]
        );
        assert!(table.get("/demo.v1.Params").is_none());

        let bytes = table
            .encode(
                "/demo.v1.MsgUpdateParams",
                &json!({"authority": "g", "params": {"enabled": true}}),
            )
            .unwrap();
        assert_eq!(bytes, [0x0a, 1, b'g', 0x12, 2, 0x08, 0x01]);

        assert_eq!(
            table.encode("/demo.v1.MsgNope", &json!({})).unwrap_err(),
            CoerceError::UnknownTypeUrl("/demo.v1.MsgNope".into())
        );
    }
}
