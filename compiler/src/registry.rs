use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::GeneratorConfig,
    error::CodegenError,
    naming::legacy_name,
    resolver::TypeClass,
    types::{type_url, Corpus},
};

/// One `{name, type}` pair of a typed-data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueField {
    pub name:  String,
    #[serde(rename = "type")]
    pub type_: String,
}

impl ValueField {
    fn new(name: &str, type_: String) -> ValueField {
        ValueField {
            name: name.to_string(),
            type_,
        }
    }
}

/// The canonical typed-data descriptor of one request type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataEntry {
    pub legacy_name:                  String,
    pub type_url:                     String,
    pub value_fields:                 Vec<ValueField>,
    /// Keyed by field name, not type name.
    pub nested_types:                 BTreeMap<String, Vec<ValueField>>,
    pub duration_fields:              BTreeSet<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclude_from_legacy_registry: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Typed-data entries keyed by type URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    pub entries: BTreeMap<String, TypedDataEntry>,
}

impl Registry {
    pub fn get(&self, type_url: &str) -> Option<&TypedDataEntry> {
        self.entries.get(type_url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, CodegenError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Sorts by strictly descending field name.
pub fn canonical_order(fields: &mut [ValueField]) {
    fields.sort_by(|a, b| b.name.cmp(&a.name));
}

/// `{name: type, ...}`, for collision messages.
pub fn describe_shape(fields: &[ValueField]) -> String {
    let body = fields
        .iter()
        .map(|f| format!("{}: {}", f.name, f.type_))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

/// First shape registered under each field-name key, across every request
/// type of the run.
#[derive(Debug, Default)]
struct ShapeIndex {
    by_key: BTreeMap<String, (String, Vec<ValueField>)>,
}

impl ShapeIndex {
    fn register(
        &mut self,
        key: &str,
        type_name: &str,
        shape: &[ValueField],
    ) -> Result<(), CodegenError> {
        match self.by_key.get(key) {
            Some((existing_type, existing)) if existing.as_slice() != shape => {
                Err(CodegenError::NestedCollision {
                    field:         key.to_string(),
                    existing_type: existing_type.clone(),
                    existing:      describe_shape(existing),
                    incoming_type: type_name.to_string(),
                    incoming:      describe_shape(shape),
                })
            }
            Some(_) => Ok(()),
            None => {
                self.by_key
                    .insert(key.to_string(), (type_name.to_string(), shape.to_vec()));
                Ok(())
            }
        }
    }
}

/// Expansion state for one request type.
struct Walk<'a> {
    corpus:    &'a Corpus,
    index:     &'a mut ShapeIndex,
    stack:     Vec<String>,
    expanded:  BTreeMap<String, Vec<ValueField>>,
    nested:    BTreeMap<String, Vec<ValueField>>,
    durations: BTreeSet<String>,
    /// `(field key, type)` pairs that hit a type still being expanded.
    pending:   Vec<(String, String)>,
}

impl<'a> Walk<'a> {
    fn new(corpus: &'a Corpus, index: &'a mut ShapeIndex) -> Self {
        Walk {
            corpus,
            index,
            stack: Vec::new(),
            expanded: BTreeMap::new(),
            nested: BTreeMap::new(),
            durations: BTreeSet::new(),
            pending: Vec::new(),
        }
    }

    /// The canonical field list of `type_name`, registering every nested
    /// shape it reaches.
    fn shape(&mut self, type_name: &str) -> Result<Vec<ValueField>, CodegenError> {
        if let Some(shape) = self.expanded.get(type_name) {
            return Ok(shape.clone());
        }

        self.stack.push(type_name.to_string());
        let mut fields = Vec::new();
        for field in self.corpus.resolved_fields(type_name)? {
            let suffix = if field.is_repeated { "[]" } else { "" };
            match &field.class {
                TypeClass::Scalar(kind) => {
                    if kind.is_duration() {
                        self.durations.insert(field.camel_name.clone());
                    }
                    fields.push(ValueField::new(
                        &field.camel_name,
                        format!("{}{}", kind.signing_type(), suffix),
                    ));
                }
                TypeClass::Message(nested) => {
                    fields.push(ValueField::new(
                        &field.camel_name,
                        format!("{}{}", field.camel_name, suffix),
                    ));
                    if self.stack.contains(nested) {
                        debug!(field = %field.camel_name, nested = %nested, "self-referential field");
                        self.pending.push((field.camel_name.clone(), nested.clone()));
                    } else {
                        let shape = self.shape(nested)?;
                        self.register(&field.camel_name, nested, shape)?;
                    }
                }
            }
        }
        self.stack.pop();

        canonical_order(&mut fields);
        self.expanded.insert(type_name.to_string(), fields.clone());
        Ok(fields)
    }

    fn register(
        &mut self,
        key: &str,
        type_name: &str,
        shape: Vec<ValueField>,
    ) -> Result<(), CodegenError> {
        self.index.register(key, type_name, &shape)?;
        self.nested.insert(key.to_string(), shape);
        Ok(())
    }

    /// Fills placeholders from the shapes their types ended up with.
    fn backfill(&mut self) -> Result<(), CodegenError> {
        for (key, type_name) in std::mem::take(&mut self.pending) {
            let shape = self
                .expanded
                .get(&type_name)
                .cloned()
                .ok_or_else(|| CodegenError::MissingMessage(type_name.clone()))?;
            self.register(&key, &type_name, shape)?;
        }
        Ok(())
    }
}

/// Derives one typed-data entry per request type, then applies the type
/// overrides.
pub fn build_registry(corpus: &Corpus, config: &GeneratorConfig) -> Result<Registry, CodegenError> {
    let mut index = ShapeIndex::default();
    let mut entries = BTreeMap::new();

    for request in &corpus.request_types {
        let message = corpus.message(request)?;

        let mut walk = Walk::new(corpus, &mut index);
        let value_fields = walk.shape(request)?;
        walk.backfill()?;

        let url = type_url(request);
        debug!(
            type_url = %url,
            fields = value_fields.len(),
            nested = walk.nested.len(),
            "built typed-data entry"
        );
        entries.insert(
            url.clone(),
            TypedDataEntry {
                legacy_name: legacy_name(message, config),
                type_url: url,
                value_fields,
                nested_types: walk.nested,
                duration_fields: walk.durations,
                exclude_from_legacy_registry: false,
            },
        );
    }

    for (url, over) in &config.type_overrides {
        match entries.get_mut(url) {
            Some(entry) => {
                if let Some(name) = &over.legacy_name {
                    entry.legacy_name = name.clone();
                }
                if let Some(exclude) = over.exclude_from_legacy_registry {
                    entry.exclude_from_legacy_registry = exclude;
                }
            }
            None => warn!(type_url = %url, "type override names no request type, ignoring"),
        }
    }

    info!(entries = entries.len(), "built typed-data registry");
    Ok(Registry { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeOverride;
    use crate::types::{FieldDef, MessageDef, ParsedFile};
    use std::path::PathBuf;

    fn field(name: &str, type_ref: &str, is_repeated: bool) -> FieldDef {
        FieldDef {
            name: name.into(),
            type_ref: type_ref.into(),
            is_repeated,
            tag: 1,
        }
    }

    fn corpus(messages: Vec<(&str, Vec<FieldDef>)>, requests: &[&str]) -> Corpus {
        let file = ParsedFile {
            path:     PathBuf::from("demo/v1/tx.proto"),
            package:  "demo.v1".into(),
            messages: messages
                .into_iter()
                .map(|(name, fields)| MessageDef {
                    package: "demo.v1".into(),
                    name: name.into(),
                    fields,
                    source: PathBuf::from("demo/v1/tx.proto"),
                    legacy_name: None,
                })
                .collect(),
            enums:    vec![],
            requests: requests.iter().map(|r| r.to_string()).collect(),
        };
        Corpus::build(vec![file])
    }

    fn names(fields: &[ValueField]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn fields_sort_descending_with_signing_types() {
        let corpus = corpus(
            vec![(
                "MsgDelegate",
                vec![
                    field("owner", "string", false),
                    field("operator", "string", false),
                    field("license_ids", "uint64", true),
                    field("active", "bool", false),
                    field("lock", "google.protobuf.Duration", false),
                ],
            )],
            &["MsgDelegate"],
        );
        let registry = build_registry(&corpus, &GeneratorConfig::default()).unwrap();
        let entry = registry.get("/demo.v1.MsgDelegate").unwrap();

        assert_eq!(entry.legacy_name, "demo/MsgDelegate");
        assert_eq!(
            names(&entry.value_fields),
            ["owner", "operator", "lock", "licenseIds", "active"]
        );
        let types: Vec<_> = entry.value_fields.iter().map(|f| f.type_.as_str()).collect();
        assert_eq!(types, ["string", "string", "string", "string[]", "bool"]);
        assert_eq!(entry.duration_fields.iter().collect::<Vec<_>>(), ["lock"]);
    }

    #[test]
    fn nested_shapes_are_keyed_by_field_name() {
        let corpus = corpus(
            vec![
                (
                    "MsgPay",
                    vec![field("amount", "Coin", true), field("fee", "Coin", false)],
                ),
                (
                    "Coin",
                    vec![field("denom", "string", false), field("amount", "string", false)],
                ),
            ],
            &["MsgPay"],
        );
        let registry = build_registry(&corpus, &GeneratorConfig::default()).unwrap();
        let entry = registry.get("/demo.v1.MsgPay").unwrap();

        assert_eq!(entry.value_fields[0], ValueField::new("fee", "fee".into()));
        assert_eq!(entry.value_fields[1], ValueField::new("amount", "amount[]".into()));
        assert_eq!(
            entry.nested_types.keys().collect::<Vec<_>>(),
            ["amount", "fee"]
        );
        assert_eq!(names(&entry.nested_types["fee"]), ["denom", "amount"]);
    }

    #[test]
    fn differing_shapes_under_one_field_name_collide() {
        let corpus = corpus(
            vec![
                ("MsgA", vec![field("amount", "Coin", false)]),
                ("MsgB", vec![field("amount", "Amount", false)]),
                ("Coin", vec![field("denom", "string", false)]),
                ("Amount", vec![field("value", "uint64", false)]),
            ],
            &["MsgA", "MsgB"],
        );
        match build_registry(&corpus, &GeneratorConfig::default()).unwrap_err() {
            CodegenError::NestedCollision {
                field,
                existing_type,
                existing,
                incoming_type,
                incoming,
            } => {
                assert_eq!(field, "amount");
                assert_eq!(existing_type, "demo.v1.Coin");
                assert_eq!(existing, "{denom: string}");
                assert_eq!(incoming_type, "demo.v1.Amount");
                assert_eq!(incoming, "{value: string}");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn cycles_become_backfilled_placeholders() {
        let corpus = corpus(
            vec![
                ("MsgTree", vec![field("root", "Node", false)]),
                (
                    "Node",
                    vec![field("label", "string", false), field("children", "Node", true)],
                ),
            ],
            &["MsgTree"],
        );
        let registry = build_registry(&corpus, &GeneratorConfig::default()).unwrap();
        let entry = registry.get("/demo.v1.MsgTree").unwrap();

        assert_eq!(names(&entry.nested_types["root"]), ["label", "children"]);
        assert_eq!(entry.nested_types["children"], entry.nested_types["root"]);
        assert_eq!(
            entry.nested_types["root"][1],
            ValueField::new("children", "children[]".into())
        );
    }

    #[test]
    fn overrides_merge_last() {
        let corpus = corpus(vec![("MsgA", vec![field("x", "string", false)])], &["MsgA"]);
        let mut config = GeneratorConfig::default();
        config.type_overrides.insert(
            "/demo.v1.MsgA".into(),
            TypeOverride {
                legacy_name:                  Some("custom/A".into()),
                exclude_from_legacy_registry: Some(true),
            },
        );
        config
            .type_overrides
            .insert("/demo.v1.MsgGone".into(), TypeOverride::default());

        let registry = build_registry(&corpus, &config).unwrap();
        let entry = registry.get("/demo.v1.MsgA").unwrap();
        assert_eq!(entry.legacy_name, "custom/A");
        assert!(entry.exclude_from_legacy_registry);
        assert_eq!(registry.len(), 1);

        let json: serde_json::Value = serde_json::from_str(&registry.to_json().unwrap()).unwrap();
        assert_eq!(json["/demo.v1.MsgA"]["excludeFromLegacyRegistry"], true);
        assert_eq!(json["/demo.v1.MsgA"]["valueFields"][0]["type"], "string");
    }
}
