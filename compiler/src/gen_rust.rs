use crate::{
    builder::BuilderTable,
    config::GeneratorConfig,
    encoder::{EncoderPlans, FieldRule, MessagePlan},
    resolver::TypeClass,
    types::type_url,
    utils::{quote, to_snake_case},
};

pub const GENERATED_HEADER: &str = "// @generated by protosign. Do not edit.\n";

/// `demo.license.v1.MsgDelegate` -> `demo_license_v1_msg_delegate`.
pub fn rust_ident(full_name: &str) -> String {
    full_name
        .split('.')
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join("_")
}

fn map_fn(full_name: &str) -> String {
    format!("map_{}", rust_ident(full_name))
}

fn encode_fn(full_name: &str) -> String {
    format!("encode_{}", rust_ident(full_name))
}

fn policy(rule: &FieldRule) -> &'static str {
    match rule.policy {
        protosign_schema::Policy::Required => "Policy::Required",
        protosign_schema::Policy::OrDefault => "Policy::OrDefault",
    }
}

/// Renders the encoder module: the wire schema, one mapping function per
/// message, one composed encoder per request type and the lookup table.
pub fn generate_encoders_rust(plans: &EncoderPlans, config: &GeneratorConfig) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push('\n');
    out.push_str("use std::collections::BTreeMap;\nuse std::sync::OnceLock;\n\n");
    out.push_str("#[allow(unused_imports)]\n");
    out.push_str(&format!(
        "use {}::{{\n    coerce::{{self, child_path, Policy}},\n    CoerceError, Def, Encoder, Field, Json, ScalarKind, Schema, Value, DEFAULT_LABEL,\n}};\n\n",
        config.runtime_crate
    ));

    out.push_str(&generate_schema_fn(plans));
    for plan in plans.messages() {
        out.push_str(&generate_map_fn(plan));
    }
    for request in plans.requests() {
        out.push_str(&format!(
            "pub fn {}(input: &Json) -> Result<Vec<u8>, CoerceError> {{\n    let value = {}(input, None)?;\n    schema().encode({}, &value)\n}}\n\n",
            encode_fn(request),
            map_fn(request),
            quote(request)
        ));
    }

    out.push_str("/// Type URL -> composed encoder.\n");
    out.push_str("pub fn encoders() -> BTreeMap<&'static str, Encoder> {\n");
    out.push_str("    let mut table: BTreeMap<&'static str, Encoder> = BTreeMap::new();\n");
    for request in plans.requests() {
        out.push_str(&format!(
            "    table.insert({}, {});\n",
            quote(&type_url(request)),
            encode_fn(request)
        ));
    }
    out.push_str("    table\n}\n\n");

    out.push_str("pub fn encode(type_url: &str, input: &Json) -> Result<Vec<u8>, CoerceError> {\n");
    out.push_str("    match type_url {\n");
    for request in plans.requests() {
        out.push_str(&format!(
            "        {} => {}(input),\n",
            quote(&type_url(request)),
            encode_fn(request)
        ));
    }
    out.push_str("        other => Err(CoerceError::UnknownTypeUrl(other.to_string())),\n");
    out.push_str("    }\n}\n");
    out
}

fn generate_schema_fn(plans: &EncoderPlans) -> String {
    let schema = plans.schema();
    let mut out = String::new();
    out.push_str("pub fn schema() -> &'static Schema {\n");
    out.push_str("    static SCHEMA: OnceLock<Schema> = OnceLock::new();\n");
    out.push_str("    SCHEMA.get_or_init(|| {\n        Schema::new(vec![\n");
    for def in &schema.defs {
        out.push_str(&format!("            Def::new({}, vec![\n", quote(&def.name)));
        for field in &def.fields {
            let line = match field.field_type {
                protosign_schema::FieldType::Scalar(kind) => format!(
                    "Field::scalar({}, {}, ScalarKind::{}, {})",
                    quote(&field.name),
                    field.tag,
                    kind.variant_name(),
                    field.is_array
                ),
                protosign_schema::FieldType::Message(index) => format!(
                    "Field::message({}, {}, {}, {})",
                    quote(&field.name),
                    field.tag,
                    index,
                    field.is_array
                ),
            };
            out.push_str(&format!("                {},\n", line));
        }
        out.push_str("            ]),\n");
    }
    out.push_str("        ])\n    })\n}\n\n");
    out
}

fn generate_map_fn(plan: &MessagePlan) -> String {
    let mut out = String::new();
    out.push_str(&format!("/// `{}`\n", plan.full_name));
    out.push_str(&format!(
        "pub fn {}(input: &Json, label: Option<&str>) -> Result<Value, CoerceError> {{\n",
        map_fn(&plan.full_name)
    ));
    out.push_str("    let path = label.unwrap_or(DEFAULT_LABEL);\n");
    out.push_str("    let view = coerce::object(input, path)?;\n");
    if plan.fields.is_empty() {
        out.push_str("    let _ = view;\n    Ok(Value::Object(BTreeMap::new()))\n}\n\n");
        return out;
    }
    out.push_str("    let mut out = BTreeMap::new();\n");

    for rule in &plan.fields {
        let camel = quote(&rule.camel_name);
        let raw = format!("view.get({}, {})", camel, quote(&rule.name));
        let field_path = format!("&child_path(path, {})", camel);
        let call = match (&rule.class, rule.is_repeated) {
            (TypeClass::Scalar(kind), false) => format!(
                "coerce::scalar_field(ScalarKind::{}, {}, {}, {})",
                kind.variant_name(),
                raw,
                field_path,
                policy(rule)
            ),
            (TypeClass::Scalar(kind), true) => format!(
                "coerce::repeated_field({}, {}, {}, {}, |v, p| {{\n        coerce::scalar(ScalarKind::{}, v, p)\n    }})",
                raw,
                field_path,
                policy(rule),
                quote(kind.keyword()),
                kind.variant_name()
            ),
            (TypeClass::Message(nested), false) => format!(
                "coerce::message_field({}, {}, {}, {}, |v, p| {{\n        {}(v, Some(p))\n    }})",
                raw,
                field_path,
                policy(rule),
                quote(nested),
                map_fn(nested)
            ),
            (TypeClass::Message(nested), true) => format!(
                "coerce::repeated_field({}, {}, {}, {}, |v, p| {{\n        {}(v, Some(p))\n    }})",
                raw,
                field_path,
                policy(rule),
                quote(nested),
                map_fn(nested)
            ),
        };
        out.push_str(&format!("    let {} = {}?;\n", field_var(rule), call));
        out.push_str(&format!(
            "    out.insert({}.to_string(), {});\n",
            camel,
            field_var(rule)
        ));
    }

    out.push_str("    Ok(Value::Object(out))\n}\n\n");
    out
}

fn field_var(rule: &FieldRule) -> String {
    format!("f_{}", to_snake_case(&rule.camel_name))
}

/// Renders the builder module: imports, the payload union and one
/// constructor module per inferred chain module.
pub fn generate_builders_rust(table: &BuilderTable) -> String {
    let mut out = String::new();
    out.push_str(GENERATED_HEADER);
    out.push('\n');

    for entry in &table.entries {
        if entry.is_aliased() {
            out.push_str(&format!("use {} as {};\n", entry.import_path, entry.alias));
        } else {
            out.push_str(&format!("use {};\n", entry.import_path));
        }
    }
    if !table.entries.is_empty() {
        out.push('\n');
    }

    out.push_str("/// Every payload the builders can produce.\n");
    out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
    out.push_str("pub enum Payload {\n");
    for entry in &table.entries {
        out.push_str(&format!("    /// `{}`\n", entry.type_url));
        out.push_str(&format!("    {}({}),\n", entry.variant, entry.alias));
    }
    out.push_str("}\n\n");

    out.push_str("impl Payload {\n");
    out.push_str("    pub fn type_url(&self) -> &'static str {\n");
    if table.entries.is_empty() {
        out.push_str("        match *self {}\n");
    } else {
        out.push_str("        match self {\n");
        for entry in &table.entries {
            out.push_str(&format!(
                "            Payload::{}(_) => {},\n",
                entry.variant,
                quote(&entry.type_url)
            ));
        }
        out.push_str("        }\n");
    }
    out.push_str("    }\n}\n\n");

    out.push_str("pub const TYPE_URLS: &[&str] = &[\n");
    for entry in &table.entries {
        out.push_str(&format!("    {},\n", quote(&entry.type_url)));
    }
    out.push_str("];\n");

    for entries in table.modules().into_values() {
        out.push('\n');
        out.push_str(&format!("pub mod {} {{\n", entries[0].rust_module()));
        out.push_str("    use super::*;\n");
        for entry in entries {
            out.push('\n');
            out.push_str(&format!(
                "    pub fn {}(value: {}) -> Payload {{\n        Payload::{}(value)\n    }}\n",
                entry.rust_method(),
                entry.alias,
                entry.variant
            ));
        }
        out.push_str("}\n");
    }

    out
}
