use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    /// Declared (snake_case) name.
    pub name:        String,
    /// Scalar keyword or type name exactly as written, possibly relative.
    pub type_ref:    String,
    pub is_repeated: bool,
    pub tag:         u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDef {
    pub package:     String,
    pub name:        String,
    pub fields:      Vec<FieldDef>,
    pub source:      PathBuf,
    /// Value of the legacy-name annotation, when the message carries one.
    pub legacy_name: Option<String>,
}

impl MessageDef {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }
}

/// Everything the structural parser extracts from one schema file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedFile {
    pub path:     PathBuf,
    pub package:  String,
    pub messages: Vec<MessageDef>,
    /// Local names of enums declared anywhere in the file.
    pub enums:    Vec<String>,
    /// Request type references of `rpc` declarations that pass the message
    /// prefix filter, as written.
    pub requests: Vec<String>,
}

/// The immutable result of loading a schema corpus. Built once and borrowed
/// by every later stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Corpus {
    /// Keyed by fully-qualified name.
    pub messages:      BTreeMap<String, MessageDef>,
    /// Fully-qualified enum names.
    pub enums:         BTreeSet<String>,
    /// Fully-qualified names of transaction payload candidates.
    pub request_types: BTreeSet<String>,
}

pub fn type_url(full_name: &str) -> String {
    format!("/{}", full_name)
}
