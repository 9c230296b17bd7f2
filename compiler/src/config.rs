use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// Default prefix of transaction message names.
pub const DEFAULT_MESSAGE_PREFIX: &str = "Msg";

/// Default suffix of parameters messages, whose missing fields are filled
/// with defaults.
pub const DEFAULT_PARAMS_SUFFIX: &str = "Params";

/// Default annotation carrying an explicit legacy name.
pub const DEFAULT_LEGACY_NAME_OPTION: &str = "amino.name";

/// Default module path generated builders import message types from.
pub const DEFAULT_PROTO_ROOT: &str = "crate::proto";

/// Default crate generated encoders link against.
pub const DEFAULT_RUNTIME_CRATE: &str = "protosign_schema";

/// Hand-authored adjustments to one registry entry, keyed by type URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeOverride {
    pub legacy_name:                  Option<String>,
    pub exclude_from_legacy_registry: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub message_prefix:     String,
    /// Package roots whose second segment names the module
    /// (`cosmos.bank.v1beta1` -> `bank`).
    pub root_namespaces:    Vec<String>,
    pub legacy_name_option: String,
    pub params_suffix:      String,
    pub proto_root:         String,
    pub runtime_crate:      String,
    /// File extensions the loader picks up.
    pub extensions:         Vec<String>,
    pub type_overrides:     BTreeMap<String, TypeOverride>,
    /// `<fully.qualified.Message>.<camelCaseField>` keys of fields that take
    /// a default value when missing.
    pub field_defaults:     BTreeSet<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            message_prefix:     DEFAULT_MESSAGE_PREFIX.to_string(),
            root_namespaces:    vec!["cosmos".to_string()],
            legacy_name_option: DEFAULT_LEGACY_NAME_OPTION.to_string(),
            params_suffix:      DEFAULT_PARAMS_SUFFIX.to_string(),
            proto_root:         DEFAULT_PROTO_ROOT.to_string(),
            runtime_crate:      DEFAULT_RUNTIME_CRATE.to_string(),
            extensions:         vec!["proto".to_string()],
            type_overrides:     BTreeMap::new(),
            field_defaults:     BTreeSet::new(),
        }
    }
}

/// A field-defaults file may be a list of keys or a `{key: bool}` map.
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldDefaultsFile {
    List(Vec<String>),
    Map(BTreeMap<String, bool>),
}

impl GeneratorConfig {
    pub fn from_file(path: &Path) -> Result<Self, CodegenError> {
        let text = fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        let config: GeneratorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CodegenError> {
        if self.message_prefix.is_empty() {
            return Err(CodegenError::Config("messagePrefix must not be empty".into()));
        }
        if self.extensions.is_empty() {
            return Err(CodegenError::Config("extensions must not be empty".into()));
        }
        if let Some(url) = self.type_overrides.keys().find(|url| !url.starts_with('/')) {
            return Err(CodegenError::Config(format!(
                "type override key {} is not a type url (missing leading \"/\")",
                url
            )));
        }
        Ok(())
    }

    /// Merges a `{typeUrl: TypeOverride}` file into this config. Entries in
    /// the file win over entries already present.
    pub fn load_type_overrides(&mut self, path: &Path) -> Result<(), CodegenError> {
        let text = fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        let overrides: BTreeMap<String, TypeOverride> = serde_json::from_str(&text)?;
        self.type_overrides.extend(overrides);
        self.validate()
    }

    pub fn load_field_defaults(&mut self, path: &Path) -> Result<(), CodegenError> {
        let text = fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?;
        match serde_json::from_str::<FieldDefaultsFile>(&text)? {
            FieldDefaultsFile::List(keys) => self.field_defaults.extend(keys),
            FieldDefaultsFile::Map(map) => self
                .field_defaults
                .extend(map.into_iter().filter(|(_, on)| *on).map(|(key, _)| key)),
        }
        Ok(())
    }

    pub fn has_field_default(&self, full_name: &str, camel_field: &str) -> bool {
        self.field_defaults
            .contains(&format!("{}.{}", full_name, camel_field))
    }
}
