//! Naming conventions inferred from package paths and message names.
//!
//! None of these are derivable from the schema language itself. They mirror
//! how the consuming chain modules lay out their packages, and fall back to
//! the last package segment whenever the layout does not match.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{config::GeneratorConfig, types::MessageDef, utils::lower_first};

lazy_static! {
    static ref VERSION: Regex = Regex::new(r"^v\d+((alpha|beta)\d*)?$").unwrap();
}

/// `v1`, `v1beta1`, `v2alpha` and friends.
pub fn is_version(segment: &str) -> bool {
    VERSION.is_match(segment)
}

/// The module a package belongs to: the segment after a root namespace
/// (`cosmos.bank.v1beta1` -> `bank`), else the segment before the first
/// version component (`demo.license.v1` -> `license`), else the last segment.
pub fn infer_module(package: &str, root_namespaces: &[String]) -> String {
    let segments: Vec<&str> = package.split('.').collect();

    if segments.len() >= 2 && root_namespaces.iter().any(|root| root == segments[0]) {
        return segments[1].to_string();
    }
    if let Some(pos) = segments.iter().position(|s| is_version(s)) {
        if pos > 0 {
            return segments[pos - 1].to_string();
        }
    }
    segments.last().copied().unwrap_or(package).to_string()
}

/// Annotation value if present, else `<module>/<LocalName>`.
pub fn legacy_name(message: &MessageDef, config: &GeneratorConfig) -> String {
    match &message.legacy_name {
        Some(name) => name.clone(),
        None => format!(
            "{}/{}",
            infer_module(&message.package, &config.root_namespaces),
            message.name
        ),
    }
}

/// `MsgDelegate` -> `delegate`.
pub fn method_name(local_name: &str, message_prefix: &str) -> String {
    let stripped = local_name.strip_prefix(message_prefix).unwrap_or(local_name);
    let stripped = if stripped.is_empty() { local_name } else { stripped };
    lower_first(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn roots() -> Vec<String> {
        vec!["cosmos".to_string()]
    }

    #[test]
    fn module_inference() {
        assert_eq!(infer_module("cosmos.bank.v1beta1", &roots()), "bank");
        assert_eq!(infer_module("demo.license.v1", &roots()), "license");
        assert_eq!(infer_module("ibc.applications.transfer.v2alpha1", &roots()), "transfer");
        assert_eq!(infer_module("v1.things", &roots()), "things");
        assert_eq!(infer_module("plain", &roots()), "plain");
        assert_eq!(infer_module("a.b.c", &roots()), "c");
    }

    #[test]
    fn version_components() {
        for yes in ["v1", "v12", "v1beta1", "v2alpha", "v1alpha3"] {
            assert!(is_version(yes), "{}", yes);
        }
        for no in ["v", "version1", "v1gamma", "V1", "v1beta1x"] {
            assert!(!is_version(no), "{}", no);
        }
    }

    #[test]
    fn legacy_name_prefers_annotation() {
        let mut message = MessageDef {
            package:     "demo.license.v1".into(),
            name:        "MsgDelegate".into(),
            fields:      vec![],
            source:      PathBuf::from("tx.proto"),
            legacy_name: None,
        };
        let config = GeneratorConfig::default();
        assert_eq!(legacy_name(&message, &config), "license/MsgDelegate");
        message.legacy_name = Some("lic/Delegate".into());
        assert_eq!(legacy_name(&message, &config), "lic/Delegate");
    }

    #[test]
    fn method_names_drop_the_prefix() {
        assert_eq!(method_name("MsgDelegate", "Msg"), "delegate");
        assert_eq!(method_name("MsgCreateNFTClass", "Msg"), "createNFTClass");
        assert_eq!(method_name("Msg", "Msg"), "msg");
    }
}
