use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::GeneratorConfig,
    error::CodegenError,
    naming::{infer_module, method_name},
    types::{type_url, Corpus},
    utils::{escape_rust_keyword, to_pascal_case, to_snake_case},
};

/// One constructor of the builder table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderEntry {
    pub module:      String,
    /// Message name without the prefix, first letter lower-cased, with a
    /// package qualifier appended when two packages of one module clash.
    pub method:      String,
    pub full_name:   String,
    pub type_url:    String,
    /// Name the message type is imported under.
    pub alias:       String,
    /// Path of the consumer's generated message type.
    pub import_path: String,
    /// Variant of the payload union.
    pub variant:     String,
}

impl BuilderEntry {
    /// `snake_case` function name, keyword-escaped.
    pub fn rust_method(&self) -> String {
        escape_rust_keyword(&to_snake_case(&self.method))
    }

    pub fn rust_module(&self) -> String {
        escape_rust_keyword(&to_snake_case(&self.module))
    }

    /// Whether the import needs an `as` clause.
    pub fn is_aliased(&self) -> bool {
        !self.import_path.ends_with(&format!("::{}", self.alias))
    }
}

/// Entries sorted by module, then method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BuilderTable {
    pub entries: Vec<BuilderEntry>,
}

impl BuilderTable {
    /// Entries grouped by module, in module order.
    pub fn modules(&self) -> BTreeMap<&str, Vec<&BuilderEntry>> {
        let mut modules: BTreeMap<&str, Vec<&BuilderEntry>> = BTreeMap::new();
        for entry in &self.entries {
            modules.entry(entry.module.as_str()).or_default().push(entry);
        }
        modules
    }

    pub fn find(&self, module: &str, method: &str) -> Option<&BuilderEntry> {
        self.entries
            .iter()
            .find(|e| e.module == module && e.method == method)
    }
}

/// The name prost gives a message type: `MsgCreateNFTClass` ->
/// `MsgCreateNftClass`.
pub fn rust_type_name(local_name: &str) -> String {
    to_pascal_case(&to_snake_case(local_name))
}

pub fn build_builder_table(corpus: &Corpus, config: &GeneratorConfig) -> Result<BuilderTable, CodegenError> {
    struct Draft {
        full_name: String,
        package:   String,
        local:     String,
        module:    String,
        method:    String,
    }

    let mut drafts = Vec::new();
    for full_name in &corpus.request_types {
        let message = corpus.message(full_name)?;
        drafts.push(Draft {
            full_name: full_name.clone(),
            package:   message.package.clone(),
            local:     message.name.clone(),
            module:    infer_module(&message.package, &config.root_namespaces),
            method:    method_name(&message.name, &config.message_prefix),
        });
    }

    // Same local name declared by more than one package.
    let mut packages_by_local: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for draft in &drafts {
        packages_by_local
            .entry(draft.local.as_str())
            .or_default()
            .push(draft.package.as_str());
    }

    // Same (module, method) produced by more than one package.
    let mut by_method: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (i, draft) in drafts.iter().enumerate() {
        by_method
            .entry((draft.module.clone(), draft.method.clone()))
            .or_default()
            .push(i);
    }

    let mut methods: Vec<String> = drafts.iter().map(|d| d.method.clone()).collect();
    for group in by_method.values().filter(|g| g.len() > 1) {
        let suffixed: Vec<String> = group
            .iter()
            .map(|&i| {
                let last = drafts[i].package.rsplit('.').next().unwrap_or(&drafts[i].package);
                format!("{}_{}", drafts[i].method, last)
            })
            .collect();
        let distinct = suffixed.iter().collect::<BTreeSet<_>>().len() == group.len();
        for (slot, &i) in group.iter().enumerate() {
            methods[i] = if distinct {
                suffixed[slot].clone()
            } else {
                format!("{}_{}", drafts[i].method, drafts[i].package.replace('.', "_"))
            };
            debug!(
                message = %drafts[i].full_name,
                method = %methods[i],
                "disambiguated builder method"
            );
        }
    }

    let mut entries = Vec::with_capacity(drafts.len());
    let mut variants = BTreeSet::new();
    for (i, draft) in drafts.iter().enumerate() {
        let type_name = rust_type_name(&draft.local);
        let clashes = packages_by_local
            .get(draft.local.as_str())
            .map_or(false, |packages| packages.len() > 1);
        let alias = if clashes {
            format!("{}{}", to_pascal_case(&draft.package), type_name)
        } else {
            type_name.clone()
        };

        let mut variant = format!(
            "{}{}",
            to_pascal_case(&draft.module),
            to_pascal_case(&methods[i])
        );
        if variants.contains(&variant) {
            variant = format!("{}{}", to_pascal_case(&draft.package), type_name);
        }
        variants.insert(variant.clone());

        let module_path = draft
            .package
            .split('.')
            .map(|segment| escape_rust_keyword(&to_snake_case(segment)))
            .collect::<Vec<_>>()
            .join("::");

        entries.push(BuilderEntry {
            module: draft.module.clone(),
            method: methods[i].clone(),
            full_name: draft.full_name.clone(),
            type_url: type_url(&draft.full_name),
            alias,
            import_path: format!("{}::{}::{}", config.proto_root, module_path, type_name),
            variant,
        });
    }

    entries.sort_by(|a, b| (&a.module, &a.method).cmp(&(&b.module, &b.method)));
    info!(builders = entries.len(), "built builder table");
    Ok(BuilderTable { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageDef, ParsedFile};
    use std::path::PathBuf;

    fn file(package: &str, messages: &[&str]) -> ParsedFile {
        ParsedFile {
            path:     PathBuf::from(format!("{}.proto", package)),
            package:  package.into(),
            messages: messages
                .iter()
                .map(|name| MessageDef {
                    package:     package.into(),
                    name:        name.to_string(),
                    fields:      vec![],
                    source:      PathBuf::from(format!("{}.proto", package)),
                    legacy_name: None,
                })
                .collect(),
            enums:    vec![],
            requests: messages.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn table(files: Vec<ParsedFile>) -> BuilderTable {
        build_builder_table(&Corpus::build(files), &GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn groups_by_module_and_method() {
        let table = table(vec![
            file("cosmos.bank.v1beta1", &["MsgSend", "MsgMultiSend"]),
            file("demo.license.v1", &["MsgDelegate", "MsgCreateNFTClass"]),
        ]);

        let modules = table.modules();
        assert_eq!(modules.keys().copied().collect::<Vec<_>>(), ["bank", "license"]);

        let send = table.find("bank", "send").unwrap();
        assert_eq!(send.type_url, "/cosmos.bank.v1beta1.MsgSend");
        assert_eq!(send.import_path, "crate::proto::cosmos::bank::v1beta1::MsgSend");
        assert_eq!(send.variant, "BankSend");
        assert!(!send.is_aliased());

        let nft = table.find("license", "createNFTClass").unwrap();
        assert_eq!(nft.rust_method(), "create_nft_class");
        assert_eq!(nft.alias, "MsgCreateNftClass");
    }

    #[test]
    fn clashing_local_names_get_package_aliases() {
        let table = table(vec![
            file("demo.license.v1", &["MsgDelegate"]),
            file("demo.license.v2", &["MsgDelegate"]),
            file("other.staking.v1", &["MsgSend"]),
        ]);

        let v1 = table.find("license", "delegate_v1").unwrap();
        let v2 = table.find("license", "delegate_v2").unwrap();
        assert_eq!(v1.alias, "DemoLicenseV1MsgDelegate");
        assert_eq!(v2.alias, "DemoLicenseV2MsgDelegate");
        assert!(v1.is_aliased());
        assert_eq!(v1.variant, "LicenseDelegateV1");
        assert_eq!(table.find("staking", "send").unwrap().alias, "MsgSend");
    }

    #[test]
    fn same_last_segment_falls_back_to_full_package() {
        let table = table(vec![
            file("a.license.v1", &["MsgDelegate"]),
            file("b.license.v1", &["MsgDelegate"]),
        ]);
        let methods: Vec<_> = table.entries.iter().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, ["delegate_a_license_v1", "delegate_b_license_v1"]);
    }

    #[test]
    fn keyword_methods_are_escaped() {
        let table = table(vec![file("demo.vault.v1", &["MsgMove"])]);
        assert_eq!(table.entries[0].rust_method(), "move_");
    }
}
