use std::collections::{BTreeMap, BTreeSet};

use protosign_schema::ScalarKind;
use tracing::{info, warn};

use crate::{
    error::CodegenError,
    types::{Corpus, FieldDef, MessageDef, ParsedFile},
    utils::to_camel_case,
};

/// Classification of a resolved field type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TypeClass {
    Scalar(ScalarKind),
    /// Fully-qualified name of a message in the corpus.
    Message(String),
}

/// A field after type resolution. Derived on demand, never stored in the
/// corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub name:        String,
    pub camel_name:  String,
    pub class:       TypeClass,
    pub is_repeated: bool,
    pub tag:         u32,
}

impl Corpus {
    /// Merges parsed files into one corpus. Files are visited in path order;
    /// on a duplicate fully-qualified name the first definition wins.
    pub fn build(mut files: Vec<ParsedFile>) -> Corpus {
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut messages: BTreeMap<String, MessageDef> = BTreeMap::new();
        let mut enums = BTreeSet::new();
        let mut request_types = BTreeSet::new();

        for file in files {
            for message in file.messages {
                let full_name = message.full_name();
                if let Some(existing) = messages.get(&full_name) {
                    warn!(
                        message = %full_name,
                        kept = %existing.source.display(),
                        ignored = %message.source.display(),
                        "duplicate message definition"
                    );
                    continue;
                }
                messages.insert(full_name, message);
            }
            for name in file.enums {
                enums.insert(format!("{}.{}", file.package, name));
            }
            for request in file.requests {
                request_types.insert(qualify(&request, &file.package));
            }
        }

        info!(
            messages = messages.len(),
            enums = enums.len(),
            requests = request_types.len(),
            "built schema corpus"
        );

        Corpus {
            messages,
            enums,
            request_types,
        }
    }

    pub fn message(&self, full_name: &str) -> Result<&MessageDef, CodegenError> {
        self.messages
            .get(full_name)
            .ok_or_else(|| CodegenError::MissingMessage(full_name.to_string()))
    }

    /// Resolves a declared type against the package of the referencing
    /// message. Returns `None` when nothing in the corpus matches.
    pub fn resolve_reference(&self, type_ref: &str, package: &str) -> Option<TypeClass> {
        if let Some(kind) = ScalarKind::from_keyword(type_ref) {
            return Some(TypeClass::Scalar(kind));
        }
        if let Some(kind) = ScalarKind::from_well_known(type_ref) {
            return Some(TypeClass::Scalar(kind));
        }

        self.candidates(type_ref, package).into_iter().find_map(|name| {
            if self.messages.contains_key(&name) {
                Some(TypeClass::Message(name))
            } else if self.enums.contains(&name) {
                Some(TypeClass::Scalar(ScalarKind::Enum))
            } else {
                None
            }
        })
    }

    /// Names to try, in order, for a message or enum reference. A dotted
    /// name is taken as written, except that `Outer.Inner` also finds a
    /// nested type registered as `package.Inner` when `Outer` is a message
    /// of the referencing package.
    fn candidates(&self, type_ref: &str, package: &str) -> Vec<String> {
        if let Some(stripped) = type_ref.strip_prefix('.') {
            return vec![stripped.to_string()];
        }
        if !type_ref.contains('.') {
            return vec![format!("{}.{}", package, type_ref)];
        }

        let mut names = vec![type_ref.to_string()];
        let outer = type_ref.split('.').next().unwrap_or(type_ref);
        if self.messages.contains_key(&format!("{}.{}", package, outer)) {
            names.push(format!("{}.{}", package, type_ref));
            if let Some(last) = type_ref.rsplit('.').next() {
                names.push(format!("{}.{}", package, last));
            }
        }
        names
    }

    pub fn resolve_field(
        &self,
        message: &MessageDef,
        field: &FieldDef,
    ) -> Result<ResolvedField, CodegenError> {
        let class = self
            .resolve_reference(&field.type_ref, &message.package)
            .ok_or_else(|| CodegenError::UnresolvedType {
                type_ref: field.type_ref.clone(),
                message:  message.full_name(),
                field:    field.name.clone(),
            })?;
        Ok(ResolvedField {
            name: field.name.clone(),
            camel_name: to_camel_case(&field.name),
            class,
            is_repeated: field.is_repeated,
            tag: field.tag,
        })
    }

    /// Declaration-ordered resolved fields of `full_name`.
    pub fn resolved_fields(&self, full_name: &str) -> Result<Vec<ResolvedField>, CodegenError> {
        let message = self.message(full_name)?;
        message
            .fields
            .iter()
            .map(|field| self.resolve_field(message, field))
            .collect()
    }

    /// Every message type reachable from `root`, `root` included. Scalars end
    /// the walk and each type is expanded once, so cycles terminate.
    pub fn closure(&self, root: &str) -> Result<BTreeSet<String>, CodegenError> {
        let mut seen = BTreeSet::new();
        let mut work = vec![root.to_string()];

        while let Some(name) = work.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            for field in self.resolved_fields(&name)? {
                if let TypeClass::Message(nested) = field.class {
                    if !seen.contains(&nested) {
                        work.push(nested);
                    }
                }
            }
        }

        Ok(seen)
    }

    /// Union of the closures of every request type.
    pub fn full_closure(&self) -> Result<BTreeSet<String>, CodegenError> {
        let mut all = BTreeSet::new();
        for request in &self.request_types {
            all.extend(self.closure(request)?);
        }
        Ok(all)
    }
}

/// Qualifies a reference that is known to name a message: a leading `.` or
/// any dot means fully qualified, a bare name is package-relative.
pub fn qualify(type_ref: &str, package: &str) -> String {
    if let Some(stripped) = type_ref.strip_prefix('.') {
        stripped.to_string()
    } else if type_ref.contains('.') {
        type_ref.to_string()
    } else {
        format!("{}.{}", package, type_ref)
    }
}
