use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    config::GeneratorConfig,
    error::CodegenError,
    tokenizer::{block_body, statements, strip_comments},
    traits::SchemaParser,
    types::{FieldDef, MessageDef, ParsedFile},
};

lazy_static! {
    static ref PACKAGE:        Regex = Regex::new(r"(?m)^\s*package\s+([A-Za-z_][\w.]*)\s*;").unwrap();
    static ref MESSAGE_HEADER: Regex = Regex::new(r"\bmessage\s+([A-Za-z_]\w*)\s*\{").unwrap();
    static ref ENUM_HEADER:    Regex = Regex::new(r"\benum\s+([A-Za-z_]\w*)\s*\{").unwrap();
    static ref FIELD:          Regex = Regex::new(
        r"^(?:(repeated)\s+)?(?:optional\s+)?(\.?[A-Za-z_][\w.]*)\s+([A-Za-z_]\w*)\s*=\s*(\d+)(?:\s*\[[\s\S]*\])?$"
    ).unwrap();
    static ref RPC:            Regex = Regex::new(
        r"\brpc\s+\w+\s*\(\s*(?:stream\s+)?(\.?[\w.]+)\s*\)\s*returns\s*\(\s*(?:stream\s+)?\.?[\w.]+\s*\)"
    ).unwrap();
}

/// Regex-and-brace-depth parser for the subset of the protobuf language the
/// generator needs: packages, message fields, enums, rpc request types and
/// one legacy-name option.
#[derive(Debug, Clone)]
pub struct StructuralParser {
    message_prefix: String,
    legacy_option:  Regex,
}

impl StructuralParser {
    pub fn new(config: &GeneratorConfig) -> Result<Self, CodegenError> {
        let pattern = format!(
            r#"^option\s*\(\s*{}\s*\)\s*=\s*"([^"]*)"$"#,
            regex::escape(&config.legacy_name_option)
        );
        let legacy_option = Regex::new(&pattern).map_err(|e| {
            CodegenError::Config(format!(
                "invalid legacy name option {}: {}",
                config.legacy_name_option, e
            ))
        })?;
        Ok(StructuralParser {
            message_prefix: config.message_prefix.clone(),
            legacy_option,
        })
    }

    fn parse_message(&self, path: &Path, package: &str, name: &str, body: &str) -> MessageDef {
        let mut fields = Vec::new();
        let mut legacy_name = None;

        for statement in statements(body) {
            if let Some(caps) = FIELD.captures(statement) {
                let Ok(tag) = caps[4].parse::<u32>() else {
                    continue;
                };
                fields.push(FieldDef {
                    name:        caps[3].to_string(),
                    type_ref:    caps[2].to_string(),
                    is_repeated: caps.get(1).is_some(),
                    tag,
                });
            } else if let Some(caps) = self.legacy_option.captures(statement) {
                legacy_name = Some(caps[1].to_string());
            }
        }

        MessageDef {
            package: package.to_string(),
            name: name.to_string(),
            fields,
            source: path.to_path_buf(),
            legacy_name,
        }
    }

    fn is_request(&self, type_ref: &str) -> bool {
        let local = type_ref.rsplit('.').next().unwrap_or(type_ref);
        local.starts_with(&self.message_prefix)
    }
}

impl SchemaParser for StructuralParser {
    fn parse(&self, path: &Path, text: &str) -> Option<ParsedFile> {
        let text = strip_comments(text);
        let package = match PACKAGE.captures(&text) {
            Some(caps) => caps[1].to_string(),
            None => {
                debug!(path = %path.display(), "no package declaration, skipping");
                return None;
            }
        };

        let messages = MESSAGE_HEADER
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let body = block_body(&text, whole.end() - 1);
                Some(self.parse_message(path, &package, &caps[1], body))
            })
            .collect::<Vec<_>>();

        let enums = ENUM_HEADER
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .collect();

        let requests = RPC
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .filter(|request| self.is_request(request))
            .collect::<Vec<_>>();

        debug!(
            path = %path.display(),
            package = %package,
            messages = messages.len(),
            requests = requests.len(),
            "parsed schema file"
        );

        Some(ParsedFile {
            path: path.to_path_buf(),
            package,
            messages,
            enums,
            requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX: &str = r#"
syntax = "proto3";
package demo.license.v1;

import "amino/amino.proto";

// service Msg { rpc Commented(MsgCommented) returns (X); }
service Msg {
  rpc Delegate(MsgDelegate) returns (MsgDelegateResponse);
  rpc Query(QueryThing) returns (QueryThingResponse);
  rpc Stream(stream .demo.license.v1.MsgStream) returns (stream Ack);
}

message MsgDelegate {
  option (amino.name) = "license/MsgDelegate";
  string owner = 1; // the owner
  string operator = 2;
  /* repeated string ignored = 9; */
  repeated uint64 license_ids = 3 [(gogoproto.nullable) = false];
  map<string, string> labels = 4;
  oneof target {
    string account = 5;
  }
  message Window {
    google.protobuf.Duration length = 1;
  }
  optional Window window = 6;
  enum Mode { MODE_UNSPECIFIED = 0; }
}

message MsgDelegateResponse {}
"#;

    fn parse(text: &str) -> Option<ParsedFile> {
        StructuralParser::new(&GeneratorConfig::default())
            .unwrap()
            .parse(Path::new("tx.proto"), text)
    }

    #[test]
    fn extracts_fields_at_message_depth() {
        let file = parse(TX).unwrap();
        assert_eq!(file.package, "demo.license.v1");

        let delegate = &file.messages[0];
        assert_eq!(delegate.name, "MsgDelegate");
        assert_eq!(delegate.legacy_name.as_deref(), Some("license/MsgDelegate"));
        let names: Vec<_> = delegate.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["owner", "operator", "license_ids", "window"]);

        let ids = &delegate.fields[2];
        assert!(ids.is_repeated);
        assert_eq!(ids.type_ref, "uint64");
        assert_eq!(ids.tag, 3);
        assert_eq!(delegate.fields[3].type_ref, "Window");
    }

    #[test]
    fn nested_blocks_register_independently() {
        let file = parse(TX).unwrap();
        let names: Vec<_> = file.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["MsgDelegate", "Window", "MsgDelegateResponse"]);
        assert_eq!(file.messages[1].fields[0].type_ref, "google.protobuf.Duration");
        assert_eq!(file.enums, ["Mode"]);
    }

    #[test]
    fn only_prefixed_rpc_requests_are_kept() {
        let file = parse(TX).unwrap();
        assert_eq!(file.requests, ["MsgDelegate", ".demo.license.v1.MsgStream"]);
    }

    #[test]
    fn files_without_package_are_skipped() {
        assert!(parse("message Lonely { string a = 1; }").is_none());
    }

    #[test]
    fn custom_legacy_option_name() {
        let config = GeneratorConfig {
            legacy_name_option: "legacy.type".into(),
            ..GeneratorConfig::default()
        };
        let parser = StructuralParser::new(&config).unwrap();
        let text = r#"package p.v1; message MsgA { option (legacy.type) = "p/A"; }"#;
        let file = parser.parse(Path::new("a.proto"), text).unwrap();
        assert_eq!(file.messages[0].legacy_name.as_deref(), Some("p/A"));
    }
}
