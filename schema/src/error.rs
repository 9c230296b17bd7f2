use serde_json::Value as Json;
use thiserror::Error;

/// Raised while turning untyped input into a schema-exact value, or while
/// writing that value to the wire. Every variant that concerns a field names
/// the full dotted/indexed path to it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("{path}: missing required field (expected {expected})")]
    MissingField { path: String, expected: String },

    #[error("{path}: expected {expected}, got {found}")]
    WrongKind {
        path:     String,
        expected: String,
        found:    String,
    },

    #[error("{path}: {value} is out of range for {expected}")]
    OutOfRange {
        path:     String,
        expected: String,
        value:    String,
    },

    #[error("{path}: expected base64-encoded bytes, got {found}")]
    InvalidBase64 { path: String, found: String },

    #[error("{path}: invalid {expected}: {reason}")]
    InvalidDuration {
        path:     String,
        expected: String,
        reason:   String,
    },

    #[error("No encoder registered for type url \"{0}\"")]
    UnknownTypeUrl(String),

    #[error("{path}: value does not match the schema (expected {expected}, got {found})")]
    Shape {
        path:     String,
        expected: String,
        found:    String,
    },
}

impl CoerceError {
    /// The field path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            CoerceError::MissingField { path, .. }
            | CoerceError::WrongKind { path, .. }
            | CoerceError::OutOfRange { path, .. }
            | CoerceError::InvalidBase64 { path, .. }
            | CoerceError::InvalidDuration { path, .. }
            | CoerceError::Shape { path, .. } => Some(path),
            CoerceError::UnknownTypeUrl(_) => None,
        }
    }

    pub(crate) fn wrong_kind(path: &str, expected: &str, found: &Json) -> CoerceError {
        CoerceError::WrongKind {
            path:     path.to_string(),
            expected: expected.to_string(),
            found:    describe(found),
        }
    }

    pub(crate) fn missing(path: &str, expected: &str) -> CoerceError {
        CoerceError::MissingField {
            path:     path.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Short human-readable rendering of an input value for error messages.
pub fn describe(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Bool(b) => format!("boolean {}", b),
        Json::Number(n) => format!("number {}", n),
        Json::String(s) => format!("string {}", Json::String(s.clone())),
        Json::Array(items) => format!("array of length {}", items.len()),
        Json::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_carry_path_and_expected_kind() {
        let err = CoerceError::wrong_kind("value.licenseIds[0]", "uint64", &json!("x"));
        assert_eq!(
            err.to_string(),
            "value.licenseIds[0]: expected uint64, got string \"x\""
        );
        assert_eq!(err.path(), Some("value.licenseIds[0]"));

        let err = CoerceError::missing("value.owner", "string");
        assert_eq!(
            err.to_string(),
            "value.owner: missing required field (expected string)"
        );
    }

    #[test]
    fn unknown_type_url_has_no_path() {
        assert_eq!(CoerceError::UnknownTypeUrl("/x.Y".into()).path(), None);
    }
}
