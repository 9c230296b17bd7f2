use std::path::PathBuf;

use thiserror::Error;

/// Fatal generation-time errors. Any of these aborts the run before output
/// is written.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk schema directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unresolved type {type_ref} for field {field} of {message}")]
    UnresolvedType {
        type_ref: String,
        message:  String,
        field:    String,
    },

    #[error("No message definition for {0}")]
    MissingMessage(String),

    #[error(
        "Nested type collision on field {field}: {existing_type} has shape {existing} \
         but {incoming_type} has shape {incoming}"
    )]
    NestedCollision {
        field:         String,
        existing_type: String,
        existing:      String,
        incoming_type: String,
        incoming:      String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CodegenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> CodegenError {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}
