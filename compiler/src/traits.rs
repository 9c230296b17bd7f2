use std::path::Path;

use crate::types::ParsedFile;

/// Turns the text of one schema file into its structural summary.
///
/// Returns `None` for files that are not authoritative (no package
/// declaration). Malformed content is skipped, never reported.
pub trait SchemaParser {
    fn parse(&self, path: &Path, text: &str) -> Option<ParsedFile>;
}
