use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::CodegenError;

/// One discovered schema file and its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Every file under `root` whose extension is in `extensions`, sorted by path.
pub fn discover(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, CodegenError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| extensions.iter().any(|e| e == ext));
        if matches {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Reads every discovered file. A missing root is an I/O error, not an
/// empty corpus.
pub fn load_sources(root: &Path, extensions: &[String]) -> Result<Vec<SourceFile>, CodegenError> {
    if !root.is_dir() {
        return Err(CodegenError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "schema root is not a directory"),
        ));
    }

    let sources = discover(root, extensions)?
        .into_iter()
        .map(|path| {
            debug!(path = %path.display(), "reading schema file");
            let text = fs::read_to_string(&path).map_err(|e| CodegenError::io(&path, e))?;
            Ok(SourceFile { path, text })
        })
        .collect::<Result<Vec<_>, CodegenError>>()?;

    info!(root = %root.display(), files = sources.len(), "loaded schema sources");
    Ok(sources)
}
