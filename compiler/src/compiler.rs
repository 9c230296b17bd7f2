use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    builder::{build_builder_table, BuilderTable},
    config::GeneratorConfig,
    encoder::{plan_encoders, EncoderPlans, EncoderTable},
    error::CodegenError,
    gen_rust::{generate_builders_rust, generate_encoders_rust},
    loader::{load_sources, SourceFile},
    parser::StructuralParser,
    registry::{build_registry, Registry},
    traits::SchemaParser,
    types::{Corpus, ParsedFile},
};

pub const REGISTRY_FILE: &str = "registry.json";
pub const BUILDERS_FILE: &str = "builders.rs";
pub const ENCODERS_FILE: &str = "encoders.rs";

/// Everything one run derives from a corpus.
#[derive(Debug, Clone)]
pub struct Generation {
    pub corpus:   Corpus,
    pub registry: Registry,
    pub builders: BuilderTable,
    pub plans:    EncoderPlans,
}

/// The three rendered output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub registry_json: String,
    pub builders_rs:   String,
    pub encoders_rs:   String,
}

impl Artifacts {
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (REGISTRY_FILE, self.registry_json.as_str()),
            (BUILDERS_FILE, self.builders_rs.as_str()),
            (ENCODERS_FILE, self.encoders_rs.as_str()),
        ]
    }
}

pub fn parse_sources(sources: &[SourceFile], parser: &dyn SchemaParser) -> Vec<ParsedFile> {
    sources
        .iter()
        .filter_map(|source| parser.parse(&source.path, &source.text))
        .collect()
}

pub fn load_corpus(root: &Path, config: &GeneratorConfig) -> Result<Corpus, CodegenError> {
    let parser = StructuralParser::new(config)?;
    load_corpus_with(root, config, &parser)
}

pub fn load_corpus_with(
    root: &Path,
    config: &GeneratorConfig,
    parser: &dyn SchemaParser,
) -> Result<Corpus, CodegenError> {
    let sources = load_sources(root, &config.extensions)?;
    let parsed = parse_sources(&sources, parser);
    let skipped = sources.len() - parsed.len();
    if skipped > 0 {
        info!(skipped, "skipped schema files without a package declaration");
    }
    Ok(Corpus::build(parsed))
}

/// Runs every stage after loading. Any error aborts before anything is
/// rendered.
pub fn compile_corpus(corpus: Corpus, config: &GeneratorConfig) -> Result<Generation, CodegenError> {
    config.validate()?;
    if corpus.request_types.is_empty() {
        warn!("no request types found; outputs will be empty");
    }
    let registry = build_registry(&corpus, config)?;
    let builders = build_builder_table(&corpus, config)?;
    let plans = plan_encoders(&corpus, config)?;
    Ok(Generation {
        corpus,
        registry,
        builders,
        plans,
    })
}

/// Loads the corpus under `root` and compiles it.
pub fn compile_schema(root: &Path, config: &GeneratorConfig) -> Result<Generation, CodegenError> {
    let corpus = load_corpus(root, config)?;
    compile_corpus(corpus, config)
}

impl Generation {
    pub fn render(&self, config: &GeneratorConfig) -> Result<Artifacts, CodegenError> {
        Ok(Artifacts {
            registry_json: self.registry.to_json()?,
            builders_rs:   generate_builders_rust(&self.builders),
            encoders_rs:   generate_encoders_rust(&self.plans, config),
        })
    }

    pub fn encoder_table(&self) -> EncoderTable {
        EncoderTable::new(self.plans.clone())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes every artifact to a `.tmp` sibling first and renames only once all
/// of them are on disk, so a failed write leaves earlier outputs untouched.
///
/// The renames themselves are not atomic as a group: if one fails, the
/// artifacts renamed before it are already replaced. The remaining `.tmp`
/// files are removed and the error names the file that could not be moved.
pub fn write_artifacts(artifacts: &Artifacts, out_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
    fs::create_dir_all(out_dir).map_err(|e| CodegenError::io(out_dir, e))?;

    let mut staged = Vec::new();
    for (name, content) in artifacts.files() {
        let target = out_dir.join(name);
        let tmp = tmp_path(&target);
        if let Err(e) = fs::write(&tmp, content) {
            for (_, written) in &staged {
                let _ = fs::remove_file(written);
            }
            return Err(CodegenError::io(&tmp, e));
        }
        staged.push((target, tmp));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (i, (target, tmp)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, target) {
            for (_, left) in &staged[i..] {
                let _ = fs::remove_file(left);
            }
            warn!(
                target = %target.display(),
                replaced = written.len(),
                "artifact rename failed, outputs are partially replaced"
            );
            return Err(CodegenError::io(target, e));
        }
        written.push(target.clone());
    }

    info!(out_dir = %out_dir.display(), files = written.len(), "wrote artifacts");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_paths_are_siblings() {
        assert_eq!(
            tmp_path(Path::new("out/registry.json")),
            PathBuf::from("out/registry.json.tmp")
        );
    }

    #[test]
    fn writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts {
            registry_json: "{}\n".into(),
            builders_rs:   "// b\n".into(),
            encoders_rs:   "// e\n".into(),
        };
        let out = dir.path().join("gen");
        let written = write_artifacts(&artifacts, &out).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(fs::read_to_string(out.join(REGISTRY_FILE)).unwrap(), "{}\n");
        assert_eq!(fs::read_to_string(out.join(ENCODERS_FILE)).unwrap(), "// e\n");
        assert!(!out.join("builders.rs.tmp").exists());
    }

    #[test]
    fn failed_renames_leave_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");
        // A non-empty directory in place of the last artifact cannot be
        // replaced by a file.
        fs::create_dir_all(out.join(ENCODERS_FILE)).unwrap();
        fs::write(out.join(ENCODERS_FILE).join("keep"), "x").unwrap();

        let artifacts = Artifacts {
            registry_json: "{}\n".into(),
            builders_rs:   "// b\n".into(),
            encoders_rs:   "// e\n".into(),
        };
        let err = write_artifacts(&artifacts, &out).unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }), "{:?}", err);

        for name in [REGISTRY_FILE, BUILDERS_FILE, ENCODERS_FILE] {
            assert!(!out.join(format!("{}.tmp", name)).exists(), "{} left behind", name);
        }
        assert!(out.join(ENCODERS_FILE).join("keep").exists());
    }
}
