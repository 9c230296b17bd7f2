//! protosign
//!
//! One-stop facade over the generator and its runtime.
//!
//! - `generate` runs load, compile, render and write in one call
//! - Registry JSON helpers
//! - Re-exports of the compiler and runtime types callers usually need

use std::path::Path;

pub use protosign_compiler::{
    compile_corpus, compile_schema, load_corpus, write_artifacts, Artifacts, BuilderEntry,
    BuilderTable, CodegenError, Corpus, EncoderPlans, EncoderTable, Generation, GeneratorConfig,
    Registry, SchemaParser, StructuralParser, TypeOverride, TypedDataEntry, ValueField,
};
pub use protosign_schema::{CoerceError, Encoder, Json, Policy, ScalarKind, Schema, Value};

/// Compiles the corpus under `root` and writes the three artifacts to
/// `out_dir`. Nothing is written unless every stage succeeds.
pub fn generate(root: &Path, out_dir: &Path, config: &GeneratorConfig) -> Result<Generation, CodegenError> {
    let generation = compile_schema(root, config)?;
    let artifacts = generation.render(config)?;
    write_artifacts(&artifacts, out_dir)?;
    Ok(generation)
}

/// Pretty-printed registry, as written to `registry.json`.
pub fn registry_to_json(registry: &Registry) -> Result<String, CodegenError> {
    registry.to_json()
}

pub fn registry_from_json(text: &str) -> Result<Registry, CodegenError> {
    Ok(serde_json::from_str(text)?)
}

pub mod config {
    pub use protosign_compiler::config::*;
}

pub mod error {
    pub use protosign_compiler::error::CodegenError;
    pub use protosign_schema::CoerceError;
}

pub mod schema {
    pub use protosign_schema::*;
}
