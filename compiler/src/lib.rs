//! protosign-compiler
//!
//! This crate implements:
//!  1) A loader and structural parser for protobuf schema trees,
//!  2) A type graph resolver (package-relative references, closures, cycles),
//!  3) The typed-data registry builder (canonical field order, nested tables),
//!  4) Encoder plans, rendered as Rust or run in-process through [EncoderTable],
//!  5) The builder table and its payload union,
//!  6) Error types (`CodegenError`) and the `SchemaParser` trait.

pub mod builder;
pub mod compiler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod gen_rust;
pub mod loader;
pub mod naming;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod tokenizer;
pub mod traits;
pub mod types;
pub mod utils;

pub use builder::{BuilderEntry, BuilderTable};
pub use compiler::{compile_corpus, compile_schema, load_corpus, write_artifacts, Artifacts, Generation};
pub use config::{GeneratorConfig, TypeOverride};
pub use encoder::{EncoderPlans, EncoderTable};
pub use error::CodegenError;
pub use parser::StructuralParser;
pub use registry::{Registry, TypedDataEntry, ValueField};
pub use resolver::TypeClass;
pub use traits::SchemaParser;
pub use types::Corpus;
