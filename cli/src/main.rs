use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use protosign::{
    compile_schema, generate, registry_to_json, CoerceError, CodegenError, GeneratorConfig,
};
use thiserror::Error;
use tracing::info;

mod logging;

#[derive(Parser)]
#[command(name = "protosign")]
#[command(about = "Generate typed-data registries, builders and value encoders from protobuf schemas", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SchemaArgs {
    /// Root directory of the schema corpus
    #[arg(short, long)]
    schema_dir: PathBuf,

    /// Generator config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-type-URL registry overrides (JSON object)
    #[arg(long)]
    type_overrides: Option<PathBuf>,

    /// Per-field default overrides (JSON array or object of booleans)
    #[arg(long)]
    field_defaults: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write registry.json, builders.rs and encoders.rs
    Generate {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,
    },

    /// Print the typed-data registry (or one entry) as JSON
    Inspect {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Only print the entry for this type URL
        #[arg(short, long)]
        type_url: Option<String>,
    },

    /// Encode a JSON value for a request type and print the bytes as hex
    Encode {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Type URL of the request, e.g. /demo.license.v1.MsgDelegate
        #[arg(short, long)]
        type_url: String,

        /// JSON input file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("Encode failed: {0}")]
    Coerce(#[from] CoerceError),

    #[error("Unknown type url {0}")]
    UnknownTypeUrl(String),
}

impl SchemaArgs {
    fn load_config(&self) -> Result<GeneratorConfig, CodegenError> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(path) = &self.type_overrides {
            config.load_type_overrides(path)?;
        }
        if let Some(path) = &self.field_defaults {
            config.load_field_defaults(path)?;
        }
        Ok(config)
    }
}

fn read_input(input: Option<&Path>) -> Result<serde_json::Value, CodegenError> {
    let text = match input {
        Some(path) => fs::read_to_string(path).map_err(|e| CodegenError::io(path, e))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CodegenError::io("<stdin>", e))?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}

/// Compiles the corpus and encodes `value` for `type_url`, hex-encoded.
fn encode_hex(
    schema_dir: &Path,
    config: &GeneratorConfig,
    type_url: &str,
    value: &serde_json::Value,
) -> Result<String, CliError> {
    let table = compile_schema(schema_dir, config)?.encoder_table();
    let bytes = table.encode(type_url, value)?;
    Ok(hex::encode(bytes))
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Generate { schema, out_dir } => {
            let config = schema.load_config()?;
            let generation = generate(&schema.schema_dir, out_dir, &config)?;
            info!(
                entries = generation.registry.len(),
                builders = generation.builders.entries.len(),
                "generated {} into {}",
                schema.schema_dir.display(),
                out_dir.display()
            );
            Ok(())
        }

        Commands::Inspect { schema, type_url } => {
            let config = schema.load_config()?;
            let generation = compile_schema(&schema.schema_dir, &config)?;
            match type_url {
                Some(url) => {
                    let entry = generation
                        .registry
                        .get(url)
                        .ok_or_else(|| CliError::UnknownTypeUrl(url.clone()))?;
                    let text = serde_json::to_string_pretty(entry).map_err(CodegenError::from)?;
                    println!("{}", text);
                }
                None => print!("{}", registry_to_json(&generation.registry)?),
            }
            Ok(())
        }

        Commands::Encode {
            schema,
            type_url,
            input,
        } => {
            let config = schema.load_config()?;
            let value = read_input(input.as_deref())?;
            println!("{}", encode_hex(&schema.schema_dir, &config, type_url, &value)?);
            Ok(())
        }
    }
}
