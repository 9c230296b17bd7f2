// example/build.rs

use std::env;
use std::path::PathBuf;

use protosign::{generate, GeneratorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto");

    let root = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?).join("proto");
    let out_dir = PathBuf::from(env::var("OUT_DIR")?).join("protosign");

    // Builders import message types from `crate::proto`, see src/lib.rs.
    generate(&root, &out_dir, &GeneratorConfig::default())?;
    Ok(())
}
