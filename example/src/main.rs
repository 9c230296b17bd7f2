// example/src/main.rs

use std::path::Path;

use prost::Message;
use protosign::{compile_schema, GeneratorConfig};
use protosign_example::{builders, encoders, proto::demo::license::v1::MsgRevoke, REGISTRY_JSON};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Registry:");
    print!("{}", REGISTRY_JSON);
    println!("Request types: {:?}", builders::TYPE_URLS);

    // licenseIds arrive as decimal strings, the way wallets usually send u64s.
    let value = json!({
        "owner": "lic1owner",
        "operator": "lic1operator",
        "licenseIds": ["1", "42"],
        "window": { "period": { "seconds": "3600", "nanos": 0 }, "renewable": true },
    });

    let bytes = encoders::encode("/demo.license.v1.MsgDelegate", &value)?;
    println!("MsgDelegate ({} bytes): {}", bytes.len(), hex::encode(&bytes));

    // The same plans, compiled at runtime instead of at build time.
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("proto");
    let table = compile_schema(&root, &GeneratorConfig::default())?.encoder_table();
    assert_eq!(table.encode("/demo.license.v1.MsgDelegate", &value)?, bytes);

    // Coercion failures name the offending field.
    let bad = json!({ "owner": "lic1owner", "licenseIds": ["one"] });
    match encoders::encode("/demo.license.v1.MsgDelegate", &bad) {
        Ok(_) => println!("unexpectedly encoded"),
        Err(err) => println!("Rejected: {}", err),
    }

    let payload = builders::license::revoke(MsgRevoke {
        owner:    "lic1owner".into(),
        operator: "lic1operator".into(),
    });
    if let builders::Payload::LicenseRevoke(msg) = &payload {
        println!("{} ({} bytes)", payload.type_url(), msg.encode_to_vec().len());
    }

    Ok(())
}
