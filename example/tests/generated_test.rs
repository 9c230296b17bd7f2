use prost::Message;
use protosign_example::{
    builders, encoders,
    proto::demo::license::v1::{MsgDelegate, MsgRevoke, Window},
    proto::google::protobuf::Duration,
    REGISTRY_JSON,
};
use protosign_schema::CoerceError;
use serde_json::json;

const DELEGATE: &str = "/demo.license.v1.MsgDelegate";

#[test]
fn generated_encoder_matches_prost() {
    let input = json!({
        "owner": "a1",
        "operator": "a2",
        "licenseIds": [1, "2", 3],
        "window": {"period": {"seconds": 60, "nanos": 0}, "renewable": true},
    });
    let bytes = encoders::encode(DELEGATE, &input).unwrap();

    let native = MsgDelegate {
        owner:       "a1".into(),
        operator:    "a2".into(),
        license_ids: vec![1, 2, 3],
        window:      Some(Window {
            period:    Some(Duration { seconds: 60, nanos: 0 }),
            renewable: true,
        }),
    };
    assert_eq!(bytes, native.encode_to_vec());

    let table = encoders::encoders();
    assert_eq!(table[DELEGATE](&input).unwrap(), bytes);
    assert_eq!(
        encoders::encode_demo_license_v1_msg_delegate(&input).unwrap(),
        bytes
    );
}

#[test]
fn generated_encoder_reports_field_paths() {
    let err = encoders::encode(DELEGATE, &json!({"owner": 1})).unwrap_err();
    assert_eq!(err.path(), Some("value.owner"));

    let err = encoders::encode(
        DELEGATE,
        &json!({
            "owner": "a1",
            "operator": "a2",
            "licenseIds": [],
            "window": {"period": {"seconds": 5, "nanos": -1}, "renewable": false},
        }),
    )
    .unwrap_err();
    assert_eq!(err.path(), Some("value.window.period"));

    assert_eq!(
        encoders::encode("/demo.license.v1.MsgNope", &json!({})).unwrap_err(),
        CoerceError::UnknownTypeUrl("/demo.license.v1.MsgNope".into())
    );
}

#[test]
fn generated_builders_tag_payloads() {
    assert_eq!(
        builders::TYPE_URLS,
        ["/demo.license.v1.MsgDelegate", "/demo.license.v1.MsgRevoke"]
    );

    let delegate = builders::license::delegate(MsgDelegate::default());
    assert_eq!(delegate.type_url(), DELEGATE);

    let revoke = MsgRevoke {
        owner:    "a1".into(),
        operator: "a2".into(),
    };
    let payload = builders::license::revoke(revoke.clone());
    assert_eq!(payload, builders::Payload::LicenseRevoke(revoke));
    assert_eq!(payload.type_url(), "/demo.license.v1.MsgRevoke");
}

#[test]
fn generated_registry_is_bundled() {
    let registry = protosign::registry_from_json(REGISTRY_JSON).unwrap();
    let entry = registry.get(DELEGATE).unwrap();
    assert_eq!(entry.legacy_name, "license/MsgDelegate");
    assert!(entry.duration_fields.contains("period"));
    assert_eq!(entry.nested_types["window"].len(), 2);
}
