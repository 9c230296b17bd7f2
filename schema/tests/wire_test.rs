use std::collections::BTreeMap;

use prost::Message;
use protosign_schema::{Def, Field, ScalarKind, Schema, Value};

#[derive(Clone, PartialEq, Message)]
struct Kinds {
    #[prost(sint32, tag = "1")]
    a: i32,
    #[prost(sint64, tag = "2")]
    b: i64,
    #[prost(fixed32, tag = "3")]
    c: u32,
    #[prost(sfixed64, tag = "4")]
    d: i64,
    #[prost(double, tag = "5")]
    e: f64,
    #[prost(float, tag = "6")]
    f: f32,
    #[prost(int32, tag = "7")]
    g: i32,
    #[prost(sint64, repeated, tag = "8")]
    h: Vec<i64>,
    #[prost(string, repeated, tag = "9")]
    i: Vec<String>,
    #[prost(bytes = "vec", tag = "10")]
    j: Vec<u8>,
    #[prost(int32, tag = "11")]
    k: i32,
    #[prost(uint32, tag = "12")]
    l: u32,
}

fn kinds_schema() -> Schema {
    Schema::new(vec![Def::new(
        "demo.Kinds",
        vec![
            Field::scalar("a", 1, ScalarKind::SInt32, false),
            Field::scalar("b", 2, ScalarKind::SInt64, false),
            Field::scalar("c", 3, ScalarKind::Fixed32, false),
            Field::scalar("d", 4, ScalarKind::SFixed64, false),
            Field::scalar("e", 5, ScalarKind::Double, false),
            Field::scalar("f", 6, ScalarKind::Float, false),
            Field::scalar("g", 7, ScalarKind::Int32, false),
            Field::scalar("h", 8, ScalarKind::SInt64, true),
            Field::scalar("i", 9, ScalarKind::String, true),
            Field::scalar("j", 10, ScalarKind::Bytes, false),
            Field::scalar("k", 11, ScalarKind::Enum, false),
            Field::scalar("l", 12, ScalarKind::UInt32, false),
        ],
    )])
}

#[test]
fn every_scalar_kind_matches_prost() {
    let mut fields = BTreeMap::new();
    fields.insert("a".to_string(), Value::Int32(-3));
    fields.insert("b".to_string(), Value::Int64(-300));
    fields.insert("c".to_string(), Value::UInt32(7));
    fields.insert("d".to_string(), Value::Int64(-1));
    fields.insert("e".to_string(), Value::Double(1.5));
    fields.insert("f".to_string(), Value::Float(-0.25));
    fields.insert("g".to_string(), Value::Int32(-2));
    fields.insert(
        "h".to_string(),
        Value::Array(vec![Value::Int64(1), Value::Int64(-1), Value::Int64(1 << 40)]),
    );
    fields.insert(
        "i".to_string(),
        Value::Array(vec![Value::String("x".into()), Value::String(String::new())]),
    );
    fields.insert("j".to_string(), Value::Bytes(vec![0, 255]));
    fields.insert("k".to_string(), Value::Int32(2));
    fields.insert("l".to_string(), Value::UInt32(0));

    let bytes = kinds_schema()
        .encode("demo.Kinds", &Value::Object(fields))
        .unwrap();

    let native = Kinds {
        a: -3,
        b: -300,
        c: 7,
        d: -1,
        e: 1.5,
        f: -0.25,
        g: -2,
        h: vec![1, -1, 1 << 40],
        i: vec!["x".into(), String::new()],
        j: vec![0, 255],
        k: 2,
        l: 0,
    };
    assert_eq!(bytes, native.encode_to_vec());
}

#[test]
fn empty_object_encodes_to_nothing() {
    let bytes = kinds_schema()
        .encode("demo.Kinds", &Value::Object(BTreeMap::new()))
        .unwrap();
    assert!(bytes.is_empty());
    assert_eq!(Kinds::default().encode_to_vec(), bytes);
}
