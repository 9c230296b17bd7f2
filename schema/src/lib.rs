//! Runtime support for encoders generated by `protosign-compiler`.
//!
//! Generated mapping functions coerce untyped JSON input into a schema-exact
//! [Value] through the helpers in [coerce]; the composed encoders then fill
//! structural defaults and write protobuf wire bytes through a [Schema].
//!
//! ```
//! use protosign_schema::*;
//! use std::collections::BTreeMap;
//!
//! let schema = Schema::new(vec![
//!     Def::new("demo.Point", vec![
//!         Field::scalar("x", 1, ScalarKind::Int32, false),
//!         Field::scalar("y", 2, ScalarKind::Int32, false),
//!     ]),
//! ]);
//!
//! let mut fields = BTreeMap::new();
//! fields.insert("x".to_owned(), Value::Int32(150));
//! fields.insert("y".to_owned(), Value::Int32(0));
//! let bytes = schema.encode("demo.Point", &Value::Object(fields)).unwrap();
//! assert_eq!(bytes, [0x08, 0x96, 0x01]);
//! ```

pub mod bb;
pub mod coerce;
pub mod error;
pub mod kind;
pub mod schema;
pub mod value;

pub use bb::*;
pub use coerce::{FieldView, Policy, DEFAULT_LABEL};
pub use error::CoerceError;
pub use kind::*;
pub use schema::*;
pub use value::*;

/// Untyped encoder input.
pub use serde_json::Value as Json;

/// A composed encoder: untyped input in, wire bytes out.
pub type Encoder = fn(&Json) -> Result<Vec<u8>, CoerceError>;
