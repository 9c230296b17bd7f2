use crate::bb::WireType;

pub const DURATION_TYPE: &str = "google.protobuf.Duration";
pub const TIMESTAMP_TYPE: &str = "google.protobuf.Timestamp";

/// Every non-message field type a schema can declare.
///
/// Resolved once, when a field's declared type is classified; generated code
/// and the in-process encoders carry the variant instead of the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarKind {
    String,
    Bytes,
    Bool,
    Int32,
    SInt32,
    SFixed32,
    UInt32,
    Fixed32,
    Int64,
    SInt64,
    SFixed64,
    UInt64,
    Fixed64,
    Float,
    Double,
    Enum,
    Duration,
    Timestamp,
}

pub const ALL_SCALAR_KINDS: [ScalarKind; 18] = [
    ScalarKind::String,
    ScalarKind::Bytes,
    ScalarKind::Bool,
    ScalarKind::Int32,
    ScalarKind::SInt32,
    ScalarKind::SFixed32,
    ScalarKind::UInt32,
    ScalarKind::Fixed32,
    ScalarKind::Int64,
    ScalarKind::SInt64,
    ScalarKind::SFixed64,
    ScalarKind::UInt64,
    ScalarKind::Fixed64,
    ScalarKind::Float,
    ScalarKind::Double,
    ScalarKind::Enum,
    ScalarKind::Duration,
    ScalarKind::Timestamp,
];

impl ScalarKind {
    /// Maps a schema scalar keyword (`uint64`, `string`, ...) to its kind.
    /// Enums and well-known types are not keywords and return `None`.
    pub fn from_keyword(keyword: &str) -> Option<ScalarKind> {
        let kind = match keyword {
            "string" => ScalarKind::String,
            "bytes" => ScalarKind::Bytes,
            "bool" => ScalarKind::Bool,
            "int32" => ScalarKind::Int32,
            "sint32" => ScalarKind::SInt32,
            "sfixed32" => ScalarKind::SFixed32,
            "uint32" => ScalarKind::UInt32,
            "fixed32" => ScalarKind::Fixed32,
            "int64" => ScalarKind::Int64,
            "sint64" => ScalarKind::SInt64,
            "sfixed64" => ScalarKind::SFixed64,
            "uint64" => ScalarKind::UInt64,
            "fixed64" => ScalarKind::Fixed64,
            "float" => ScalarKind::Float,
            "double" => ScalarKind::Double,
            _ => return None,
        };
        Some(kind)
    }

    /// Recognizes the well-known message types that are treated as scalars.
    pub fn from_well_known(type_name: &str) -> Option<ScalarKind> {
        match type_name.trim_start_matches('.') {
            DURATION_TYPE => Some(ScalarKind::Duration),
            TIMESTAMP_TYPE => Some(ScalarKind::Timestamp),
            _ => None,
        }
    }

    /// The name used in error messages and emitted descriptors.
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Bool => "bool",
            ScalarKind::Int32 => "int32",
            ScalarKind::SInt32 => "sint32",
            ScalarKind::SFixed32 => "sfixed32",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Int64 => "int64",
            ScalarKind::SInt64 => "sint64",
            ScalarKind::SFixed64 => "sfixed64",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::Enum => "enum",
            ScalarKind::Duration => "duration",
            ScalarKind::Timestamp => "timestamp",
        }
    }

    /// The Rust path segment of this variant, for code generation.
    pub fn variant_name(self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Bytes => "Bytes",
            ScalarKind::Bool => "Bool",
            ScalarKind::Int32 => "Int32",
            ScalarKind::SInt32 => "SInt32",
            ScalarKind::SFixed32 => "SFixed32",
            ScalarKind::UInt32 => "UInt32",
            ScalarKind::Fixed32 => "Fixed32",
            ScalarKind::Int64 => "Int64",
            ScalarKind::SInt64 => "SInt64",
            ScalarKind::SFixed64 => "SFixed64",
            ScalarKind::UInt64 => "UInt64",
            ScalarKind::Fixed64 => "Fixed64",
            ScalarKind::Float => "Float",
            ScalarKind::Double => "Double",
            ScalarKind::Enum => "Enum",
            ScalarKind::Duration => "Duration",
            ScalarKind::Timestamp => "Timestamp",
        }
    }

    /// Typed-data signing type. Only booleans keep a native type; integers,
    /// bytes, floats, durations and timestamps are signed as text.
    pub fn signing_type(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            _ => "string",
        }
    }

    pub fn is_duration(self) -> bool {
        self == ScalarKind::Duration
    }

    /// `true` for kinds whose signed and unsigned ranges are 64 bits wide.
    pub fn is_wide(self) -> bool {
        matches!(
            self,
            ScalarKind::Int64
                | ScalarKind::SInt64
                | ScalarKind::SFixed64
                | ScalarKind::UInt64
                | ScalarKind::Fixed64
        )
    }

    pub fn wire_type(self) -> WireType {
        match self {
            ScalarKind::String
            | ScalarKind::Bytes
            | ScalarKind::Duration
            | ScalarKind::Timestamp => WireType::LengthDelimited,
            ScalarKind::SFixed32 | ScalarKind::Fixed32 | ScalarKind::Float => WireType::Fixed32,
            ScalarKind::SFixed64 | ScalarKind::Fixed64 | ScalarKind::Double => WireType::Fixed64,
            _ => WireType::Varint,
        }
    }

    /// Repeated fields of packable kinds are written as one packed run.
    pub fn is_packable(self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }
}
