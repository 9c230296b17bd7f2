/// Protobuf wire types, as carried in the low three bits of a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

/// A growable byte buffer meant for writing protobuf wire data.
///
/// Example usage:
///
/// ```
/// use protosign_schema::{ByteBufferMut, WireType};
/// let mut bb = ByteBufferMut::new();
/// bb.write_tag(1, WireType::Varint);
/// bb.write_var_uint64(150);
/// assert_eq!(bb.data(), [0x08, 0x96, 0x01]);
/// ```
#[derive(Debug, Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying byte vector.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a bool as a single-byte varint.
    pub fn write_bool(&mut self, value: bool) {
        self.write_byte(if value { 1 } else { 0 });
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    /// Write a field key: `(field_number << 3) | wire_type`.
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) {
        self.write_var_uint((field_number << 3) | wire_type as u32);
    }

    /// Write a base-128 varint. Uses at most ten bytes.
    pub fn write_var_uint64(&mut self, mut value: u64) {
        while value > 127 {
            self.write_byte((value as u8 & 127) | 128);
            value >>= 7;
        }
        self.write_byte(value as u8);
    }

    pub fn write_var_uint(&mut self, value: u32) {
        self.write_var_uint64(value as u64);
    }

    /// Write an `int32`. Negative values are sign-extended to 64 bits and
    /// always take ten bytes.
    pub fn write_var_int(&mut self, value: i32) {
        self.write_var_uint64(value as i64 as u64);
    }

    pub fn write_var_int64(&mut self, value: i64) {
        self.write_var_uint64(value as u64);
    }

    /// Write a `sint32` using zigzag encoding.
    pub fn write_zigzag(&mut self, value: i32) {
        self.write_var_uint(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Write a `sint64` using zigzag encoding.
    pub fn write_zigzag64(&mut self, value: i64) {
        self.write_var_uint64(((value << 1) ^ (value >> 63)) as u64);
    }

    pub fn write_fixed32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_float(&mut self, value: f32) {
        self.write_fixed32(value.to_bits());
    }

    pub fn write_double(&mut self, value: f64) {
        self.write_fixed64(value.to_bits());
    }

    /// Write a length prefix followed by the payload.
    pub fn write_length_delimited(&mut self, value: &[u8]) {
        self.write_var_uint64(value.len() as u64);
        self.write_bytes(value);
    }

    /// Write a UTF-8 string as a length-delimited payload.
    pub fn write_string(&mut self, value: &str) {
        self.write_length_delimited(value.as_bytes());
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_bool() {
    assert_eq!(write_once(|bb| bb.write_bool(false)), [0]);
    assert_eq!(write_once(|bb| bb.write_bool(true)), [1]);
}

#[test]
fn write_tag() {
    assert_eq!(write_once(|bb| bb.write_tag(1, WireType::Varint)), [0x08]);
    assert_eq!(write_once(|bb| bb.write_tag(2, WireType::LengthDelimited)), [0x12]);
    assert_eq!(write_once(|bb| bb.write_tag(3, WireType::Fixed32)), [0x1d]);
    assert_eq!(write_once(|bb| bb.write_tag(4, WireType::Fixed64)), [0x21]);
    assert_eq!(write_once(|bb| bb.write_tag(16, WireType::Varint)), [0x80, 0x01]);
}

#[test]
fn write_var_uint64() {
    assert_eq!(write_once(|bb| bb.write_var_uint64(0)), [0]);
    assert_eq!(write_once(|bb| bb.write_var_uint64(1)), [1]);
    assert_eq!(write_once(|bb| bb.write_var_uint64(127)), [127]);
    assert_eq!(write_once(|bb| bb.write_var_uint64(128)), [128, 1]);
    assert_eq!(write_once(|bb| bb.write_var_uint64(300)), [0xac, 0x02]);
    assert_eq!(
        write_once(|bb| bb.write_var_uint64(u64::MAX)),
        [255, 255, 255, 255, 255, 255, 255, 255, 255, 1]
    );
}

#[test]
fn write_var_int() {
    assert_eq!(write_once(|bb| bb.write_var_int(0)), [0]);
    assert_eq!(write_once(|bb| bb.write_var_int(1)), [1]);
    assert_eq!(
        write_once(|bb| bb.write_var_int(-1)),
        [255, 255, 255, 255, 255, 255, 255, 255, 255, 1]
    );
    assert_eq!(
        write_once(|bb| bb.write_var_int64(-2)),
        [254, 255, 255, 255, 255, 255, 255, 255, 255, 1]
    );
}

#[test]
fn write_zigzag() {
    assert_eq!(write_once(|bb| bb.write_zigzag(0)), [0]);
    assert_eq!(write_once(|bb| bb.write_zigzag(-1)), [1]);
    assert_eq!(write_once(|bb| bb.write_zigzag(1)), [2]);
    assert_eq!(write_once(|bb| bb.write_zigzag(-2)), [3]);
    assert_eq!(write_once(|bb| bb.write_zigzag(i32::MAX)), [254, 255, 255, 255, 15]);
    assert_eq!(write_once(|bb| bb.write_zigzag(i32::MIN)), [255, 255, 255, 255, 15]);
    assert_eq!(write_once(|bb| bb.write_zigzag64(-65)), [129, 1]);
}

#[test]
fn write_fixed() {
    assert_eq!(write_once(|bb| bb.write_fixed32(1)), [1, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_fixed64(1)), [1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_float(1.0)), [0, 0, 0x80, 0x3f]);
    assert_eq!(
        write_once(|bb| bb.write_double(1.0)),
        [0, 0, 0, 0, 0, 0, 0xf0, 0x3f]
    );
}

#[test]
fn write_string() {
    assert_eq!(write_once(|bb| bb.write_string("")), [0]);
    assert_eq!(write_once(|bb| bb.write_string("abc")), [3, 97, 98, 99]);
    assert_eq!(
        write_once(|bb| bb.write_string("🍕")),
        [4, 240, 159, 141, 149]
    );
}
