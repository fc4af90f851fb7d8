//! Paired partial string conversions between query text and stored values.
//!
//! A [`TextCodec`] is two stateless functions: text → value and value → text.
//! Either direction may fail; failure is a [`ConvertError`] with a diagnostic
//! reason, never a panic. The round-trip law: any value the decode direction
//! can produce re-encodes to text that decodes equal (the text itself may be
//! normalized, e.g. hex case-folding).

use alloc::format;
use alloc::string::String;

use crate::value::Value;

/// A string conversion failure: the text does not match the expected type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConvertError {
    /// What the conversion expected.
    pub reason: &'static str,
}

impl ConvertError {
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

#[derive(Debug, Copy, Clone)]
enum DecodeFn {
    Partial(fn(&str) -> Result<Value, ConvertError>),
    Total(fn(&str) -> Value),
}

#[derive(Debug, Copy, Clone)]
enum EncodeFn {
    Partial(fn(&Value) -> Result<String, ConvertError>),
    Total(fn(&Value) -> String),
}

/// A paired, partial, bidirectional conversion between text and a stored
/// [`Value`]. `Copy` and const-constructible so parameter declarations can
/// live in `const`/`static` items.
#[derive(Debug, Copy, Clone)]
pub struct TextCodec {
    decode: DecodeFn,
    encode: EncodeFn,
}

impl TextCodec {
    /// Pair two partial conversions.
    pub const fn partial(
        decode: fn(&str) -> Result<Value, ConvertError>,
        encode: fn(&Value) -> Result<String, ConvertError>,
    ) -> Self {
        Self {
            decode: DecodeFn::Partial(decode),
            encode: EncodeFn::Partial(encode),
        }
    }

    /// Pair two always-succeeding conversions.
    pub const fn total(decode: fn(&str) -> Value, encode: fn(&Value) -> String) -> Self {
        Self {
            decode: DecodeFn::Total(decode),
            encode: EncodeFn::Total(encode),
        }
    }

    /// Text → value.
    pub fn decode(&self, text: &str) -> Result<Value, ConvertError> {
        match self.decode {
            DecodeFn::Partial(f) => f(text),
            DecodeFn::Total(f) => Ok(f(text)),
        }
    }

    /// Value → text.
    pub fn encode(&self, value: &Value) -> Result<String, ConvertError> {
        match self.encode {
            EncodeFn::Partial(f) => f(value),
            EncodeFn::Total(f) => Ok(f(value)),
        }
    }
}

/// Identity text conversion: the text is the value, verbatim.
pub const IDENT: TextCodec = TextCodec::partial(decode_ident, encode_ident);

/// Boolean: `true`/`false`, case-insensitive on decode.
pub const BOOL: TextCodec = TextCodec::partial(decode_bool, encode_bool);

/// Signed decimal integer.
pub const INT: TextCodec = TextCodec::partial(decode_int, encode_int);

/// 32-bit hexadecimal integer. Encodes lowercase with no leading zeros;
/// decodes any case, with or without a `0x` prefix.
pub const HEX_INT: TextCodec = TextCodec::partial(decode_hex_int, encode_hex);

/// 64-bit hexadecimal integer; same text rules as [`HEX_INT`].
pub const HEX_LONG: TextCodec = TextCodec::partial(decode_hex_long, encode_hex);

fn decode_ident(text: &str) -> Result<Value, ConvertError> {
    Ok(Value::Text(String::from(text)))
}

fn encode_ident(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Text(t) => Ok(t.clone()),
        _ => Err(ConvertError::new("expected a text value")),
    }
}

fn decode_bool(text: &str) -> Result<Value, ConvertError> {
    let t = text.trim();
    if t.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if t.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(ConvertError::new("expected true or false"))
    }
}

fn encode_bool(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Bool(true) => Ok(String::from("true")),
        Value::Bool(false) => Ok(String::from("false")),
        _ => Err(ConvertError::new("expected a boolean value")),
    }
}

fn decode_int(text: &str) -> Result<Value, ConvertError> {
    text.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ConvertError::new("expected a decimal integer"))
}

fn encode_int(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Int(i) => Ok(format!("{i}")),
        _ => Err(ConvertError::new("expected an integer value")),
    }
}

/// Strip an optional `0x`/`0X` prefix.
fn hex_body(text: &str) -> &str {
    let t = text.trim();
    t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t)
}

fn decode_hex_int(text: &str) -> Result<Value, ConvertError> {
    let v = u64::from_str_radix(hex_body(text), 16)
        .map_err(|_| ConvertError::new("expected a hexadecimal integer"))?;
    if v > u64::from(u32::MAX) {
        return Err(ConvertError::new("hexadecimal value exceeds 32 bits"));
    }
    Ok(Value::Hex(v))
}

fn decode_hex_long(text: &str) -> Result<Value, ConvertError> {
    u64::from_str_radix(hex_body(text), 16)
        .map(Value::Hex)
        .map_err(|_| ConvertError::new("expected a hexadecimal integer"))
}

fn encode_hex(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Hex(h) => Ok(format!("{h:x}")),
        _ => Err(ConvertError::new("expected a hexadecimal value")),
    }
}
