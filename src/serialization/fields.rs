//! Generic field serializer
//!
//! The one place that turns a semantic field value into bytes for a declared
//! encoding and back. Object code never formats numbers or strings itself.

use super::cb58::StringCodec;
use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::fmt;

/// Encodings a field can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Encoding {
    /// Raw bytes, no conversion
    Buffer,
    Hex,
    Cb58,
    Base58,
    /// Base-10 text of a big-endian unsigned integer
    DecimalString,
    Utf8,
    /// Unsigned integer value
    Number,
    /// Structured `{value, encoding}` leaf; output only
    Display,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Buffer => "Buffer",
            Encoding::Hex => "hex",
            Encoding::Cb58 => "cb58",
            Encoding::Base58 => "base58",
            Encoding::DecimalString => "decimalString",
            Encoding::Utf8 => "utf8",
            Encoding::Number => "number",
            Encoding::Display => "display",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value in its semantic (non-byte) form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bytes(Vec<u8>),
    Text(String),
    Number(u128),
}

/// Minimal big-endian bytes of `n`, left-padded to `width` when given
fn number_to_bytes(n: u128, width: Option<usize>) -> Result<Vec<u8>> {
    let full = n.to_be_bytes();
    let significant = full.iter().position(|b| *b != 0).unwrap_or(full.len());
    let minimal = &full[significant..];
    match width {
        None => Ok(minimal.to_vec()),
        Some(w) if minimal.len() > w => Err(CodecError::Overflow(Cow::Owned(format!(
            "value {n} does not fit in {w} bytes"
        )))),
        Some(w) => {
            let mut out = vec![0u8; w - minimal.len()];
            out.extend_from_slice(minimal);
            Ok(out)
        }
    }
}

fn bytes_to_number(bytes: &[u8]) -> Result<u128> {
    let significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let digits = &bytes[significant..];
    if digits.len() > 16 {
        return Err(CodecError::Overflow(Cow::Owned(format!(
            "{}-byte number exceeds 128 bits",
            digits.len()
        ))));
    }
    Ok(digits.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
}

fn expect_text(value: &FieldValue, encoding: Encoding) -> Result<&str> {
    match value {
        FieldValue::Text(s) => Ok(s),
        other => Err(CodecError::InvalidEncoding(Cow::Owned(format!(
            "{encoding} expects text, got {other:?}"
        )))),
    }
}

/// Converts field values to and from bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSerializer {
    strings: StringCodec,
}

impl FieldSerializer {
    pub fn new(strings: StringCodec) -> Self {
        Self { strings }
    }

    pub fn strings(&self) -> &StringCodec {
        &self.strings
    }

    /// Parse a value declared with `encoding` into bytes.
    ///
    /// `width` left-pads numeric encodings to a fixed field size and is
    /// ignored elsewhere.
    pub fn type_to_buffer(
        &self,
        value: &FieldValue,
        encoding: Encoding,
        width: Option<usize>,
    ) -> Result<Vec<u8>> {
        match encoding {
            Encoding::Buffer => match value {
                FieldValue::Bytes(b) => Ok(b.clone()),
                other => Err(CodecError::InvalidEncoding(Cow::Owned(format!(
                    "Buffer expects bytes, got {other:?}"
                )))),
            },
            Encoding::Hex => self.strings.decode_hex(expect_text(value, encoding)?),
            Encoding::Cb58 => self.strings.decode_checked(expect_text(value, encoding)?),
            Encoding::Base58 => self.strings.decode_base58(expect_text(value, encoding)?),
            Encoding::Utf8 => Ok(expect_text(value, encoding)?.as_bytes().to_vec()),
            Encoding::DecimalString => {
                let text = expect_text(value, encoding)?;
                let n = text.parse::<u128>().map_err(|e| {
                    CodecError::InvalidEncoding(Cow::Owned(format!(
                        "decimal string {text:?}: {e}"
                    )))
                })?;
                number_to_bytes(n, width)
            }
            Encoding::Number => match value {
                FieldValue::Number(n) => number_to_bytes(*n, width),
                other => Err(CodecError::InvalidEncoding(Cow::Owned(format!(
                    "number expects a numeric value, got {other:?}"
                )))),
            },
            Encoding::Display => Err(CodecError::InvalidEncoding(Cow::Borrowed(
                "display form cannot be converted back to bytes",
            ))),
        }
    }

    /// Render bytes as a value of `encoding`
    pub fn buffer_to_type(&self, bytes: &[u8], encoding: Encoding) -> Result<FieldValue> {
        Ok(match encoding {
            Encoding::Buffer => FieldValue::Bytes(bytes.to_vec()),
            Encoding::Hex => FieldValue::Text(self.strings.encode_hex(bytes)),
            Encoding::Cb58 => FieldValue::Text(self.strings.encode_checked(bytes)),
            Encoding::Base58 => FieldValue::Text(self.strings.encode_base58(bytes)),
            Encoding::Utf8 => FieldValue::Text(String::from_utf8(bytes.to_vec()).map_err(
                |e| CodecError::InvalidEncoding(Cow::Owned(format!("utf8: {e}"))),
            )?),
            Encoding::DecimalString => FieldValue::Text(bytes_to_number(bytes)?.to_string()),
            Encoding::Number => FieldValue::Number(bytes_to_number(bytes)?),
            Encoding::Display => FieldValue::Text(self.strings.encode_hex(bytes)),
        })
    }

    /// Structured display leaf for bytes rendered in `encoding`
    pub fn display(&self, bytes: &[u8], encoding: Encoding) -> Result<Value> {
        let rendered = match self.buffer_to_type(bytes, encoding)? {
            FieldValue::Bytes(b) => Value::from(b),
            FieldValue::Text(s) => Value::from(s),
            FieldValue::Number(n) => Value::from(n.to_string()),
        };
        Ok(json!({ "value": rendered, "encoding": encoding.name() }))
    }

    /// Display leaf for a plain number
    pub fn display_number(&self, n: u128) -> Value {
        json!({ "value": n.to_string(), "encoding": Encoding::DecimalString.name() })
    }

    /// Display leaf for text
    pub fn display_text(&self, text: &str) -> Value {
        json!({ "value": text, "encoding": Encoding::Utf8.name() })
    }
}
