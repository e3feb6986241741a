//! Logical-value codec for stored entries.
//!
//! The store persists one plain string per key. String values are stored
//! bare (no quoting), everything else as its JSON text, so a stored counter
//! reads back as `42` and a stored object as structured data. Decoding
//! attempts a structured parse first and silently falls back to the raw
//! string, which keeps entries written by foreign code readable.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure to convert a logical value into its storable form.
///
/// Surfaced when the value cannot be represented by the encoding, most
/// commonly a cyclic or self-referential structure.
#[derive(Debug, Error)]
#[error("value cannot be encoded for storage (cyclic or non-representable structure): {source}")]
pub struct EncodeError {
    #[from]
    source: serde_json::Error,
}

/// Converts any serializable value into its logical form.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, EncodeError> {
    Ok(serde_json::to_value(value)?)
}

/// Encodes a logical value as the raw string persisted in the store.
///
/// String values are stored bare; numbers, booleans and null take their
/// text form; objects and arrays take their JSON encoding.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decodes a raw stored string into a logical value.
///
/// Anything that is not valid JSON comes back as a plain string value.
/// The fallback is silent and non-fatal.
pub fn decode(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
