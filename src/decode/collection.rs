//! Object and collection decoding
//!
//! A collection decodes all-or-nothing: the first element that fails turns
//! the whole body into a [`DecodeError`].

use super::keypath::value_at_key_path;
use super::types::{DecodeError, Decoder};
use serde_json::Value;

/// Parse a raw response body as JSON
pub fn parse_json(body: &[u8]) -> Result<Value, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(DecodeError::invalid_json)
}

/// Decode the object found at `key_path`
pub fn decode_object<T>(
    json: &Value,
    key_path: Option<&str>,
    decoder: &Decoder<T>,
) -> Result<T, DecodeError> {
    let object = value_at_key_path(json, key_path).ok_or_else(|| {
        DecodeError::missing_key_path(key_path.unwrap_or("<root>"))
    })?;
    decoder.decode(object)
}

/// Decode every element of the array found at `key_path`
pub fn decode_collection<T>(
    json: &Value,
    key_path: Option<&str>,
    decoder: &Decoder<T>,
) -> Result<Vec<T>, DecodeError> {
    let collection = value_at_key_path(json, key_path).ok_or_else(|| {
        DecodeError::missing_key_path(key_path.unwrap_or("<root>"))
    })?;
    let Value::Array(items) = collection else {
        return Err(DecodeError::not_a_collection(key_path));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| decoder.decode(item).map_err(|e| e.at_index(index)))
        .collect()
}
