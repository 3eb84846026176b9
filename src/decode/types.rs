//! Decoder types
//!
//! Defines the element decoder function value and its error.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failure to turn a JSON fragment into the target type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    /// Human readable reason
    pub message: String,
    /// Key path or element position the failure refers to
    pub path: Option<String>,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// The key path did not resolve to any value
    pub fn missing_key_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: format!("JSON response collection could not be found at '{path}'"),
            path: Some(path),
        }
    }

    /// The key path resolved to something other than an array
    pub fn not_a_collection(path: Option<&str>) -> Self {
        Self {
            message: format!(
                "Expected a JSON array at '{}'",
                path.unwrap_or("<root>")
            ),
            path: path.map(String::from),
        }
    }

    /// The response body is not valid JSON
    pub fn invalid_json(message: impl fmt::Display) -> Self {
        Self::new(format!("Response body is not valid JSON: {message}"))
    }

    /// Prefix the error with the position of the element that failed
    #[must_use]
    pub fn at_index(self, index: usize) -> Self {
        Self {
            message: format!("element {index}: {}", self.message),
            path: Some(format!("[{index}]")),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

type DecodeFn<T> = dyn Fn(&Value) -> Result<T, DecodeError> + Send + Sync;

/// Decodes one JSON fragment into a `T`
///
/// Any `DeserializeOwned` type gets a decoder through [`Decoder::serde`];
/// hand-written mappings use [`Decoder::new`].
pub struct Decoder<T> {
    decode: Arc<DecodeFn<T>>,
}

impl<T> Decoder<T> {
    /// Create a decoder from a function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(f),
        }
    }

    /// Decode a single JSON fragment
    pub fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        (self.decode)(value)
    }

    /// Transform decoded values
    pub fn map<U, F>(self, f: F) -> Decoder<U>
    where
        T: 'static,
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Decoder::new(move |value| self.decode(value).map(&f))
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> {
    /// Decoder backed by the type's `Deserialize` implementation
    pub fn serde() -> Self {
        Self::new(|value| T::deserialize(value).map_err(DecodeError::from))
    }
}

impl<T: DeserializeOwned + 'static> Default for Decoder<T> {
    fn default() -> Self {
        Self::serde()
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}
