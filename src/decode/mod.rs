//! Response decoder module
//!
//! Turns JSON response bodies into typed values.
//!
//! # Overview
//!
//! A [`Decoder<T>`] is a function value that decodes a single JSON fragment
//! into a `T`. Object and collection helpers locate the fragment with a
//! dot-notation key path (`"items"`, `"data.results"`, `"$.data[0]"`) and fail
//! the whole response on the first element that does not decode.

mod collection;
mod keypath;
mod types;

pub use collection::{decode_collection, decode_object, parse_json};
pub use keypath::value_at_key_path;
pub use types::{DecodeError, Decoder};
