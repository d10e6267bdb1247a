//! JSON codec using `serde_json`.
//!
//! Commands take a positional parameter list. [`JsonCodec::to_params`] turns
//! a serializable value into that list: an array contributes its elements,
//! `null` (including `()`) contributes nothing, anything else becomes the only
//! parameter.
//!
//! # Example
//!
//! ```
//! use confd_client::codec::JsonCodec;
//! use serde_json::json;
//!
//! let params = JsonCodec::to_params(&("interfaces", 2)).unwrap();
//! assert_eq!(params, vec![json!("interfaces"), json!(2)]);
//!
//! let decoded: Vec<String> = JsonCodec::decode(b"[\"a\",\"b\"]").unwrap();
//! assert_eq!(decoded, vec!["a", "b"]);
//! ```

use serde_json::Value;

use crate::error::Result;

/// JSON codec for parameters and payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode a value into a positional parameter list.
    pub fn to_params<T: serde::Serialize>(value: &T) -> Result<Vec<Value>> {
        Ok(match Self::encode(value)? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }
}
