//! Opaque success payload.
//!
//! Holds the raw JSON `result` value exactly as it appeared on the wire.
//! Uses `bytes::Bytes` so the payload shares memory with the received frame.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use confd_client::protocol::Payload;
//!
//! let payload = Payload::new(Bytes::from_static(b"[1, 2, 3]"));
//! assert_eq!(payload.as_bytes(), b"[1, 2, 3]");
//!
//! let values: Vec<u32> = payload.decode().unwrap();
//! assert_eq!(values, vec![1, 2, 3]);
//! ```

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::codec::JsonCodec;
use crate::error::Result;

const NULL: &[u8] = b"null";

/// Raw JSON result of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Bytes);

impl Payload {
    /// Wrap raw payload bytes.
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// The JSON `null` payload.
    pub fn null() -> Self {
        Self(Bytes::from_static(NULL))
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying Bytes (zero-copy).
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Payload as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Check if the payload is JSON `null`.
    pub fn is_null(&self) -> bool {
        &self.0[..] == NULL
    }

    /// Get the payload length.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        JsonCodec::decode(&self.0)
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Payload> for Bytes {
    fn from(payload: Payload) -> Self {
        payload.0
    }
}
