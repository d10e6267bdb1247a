//! Codec module - serialization for parameters and payloads.
//!
//! - [`JsonCodec`] - `serde_json` encoding of positional parameters and typed
//!   decoding of result payloads
//!
//! Codecs are marker structs with static methods rather than trait objects.

mod json;

pub use json::JsonCodec;
