//! Wire format encoding and decoding.
//!
//! Every frame is a single JSON document on one line:
//! ```text
//! -> {"id":1,"method":"get_SID","params":[],"session":{"name":"cli","SID":"..."}}\n
//! <- {"id":1,"result":"...","error":null}\n
//! <- {"id":2,"result":null,"error":{"severity":"FATAL","code":"...","message":"..."}}\n
//! ```
//!
//! The session block carries the SID once one is known. Until then it carries
//! the username and credential, if any.

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use super::error::{ProtocolError, WireError};
use super::payload::Payload;
use crate::transport::TransportError;

/// Terminator ending every frame.
pub const FRAME_TERMINATOR: u8 = b'\n';

/// Default maximum frame size (16 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Command whose successful result is the session identifier.
pub const SESSION_COMMAND: &str = "get_SID";

/// Session block sent with every request.
///
/// Deliberately not `Debug`: it may hold the credential in clear.
#[derive(Serialize)]
pub struct Session<'a> {
    /// Logical client name.
    pub name: &'a str,
    /// Auth principal, only sent while no SID is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    /// Credential, only sent while no SID is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    /// Session identifier.
    #[serde(rename = "SID", skip_serializing_if = "Option::is_none")]
    pub sid: Option<&'a str>,
}

/// One outgoing command.
#[derive(Serialize)]
pub struct Request<'a> {
    /// Request identifier echoed back by the server.
    pub id: u64,
    /// Command name.
    pub method: &'a str,
    /// Positional parameters.
    pub params: &'a [Value],
    /// Session block.
    pub session: Session<'a>,
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Well-formed success, payload passed through untouched.
    Success(Payload),
    /// Server-side rejection.
    Error(ProtocolError),
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoed request identifier, if the server sent one.
    pub id: Option<u64>,
    /// Success payload or rejection, never both.
    pub outcome: Outcome,
}

#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default, borrow)]
    result: Option<&'a RawValue>,
    #[serde(default)]
    error: Option<WireError>,
}

/// Encode a request into a terminated frame.
pub fn encode_request(request: &Request<'_>) -> Result<Bytes, serde_json::Error> {
    let mut buf = BytesMut::with_capacity(128).writer();
    serde_json::to_writer(&mut buf, request)?;

    let mut buf = buf.into_inner();
    buf.put_u8(FRAME_TERMINATOR);
    Ok(buf.freeze())
}

/// Decode one response frame (terminator already stripped).
///
/// A non-null `error` member makes the frame a rejection. Otherwise the raw
/// `result` bytes are sliced out of `frame` without copying; a missing or
/// null result yields a `null` payload.
///
/// # Errors
///
/// Returns [`TransportError::MalformedFrame`] if the frame is not a response
/// envelope.
pub fn decode_response(frame: &Bytes) -> Result<Response, TransportError> {
    let envelope: Envelope<'_> = serde_json::from_slice(frame)
        .map_err(|e| TransportError::MalformedFrame(e.to_string()))?;

    if let Some(wire) = envelope.error {
        let err = wire.into_protocol_error().ok_or_else(|| {
            TransportError::MalformedFrame("error object has an empty code".to_string())
        })?;
        return Ok(Response {
            id: envelope.id,
            outcome: Outcome::Error(err),
        });
    }

    let payload = match envelope.result {
        Some(raw) => Payload::new(frame.slice_ref(raw.get().as_bytes())),
        None => Payload::null(),
    };

    Ok(Response {
        id: envelope.id,
        outcome: Outcome::Success(payload),
    })
}
