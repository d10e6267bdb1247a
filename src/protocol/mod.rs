//! Protocol module - wire format, framing, and response decoding.
//!
//! This module implements the line-oriented JSON protocol:
//! - newline framing with a bounded line buffer
//! - request envelope encoding with the session block
//! - response envelope decoding into a payload or a [`ProtocolError`]

mod error;
mod line_buffer;
mod payload;
mod wire_format;

pub use error::{ProtocolError, Severity, UNKNOWN_ERROR_CODE};
pub use line_buffer::LineBuffer;
pub use payload::Payload;
pub use wire_format::{
    decode_response, encode_request, Outcome, Request, Response, Session,
    DEFAULT_MAX_FRAME_SIZE, FRAME_TERMINATOR, SESSION_COMMAND,
};
