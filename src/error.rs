//! Error types for confd-client.

use thiserror::Error;

use crate::protocol::ProtocolError;
use crate::transport::TransportError;

/// Main error type for all confd operations.
#[derive(Debug, Error)]
pub enum ConfdError {
    /// The connection string could not be used as a confd URL.
    ///
    /// The raw URL is never included, it may carry a credential.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A request was issued without a command name.
    #[error("command name must not be empty")]
    EmptyCommand,

    /// Dial, timeout, read/write or framing failure on the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server rejected the request.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// JSON error while encoding parameters or decoding a payload.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfdError {
    /// Check if this error happened below the protocol layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ConfdError::Transport(_))
    }

    /// Check if this error is a server-side rejection.
    pub fn is_protocol(&self) -> bool {
        matches!(self, ConfdError::Protocol(_))
    }

    /// Get the decoded server rejection, if any.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            ConfdError::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias using ConfdError.
pub type Result<T> = std::result::Result<T, ConfdError>;
