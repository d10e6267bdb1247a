//! Server-side rejections.
//!
//! An error frame carries three fields kept apart for programmatic use while
//! rendering exactly as `"<SEVERITY> [<CODE>] <message>"`:
//!
//! ```
//! use confd_client::protocol::{ProtocolError, Severity};
//!
//! let err = ProtocolError::new(Severity::Fatal, "FUNCTION_UNKNOWN", "No such function.");
//! assert_eq!(err.to_string(), "FATAL [FUNCTION_UNKNOWN] No such function.");
//! assert!(err.is_fatal());
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Code used when the server sends a bare string instead of an error object.
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN";

/// Severity class of a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The request failed and nothing was done.
    Fatal,
    /// Recoverable error.
    Error,
    /// Informational rejection.
    Warning,
    /// Any other token the server sends, kept verbatim.
    Other(String),
}

impl Severity {
    /// Wire token for this severity.
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Other(s) => s,
        }
    }
}

impl From<&str> for Severity {
    fn from(token: &str) -> Self {
        match token {
            "FATAL" => Severity::Fatal,
            "ERROR" => Severity::Error,
            "WARNING" => Severity::Warning,
            other => Severity::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Severity::from(token.as_str()))
    }
}

/// A decoded server rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolError {
    severity: Severity,
    code: String,
    message: String,
}

impl ProtocolError {
    /// Create a new rejection.
    pub fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Severity class.
    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    /// Machine-readable code, e.g. `FUNCTION_UNKNOWN`.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if the severity is `FATAL`.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)
    }
}

impl std::error::Error for ProtocolError {}

/// The `error` member of a response as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireError {
    Structured(ProtocolError),
    Message(String),
}

impl WireError {
    /// Validate and convert into a [`ProtocolError`].
    ///
    /// Returns `None` when the error object is unusable (empty code).
    pub(crate) fn into_protocol_error(self) -> Option<ProtocolError> {
        match self {
            WireError::Structured(err) if err.code.is_empty() => None,
            WireError::Structured(err) => Some(err),
            WireError::Message(message) => Some(ProtocolError::new(
                Severity::Error,
                UNKNOWN_ERROR_CODE,
                message,
            )),
        }
    }
}
