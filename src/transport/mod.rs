//! Transport module - one point-to-point stream carrying request/response frames.
//!
//! The [`Transport`] trait is the capability the connection layer drives:
//! open, send one request frame, receive one response frame, close.
//! Transports move opaque newline-terminated frames and know nothing about
//! sessions or the JSON envelope.
//!
//! Variants:
//! - [`TcpTransport`] - TCP stream with per-operation timeout
//! - [`MemoryTransport`] - in-process responder with deterministic timeouts

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

mod memory;
mod tcp;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

/// Default timeout for connect, write and read operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised below the protocol layer.
///
/// None of these mean the server rejected a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Operation attempted on a transport that has not been opened.
    #[error("transport is not open")]
    NotOpen,

    /// Dialing the remote endpoint failed.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation did not complete within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// I/O error on an open stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream before a complete frame arrived.
    #[error("connection closed before a complete response was received")]
    Closed,

    /// A frame exceeded the configured maximum size.
    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// A complete frame arrived but could not be decoded.
    #[error("malformed response frame: {0}")]
    MalformedFrame(String),

    /// The response belongs to a different request.
    #[error("response id {actual:?} does not match request id {expected}")]
    UnexpectedResponse { expected: u64, actual: Option<u64> },
}

/// A stream connection that carries one request frame and one response frame
/// per exchange.
///
/// Implementations must not reconnect on their own: `send` and `receive` on a
/// closed transport fail with [`TransportError::NotOpen`]. `open` on an open
/// transport and `close` on a closed one are no-ops.
#[async_trait]
pub trait Transport: Send {
    /// Remote address this transport dials (`host:port`).
    fn address(&self) -> &str;

    /// Current operation timeout.
    fn timeout(&self) -> Duration;

    /// Change the operation timeout. Applies to subsequent operations.
    fn set_timeout(&mut self, timeout: Duration);

    /// Whether the underlying stream is currently held.
    fn is_open(&self) -> bool;

    /// Acquire the underlying stream.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Write one complete frame (terminator included).
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Read one complete frame, terminator stripped.
    async fn receive(&mut self) -> Result<Bytes, TransportError>;

    /// Release the underlying stream.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Run `fut` under `timeout`, mapping expiry to [`TransportError::Timeout`].
pub(crate) async fn with_timeout<F, T>(
    operation: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, TransportError>
where
    F: std::future::Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout {
            operation,
            after: timeout,
        }),
    }
}
