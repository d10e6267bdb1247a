//! In-process transport.
//!
//! Each request frame is handed to a responder closure; whatever bytes it
//! returns are framed like data read from a socket. A responder returning
//! `None` never answers, so `receive` fails with a timeout after exactly the
//! configured duration, which makes timeout behavior testable under tokio's
//! paused clock.
//!
//! # Example
//!
//! ```
//! use confd_client::transport::{MemoryTransport, Transport};
//!
//! # tokio_test_block(async {
//! let mut transport = MemoryTransport::new(|frame: &[u8]| Some(frame.to_vec()));
//! transport.open().await.unwrap();
//! transport.send(b"ping\n").await.unwrap();
//! assert_eq!(&transport.receive().await.unwrap()[..], b"ping");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{Transport, TransportError, DEFAULT_TIMEOUT};
use crate::protocol::{LineBuffer, FRAME_TERMINATOR};

/// Address reported by in-process transports.
pub const MEMORY_ADDRESS: &str = "memory";

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>> + Send>;

/// In-process transport driven by a responder closure.
pub struct MemoryTransport {
    address: String,
    timeout: Duration,
    open: bool,
    reachable: bool,
    responder: Responder,
    buffer: LineBuffer,
    inbox: VecDeque<Bytes>,
    sent: Vec<Bytes>,
    opens: usize,
}

impl MemoryTransport {
    /// Create a closed transport answering with `responder`.
    ///
    /// The responder receives each request frame without its terminator. A
    /// missing terminator on the reply is added.
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        Self {
            address: MEMORY_ADDRESS.to_string(),
            timeout: DEFAULT_TIMEOUT,
            open: false,
            reachable: true,
            responder: Box::new(responder),
            buffer: LineBuffer::new(),
            inbox: VecDeque::new(),
            sent: Vec::new(),
            opens: 0,
        }
    }

    /// Create a transport that never answers.
    pub fn silent() -> Self {
        Self::new(|_| None)
    }

    /// Set the reported address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Make subsequent `open` calls fail as if the connection was refused.
    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
    }

    /// Request frames sent so far, terminators stripped.
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    /// Number of successful `open` calls that acquired a new stream.
    pub fn open_count(&self) -> usize {
        self.opens
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn address(&self) -> &str {
        &self.address
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn open(&mut self) -> Result<(), TransportError> {
        if self.open {
            return Ok(());
        }
        if !self.reachable {
            return Err(TransportError::Connect {
                address: self.address.clone(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "endpoint unreachable"),
            });
        }

        self.open = true;
        self.opens += 1;
        Ok(())
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }

        let request = frame.strip_suffix(&[FRAME_TERMINATOR]).unwrap_or(frame);
        self.sent.push(Bytes::copy_from_slice(request));

        if let Some(mut reply) = (self.responder)(request) {
            if reply.last() != Some(&FRAME_TERMINATOR) {
                reply.push(FRAME_TERMINATOR);
            }
            self.inbox.extend(self.buffer.push(&reply)?);
        }
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes, TransportError> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }

        match self.inbox.pop_front() {
            Some(frame) => Ok(frame),
            None => {
                tokio::time::sleep(self.timeout).await;
                Err(TransportError::Timeout {
                    operation: "read",
                    after: self.timeout,
                })
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        self.buffer.clear();
        self.inbox.clear();
        Ok(())
    }
}
