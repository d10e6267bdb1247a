//! TCP transport.
//!
//! Dials `host:port` with a connect timeout, then exchanges newline-terminated
//! frames. Connect, write and the read of each complete response frame are
//! each bounded by the configured timeout.
//!
//! # Example
//!
//! ```ignore
//! use confd_client::transport::{TcpTransport, Transport};
//!
//! let mut transport = TcpTransport::new("127.0.0.1:4472");
//! transport.open().await?;
//! transport.send(b"{\"id\":1,\"method\":\"get_SID\",\"params\":[],\"session\":{\"name\":\"cli\"}}\n").await?;
//! let frame = transport.receive().await?;
//! transport.close().await?;
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{with_timeout, Transport, TransportError, DEFAULT_TIMEOUT};
use crate::protocol::{LineBuffer, DEFAULT_MAX_FRAME_SIZE};

/// Read buffer size for a single socket read.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// TCP stream transport.
pub struct TcpTransport {
    address: String,
    timeout: Duration,
    max_frame_size: usize,
    stream: Option<TcpStream>,
    buffer: LineBuffer,
    /// Complete frames read ahead of the current exchange.
    pending: VecDeque<Bytes>,
}

impl TcpTransport {
    /// Create a closed transport for `address` (`host:port`).
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            stream: None,
            buffer: LineBuffer::new(),
            pending: VecDeque::new(),
        }
    }

    /// Set the maximum accepted response frame size.
    ///
    /// Takes effect the next time the transport is opened.
    pub fn set_max_frame_size(&mut self, max_frame_size: usize) {
        self.max_frame_size = max_frame_size;
    }

    /// Get the maximum accepted response frame size.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::NotOpen)
    }
}

#[async_trait]
impl Transport for TcpTransport {
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
        self.stream.is_some()
    }

    async fn open(&mut self) -> Result<(), TransportError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let address = self.address.clone();
        let stream = with_timeout("connect", self.timeout, async {
            TcpStream::connect(&address)
                .await
                .map_err(|source| TransportError::Connect {
                    address: address.clone(),
                    source,
                })
        })
        .await?;
        stream.set_nodelay(true)?;

        tracing::debug!("Connected to {}", self.address);
        self.buffer = LineBuffer::with_max_frame_size(self.max_frame_size);
        self.pending.clear();
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let timeout = self.timeout;
        let stream = self.stream_mut()?;

        with_timeout("write", timeout, async {
            stream.write_all(frame).await?;
            stream.flush().await?;
            Ok::<(), TransportError>(())
        })
        .await?;

        tracing::trace!("Sent frame of {} bytes", frame.len());
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes, TransportError> {
        if let Some(frame) = self.pending.pop_front() {
            return Ok(frame);
        }

        let timeout = self.timeout;
        let Self {
            stream,
            buffer,
            pending,
            ..
        } = self;
        let stream = stream.as_mut().ok_or(TransportError::NotOpen)?;

        // One deadline for the whole frame, however the peer paces its bytes.
        let frame = with_timeout("read", timeout, read_frame(stream, buffer, pending)).await?;

        tracing::trace!("Received frame of {} bytes", frame.len());
        Ok(frame)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.buffer.clear();
        self.pending.clear();

        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        let result = with_timeout("shutdown", self.timeout, async {
            match stream.shutdown().await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
                Err(e) => Err(TransportError::Io(e)),
            }
        })
        .await;

        tracing::debug!("Closed connection to {}", self.address);
        result
    }
}

/// Read until `buffer` yields at least one complete frame.
async fn read_frame(
    stream: &mut TcpStream,
    buffer: &mut LineBuffer,
    pending: &mut VecDeque<Bytes>,
) -> Result<Bytes, TransportError> {
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(TransportError::Closed);
        }

        pending.extend(buffer.push(&chunk[..n])?);
        if let Some(frame) = pending.pop_front() {
            return Ok(frame);
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let (read, mut write) = socket.into_split();
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = format!("{}\n", line);
                        if write.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        address
    }

    #[test]
    fn test_new_is_closed() {
        let transport = TcpTransport::new("127.0.0.1:4472");
        assert!(!transport.is_open());
        assert_eq!(transport.address(), "127.0.0.1:4472");
        assert_eq!(transport.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(transport.max_frame_size(), DEFAULT_MAX_FRAME_SIZE);
    }

    #[tokio::test]
    async fn test_send_on_closed_transport_fails() {
        let mut transport = TcpTransport::new("127.0.0.1:4472");

        let err = transport.send(b"x\n").await.unwrap_err();
        assert!(matches!(err, TransportError::NotOpen));

        let err = transport.receive().await.unwrap_err();
        assert!(matches!(err, TransportError::NotOpen));
    }

    #[tokio::test]
    async fn test_round_trip_and_close() {
        let address = echo_server().await;
        let mut transport = TcpTransport::new(address);

        transport.open().await.unwrap();
        assert!(transport.is_open());

        transport.send(b"{\"id\":1}\n").await.unwrap();
        let frame = transport.receive().await.unwrap();
        assert_eq!(&frame[..], b"{\"id\":1}");

        transport.close().await.unwrap();
        assert!(!transport.is_open());
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_after_close() {
        let address = echo_server().await;
        let mut transport = TcpTransport::new(address);

        transport.open().await.unwrap();
        transport.close().await.unwrap();
        transport.open().await.unwrap();

        transport.send(b"again\n").await.unwrap();
        assert_eq!(&transport.receive().await.unwrap()[..], b"again");
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let mut transport = TcpTransport::new(address.clone());
        transport.set_timeout(Duration::from_secs(1));

        match transport.open().await {
            Err(TransportError::Connect { address: a, .. }) => assert_eq!(a, address),
            other => panic!("expected connect error, got {:?}", other),
        }
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn test_peer_close_before_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"{\"id\":1,").await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let mut transport = TcpTransport::new(address);
        transport.open().await.unwrap();

        let err = transport.receive().await.unwrap_err();
        assert!(matches!(err, TransportError::Closed));
    }

    #[tokio::test]
    async fn test_trickling_peer_hits_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Each byte arrives well inside the timeout, the frame never does.
            for _ in 0..100 {
                if socket.write_all(b" ").await.is_err() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let _ = socket.write_all(b"{\"id\":1}\n").await;
        });

        let mut transport = TcpTransport::new(address);
        transport.set_timeout(Duration::from_millis(300));
        transport.open().await.unwrap();

        let started = std::time::Instant::now();
        let err = transport.receive().await.unwrap_err();
        let elapsed = started.elapsed();

        match err {
            TransportError::Timeout { operation, after } => {
                assert_eq!(operation, "read");
                assert_eq!(after, Duration::from_millis(300));
            }
            other => panic!("expected read timeout, got {:?}", other),
        }
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let address = echo_server().await;
        let mut transport = TcpTransport::new(address);
        transport.set_max_frame_size(16);

        transport.open().await.unwrap();
        transport
            .send(b"this line is definitely longer than sixteen bytes\n")
            .await
            .unwrap();

        let err = transport.receive().await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { max: 16, .. }));
    }
}
