//! Line buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management. Every frame on the
//! wire is one line terminated by `\n` (an optional `\r` before it is
//! stripped). The buffer remembers how far it has already scanned so a frame
//! arriving byte by byte is not rescanned from the start on every push.
//!
//! # Example
//!
//! ```
//! use confd_client::protocol::LineBuffer;
//!
//! let mut buffer = LineBuffer::new();
//!
//! assert!(buffer.push(b"{\"id\":1,").unwrap().is_empty());
//! let frames = buffer.push(b"\"result\":true}\n").unwrap();
//!
//! assert_eq!(&frames[0][..], b"{\"id\":1,\"result\":true}");
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{DEFAULT_MAX_FRAME_SIZE, FRAME_TERMINATOR};
use crate::transport::TransportError;

/// Buffer for accumulating incoming bytes and extracting complete lines.
pub struct LineBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to contain no terminator.
    scanned: usize,
    /// Maximum allowed frame size, terminator excluded.
    max_frame_size: usize,
}

impl LineBuffer {
    /// Create a new line buffer with default settings.
    ///
    /// Default capacity: 8KB, max frame: 16MB.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a new line buffer with a custom max frame size.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            scanned: 0,
            max_frame_size,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data is kept for the next push. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::FrameTooLarge`] if a frame (complete or still
    /// accumulating) exceeds the maximum frame size.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            if !frame.is_empty() {
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    fn try_extract_one(&mut self) -> Result<Option<Bytes>, TransportError> {
        let found = self.buffer[self.scanned..]
            .iter()
            .position(|&b| b == FRAME_TERMINATOR);

        let Some(offset) = found else {
            self.scanned = self.buffer.len();
            if self.scanned > self.max_frame_size {
                return Err(TransportError::FrameTooLarge {
                    size: self.scanned,
                    max: self.max_frame_size,
                });
            }
            return Ok(None);
        };

        let end = self.scanned + offset;
        if end > self.max_frame_size {
            return Err(TransportError::FrameTooLarge {
                size: end,
                max: self.max_frame_size,
            });
        }

        let mut line = self.buffer.split_to(end + 1);
        line.truncate(end);
        if line.last() == Some(&b'\r') {
            line.truncate(end - 1);
        }
        self.scanned = 0;

        Ok(Some(line.freeze()))
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop any partial frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = LineBuffer::new();

        let frames = buffer.push(b"{\"id\":1}\n").unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"{\"id\":1}");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = LineBuffer::new();

        let frames = buffer.push(b"first\nsecond\nthird\n").unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(&frames[0][..], b"first");
        assert_eq!(&frames[1][..], b"second");
        assert_eq!(&frames[2][..], b"third");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_crlf_terminator_is_stripped() {
        let mut buffer = LineBuffer::new();

        let frames = buffer.push(b"hello\r\n").unwrap();

        assert_eq!(&frames[0][..], b"hello");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut buffer = LineBuffer::new();

        let frames = buffer.push(b"\n\r\nvalue\n").unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"value");
    }

    #[test]
    fn test_mixed_complete_and_partial() {
        let mut buffer = LineBuffer::new();

        let frames = buffer.push(b"first\nsec").unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.len(), 3);

        let frames = buffer.push(b"ond\n").unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"second");
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = LineBuffer::new();
        let line = b"{\"id\":7,\"result\":\"ok\"}\n";

        let mut all_frames = Vec::new();
        for byte in line {
            all_frames.extend(buffer.push(&[*byte]).unwrap());
        }

        assert_eq!(all_frames.len(), 1);
        assert_eq!(&all_frames[0][..], &line[..line.len() - 1]);
    }

    #[test]
    fn test_max_frame_size_on_partial_data() {
        let mut buffer = LineBuffer::with_max_frame_size(8);

        let result = buffer.push(b"0123456789");

        match result {
            Err(TransportError::FrameTooLarge { size, max }) => {
                assert_eq!(size, 10);
                assert_eq!(max, 8);
            }
            other => panic!("expected FrameTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_max_frame_size_on_complete_frame() {
        let mut buffer = LineBuffer::with_max_frame_size(4);

        let result = buffer.push(b"abcdef\n");

        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_frame_at_exact_limit() {
        let mut buffer = LineBuffer::with_max_frame_size(4);

        let frames = buffer.push(b"abcd\n").unwrap();

        assert_eq!(&frames[0][..], b"abcd");
    }

    #[test]
    fn test_clear_drops_partial_frame() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"partial").unwrap();
        assert!(!buffer.is_empty());

        buffer.clear();

        assert!(buffer.is_empty());
        let frames = buffer.push(b"next\n").unwrap();
        assert_eq!(&frames[0][..], b"next");
    }
}
