use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::codec::{decode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Bounded accumulator that turns a byte stream into complete frames.
///
/// The buffer never holds more than one maximal frame's worth of bytes.
/// Callers fill it with a single read whenever the source is readable, then
/// drain every complete frame with [`FrameBuffer::next_frame`]. Pipelined
/// frames delivered by one read are drained without further I/O.
pub struct FrameBuffer {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameBuffer {
    /// Create a new frame buffer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a new frame buffer with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_frame_size),
            config,
        }
    }

    /// Perform one read from `src` into the free space of the buffer.
    ///
    /// Returns the number of bytes read; `0` means the source reached EOF.
    /// Reads interrupted by a signal are retried.
    pub fn fill_from<R: Read>(&mut self, src: &mut R) -> Result<usize> {
        let free = self.free_space();
        if free == 0 {
            return Err(FrameError::BufferFull(self.buf.len()));
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let want = free.min(READ_CHUNK_SIZE);
        let read = loop {
            match src.read(&mut chunk[..want]) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        self.buf.extend_from_slice(&chunk[..read]);
        tracing::trace!(read, buffered = self.buf.len(), "filled frame buffer");
        Ok(read)
    }

    /// Append bytes that were obtained elsewhere.
    ///
    /// Fails without buffering anything if the bytes do not fit.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.free_space() {
            return Err(FrameError::BufferFull(self.buf.len()));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Take the next complete frame payload off the front of the buffer.
    ///
    /// Returns `Ok(None)` while only part of a frame is buffered. Remaining
    /// bytes are kept at the front for the next call.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        decode_frame(&mut self.buf, self.config.max_frame_size)
    }

    /// Number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes that can still be accepted before the buffer is full.
    pub fn free_space(&self) -> usize {
        self.config.max_frame_size.saturating_sub(self.buf.len())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
