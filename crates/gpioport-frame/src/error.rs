/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A frame (header included) exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The payload cannot be described by a 2-byte length prefix.
    #[error("payload too large for length prefix ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The accumulator is full without holding a complete frame.
    #[error("frame buffer full ({0} bytes buffered)")]
    BufferFull(usize),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream stopped accepting bytes mid-frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
