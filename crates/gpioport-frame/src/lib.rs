//! Length-prefixed framing for the gpioport host channel.
//!
//! Every message on the wire is:
//! - A 2-byte big-endian payload length
//! - The payload itself (an encoded term)
//!
//! Frames are bounded: the header plus payload may never exceed the
//! configured maximum frame size. Anything larger is a protocol violation.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_FRAME, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::FrameBuffer;
pub use writer::FrameWriter;
