use gpioport_frame::FrameError;
use gpioport_gpio::ValueFault;
use gpioport_term::TermError;

use crate::command::ProtocolError;

/// Errors that end the port process.
///
/// Failures the host should hear about as a reply never use this type; they
/// travel as [`crate::Reply::Error`].
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// Framing violation or host channel I/O failure.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A payload that is not a well-formed term, or a reply that cannot be encoded.
    #[error("term error: {0}")]
    Term(#[from] TermError),

    /// A well-formed term that is not a valid command.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// Short or failed I/O on the pin's value handle.
    #[error("gpio fault: {0}")]
    Value(#[from] ValueFault),

    /// The readiness wait itself failed.
    #[error("poll failed: {0}")]
    Poll(std::io::Error),

    /// The host channel reported an invalid descriptor.
    #[error("host channel descriptor is invalid")]
    InvalidHostChannel,
}

pub type Result<T> = std::result::Result<T, FatalError>;
