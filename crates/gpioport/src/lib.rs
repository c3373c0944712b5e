//! Port process that exposes one GPIO pin to a supervising host.
//!
//! The host talks to the port over a byte stream (stdin/stdout when spawned
//! as a port). Each message is a length-prefixed term; see [`command`] for
//! what the host may send and [`outbound`] for what comes back.
//!
//! # Crate Structure
//!
//! - [`frame`]: 2-byte length-prefixed framing
//! - [`term`]: external term format codec
//! - [`gpio`]: the sysfs pin and its state machine
//! - [`dispatch`]: routes decoded commands to the pin and emits replies
//! - [`bridge`]: the poll loop over the host channel and pin interrupts

pub mod bridge;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod outbound;

pub use bridge::Bridge;
pub use command::{Command, Function, ProtocolError};
pub use dispatch::Dispatcher;
pub use error::FatalError;
pub use outbound::{Outbound, Reply};

/// Re-export frame types.
pub mod frame {
    pub use gpioport_frame::*;
}

/// Re-export term types.
pub mod term {
    pub use gpioport_term::*;
}

/// Re-export GPIO types.
pub mod gpio {
    pub use gpioport_gpio::*;
}
