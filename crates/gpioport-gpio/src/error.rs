use std::io;

use crate::types::PinState;

/// Reportable failures: the host gets a tagged error and the port keeps running.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The operation is not legal in the pin's current state.
    #[error("{op} not allowed while pin is {state}")]
    IllegalState { op: &'static str, state: PinState },

    /// Writing the pin number to `export` failed.
    #[error("failed to export gpio {pin}: {source}")]
    Export { pin: u32, source: io::Error },

    /// Writing the `direction` attribute failed.
    #[error("failed to set direction of gpio {pin}: {source}")]
    Direction { pin: u32, source: io::Error },

    /// Opening the `value` attribute failed.
    #[error("failed to open value of gpio {pin}: {source}")]
    ValueOpen { pin: u32, source: io::Error },

    /// Writing the `edge` attribute failed.
    #[error("failed to set edge of gpio {pin}: {source}")]
    Edge { pin: u32, source: io::Error },
}

/// Faults on the open value handle. These end the process.
#[derive(Debug, thiserror::Error)]
pub enum ValueFault {
    /// The read or write moved fewer bytes than requested.
    #[error("short {op} on value of gpio {pin} ({transferred} of 1 bytes)")]
    Short {
        op: &'static str,
        pin: u32,
        transferred: usize,
    },

    /// The read or write failed outright.
    #[error("{op} on value of gpio {pin} failed: {source}")]
    Io {
        op: &'static str,
        pin: u32,
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GpioError>;

/// Result of an operation that touches the value handle.
///
/// The outer error is a [`ValueFault`]; the inner result is what gets
/// reported to the host.
pub type Checked<T> = std::result::Result<Result<T>, ValueFault>;
