//! Single-pin GPIO control over the Linux sysfs interface.
//!
//! [`Pin`] owns at most one exported pin and its open value file, and
//! enforces which operations are legal in each [`PinState`]. The control
//! files themselves live behind [`Sysfs`], rooted at `/sys/class/gpio` by
//! default.

pub mod error;
pub mod pin;
pub mod sysfs;
pub mod types;

pub use error::{Checked, GpioError, Result, ValueFault};
pub use pin::Pin;
pub use sysfs::{Sysfs, ValueHandle, DEFAULT_SYSFS_ROOT};
pub use types::{Direction, Edge, Level, PinState};
