use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ValueFault;
use crate::types::{Direction, Edge, Level};

/// Default location of the sysfs GPIO class directory.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// The sysfs GPIO control surface.
///
/// Layout under the root:
/// ```text
/// export            write a pin number to reserve it
/// unexport          write a pin number to release it
/// gpio<N>/direction "in" | "out"
/// gpio<N>/value     "0" | "1"
/// gpio<N>/edge      "none" | "rising" | "falling" | "both"
/// ```
#[derive(Debug, Clone)]
pub struct Sysfs {
    root: PathBuf,
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn pin_dir(&self, pin: u32) -> PathBuf {
        self.root.join(format!("gpio{pin}"))
    }

    /// A pin counts as exported once its `direction` attribute exists.
    pub fn is_exported(&self, pin: u32) -> bool {
        self.pin_dir(pin).join("direction").exists()
    }

    pub fn export(&self, pin: u32) -> io::Result<()> {
        write_attr(&self.root.join("export"), &pin.to_string())
    }

    pub fn unexport(&self, pin: u32) -> io::Result<()> {
        write_attr(&self.root.join("unexport"), &pin.to_string())
    }

    pub fn set_direction(&self, pin: u32, direction: Direction) -> io::Result<()> {
        write_attr(&self.pin_dir(pin).join("direction"), direction.as_sysfs())
    }

    pub fn set_edge(&self, pin: u32, edge: Edge) -> io::Result<()> {
        write_attr(&self.pin_dir(pin).join("edge"), edge.as_sysfs())
    }

    /// Open the `value` attribute: read/write for outputs, read-only for inputs.
    pub fn open_value(&self, pin: u32, direction: Direction) -> io::Result<ValueHandle> {
        let path = self.pin_dir(pin).join("value");
        let file = OpenOptions::new()
            .read(true)
            .write(direction == Direction::Output)
            .open(&path)?;
        debug!(?path, "opened value attribute");
        Ok(ValueHandle { file, pin })
    }
}

/// Attributes are provided by the kernel; a missing one is an error.
fn write_attr(path: &Path, value: &str) -> io::Result<()> {
    debug!(?path, value, "writing sysfs attribute");
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.write_all(value.as_bytes())
}

/// Open handle on a pin's `value` attribute.
///
/// All access is positioned at offset 0, which also re-arms `poll`
/// notification on sysfs.
#[derive(Debug)]
pub struct ValueHandle {
    file: File,
    pin: u32,
}

impl ValueHandle {
    pub fn read_level(&self) -> Result<Level, ValueFault> {
        let mut buf = [0u8; 1];
        let n = loop {
            match self.file.read_at(&mut buf, 0) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ValueFault::Io {
                        op: "read",
                        pin: self.pin,
                        source,
                    })
                }
            }
        };
        if n < buf.len() {
            return Err(ValueFault::Short {
                op: "read",
                pin: self.pin,
                transferred: n,
            });
        }
        Ok(Level::from_byte(buf[0]))
    }

    pub fn write_level(&self, level: Level) -> Result<(), ValueFault> {
        let buf = [level.as_byte()];
        let n = loop {
            match self.file.write_at(&buf, 0) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ValueFault::Io {
                        op: "write",
                        pin: self.pin,
                        source,
                    })
                }
            }
        };
        if n < buf.len() {
            return Err(ValueFault::Short {
                op: "write",
                pin: self.pin,
                transferred: n,
            });
        }
        Ok(())
    }
}

impl AsFd for ValueHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}
