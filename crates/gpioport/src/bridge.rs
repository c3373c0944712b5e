use std::io::{Read, Write};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use gpioport_frame::{FrameBuffer, FrameConfig, FrameWriter};
use gpioport_gpio::Pin;
use tracing::{debug, info, trace};

use crate::dispatch::Dispatcher;
use crate::error::{FatalError, Result};

/// Which sources a readiness wait reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ready {
    pub host: bool,
    pub interrupt: bool,
}

/// The port's event loop.
///
/// Waits without timeout on the host channel and, only while the pin is
/// armed, on the pin's value handle. Host input is framed and dispatched;
/// pin readiness becomes an interrupt report.
pub struct Bridge<R, W> {
    input: R,
    frames: FrameBuffer,
    dispatcher: Dispatcher<W>,
}

impl<R: Read + AsFd, W: Write> Bridge<R, W> {
    pub fn new(input: R, output: W, pin: Pin, config: FrameConfig) -> Self {
        Self {
            input,
            frames: FrameBuffer::with_config(config),
            dispatcher: Dispatcher::new(pin, FrameWriter::new(output)),
        }
    }

    /// Run until the host closes its end of the channel.
    ///
    /// `Ok` means a clean shutdown; any `Err` is fatal.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let ready = wait(self.input.as_fd(), self.dispatcher.pin().interrupt_fd())?;
            trace!(?ready, "woke");

            if !self.service(ready)? {
                info!("host closed channel");
                return Ok(());
            }
        }
    }

    /// Handle one wake-up. Returns `false` once the host has closed the channel.
    pub fn service(&mut self, ready: Ready) -> Result<bool> {
        // The value handle that was polled is only valid until a host
        // command replaces or releases it, so report the pin first.
        if ready.interrupt {
            self.dispatcher.report_interrupt()?;
        }

        if ready.host {
            return self.service_host();
        }
        Ok(true)
    }

    /// Read once from the host and dispatch every complete frame.
    ///
    /// Returns `false` at end of stream.
    pub fn service_host(&mut self) -> Result<bool> {
        let read = self.frames.fill_from(&mut self.input)?;
        if read == 0 {
            return Ok(false);
        }

        while let Some(payload) = self.frames.next_frame()? {
            self.dispatcher.dispatch(&payload)?;
        }
        debug!(pending = self.frames.len(), "host input drained");
        Ok(true)
    }

    pub fn dispatcher(&self) -> &Dispatcher<W> {
        &self.dispatcher
    }

    /// Consume the bridge and return the pin and the output stream.
    pub fn into_parts(self) -> (Pin, W) {
        self.dispatcher.into_parts()
    }
}

/// Block until the host channel or the armed pin is ready.
///
/// The pin is left out of the wait set entirely when `interrupt` is `None`.
pub fn wait(host: BorrowedFd<'_>, interrupt: Option<BorrowedFd<'_>>) -> Result<Ready> {
    let mut fds = [
        libc::pollfd {
            fd: host.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: interrupt.map_or(-1, |fd| fd.as_raw_fd()),
            events: libc::POLLPRI,
            revents: 0,
        },
    ];
    let nfds: libc::nfds_t = if interrupt.is_some() { 2 } else { 1 };

    loop {
        // SAFETY: `fds` is a valid, writable array of at least `nfds` pollfd
        // entries, and both descriptors are borrowed for the call's duration.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), nfds, -1) };
        if rc >= 0 {
            break;
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(FatalError::Poll(err));
        }
    }

    if fds[0].revents & libc::POLLNVAL != 0 {
        return Err(FatalError::InvalidHostChannel);
    }

    Ok(Ready {
        host: fds[0].revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0,
        interrupt: interrupt.is_some() && fds[1].revents & libc::POLLPRI != 0,
    })
}
