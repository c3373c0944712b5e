use std::os::fd::{AsFd, BorrowedFd};

use tracing::{debug, info, warn};

use crate::error::{Checked, GpioError, Result};
use crate::sysfs::{Sysfs, ValueHandle};
use crate::types::{Direction, Edge, Level, PinState};

/// The one GPIO pin a port process may own.
///
/// A value handle exists exactly while the state is not `Closed`; the
/// handle and the pin number live together in `open`.
#[derive(Debug)]
pub struct Pin {
    sysfs: Sysfs,
    open: Option<OpenPin>,
}

#[derive(Debug)]
struct OpenPin {
    number: u32,
    state: PinState,
    value: ValueHandle,
}

impl Pin {
    /// A closed pin using the given control surface.
    pub fn new(sysfs: Sysfs) -> Self {
        Self { sysfs, open: None }
    }

    pub fn state(&self) -> PinState {
        self.open.as_ref().map_or(PinState::Closed, |open| open.state)
    }

    pub fn number(&self) -> Option<u32> {
        self.open.as_ref().map(|open| open.number)
    }

    /// Export `number` if needed, set its direction and open its value.
    ///
    /// Any pin already held is released first. On failure the pin is left
    /// `Closed`, and an export made by this call is undone.
    pub fn open(&mut self, number: u32, direction: Direction) -> Result<()> {
        self.release();

        let exported_here = !self.sysfs.is_exported(number);
        if exported_here {
            debug!(pin = number, "exporting");
            self.sysfs
                .export(number)
                .map_err(|source| GpioError::Export { pin: number, source })?;
        }

        let value = self.configure(number, direction).inspect_err(|_| {
            if exported_here {
                self.unexport(number);
            }
        })?;

        let state = match direction {
            Direction::Input => PinState::Input,
            Direction::Output => PinState::Output,
        };
        self.open = Some(OpenPin {
            number,
            state,
            value,
        });
        info!(pin = number, direction = direction.as_str(), "pin opened");
        Ok(())
    }

    fn configure(&self, number: u32, direction: Direction) -> Result<ValueHandle> {
        self.sysfs
            .set_direction(number, direction)
            .map_err(|source| GpioError::Direction { pin: number, source })?;

        self.sysfs
            .open_value(number, direction)
            .map_err(|source| GpioError::ValueOpen { pin: number, source })
    }

    /// Best effort: the pin is given up either way.
    fn unexport(&self, number: u32) {
        if let Err(err) = self.sysfs.unexport(number) {
            warn!(pin = number, error = %err, "unexport failed");
        }
    }

    /// Close the value handle and unexport the pin. Always succeeds.
    pub fn release(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        drop(open.value);

        self.unexport(open.number);
        info!(pin = open.number, "pin released");
    }

    /// Drive the pin. Legal only in `Output`.
    pub fn write(&mut self, level: Level) -> Checked<()> {
        match &self.open {
            Some(open) if open.state == PinState::Output => {
                open.value.write_level(level)?;
                Ok(Ok(()))
            }
            _ => Ok(Err(GpioError::IllegalState {
                op: "write",
                state: self.state(),
            })),
        }
    }

    /// Sample the pin. Legal in every state except `Closed`.
    pub fn read(&self) -> Checked<Level> {
        match &self.open {
            Some(open) => Ok(Ok(open.value.read_level()?)),
            None => Ok(Err(GpioError::IllegalState {
                op: "read",
                state: PinState::Closed,
            })),
        }
    }

    /// Write `edge` to the pin's edge attribute and start reporting interrupts.
    ///
    /// The current direction is not checked: arming an output pin succeeds
    /// if the kernel accepts the edge write.
    pub fn arm_interrupt(&mut self, edge: Edge) -> Result<()> {
        let Some(open) = self.open.as_mut() else {
            return Err(GpioError::IllegalState {
                op: "set_int",
                state: PinState::Closed,
            });
        };

        self.sysfs
            .set_edge(open.number, edge)
            .map_err(|source| GpioError::Edge {
                pin: open.number,
                source,
            })?;

        open.state = PinState::InputWithInterrupts;
        info!(pin = open.number, edge = edge.as_sysfs(), "interrupts armed");
        Ok(())
    }

    /// The value handle to watch for interrupts, present only while armed.
    pub fn interrupt_fd(&self) -> Option<BorrowedFd<'_>> {
        self.open
            .as_ref()
            .filter(|open| open.state == PinState::InputWithInterrupts)
            .map(|open| open.value.as_fd())
    }
}
