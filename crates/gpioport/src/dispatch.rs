use std::io::Write;

use gpioport_frame::FrameWriter;
use gpioport_gpio::{GpioError, Pin};
use tracing::{debug, warn};

use crate::command::{Command, Function};
use crate::error::Result;
use crate::outbound::{
    Outbound, Reply, GPIO_INIT_FAIL, GPIO_READ_FAILED, GPIO_SET_INT_FAILED, GPIO_WRITE_FAILED,
};

/// Routes decoded commands to the pin and writes replies to the host.
///
/// Returns `Err` only for fatal conditions; every reportable failure is
/// turned into a reply.
pub struct Dispatcher<W> {
    pin: Pin,
    writer: FrameWriter<W>,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(pin: Pin, writer: FrameWriter<W>) -> Self {
        Self { pin, writer }
    }

    /// Decode one frame payload, execute it and send its reply, if any.
    pub fn dispatch(&mut self, payload: &[u8]) -> Result<()> {
        let command = Command::decode(payload)?;
        debug!(?command, "received");

        if let Some(reply) = self.execute(command)? {
            self.send(&reply)?;
        }
        Ok(())
    }

    /// Execute a command against the pin, returning the reply to send.
    pub fn execute(&mut self, command: Command) -> Result<Option<Outbound>> {
        match command {
            Command::Init { pin, direction } => {
                let reply = match self.pin.open(pin, direction) {
                    Ok(()) => Reply::Ok,
                    Err(err) => {
                        warn!(pin, error = %err, "init failed");
                        Reply::Error(GPIO_INIT_FAIL)
                    }
                };
                Ok(Some(Outbound::Init(reply)))
            }
            Command::Release => {
                self.pin.release();
                Ok(None)
            }
            Command::Call {
                reference,
                function,
            } => {
                let result = self.call(&function)?;
                Ok(Some(Outbound::Call { reference, result }))
            }
        }
    }

    fn call(&mut self, function: &Function) -> Result<Reply> {
        let reply = match function {
            Function::Write(level) => match self.pin.write(*level)? {
                Ok(()) => Reply::Ok,
                Err(err) => rejected(function, err, GPIO_WRITE_FAILED),
            },
            Function::Read => match self.pin.read()? {
                Ok(level) => Reply::Value(level.as_int()),
                Err(err) => rejected(function, err, GPIO_READ_FAILED),
            },
            Function::SetInt(edge) => match self.pin.arm_interrupt(*edge) {
                Ok(()) => Reply::Ok,
                Err(err) => rejected(function, err, GPIO_SET_INT_FAILED),
            },
            Function::Unknown(name) => {
                warn!(function = %name, "unknown call function");
                Reply::Absent
            }
        };
        Ok(reply)
    }

    /// Sample the armed pin and report the edge it implies.
    pub fn report_interrupt(&mut self) -> Result<()> {
        match self.pin.read()? {
            Ok(level) => self.send(&Outbound::interrupt(level)),
            Err(err) => {
                warn!(error = %err, "interrupt on a pin that cannot be read");
                Ok(())
            }
        }
    }

    /// Encode and send one message to the host.
    pub fn send(&mut self, message: &Outbound) -> Result<()> {
        let term = message.to_term();
        let payload = gpioport_term::to_vec(&term)?;
        debug!(message = %term, size = payload.len(), "sending");
        self.writer.send(&payload)?;
        Ok(())
    }

    pub fn pin(&self) -> &Pin {
        &self.pin
    }

    /// Consume the dispatcher and return the pin and the underlying writer.
    pub fn into_parts(self) -> (Pin, W) {
        (self.pin, self.writer.into_inner())
    }
}

fn rejected(function: &Function, err: GpioError, reason: &'static str) -> Reply {
    debug!(function = function.name(), error = %err, "call rejected");
    Reply::Error(reason)
}
