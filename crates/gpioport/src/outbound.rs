use gpioport_gpio::{Edge, Level};
use gpioport_term::Term;

pub const GPIO_INIT_FAIL: &str = "gpio_init_fail";
pub const GPIO_WRITE_FAILED: &str = "gpio_write_failed";
pub const GPIO_READ_FAILED: &str = "gpio_read_failed";
pub const GPIO_SET_INT_FAILED: &str = "gpio_set_int_failed";

/// Result carried by a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `ok`
    Ok,
    /// A bare integer, e.g. a pin level.
    Value(i64),
    /// `{error, Reason}`
    Error(&'static str),
    /// No result; sent for functions the port does not implement. Encoded as `nil`.
    Absent,
}

impl Reply {
    pub fn to_term(&self) -> Term {
        match self {
            Reply::Ok => Term::atom("ok"),
            Reply::Value(value) => Term::Integer(*value),
            Reply::Error(reason) => Term::tuple(vec![Term::atom("error"), Term::atom(*reason)]),
            Reply::Absent => Term::atom("nil"),
        }
    }
}

/// A message sent from the port to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Direct answer to `init`.
    Init(Reply),
    /// `{port_reply, Ref, Result}`
    Call { reference: Term, result: Reply },
    /// `{gpio_interrupt, rising | falling}`
    Interrupt(Edge),
}

impl Outbound {
    /// Interrupt report for a sampled level. High reads as a rising edge.
    pub fn interrupt(level: Level) -> Self {
        match level {
            Level::High => Outbound::Interrupt(Edge::Rising),
            Level::Low => Outbound::Interrupt(Edge::Falling),
        }
    }

    pub fn to_term(&self) -> Term {
        match self {
            Outbound::Init(reply) => reply.to_term(),
            Outbound::Call { reference, result } => Term::tuple(vec![
                Term::atom("port_reply"),
                reference.clone(),
                result.to_term(),
            ]),
            Outbound::Interrupt(edge) => {
                Term::tuple(vec![Term::atom("gpio_interrupt"), Term::atom(edge.as_sysfs())])
            }
        }
    }
}
