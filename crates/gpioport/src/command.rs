//! Commands the host sends, decoded from terms.
//!
//! ```text
//! {init, Pin, input | output}
//! {cast, release}
//! {call, Ref, {write, 0 | 1}}
//! {call, Ref, {read}}            (a bare `read` atom is accepted too)
//! {call, Ref, {set_int, rising | falling | both}}
//! ```
//!
//! `Ref` may be any term at all. Anything else is a protocol violation,
//! except an unknown `call` function, which still gets a reply.

use bytes::Bytes;
use gpioport_gpio::{Direction, Edge, Level};
use gpioport_term::{decode_body, Term};

use crate::error::FatalError;

/// A decoded host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open `pin` with the given direction. Always answered.
    Init { pin: u32, direction: Direction },
    /// Release the pin. Never answered.
    Release,
    /// A request whose reply carries `reference` back.
    Call { reference: Term, function: Function },
}

/// The operation requested by a `call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Write(Level),
    Read,
    SetInt(Edge),
    /// A function name the port does not implement.
    Unknown(String),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Write(_) => "write",
            Function::Read => "read",
            Function::SetInt(_) => "set_int",
            Function::Unknown(name) => name,
        }
    }
}

/// A term that does not describe a valid command.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The message is not a tuple tagged with an atom.
    #[error("expected a tagged tuple, got {0}")]
    Untagged(&'static str),

    /// The tag names no known command.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A command with the wrong number of elements.
    #[error("{command}: expected {expected} elements, got {got}")]
    Arity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// A field of the wrong kind or out of range.
    #[error("{command}: bad {field}: expected {expected}, got {got}")]
    BadField {
        command: &'static str,
        field: &'static str,
        expected: &'static str,
        got: String,
    },

    /// A cast other than `release`.
    #[error("cast: unknown action '{0}'")]
    UnknownCast(String),
}

impl Command {
    /// Decode one frame payload.
    ///
    /// The reference of a `call` is never decoded: its encoded bytes are
    /// kept as a [`Term::Encoded`], so whatever term the host chose is
    /// echoed back unchanged.
    pub fn decode(payload: &[u8]) -> Result<Self, FatalError> {
        let Some(elements) = gpioport_term::tuple_elements(payload)? else {
            let term = gpioport_term::decode(payload)?;
            return Err(ProtocolError::Untagged(term.kind()).into());
        };
        let Some(first) = elements.first() else {
            return Err(ProtocolError::Untagged("tuple").into());
        };
        let tag = decode_body(first)?;
        let Some(name) = tag.as_atom() else {
            return Err(ProtocolError::Untagged(tag.kind()).into());
        };

        match name {
            "init" => {
                expect_arity("init", &elements, 3)?;
                let pin = decode_body(&elements[1])?;
                let pin = pin
                    .as_integer()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| bad_field("init", "pin", "non-negative integer", &pin))?;
                let direction = decode_body(&elements[2])?;
                let direction = direction
                    .as_atom()
                    .and_then(|name| name.parse::<Direction>().ok())
                    .ok_or_else(|| bad_field("init", "direction", "input | output", &direction))?;
                Ok(Command::Init { pin, direction })
            }
            "cast" => {
                expect_arity("cast", &elements, 2)?;
                let action = decode_body(&elements[1])?;
                match action.as_atom() {
                    Some("release") => Ok(Command::Release),
                    Some(other) => Err(ProtocolError::UnknownCast(other.to_string()).into()),
                    None => Err(bad_field("cast", "action", "atom", &action).into()),
                }
            }
            "call" => {
                expect_arity("call", &elements, 3)?;
                let function = decode_function(&decode_body(&elements[2])?)?;
                Ok(Command::Call {
                    reference: Term::Encoded(elements[1].clone()),
                    function,
                })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string()).into()),
        }
    }
}

fn decode_function(request: &Term) -> Result<Function, ProtocolError> {
    let (name, args) = match request {
        Term::Atom(name) => (name.as_str(), &[][..]),
        Term::Tuple(elements) => match elements.split_first() {
            Some((Term::Atom(name), args)) => (name.as_str(), args),
            _ => return Err(bad_field("call", "request", "{function, ...}", request)),
        },
        _ => return Err(bad_field("call", "request", "{function, ...}", request)),
    };

    let function = match name {
        "write" => {
            let value = args
                .first()
                .and_then(Term::as_integer)
                .ok_or_else(|| missing_or_bad("write", "value", "integer", args.first()))?;
            Function::Write(Level::from(value != 0))
        }
        "read" => Function::Read,
        "set_int" => {
            let edge = args
                .first()
                .and_then(Term::as_atom)
                .and_then(|name| name.parse::<Edge>().ok())
                .ok_or_else(|| {
                    missing_or_bad("set_int", "edge", "rising | falling | both", args.first())
                })?;
            Function::SetInt(edge)
        }
        other => Function::Unknown(other.to_string()),
    };
    Ok(function)
}

fn expect_arity(
    command: &'static str,
    elements: &[Bytes],
    expected: usize,
) -> Result<(), ProtocolError> {
    if elements.len() != expected {
        return Err(ProtocolError::Arity {
            command,
            expected,
            got: elements.len(),
        });
    }
    Ok(())
}

fn bad_field(
    command: &'static str,
    field: &'static str,
    expected: &'static str,
    got: &Term,
) -> ProtocolError {
    ProtocolError::BadField {
        command,
        field,
        expected,
        got: got.to_string(),
    }
}

fn missing_or_bad(
    command: &'static str,
    field: &'static str,
    expected: &'static str,
    got: Option<&Term>,
) -> ProtocolError {
    ProtocolError::BadField {
        command,
        field,
        expected,
        got: got.map_or_else(|| "nothing".to_string(), Term::to_string),
    }
}
