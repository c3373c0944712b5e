use std::fmt;

use bytes::Bytes;

/// Node creation number carried by pids and references.
///
/// Older nodes use one byte, newer ones four. The width is kept so a term
/// is re-encoded with the same tag it arrived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    Narrow(u8),
    Wide(u32),
}

impl Creation {
    pub fn value(self) -> u32 {
        match self {
            Creation::Narrow(c) => u32::from(c),
            Creation::Wide(c) => c,
        }
    }
}

/// An Erlang process identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pid {
    pub node: String,
    pub id: u32,
    pub serial: u32,
    pub creation: Creation,
}

/// An Erlang reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub node: String,
    pub creation: Creation,
    pub ids: Vec<u32>,
}

/// A decoded term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Integer(i64),
    Atom(String),
    Tuple(Vec<Term>),
    /// A proper list. The empty list is `List(vec![])`.
    List(Vec<Term>),
    Binary(Bytes),
    Pid(Pid),
    Reference(Reference),
    /// A term kept in its encoded form (no version byte). It is written
    /// back byte for byte, whatever kind it holds.
    Encoded(Bytes),
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    pub fn tuple(elements: Vec<Term>) -> Self {
        Term::Tuple(elements)
    }

    pub fn nil() -> Self {
        Term::List(Vec::new())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Short name of the term kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Integer(_) => "integer",
            Term::Atom(_) => "atom",
            Term::Tuple(_) => "tuple",
            Term::List(_) => "list",
            Term::Binary(_) => "binary",
            Term::Pid(_) => "pid",
            Term::Reference(_) => "reference",
            Term::Encoded(_) => "encoded term",
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Integer(value)
    }
}

/// Renders terms in Erlang syntax for logs.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Integer(value) => write!(f, "{value}"),
            Term::Atom(name) => write!(f, "{name}"),
            Term::Tuple(elements) => {
                f.write_str("{")?;
                write_seq(f, elements)?;
                f.write_str("}")
            }
            Term::List(elements) => {
                f.write_str("[")?;
                write_seq(f, elements)?;
                f.write_str("]")
            }
            Term::Binary(bytes) => write!(f, "<<{} bytes>>", bytes.len()),
            Term::Pid(pid) => write!(f, "<{}.{}.{}>", pid.node, pid.id, pid.serial),
            Term::Reference(r) => {
                write!(f, "#Ref<{}", r.node)?;
                for id in r.ids.iter().rev() {
                    write!(f, ".{id}")?;
                }
                f.write_str(">")
            }
            Term::Encoded(bytes) => match crate::codec::decode_body(bytes) {
                Ok(term) => write!(f, "{term}"),
                Err(_) => write!(f, "#Term<{} bytes>", bytes.len()),
            },
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, elements: &[Term]) -> fmt::Result {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{element}")?;
    }
    Ok(())
}
