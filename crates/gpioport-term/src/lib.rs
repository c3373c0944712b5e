//! Structured terms exchanged with the host process.
//!
//! Payloads use the Erlang external term format (leading version byte 131).
//! Only the subset a port host actually sends is understood: integers,
//! atoms, tuples, lists, binaries, pids and references. Pids and references
//! are opaque to the port but keep every field so they can be echoed back.
//! Any other well-formed term can still be stepped over and carried as
//! [`Term::Encoded`].

pub mod codec;
pub mod error;
pub mod term;

pub use codec::{decode, decode_body, encode, to_vec, tuple_elements, VERSION};
pub use error::{Result, TermError};
pub use term::{Creation, Pid, Reference, Term};
