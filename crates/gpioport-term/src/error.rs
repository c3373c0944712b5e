/// Errors that can occur while encoding or decoding terms.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TermError {
    /// The payload does not start with the format version byte.
    #[error("bad version byte {0} (expected 131)")]
    BadVersion(u8),

    /// The payload ended in the middle of a term.
    #[error("truncated term (needed {needed} more bytes at offset {offset})")]
    Truncated { offset: usize, needed: usize },

    /// A tag outside the supported subset.
    #[error("unsupported term tag {tag} at offset {offset}")]
    UnsupportedTag { tag: u8, offset: usize },

    /// Bytes remain after the top-level term.
    #[error("{0} trailing bytes after term")]
    TrailingBytes(usize),

    /// Terms nested deeper than the decoder accepts.
    #[error("term nesting exceeds {0} levels")]
    TooDeep(usize),

    /// An atom whose text is not valid UTF-8.
    #[error("atom is not valid utf-8")]
    InvalidAtom,

    /// A list whose tail is not the empty list.
    #[error("improper lists are not supported")]
    ImproperList,

    /// An integer outside the range the port handles.
    #[error("integer out of range")]
    IntegerOutOfRange,

    /// A value too large for its encoding.
    #[error("{what} too long ({len})")]
    TooLong { what: &'static str, len: usize },
}

pub type Result<T> = std::result::Result<T, TermError>;
