use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, TermError};
use crate::term::{Creation, Pid, Reference, Term};

/// Leading byte of every encoded payload.
pub const VERSION: u8 = 131;

const MAX_DEPTH: usize = 64;

mod tag {
    pub const NEW_FLOAT: u8 = 70;
    pub const BIT_BINARY: u8 = 77;
    pub const ATOM_CACHE_REF: u8 = 82;
    pub const NEW_PID: u8 = 88;
    pub const NEW_PORT: u8 = 89;
    pub const NEWER_REFERENCE: u8 = 90;
    pub const SMALL_INTEGER: u8 = 97;
    pub const INTEGER: u8 = 98;
    pub const FLOAT: u8 = 99;
    pub const ATOM: u8 = 100;
    pub const REFERENCE: u8 = 101;
    pub const PORT: u8 = 102;
    pub const PID: u8 = 103;
    pub const SMALL_TUPLE: u8 = 104;
    pub const LARGE_TUPLE: u8 = 105;
    pub const NIL: u8 = 106;
    pub const STRING: u8 = 107;
    pub const LIST: u8 = 108;
    pub const BINARY: u8 = 109;
    pub const SMALL_BIG: u8 = 110;
    pub const LARGE_BIG: u8 = 111;
    pub const NEW_FUN: u8 = 112;
    pub const EXPORT: u8 = 113;
    pub const NEW_REFERENCE: u8 = 114;
    pub const SMALL_ATOM: u8 = 115;
    pub const MAP: u8 = 116;
    pub const FUN: u8 = 117;
    pub const ATOM_UTF8: u8 = 118;
    pub const SMALL_ATOM_UTF8: u8 = 119;
    pub const V4_PORT: u8 = 120;
}

/// Decode one complete payload into a term.
///
/// The payload must start with [`VERSION`] and contain exactly one term.
pub fn decode(bytes: &[u8]) -> Result<Term> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let version = decoder.u8()?;
    if version != VERSION {
        return Err(TermError::BadVersion(version));
    }

    let term = decoder.term(0)?;
    let trailing = bytes.len() - decoder.pos;
    if trailing != 0 {
        return Err(TermError::TrailingBytes(trailing));
    }
    Ok(term)
}

/// Decode one term that carries no version byte, such as a tuple element
/// returned by [`tuple_elements`].
pub fn decode_body(bytes: &[u8]) -> Result<Term> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let term = decoder.term(0)?;
    let trailing = bytes.len() - decoder.pos;
    if trailing != 0 {
        return Err(TermError::TrailingBytes(trailing));
    }
    Ok(term)
}

/// Split a payload whose top-level term is a tuple into the encoded bytes
/// of each element.
///
/// Elements are only scanned, not decoded, so any well-formed term is
/// accepted, including kinds [`decode`] does not understand. Returns
/// `Ok(None)` when the payload holds a well-formed term that is not a tuple.
pub fn tuple_elements(bytes: &[u8]) -> Result<Option<Vec<Bytes>>> {
    let mut decoder = Decoder { bytes, pos: 0 };
    let version = decoder.u8()?;
    if version != VERSION {
        return Err(TermError::BadVersion(version));
    }

    let arity = match decoder.u8()? {
        tag::SMALL_TUPLE => Some(decoder.u8()? as usize),
        tag::LARGE_TUPLE => Some(decoder.u32()? as usize),
        _ => None,
    };
    let elements = match arity {
        Some(arity) => {
            let mut out = Vec::with_capacity(arity.min(decoder.remaining()));
            for _ in 0..arity {
                let start = decoder.pos;
                decoder.skip(1)?;
                out.push(Bytes::copy_from_slice(&bytes[start..decoder.pos]));
            }
            Some(out)
        }
        None => {
            decoder.pos = 1;
            decoder.skip(0)?;
            None
        }
    };

    let trailing = bytes.len() - decoder.pos;
    if trailing != 0 {
        return Err(TermError::TrailingBytes(trailing));
    }
    Ok(elements)
}

/// Encode a term, version byte included, onto the end of `dst`.
pub fn encode(term: &Term, dst: &mut BytesMut) -> Result<()> {
    dst.put_u8(VERSION);
    encode_term(term, dst)
}

/// Encode a term into a fresh buffer.
pub fn to_vec(term: &Term) -> Result<Vec<u8>> {
    let mut buf = BytesMut::new();
    encode(term, &mut buf)?;
    Ok(buf.to_vec())
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(TermError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn term(&mut self, depth: usize) -> Result<Term> {
        if depth > MAX_DEPTH {
            return Err(TermError::TooDeep(MAX_DEPTH));
        }

        let offset = self.pos;
        let tag = self.u8()?;
        let term = match tag {
            tag::SMALL_INTEGER => Term::Integer(i64::from(self.u8()?)),
            tag::INTEGER => Term::Integer(i64::from(self.u32()? as i32)),
            tag::SMALL_BIG => {
                let n = self.u8()? as usize;
                let sign = self.u8()?;
                let digits = self.take(n)?;
                Term::Integer(small_big(sign, digits)?)
            }
            tag::ATOM | tag::SMALL_ATOM | tag::ATOM_UTF8 | tag::SMALL_ATOM_UTF8 => {
                Term::Atom(self.atom_body(tag)?)
            }
            tag::SMALL_TUPLE => {
                let arity = self.u8()? as usize;
                Term::Tuple(self.elements(arity, depth)?)
            }
            tag::LARGE_TUPLE => {
                let arity = self.u32()? as usize;
                Term::Tuple(self.elements(arity, depth)?)
            }
            tag::NIL => Term::nil(),
            tag::STRING => {
                let len = self.u16()? as usize;
                let chars = self.take(len)?;
                Term::List(chars.iter().map(|&c| Term::Integer(i64::from(c))).collect())
            }
            tag::LIST => {
                let len = self.u32()? as usize;
                let elements = self.elements(len, depth)?;
                match self.term(depth + 1)? {
                    Term::List(tail) if tail.is_empty() => Term::List(elements),
                    _ => return Err(TermError::ImproperList),
                }
            }
            tag::BINARY => {
                let len = self.u32()? as usize;
                Term::Binary(Bytes::copy_from_slice(self.take(len)?))
            }
            tag::PID | tag::NEW_PID => {
                let node = self.node()?;
                let id = self.u32()?;
                let serial = self.u32()?;
                let creation = self.creation(tag == tag::NEW_PID)?;
                Term::Pid(Pid {
                    node,
                    id,
                    serial,
                    creation,
                })
            }
            tag::NEW_REFERENCE | tag::NEWER_REFERENCE => {
                let len = self.u16()? as usize;
                let node = self.node()?;
                let creation = self.creation(tag == tag::NEWER_REFERENCE)?;
                let ids = (0..len).map(|_| self.u32()).collect::<Result<Vec<_>>>()?;
                Term::Reference(Reference {
                    node,
                    creation,
                    ids,
                })
            }
            _ => return Err(TermError::UnsupportedTag { tag, offset }),
        };
        Ok(term)
    }

    /// Step over one term of any kind without building it.
    fn skip(&mut self, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(TermError::TooDeep(MAX_DEPTH));
        }

        let offset = self.pos;
        let tag = self.u8()?;
        match tag {
            tag::SMALL_INTEGER | tag::ATOM_CACHE_REF => self.advance(1)?,
            tag::INTEGER => self.advance(4)?,
            tag::NEW_FLOAT => self.advance(8)?,
            tag::FLOAT => self.advance(31)?,
            tag::SMALL_BIG => {
                let n = self.u8()? as usize;
                self.advance(n + 1)?;
            }
            tag::LARGE_BIG => {
                let n = self.u32()? as usize;
                self.advance(n.saturating_add(1))?;
            }
            tag::ATOM | tag::ATOM_UTF8 | tag::STRING => {
                let n = self.u16()? as usize;
                self.advance(n)?;
            }
            tag::SMALL_ATOM | tag::SMALL_ATOM_UTF8 => {
                let n = self.u8()? as usize;
                self.advance(n)?;
            }
            tag::NIL => {}
            tag::SMALL_TUPLE => {
                let arity = self.u8()? as usize;
                self.skip_n(arity, depth)?;
            }
            tag::LARGE_TUPLE => {
                let arity = self.u32()? as usize;
                self.skip_n(arity, depth)?;
            }
            tag::LIST => {
                // Elements plus the tail, which need not be `[]`.
                let len = self.u32()? as usize;
                self.skip_n(len.saturating_add(1), depth)?;
            }
            tag::MAP => {
                let arity = self.u32()? as usize;
                self.skip_n(arity.saturating_mul(2), depth)?;
            }
            tag::BINARY => {
                let n = self.u32()? as usize;
                self.advance(n)?;
            }
            tag::BIT_BINARY => {
                let n = self.u32()? as usize;
                self.advance(n.saturating_add(1))?;
            }
            tag::PID => {
                self.skip(depth + 1)?;
                self.advance(9)?;
            }
            tag::NEW_PID => {
                self.skip(depth + 1)?;
                self.advance(12)?;
            }
            tag::PORT => {
                self.skip(depth + 1)?;
                self.advance(5)?;
            }
            tag::NEW_PORT => {
                self.skip(depth + 1)?;
                self.advance(8)?;
            }
            tag::V4_PORT => {
                self.skip(depth + 1)?;
                self.advance(12)?;
            }
            tag::REFERENCE => {
                self.skip(depth + 1)?;
                self.advance(5)?;
            }
            tag::NEW_REFERENCE | tag::NEWER_REFERENCE => {
                let len = self.u16()? as usize;
                self.skip(depth + 1)?;
                let creation = if tag == tag::NEWER_REFERENCE { 4 } else { 1 };
                self.advance(creation + 4 * len)?;
            }
            tag::EXPORT => self.skip_n(3, depth)?,
            tag::NEW_FUN => {
                // Size counts itself.
                let size = self.u32()? as usize;
                self.advance(size.saturating_sub(4))?;
            }
            tag::FUN => {
                let free = self.u32()? as usize;
                self.skip_n(free.saturating_add(4), depth)?;
            }
            _ => return Err(TermError::UnsupportedTag { tag, offset }),
        }
        Ok(())
    }

    fn skip_n(&mut self, count: usize, depth: usize) -> Result<()> {
        for _ in 0..count {
            self.skip(depth + 1)?;
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn elements(&mut self, count: usize, depth: usize) -> Result<Vec<Term>> {
        // Every element takes at least one byte; don't trust the count for allocation.
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            out.push(self.term(depth + 1)?);
        }
        Ok(out)
    }

    fn atom_body(&mut self, tag: u8) -> Result<String> {
        let len = match tag {
            tag::SMALL_ATOM | tag::SMALL_ATOM_UTF8 => self.u8()? as usize,
            _ => self.u16()? as usize,
        };
        let text = self.take(len)?;
        match tag {
            tag::ATOM | tag::SMALL_ATOM => Ok(text.iter().map(|&b| b as char).collect()),
            _ => String::from_utf8(text.to_vec()).map_err(|_| TermError::InvalidAtom),
        }
    }

    fn node(&mut self) -> Result<String> {
        let offset = self.pos;
        let tag = self.u8()?;
        match tag {
            tag::ATOM | tag::SMALL_ATOM | tag::ATOM_UTF8 | tag::SMALL_ATOM_UTF8 => {
                self.atom_body(tag)
            }
            _ => Err(TermError::UnsupportedTag { tag, offset }),
        }
    }

    fn creation(&mut self, wide: bool) -> Result<Creation> {
        if wide {
            Ok(Creation::Wide(self.u32()?))
        } else {
            Ok(Creation::Narrow(self.u8()?))
        }
    }
}

fn small_big(sign: u8, digits: &[u8]) -> Result<i64> {
    if digits.len() > 8 {
        return Err(TermError::IntegerOutOfRange);
    }
    let magnitude = digits
        .iter()
        .rev()
        .fold(0u64, |acc, &d| (acc << 8) | u64::from(d));
    let value = if sign == 0 {
        i128::from(magnitude)
    } else {
        -i128::from(magnitude)
    };
    i64::try_from(value).map_err(|_| TermError::IntegerOutOfRange)
}

fn encode_term(term: &Term, dst: &mut BytesMut) -> Result<()> {
    match term {
        Term::Integer(value) => put_integer(*value, dst),
        Term::Atom(name) => put_atom(name, dst)?,
        Term::Tuple(elements) => {
            if let Ok(arity) = u8::try_from(elements.len()) {
                dst.put_u8(tag::SMALL_TUPLE);
                dst.put_u8(arity);
            } else {
                dst.put_u8(tag::LARGE_TUPLE);
                dst.put_u32(len_u32("tuple", elements.len())?);
            }
            for element in elements {
                encode_term(element, dst)?;
            }
        }
        Term::List(elements) if elements.is_empty() => dst.put_u8(tag::NIL),
        Term::List(elements) => {
            dst.put_u8(tag::LIST);
            dst.put_u32(len_u32("list", elements.len())?);
            for element in elements {
                encode_term(element, dst)?;
            }
            dst.put_u8(tag::NIL);
        }
        Term::Binary(bytes) => {
            dst.put_u8(tag::BINARY);
            dst.put_u32(len_u32("binary", bytes.len())?);
            dst.put_slice(bytes);
        }
        Term::Pid(pid) => {
            dst.put_u8(match pid.creation {
                Creation::Narrow(_) => tag::PID,
                Creation::Wide(_) => tag::NEW_PID,
            });
            put_atom(&pid.node, dst)?;
            dst.put_u32(pid.id);
            dst.put_u32(pid.serial);
            put_creation(pid.creation, dst);
        }
        Term::Reference(r) => {
            dst.put_u8(match r.creation {
                Creation::Narrow(_) => tag::NEW_REFERENCE,
                Creation::Wide(_) => tag::NEWER_REFERENCE,
            });
            let len = u16::try_from(r.ids.len()).map_err(|_| TermError::TooLong {
                what: "reference",
                len: r.ids.len(),
            })?;
            dst.put_u16(len);
            put_atom(&r.node, dst)?;
            put_creation(r.creation, dst);
            for id in &r.ids {
                dst.put_u32(*id);
            }
        }
        Term::Encoded(bytes) => dst.put_slice(bytes),
    }
    Ok(())
}

fn put_integer(value: i64, dst: &mut BytesMut) {
    if (0..=255).contains(&value) {
        dst.put_u8(tag::SMALL_INTEGER);
        dst.put_u8(value as u8);
    } else if let Ok(v) = i32::try_from(value) {
        dst.put_u8(tag::INTEGER);
        dst.put_i32(v);
    } else {
        let magnitude = value.unsigned_abs().to_le_bytes();
        let n = 8 - magnitude.iter().rev().take_while(|&&b| b == 0).count();
        dst.put_u8(tag::SMALL_BIG);
        dst.put_u8(n as u8);
        dst.put_u8(u8::from(value < 0));
        dst.put_slice(&magnitude[..n]);
    }
}

fn put_atom(name: &str, dst: &mut BytesMut) -> Result<()> {
    if let Ok(len) = u8::try_from(name.len()) {
        dst.put_u8(tag::SMALL_ATOM_UTF8);
        dst.put_u8(len);
    } else if let Ok(len) = u16::try_from(name.len()) {
        dst.put_u8(tag::ATOM_UTF8);
        dst.put_u16(len);
    } else {
        return Err(TermError::TooLong {
            what: "atom",
            len: name.len(),
        });
    }
    dst.put_slice(name.as_bytes());
    Ok(())
}

fn put_creation(creation: Creation, dst: &mut BytesMut) {
    match creation {
        Creation::Narrow(c) => dst.put_u8(c),
        Creation::Wide(c) => dst.put_u32(c),
    }
}

fn len_u32(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| TermError::TooLong { what, len })
}
