use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::encode_frame;
use crate::error::{FrameError, Result};

/// Writes whole frames to the host.
///
/// Outgoing frames are bounded only by what the 2-byte length prefix can
/// express; the inbound frame limit does not apply to replies, which may
/// echo a reference close to that limit.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
        }
    }

    /// Frame `payload`, write all of it and flush.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;

        let mut offset = 0;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::{DEFAULT_MAX_FRAME, MAX_PAYLOAD};

    fn sink() -> FrameWriter<Cursor<Vec<u8>>> {
        FrameWriter::new(Cursor::new(Vec::new()))
    }

    #[test]
    fn reply_is_length_prefixed() {
        let mut writer = sink();
        writer.send(b"\x83w\x02ok").unwrap();
        assert_eq!(writer.into_inner().into_inner(), b"\x00\x05\x83w\x02ok");
    }

    #[test]
    fn reply_may_exceed_inbound_limit() {
        let payload = vec![1u8; DEFAULT_MAX_FRAME + 100];
        let mut writer = sink();
        writer.send(&payload).unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.len(), 2 + payload.len());
        assert_eq!(&wire[..2], &((payload.len() as u16).to_be_bytes()));
    }

    #[test]
    fn reply_beyond_length_prefix_is_rejected() {
        let mut writer = sink();
        let err = writer.send(&vec![0u8; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(writer.get_ref().get_ref().is_empty());
    }

    /// Takes one byte per call, after refusing the first call with EINTR.
    struct Trickle {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(ErrorKind::Interrupted.into());
            }
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_and_interrupted_writes_complete() {
        let mut writer = FrameWriter::new(Trickle {
            interrupted: false,
            data: Vec::new(),
        });
        writer.send(b"abc").unwrap();
        assert_eq!(writer.into_inner().data, b"\x00\x03abc");
    }

    #[test]
    fn host_gone_is_connection_closed() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = FrameWriter::new(Closed).send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }
}
