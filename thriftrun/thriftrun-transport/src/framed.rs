//! Length-prefixed framing.

use bytes::{Buf, BytesMut};

use crate::{Transport, TransportError};

/// Default cap on a single frame: 16 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Frames messages over an inner transport.
///
/// Writes accumulate until `flush`, which emits a 4-byte big-endian length
/// prefix followed by the payload. Reads consume a length prefix, then
/// expose exactly that many bytes. Frames longer than `max_frame_size` are
/// rejected before their payload is read.
#[derive(Debug)]
pub struct FramedTransport<T> {
    inner: T,
    rframe: BytesMut,
    wframe: BytesMut,
    max_frame_size: usize,
}

impl<T: Transport> FramedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self::with_max_frame_size(inner, DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(inner: T, max_frame_size: usize) -> Self {
        Self {
            inner,
            rframe: BytesMut::new(),
            wframe: BytesMut::new(),
            max_frame_size,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Read the next frame into the read buffer.
    ///
    /// Returns false on a clean EOF at a frame boundary. EOF in the middle
    /// of a length prefix or payload is [`TransportError::FrameTruncated`].
    fn read_frame(&mut self) -> Result<bool, TransportError> {
        let mut len_buf = [0u8; 4];
        let first = self.inner.read(&mut len_buf)?;
        if first == 0 {
            return Ok(false);
        }
        self.read_remainder(&mut len_buf, first, 4)?;

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > self.max_frame_size {
            return Err(TransportError::FrameTooLarge {
                length: len,
                limit: self.max_frame_size,
            });
        }

        let mut payload = vec![0u8; len];
        self.read_remainder(&mut payload, 0, len)?;
        self.rframe = BytesMut::from(&payload[..]);
        Ok(true)
    }

    fn read_remainder(
        &mut self,
        buf: &mut [u8],
        mut filled: usize,
        expected: usize,
    ) -> Result<(), TransportError> {
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(TransportError::FrameTruncated {
                    expected,
                    got: filled,
                });
            }
            filled += n;
        }
        Ok(())
    }
}

impl<T: Transport> Transport for FramedTransport<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.rframe.is_empty() && !self.read_frame()? {
            return Ok(0);
        }
        let n = buf.len().min(self.rframe.remaining());
        self.rframe.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.wframe.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if !self.wframe.is_empty() {
            let payload = self.wframe.split();
            let len = u32::try_from(payload.len()).map_err(|_| TransportError::FrameTooLarge {
                length: payload.len(),
                limit: u32::MAX as usize,
            })?;
            self.inner.write(&len.to_be_bytes())?;
            self.inner.write(&payload)?;
        }
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.inner.close()
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}
