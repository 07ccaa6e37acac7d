//! Growable in-memory transport.

use bytes::{Buf, BytesMut};

use crate::{Transport, TransportError};

/// In-memory byte tape: writes append at the end, reads consume from the
/// front, so bytes written first are read first. Growable.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    buf: BytesMut,
    open: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            open: true,
        }
    }

    /// A transport pre-seeded with bytes to read.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
            open: true,
        }
    }

    /// Bytes written but not yet read.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Drain and return everything currently buffered.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        self.buf.split().to_vec()
    }
}

impl Transport for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let n = buf.len().min(self.buf.remaining());
        if n == 0 {
            return Ok(0);
        }
        self.buf.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.buf.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
