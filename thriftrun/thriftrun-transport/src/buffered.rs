//! Read/write buffering over an inner transport.

use bytes::{Buf, BytesMut};

use crate::{Transport, TransportError};

const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Wraps another transport with independent read and write buffers.
///
/// Reads fill the read buffer in `capacity`-sized chunks; writes accumulate
/// until `flush` or until the write buffer reaches capacity.
#[derive(Debug)]
pub struct BufferedTransport<T> {
    inner: T,
    rbuf: BytesMut,
    wbuf: BytesMut,
    capacity: usize,
}

impl<T: Transport> BufferedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: T, capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be non-zero");
        Self {
            inner,
            rbuf: BytesMut::with_capacity(capacity),
            wbuf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    fn fill_read_buffer(&mut self) -> Result<usize, TransportError> {
        let mut chunk = vec![0u8; self.capacity];
        let n = self.inner.read(&mut chunk)?;
        self.rbuf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    fn drain_write_buffer(&mut self) -> Result<(), TransportError> {
        if !self.wbuf.is_empty() {
            let pending = self.wbuf.split();
            self.inner.write(&pending)?;
        }
        Ok(())
    }
}

impl<T: Transport> Transport for BufferedTransport<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.rbuf.is_empty() && self.fill_read_buffer()? == 0 {
            return Ok(0);
        }
        let n = buf.len().min(self.rbuf.remaining());
        self.rbuf.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.wbuf.extend_from_slice(buf);
        if self.wbuf.len() >= self.capacity {
            self.drain_write_buffer()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.drain_write_buffer()?;
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let drained = self.drain_write_buffer();
        self.inner.close()?;
        drained
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}
