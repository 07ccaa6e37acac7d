//! TCP socket transport.

use std::{
    io::{Read as _, Write as _},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{Transport, TransportError};

/// Blocking TCP transport over `std::net::TcpStream`.
///
/// Servers accept with `std::net::TcpListener` and wrap each accepted stream
/// via [`TcpTransport::from_stream`]; connection scheduling stays on the
/// host's side of the seam. Timeout expiry surfaces as
/// [`TransportError::Io`] with a timeout error kind.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn set_read_timeout_ms(&mut self, ms: Option<u64>) -> Result<(), TransportError> {
        self.stream_ref()?
            .set_read_timeout(ms.map(Duration::from_millis))?;
        Ok(())
    }

    pub fn set_write_timeout_ms(&mut self, ms: Option<u64>) -> Result<(), TransportError> {
        self.stream_ref()?
            .set_write_timeout(ms.map(Duration::from_millis))?;
        Ok(())
    }

    fn stream_ref(&self) -> Result<&TcpStream, TransportError> {
        self.stream.as_ref().ok_or(TransportError::Closed)
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, TransportError> {
        self.stream.as_mut().ok_or(TransportError::Closed)
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.stream_mut()?.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.stream_mut()?.write_all(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.stream_mut()?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(stream) = self.stream.take() {
            // Peer may already be gone; a failed shutdown still leaves us closed.
            let _ = stream.shutdown(Shutdown::Both);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}
