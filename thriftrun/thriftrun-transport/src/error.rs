//! Error type shared by all transports.

/// I/O and framing failures; fatal to the current connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport was closed, locally or by the peer.
    #[error("transport is closed")]
    Closed,

    /// End of stream in the middle of an expected read.
    #[error("unexpected end of stream")]
    Eof,

    /// Underlying I/O failure, including read/write timeout expiry.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A frame length prefix exceeded the configured cap.
    #[error("frame length {length} exceeds limit {limit}")]
    FrameTooLarge { length: usize, limit: usize },

    /// The stream ended before a full frame payload arrived.
    #[error("frame truncated: expected {expected} bytes, got {got}")]
    FrameTruncated { expected: usize, got: usize },
}
