//! Protocol-level error type.

use thriftrun_transport::TransportError;

/// Malformed wire data; fatal to the current message, and in server
/// contexts to the connection, whose protocol state is unsynchronized.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("bad protocol version")]
    BadVersion,

    #[error("bad message type {0}")]
    BadMessageType(u8),

    #[error("unexpected type: expected {expected}, found {found}")]
    UnexpectedType { expected: String, found: String },

    #[error("declared size {size} exceeds limit {limit}")]
    SizeLimit { size: i64, limit: usize },

    #[error("string is not valid UTF-8")]
    BadUtf8,

    #[error("malformed varint")]
    BadVarint,

    #[error("message ended before a complete value was read")]
    Truncated,

    #[error("required field {field_id} of {strukt} missing")]
    RequiredFieldMissing { strukt: String, field_id: i16 },

    #[error("union {strukt} must carry at most one field, found {count}")]
    UnionCardinality { strukt: String, count: usize },

    #[error("nesting depth limit exceeded")]
    DepthLimit,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    pub(crate) fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedType {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
