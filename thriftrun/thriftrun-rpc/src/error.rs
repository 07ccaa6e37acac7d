//! RPC-level error taxonomy.

use thriftrun_core::StructValue;
use thriftrun_protocol::ProtocolError;
use thriftrun_transport::TransportError;

use crate::app_error::ApplicationError;

/// Everything a caller can see from an RPC: disjoint and typed.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The peer answered with an application exception.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The method raised one of its declared exceptions.
    #[error("service raised {}", .0.def().name)]
    Declared(StructValue),

    /// Malformed wire data; the connection is no longer synchronized.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// I/O failure; the session is over.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("service '{0}' not present in schema")]
    UnknownService(String),

    #[error("method '{0}' not declared by the service")]
    UnknownMethod(String),
}
