//! Runtime Apache Thrift stack: `.thrift` IDL in, typed RPC out — no code
//! generation.
//!
//! # Pipeline
//!
//! ```text
//! .thrift source tree
//!   └─ load_schema            – lex, parse, resolve includes and names
//!       └─ Schema             – immutable type/service graph
//!           ├─ codec          – StructValue ⇄ bytes via a protocol
//!           │    └─ BinaryProtocol | CompactProtocol | JsonProtocol
//!           │         └─ MemoryTransport | BufferedTransport
//!           │            | FramedTransport | TcpTransport
//!           └─ Processor / Client – CALL/REPLY dispatch over a protocol
//! ```
//!
//! The schema is built once and shared; protocols and transports are
//! per-connection. See the member crates for the individual layers.

use std::path::Path;

pub use thriftrun_core::{
    BindingError, ConstDef, EnumDef, FieldDef, Limits, MethodDef, Module, RecordBinding,
    Requiredness, Schema, ServiceDef, StructDef, StructKind, StructValue, TypeRef, TypedefDef,
    Value, format_schema,
};
pub use thriftrun_idl::{IdlError, Loader, ResolveError};
pub use thriftrun_protocol::{
    BinaryProtocol, CompactProtocol, JsonProtocol, MessageType, Protocol, ProtocolError, WireType,
    codec,
};
pub use thriftrun_rpc::{
    ApplicationError, ApplicationErrorKind, Client, HandlerError, Processor, RpcError,
};
pub use thriftrun_transport::{
    BufferedTransport, FramedTransport, MemoryTransport, TcpTransport, Transport, TransportError,
};

/// Load a schema from a root `.thrift` file with default options.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, IdlError> {
    thriftrun_idl::load(path)
}

/// Load a schema from in-memory IDL text with default options.
pub fn load_schema_str(name: &str, text: &str) -> Result<Schema, IdlError> {
    thriftrun_idl::load_str(name, text)
}
