//! RPC machinery for the `thriftrun` Thrift runtime.
//!
//! The [`Processor`] dispatches `CALL`/`ONEWAY` messages to registered
//! handlers using the schema's service descriptors; the [`Client`] mirrors
//! it on the calling side. Both are synchronous: one request occupies one
//! logical worker, and concurrency above the processor (thread per
//! connection, pools) is the host's choice.
//!
//! Declared exceptions, application errors, protocol errors, and transport
//! errors reach the caller as distinct [`RpcError`] variants.

mod app_error;
mod client;
mod error;
mod processor;

pub use app_error::{ApplicationError, ApplicationErrorKind};
pub use client::Client;
pub use error::RpcError;
pub use processor::{HandlerError, Processor};
