//! Schema-driven RPC client.

use std::sync::Arc;

use thriftrun_core::{Schema, ServiceDef, StructValue, Value};
use thriftrun_protocol::{MessageType, Protocol, WireType, codec, skip};

use crate::{
    app_error::{ApplicationError, ApplicationErrorKind},
    error::RpcError,
};

/// Calls methods of one service over a protocol.
///
/// Sequence ids are chosen here and verified against the echo in the reply.
pub struct Client<P> {
    schema: Arc<Schema>,
    service: Arc<ServiceDef>,
    proto: P,
    seqid: i32,
}

impl<P: Protocol> Client<P> {
    pub fn new(schema: Arc<Schema>, service_name: &str, proto: P) -> Result<Self, RpcError> {
        let service = schema
            .service(service_name)
            .cloned()
            .ok_or_else(|| RpcError::UnknownService(service_name.to_string()))?;
        Ok(Self {
            schema,
            service,
            proto,
            seqid: 0,
        })
    }

    pub fn into_protocol(self) -> P {
        self.proto
    }

    /// An empty args struct for a method, ready for `set_by_name`.
    pub fn args(&self, method: &str) -> Result<StructValue, RpcError> {
        let m = self
            .schema
            .resolve_method(&self.service, method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;
        Ok(StructValue::new(Arc::clone(&m.args)))
    }

    /// Invoke a method and wait for its reply.
    ///
    /// Returns `None` for `void` and oneway methods; a set `throws` field in
    /// the reply surfaces as [`RpcError::Declared`].
    pub fn call(&mut self, method: &str, args: StructValue) -> Result<Option<Value>, RpcError> {
        let seqid = self.send(method, args)?;
        let m = self
            .schema
            .resolve_method(&self.service, method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;
        if m.oneway {
            return Ok(None);
        }
        self.recv(method, seqid)
    }

    /// Write and flush a `CALL` (or `ONEWAY`) message; returns the seqid.
    pub fn send(&mut self, method: &str, args: StructValue) -> Result<i32, RpcError> {
        let m = self
            .schema
            .resolve_method(&self.service, method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;
        self.seqid = self.seqid.wrapping_add(1);
        let seqid = self.seqid;
        let message_type = if m.oneway {
            MessageType::Oneway
        } else {
            MessageType::Call
        };
        self.proto.write_message_begin(method, message_type, seqid)?;
        codec::write_struct(&mut self.proto, &self.schema, &args)?;
        self.proto.write_message_end()?;
        self.proto.flush()?;
        Ok(seqid)
    }

    /// Read one reply for a previously sent call.
    ///
    /// Application exceptions share the `REPLY` envelope with real results,
    /// so the reply struct is decoded in a single pass and classified by
    /// shape: result structs carry only the id-0 success slot and
    /// struct-typed throws fields, which the fixed `{1: string, 2: i32}`
    /// application payload can never look like.
    pub fn recv(&mut self, method: &str, seqid: i32) -> Result<Option<Value>, RpcError> {
        let m = self
            .schema
            .resolve_method(&self.service, method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;

        let (name, message_type, echoed) = self.proto.read_message_begin()?;

        if message_type != MessageType::Reply {
            return Err(ApplicationError::new(
                ApplicationErrorKind::InvalidMessageType,
                format!("expected REPLY, got {message_type:?}"),
            )
            .into());
        }
        if name != method {
            return Err(ApplicationError::new(
                ApplicationErrorKind::WrongMethodName,
                format!("expected reply for '{method}', got '{name}'"),
            )
            .into());
        }
        if echoed != seqid {
            return Err(ApplicationError::new(
                ApplicationErrorKind::BadSequenceId,
                format!("expected seqid {seqid}, got {echoed}"),
            )
            .into());
        }

        let mut success = None;
        let mut thrown = None;
        let mut app_message: Option<String> = None;
        let mut app_kind: Option<i32> = None;

        self.proto.read_struct_begin()?;
        while let Some((wire, id)) = self.proto.read_field_begin()? {
            match m.result.field_by_id(id) {
                Some(field) if codec::wire_type_of(&self.schema, &field.ty) == wire => {
                    let value = codec::read_value(&mut self.proto, &self.schema, &field.ty)?;
                    if id == 0 {
                        success = Some(value);
                    } else {
                        thrown = Some(value);
                    }
                }
                _ if id == 1 && wire == WireType::Binary => {
                    app_message = Some(self.proto.read_string()?);
                }
                _ if id == 2 && wire == WireType::I32 => {
                    app_kind = Some(self.proto.read_i32()?);
                }
                _ => skip(&mut self.proto, wire)?,
            }
            self.proto.read_field_end()?;
        }
        self.proto.read_struct_end()?;
        self.proto.read_message_end()?;

        if let Some(value) = success {
            return Ok(Some(value));
        }
        if let Some(Value::Struct(thrown)) = thrown {
            return Err(RpcError::Declared(thrown));
        }
        if app_message.is_some() || app_kind.is_some() {
            return Err(ApplicationError::new(
                ApplicationErrorKind::from_i32(app_kind.unwrap_or(0)),
                app_message.unwrap_or_default(),
            )
            .into());
        }
        if m.returns.is_none() {
            return Ok(None);
        }
        Err(ApplicationError::new(
            ApplicationErrorKind::MissingResult,
            format!("'{method}' reply carried no result"),
        )
        .into())
    }
}
