//! Server-side method dispatch.

use std::{collections::HashMap, sync::Arc};

use thriftrun_core::{Schema, ServiceDef, StructValue, TypeRef, Value};
use thriftrun_protocol::{MessageType, Protocol, ProtocolError, WireType, codec, skip};
use thriftrun_transport::TransportError;
use tracing::{debug, warn};

use crate::{
    app_error::{ApplicationError, ApplicationErrorKind},
    error::RpcError,
};

/// Error surface available to handlers.
#[derive(Debug)]
pub enum HandlerError {
    /// An exception instance matching one of the method's `throws` types;
    /// encoded into the matching result field.
    Declared(StructValue),
    /// Anything else; becomes an `INTERNAL_ERROR` application exception.
    Internal(String),
}

type HandlerFn = dyn Fn(&StructValue) -> Result<Value, HandlerError> + Send + Sync;

/// Dispatches incoming calls for one service against registered handlers.
///
/// One processor serves one service (including inherited methods); it is
/// shareable across workers, but each worker brings its own protocol pair.
pub struct Processor {
    schema: Arc<Schema>,
    service: Arc<ServiceDef>,
    handlers: HashMap<String, Box<HandlerFn>>,
}

impl Processor {
    pub fn new(schema: Arc<Schema>, service_name: &str) -> Result<Self, RpcError> {
        let service = schema
            .service(service_name)
            .cloned()
            .ok_or_else(|| RpcError::UnknownService(service_name.to_string()))?;
        Ok(Self {
            schema,
            service,
            handlers: HashMap::new(),
        })
    }

    /// Register a handler for a declared method (own or inherited).
    pub fn handle(
        &mut self,
        method: &str,
        f: impl Fn(&StructValue) -> Result<Value, HandlerError> + Send + Sync + 'static,
    ) -> Result<(), RpcError> {
        if self.schema.resolve_method(&self.service, method).is_none() {
            return Err(RpcError::UnknownMethod(method.to_string()));
        }
        self.handlers.insert(method.to_string(), Box::new(f));
        Ok(())
    }

    /// An empty args struct for a method, for driving a processor directly.
    pub fn args_for(&self, method: &str) -> Result<StructValue, RpcError> {
        let m = self
            .schema
            .resolve_method(&self.service, method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;
        Ok(StructValue::new(Arc::clone(&m.args)))
    }

    /// Handle exactly one message. Returns false on a clean end of stream
    /// at a message boundary.
    pub fn process<I, O>(&self, input: &mut I, output: &mut O) -> Result<bool, RpcError>
    where
        I: Protocol,
        O: Protocol,
    {
        let (name, message_type, seqid) = match input.read_message_begin() {
            Ok(header) => header,
            Err(
                ProtocolError::Transport(TransportError::Eof) | ProtocolError::Truncated,
            ) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if message_type != MessageType::Call && message_type != MessageType::Oneway {
            skip(input, WireType::Struct)?;
            input.read_message_end()?;
            self.reply_exception(
                output,
                &name,
                seqid,
                ApplicationError::new(
                    ApplicationErrorKind::InvalidMessageType,
                    format!("expected CALL or ONEWAY, got {message_type:?}"),
                ),
            )?;
            return Ok(true);
        }

        let Some(method) = self.schema.resolve_method(&self.service, &name) else {
            warn!(method = %name, "call for unknown method");
            skip(input, WireType::Struct)?;
            input.read_message_end()?;
            self.reply_exception(
                output,
                &name,
                seqid,
                ApplicationError::new(
                    ApplicationErrorKind::UnknownMethod,
                    format!("unknown method '{name}'"),
                ),
            )?;
            return Ok(true);
        };

        let args = codec::read_struct(input, &self.schema, &method.args)?;
        input.read_message_end()?;

        let Some(handler) = self.handlers.get(&name) else {
            if method.oneway {
                warn!(method = %name, "oneway call with no handler registered");
                return Ok(true);
            }
            self.reply_exception(
                output,
                &name,
                seqid,
                ApplicationError::new(
                    ApplicationErrorKind::UnknownMethod,
                    format!("no handler registered for '{name}'"),
                ),
            )?;
            return Ok(true);
        };

        debug!(method = %name, seqid, oneway = method.oneway, "dispatching");
        let outcome = handler(&args);

        if method.oneway {
            if let Err(e) = outcome {
                warn!(method = %name, error = ?e, "oneway handler failed");
            }
            return Ok(true);
        }

        let mut result = StructValue::new(Arc::clone(&method.result));
        match outcome {
            Ok(value) => {
                if method.returns.is_some() {
                    result.set(0, value);
                }
            }
            Err(HandlerError::Declared(thrown)) => {
                let Some(field) = method.result.fields.iter().find(|f| {
                    matches!(
                        self.schema.true_type(&f.ty),
                        TypeRef::Struct(name) if *name == thrown.def().name
                    )
                }) else {
                    self.reply_exception(
                        output,
                        &name,
                        seqid,
                        ApplicationError::new(
                            ApplicationErrorKind::InternalError,
                            format!("undeclared exception {}", thrown.def().name),
                        ),
                    )?;
                    return Ok(true);
                };
                result.set(field.id, Value::Struct(thrown));
            }
            Err(HandlerError::Internal(message)) => {
                warn!(method = %name, %message, "handler failed");
                self.reply_exception(
                    output,
                    &name,
                    seqid,
                    ApplicationError::new(ApplicationErrorKind::InternalError, message),
                )?;
                return Ok(true);
            }
        }

        output.write_message_begin(&name, MessageType::Reply, seqid)?;
        codec::write_struct(output, &self.schema, &result)?;
        output.write_message_end()?;
        output.flush()?;
        Ok(true)
    }

    /// Process messages until the peer closes cleanly.
    pub fn serve<I, O>(&self, input: &mut I, output: &mut O) -> Result<(), RpcError>
    where
        I: Protocol,
        O: Protocol,
    {
        while self.process(input, output)? {}
        Ok(())
    }

    /// Application exceptions ride a `REPLY` envelope with the seqid echoed;
    /// the payload shape alone distinguishes them from a method result.
    fn reply_exception<O: Protocol>(
        &self,
        output: &mut O,
        name: &str,
        seqid: i32,
        error: ApplicationError,
    ) -> Result<(), RpcError> {
        output.write_message_begin(name, MessageType::Reply, seqid)?;
        error.write(output)?;
        output.write_message_end()?;
        output.flush()?;
        Ok(())
    }
}
