//! The standard Thrift application exception.

use thriftrun_protocol::{Protocol, ProtocolError, WireType, skip};

/// Failure category carried by an application exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationErrorKind {
    Unknown = 0,
    UnknownMethod = 1,
    InvalidMessageType = 2,
    WrongMethodName = 3,
    BadSequenceId = 4,
    MissingResult = 5,
    InternalError = 6,
    ProtocolError = 7,
}

impl ApplicationErrorKind {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::UnknownMethod,
            2 => Self::InvalidMessageType,
            3 => Self::WrongMethodName,
            4 => Self::BadSequenceId,
            5 => Self::MissingResult,
            6 => Self::InternalError,
            7 => Self::ProtocolError,
            _ => Self::Unknown,
        }
    }
}

/// An application exception: kind plus a diagnostic message.
///
/// The wire form is the fixed two-field struct (`1: string message,
/// 2: i32 type`) carried in a `REPLY` envelope, so no schema is needed to
/// encode or decode one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("application error ({kind:?}): {message}")]
pub struct ApplicationError {
    pub kind: ApplicationErrorKind,
    pub message: String,
}

impl ApplicationError {
    pub fn new(kind: ApplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn write<P: Protocol + ?Sized>(&self, proto: &mut P) -> Result<(), ProtocolError> {
        proto.write_struct_begin("TApplicationException")?;
        proto.write_field_begin("message", WireType::Binary, 1)?;
        proto.write_string(&self.message)?;
        proto.write_field_end()?;
        proto.write_field_begin("type", WireType::I32, 2)?;
        proto.write_i32(self.kind.as_i32())?;
        proto.write_field_end()?;
        proto.write_field_stop()?;
        proto.write_struct_end()
    }

    pub fn read<P: Protocol + ?Sized>(proto: &mut P) -> Result<Self, ProtocolError> {
        let mut out = Self::new(ApplicationErrorKind::Unknown, "");
        proto.read_struct_begin()?;
        while let Some((wire, id)) = proto.read_field_begin()? {
            match (id, wire) {
                (1, WireType::Binary) => out.message = proto.read_string()?,
                (2, WireType::I32) => out.kind = ApplicationErrorKind::from_i32(proto.read_i32()?),
                _ => skip(proto, wire)?,
            }
            proto.read_field_end()?;
        }
        proto.read_struct_end()?;
        Ok(out)
    }
}
