//! Wire protocols for the `thriftrun` Thrift runtime.
//!
//! Three interoperable encodings implement the same abstract [`Protocol`]
//! operation set over a [`Transport`](thriftrun_transport::Transport):
//!
//! - [`BinaryProtocol`] — big-endian fixed-width, the classic encoding
//! - [`CompactProtocol`] — varint/zigzag with field-id delta encoding
//! - [`JsonProtocol`] — the Thrift TJSON form
//!
//! The [`codec`] module bridges protocols and the schema: it encodes and
//! decodes [`Value`](thriftrun_core::Value)s against
//! [`StructDef`](thriftrun_core::StructDef)s, skipping unknown fields and
//! enforcing requiredness.

mod binary;
pub mod codec;
mod compact;
mod error;
mod json;
mod skip;
mod wire;

pub use binary::BinaryProtocol;
pub use compact::CompactProtocol;
pub use error::ProtocolError;
pub use json::JsonProtocol;
pub use skip::skip;
pub use wire::{MessageType, WireType};

use thriftrun_core::Limits;

/// The abstract operation set every protocol implements.
///
/// A protocol instance is single-threaded with respect to its transport;
/// concurrent use is undefined. Writers emit fields in whatever order the
/// caller chooses; readers must tolerate any order.
pub trait Protocol {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        seqid: i32,
    ) -> Result<(), ProtocolError>;
    fn write_message_end(&mut self) -> Result<(), ProtocolError>;

    fn write_struct_begin(&mut self, name: &str) -> Result<(), ProtocolError>;
    fn write_struct_end(&mut self) -> Result<(), ProtocolError>;

    fn write_field_begin(
        &mut self,
        name: &str,
        wire_type: WireType,
        id: i16,
    ) -> Result<(), ProtocolError>;
    fn write_field_end(&mut self) -> Result<(), ProtocolError>;
    fn write_field_stop(&mut self) -> Result<(), ProtocolError>;

    fn write_map_begin(
        &mut self,
        key_type: WireType,
        value_type: WireType,
        size: usize,
    ) -> Result<(), ProtocolError>;
    fn write_map_end(&mut self) -> Result<(), ProtocolError>;
    fn write_list_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError>;
    fn write_list_end(&mut self) -> Result<(), ProtocolError>;
    fn write_set_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError>;
    fn write_set_end(&mut self) -> Result<(), ProtocolError>;

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError>;
    fn write_i8(&mut self, v: i8) -> Result<(), ProtocolError>;
    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError>;
    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError>;
    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError>;
    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError>;
    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError>;
    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError>;

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32), ProtocolError>;
    fn read_message_end(&mut self) -> Result<(), ProtocolError>;

    fn read_struct_begin(&mut self) -> Result<(), ProtocolError>;
    fn read_struct_end(&mut self) -> Result<(), ProtocolError>;

    /// `None` signals the field-stop marker.
    fn read_field_begin(&mut self) -> Result<Option<(WireType, i16)>, ProtocolError>;
    fn read_field_end(&mut self) -> Result<(), ProtocolError>;

    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize), ProtocolError>;
    fn read_map_end(&mut self) -> Result<(), ProtocolError>;
    fn read_list_begin(&mut self) -> Result<(WireType, usize), ProtocolError>;
    fn read_list_end(&mut self) -> Result<(), ProtocolError>;
    fn read_set_begin(&mut self) -> Result<(WireType, usize), ProtocolError>;
    fn read_set_end(&mut self) -> Result<(), ProtocolError>;

    fn read_bool(&mut self) -> Result<bool, ProtocolError>;
    fn read_i8(&mut self) -> Result<i8, ProtocolError>;
    fn read_i16(&mut self) -> Result<i16, ProtocolError>;
    fn read_i32(&mut self) -> Result<i32, ProtocolError>;
    fn read_i64(&mut self) -> Result<i64, ProtocolError>;
    fn read_double(&mut self) -> Result<f64, ProtocolError>;
    fn read_string(&mut self) -> Result<String, ProtocolError>;
    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError>;

    /// Flush the underlying transport.
    fn flush(&mut self) -> Result<(), ProtocolError>;

    /// Decode limits in effect for this protocol instance.
    fn limits(&self) -> &Limits;
}
