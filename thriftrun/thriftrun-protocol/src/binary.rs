//! The classic Thrift binary protocol.
//!
//! Big-endian fixed-width integers throughout. Strict message headers carry
//! a version word (`0x8001_0000 | messageType`); non-strict headers lead
//! with the name length. `strict_read` / `strict_write` on
//! [`Limits`](thriftrun_core::Limits) select which forms are accepted and
//! produced.

use thriftrun_core::Limits;
use thriftrun_transport::Transport;

use crate::{MessageType, Protocol, ProtocolError, WireType};

const VERSION_1: u32 = 0x8001_0000;
const VERSION_MASK: u32 = 0xffff_0000;

/// Binary protocol over a transport.
#[derive(Debug)]
pub struct BinaryProtocol<T> {
    trans: T,
    limits: Limits,
}

impl<T: Transport> BinaryProtocol<T> {
    pub fn new(trans: T) -> Self {
        Self::with_limits(trans, Limits::default())
    }

    pub fn with_limits(trans: T, limits: Limits) -> Self {
        Self { trans, limits }
    }

    pub fn into_inner(self) -> T {
        self.trans
    }

    fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        let mut buf = [0u8; 1];
        self.trans.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        let mut buf = [0u8; 4];
        self.trans.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Validate a declared byte or element count against `limit`.
    fn checked_size(&self, size: i32, limit: usize) -> Result<usize, ProtocolError> {
        if size < 0 || size as usize > limit {
            return Err(ProtocolError::SizeLimit {
                size: size as i64,
                limit,
            });
        }
        Ok(size as usize)
    }

    fn read_raw(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = vec![0u8; len];
        self.trans.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<T: Transport> Protocol for BinaryProtocol<T> {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        seqid: i32,
    ) -> Result<(), ProtocolError> {
        if self.limits.strict_write {
            let header = VERSION_1 | message_type.as_u8() as u32;
            self.write_i32(header as i32)?;
            self.write_string(name)?;
        } else {
            self.write_string(name)?;
            self.write_i8(message_type.as_u8() as i8)?;
        }
        self.write_i32(seqid)
    }

    fn write_message_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_begin(
        &mut self,
        _name: &str,
        wire_type: WireType,
        id: i16,
    ) -> Result<(), ProtocolError> {
        self.write_i8(wire_type.as_u8() as i8)?;
        self.write_i16(id)
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.write_i8(0)
    }

    fn write_map_begin(
        &mut self,
        key_type: WireType,
        value_type: WireType,
        size: usize,
    ) -> Result<(), ProtocolError> {
        self.write_i8(key_type.as_u8() as i8)?;
        self.write_i8(value_type.as_u8() as i8)?;
        self.write_i32(size as i32)
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_list_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError> {
        self.write_i8(elem_type.as_u8() as i8)?;
        self.write_i32(size as i32)
    }

    fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_set_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError> {
        self.write_list_begin(elem_type, size)
    }

    fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError> {
        self.write_i8(v as i8)
    }

    fn write_i8(&mut self, v: i8) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&[v as u8])?)
    }

    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&v.to_be_bytes())?)
    }

    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&v.to_be_bytes())?)
    }

    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&v.to_be_bytes())?)
    }

    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&v.to_bits().to_be_bytes())?)
    }

    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError> {
        self.write_i32(v.len() as i32)?;
        Ok(self.trans.write(v)?)
    }

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32), ProtocolError> {
        let first = self.read_u32()?;
        if first & 0x8000_0000 != 0 {
            // Strict header: version word, then name, then seqid.
            if first & VERSION_MASK != VERSION_1 {
                return Err(ProtocolError::BadVersion);
            }
            let type_byte = (first & 0xff) as u8;
            let message_type = MessageType::from_u8(type_byte)
                .ok_or(ProtocolError::BadMessageType(type_byte))?;
            let name = self.read_string()?;
            let seqid = self.read_i32()?;
            return Ok((name, message_type, seqid));
        }

        // Non-strict header: `first` was the name length.
        if self.limits.strict_read {
            return Err(ProtocolError::BadVersion);
        }
        let len = self.checked_size(first as i32, self.limits.string_length)?;
        let bytes = self.read_raw(len)?;
        let name = String::from_utf8(bytes).map_err(|_| ProtocolError::BadUtf8)?;
        let type_byte = self.read_u8()?;
        let message_type =
            MessageType::from_u8(type_byte).ok_or(ProtocolError::BadMessageType(type_byte))?;
        let seqid = self.read_i32()?;
        Ok((name, message_type, seqid))
    }

    fn read_message_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<Option<(WireType, i16)>, ProtocolError> {
        let type_byte = self.read_u8()?;
        if type_byte == 0 {
            return Ok(None);
        }
        let wire_type = WireType::from_u8(type_byte)
            .ok_or_else(|| ProtocolError::unexpected("a wire type", format!("byte {type_byte}")))?;
        let id = self.read_i16()?;
        Ok(Some((wire_type, id)))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize), ProtocolError> {
        let key_byte = self.read_u8()?;
        let key_type = WireType::from_u8(key_byte)
            .ok_or_else(|| ProtocolError::unexpected("a wire type", format!("byte {key_byte}")))?;
        let value_byte = self.read_u8()?;
        let value_type = WireType::from_u8(value_byte).ok_or_else(|| {
            ProtocolError::unexpected("a wire type", format!("byte {value_byte}"))
        })?;
        let size = self.read_i32()?;
        let size = self.checked_size(size, self.limits.container_length)?;
        Ok((key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<(WireType, usize), ProtocolError> {
        let elem_byte = self.read_u8()?;
        let elem_type = WireType::from_u8(elem_byte)
            .ok_or_else(|| ProtocolError::unexpected("a wire type", format!("byte {elem_byte}")))?;
        let size = self.read_i32()?;
        let size = self.checked_size(size, self.limits.container_length)?;
        Ok((elem_type, size))
    }

    fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<(WireType, usize), ProtocolError> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_i8()? != 0)
    }

    fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(self.read_u8()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        let mut buf = [0u8; 2];
        self.trans.read_exact(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(self.read_u32()? as i32)
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        let mut buf = [0u8; 8];
        self.trans.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        let mut buf = [0u8; 8];
        self.trans.read_exact(&mut buf)?;
        Ok(f64::from_bits(u64::from_be_bytes(buf)))
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|_| ProtocolError::BadUtf8)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let len = self.read_i32()?;
        let len = self.checked_size(len, self.limits.string_length)?;
        self.read_raw(len)
    }

    fn flush(&mut self) -> Result<(), ProtocolError> {
        Ok(self.trans.flush()?)
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }
}
