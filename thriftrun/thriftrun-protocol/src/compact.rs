//! The Thrift compact protocol.
//!
//! Integers are zig-zag varints, struct field ids are delta-encoded into the
//! high nibble of the field-type byte, and booleans inline their value into
//! the field-type nibble. Doubles are little-endian fixed width, per the
//! compact protocol specification.

use thriftrun_core::Limits;
use thriftrun_transport::Transport;

use crate::{MessageType, Protocol, ProtocolError, WireType};

const PROTOCOL_ID: u8 = 0x82;
const VERSION: u8 = 1;
const VERSION_MASK: u8 = 0x1f;
const TYPE_SHIFT: u8 = 5;
const TYPE_MASK: u8 = 0x07;

// Compact element-type nibble values.
const CT_BOOL_TRUE: u8 = 1;
const CT_BOOL_FALSE: u8 = 2;
const CT_BYTE: u8 = 3;
const CT_I16: u8 = 4;
const CT_I32: u8 = 5;
const CT_I64: u8 = 6;
const CT_DOUBLE: u8 = 7;
const CT_BINARY: u8 = 8;
const CT_LIST: u8 = 9;
const CT_SET: u8 = 10;
const CT_MAP: u8 = 11;
const CT_STRUCT: u8 = 12;

fn compact_type(wire: WireType) -> u8 {
    match wire {
        WireType::Bool => CT_BOOL_TRUE,
        WireType::I8 => CT_BYTE,
        WireType::I16 => CT_I16,
        WireType::I32 => CT_I32,
        WireType::I64 => CT_I64,
        WireType::Double => CT_DOUBLE,
        WireType::Binary => CT_BINARY,
        WireType::List => CT_LIST,
        WireType::Set => CT_SET,
        WireType::Map => CT_MAP,
        WireType::Struct => CT_STRUCT,
    }
}

fn wire_type(compact: u8) -> Option<WireType> {
    Some(match compact {
        CT_BOOL_TRUE | CT_BOOL_FALSE => WireType::Bool,
        CT_BYTE => WireType::I8,
        CT_I16 => WireType::I16,
        CT_I32 => WireType::I32,
        CT_I64 => WireType::I64,
        CT_DOUBLE => WireType::Double,
        CT_BINARY => WireType::Binary,
        CT_LIST => WireType::List,
        CT_SET => WireType::Set,
        CT_MAP => WireType::Map,
        CT_STRUCT => WireType::Struct,
        _ => return None,
    })
}

fn zigzag_i32(v: i32) -> u64 {
    ((v << 1) ^ (v >> 31)) as u32 as u64
}

fn zigzag_i64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn unzigzag_i32(n: u64) -> i32 {
    let n = n as u32;
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

fn unzigzag_i64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Compact protocol over a transport.
#[derive(Debug)]
pub struct CompactProtocol<T> {
    trans: T,
    limits: Limits,
    last_write_field_id: i16,
    write_field_stack: Vec<i16>,
    pending_write_bool: Option<i16>,
    last_read_field_id: i16,
    read_field_stack: Vec<i16>,
    pending_read_bool: Option<bool>,
}

impl<T: Transport> CompactProtocol<T> {
    pub fn new(trans: T) -> Self {
        Self::with_limits(trans, Limits::default())
    }

    pub fn with_limits(trans: T, limits: Limits) -> Self {
        Self {
            trans,
            limits,
            last_write_field_id: 0,
            write_field_stack: Vec::new(),
            pending_write_bool: None,
            last_read_field_id: 0,
            read_field_stack: Vec::new(),
            pending_read_bool: None,
        }
    }

    pub fn into_inner(self) -> T {
        self.trans
    }

    fn write_byte(&mut self, b: u8) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&[b])?)
    }

    fn read_byte(&mut self) -> Result<u8, ProtocolError> {
        let mut buf = [0u8; 1];
        self.trans.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn write_varint(&mut self, mut v: u64) -> Result<(), ProtocolError> {
        loop {
            if v & !0x7f == 0 {
                return self.write_byte(v as u8);
            }
            self.write_byte((v as u8 & 0x7f) | 0x80)?;
            v >>= 7;
        }
    }

    fn read_varint(&mut self) -> Result<u64, ProtocolError> {
        let mut out = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.read_byte()?;
            out |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(out);
            }
        }
        Err(ProtocolError::BadVarint)
    }

    fn checked_size(&self, size: u64, limit: usize) -> Result<usize, ProtocolError> {
        if size > limit as u64 {
            return Err(ProtocolError::SizeLimit {
                size: size as i64,
                limit,
            });
        }
        Ok(size as usize)
    }

    /// Field header with delta-encoded id, or explicit zig-zag id when the
    /// delta does not fit the nibble.
    fn write_field_header(&mut self, compact_type: u8, id: i16) -> Result<(), ProtocolError> {
        let delta = i32::from(id) - i32::from(self.last_write_field_id);
        if (1..=15).contains(&delta) {
            self.write_byte(((delta as u8) << 4) | compact_type)?;
        } else {
            self.write_byte(compact_type)?;
            self.write_varint(zigzag_i32(i32::from(id)))?;
        }
        self.last_write_field_id = id;
        Ok(())
    }
}

impl<T: Transport> Protocol for CompactProtocol<T> {
    fn write_message_begin(
        &mut self,
        name: &str,
        message_type: MessageType,
        seqid: i32,
    ) -> Result<(), ProtocolError> {
        self.write_byte(PROTOCOL_ID)?;
        self.write_byte((message_type.as_u8() << TYPE_SHIFT) | VERSION)?;
        self.write_varint(seqid as u32 as u64)?;
        self.write_varint(name.len() as u64)?;
        Ok(self.trans.write(name.as_bytes())?)
    }

    fn write_message_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        self.write_field_stack.push(self.last_write_field_id);
        self.last_write_field_id = 0;
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.last_write_field_id = self.write_field_stack.pop().unwrap_or(0);
        Ok(())
    }

    fn write_field_begin(
        &mut self,
        _name: &str,
        wire_type: WireType,
        id: i16,
    ) -> Result<(), ProtocolError> {
        if wire_type == WireType::Bool {
            // Deferred: the value byte is folded into the type nibble.
            self.pending_write_bool = Some(id);
            return Ok(());
        }
        self.write_field_header(compact_type(wire_type), id)
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.write_byte(0)
    }

    fn write_map_begin(
        &mut self,
        key_type: WireType,
        value_type: WireType,
        size: usize,
    ) -> Result<(), ProtocolError> {
        self.write_varint(size as u64)?;
        if size > 0 {
            self.write_byte((compact_type(key_type) << 4) | compact_type(value_type))?;
        }
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_list_begin(&mut self, elem_type: WireType, size: usize) -> Result<(), ProtocolError> {
        if size < 15 {
            self.write_byte(((size as u8) << 4) | compact_type(elem_type))
        } else {
            self.write_byte(0xf0 | compact_type(elem_type))?;
            self.write_varint(size as u64)
        }
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
        let compact = if v { CT_BOOL_TRUE } else { CT_BOOL_FALSE };
        match self.pending_write_bool.take() {
            Some(id) => self.write_field_header(compact, id),
            None => self.write_byte(compact),
        }
    }

    fn write_i8(&mut self, v: i8) -> Result<(), ProtocolError> {
        self.write_byte(v as u8)
    }

    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError> {
        self.write_varint(zigzag_i32(i32::from(v)))
    }

    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError> {
        self.write_varint(zigzag_i32(v))
    }

    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError> {
        self.write_varint(zigzag_i64(v))
    }

    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError> {
        Ok(self.trans.write(&v.to_bits().to_le_bytes())?)
    }

    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError> {
        self.write_varint(v.len() as u64)?;
        Ok(self.trans.write(v)?)
    }

    fn read_message_begin(&mut self) -> Result<(String, MessageType, i32), ProtocolError> {
        if self.read_byte()? != PROTOCOL_ID {
            return Err(ProtocolError::BadVersion);
        }
        let header = self.read_byte()?;
        if header & VERSION_MASK != VERSION {
            return Err(ProtocolError::BadVersion);
        }
        let type_bits = (header >> TYPE_SHIFT) & TYPE_MASK;
        let message_type =
            MessageType::from_u8(type_bits).ok_or(ProtocolError::BadMessageType(type_bits))?;
        let seqid = self.read_varint()? as u32 as i32;
        let len = self.read_varint()?;
        let len = self.checked_size(len, self.limits.string_length)?;
        let mut bytes = vec![0u8; len];
        self.trans.read_exact(&mut bytes)?;
        let name = String::from_utf8(bytes).map_err(|_| ProtocolError::BadUtf8)?;
        Ok((name, message_type, seqid))
    }

    fn read_message_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        self.read_field_stack.push(self.last_read_field_id);
        self.last_read_field_id = 0;
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.last_read_field_id = self.read_field_stack.pop().unwrap_or(0);
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<Option<(WireType, i16)>, ProtocolError> {
        let header = self.read_byte()?;
        if header == 0 {
            return Ok(None);
        }
        let compact = header & 0x0f;
        let delta = header >> 4;
        let id = if delta == 0 {
            unzigzag_i32(self.read_varint()?) as i16
        } else {
            self.last_read_field_id.wrapping_add(i16::from(delta))
        };
        self.last_read_field_id = id;

        if compact == CT_BOOL_TRUE || compact == CT_BOOL_FALSE {
            self.pending_read_bool = Some(compact == CT_BOOL_TRUE);
        }
        let wire = wire_type(compact)
            .ok_or_else(|| ProtocolError::unexpected("a compact type", format!("nibble {compact}")))?;
        Ok(Some((wire, id)))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<(WireType, WireType, usize), ProtocolError> {
        let size = self.read_varint()?;
        let size = self.checked_size(size, self.limits.container_length)?;
        if size == 0 {
            // The key/value type byte is elided for empty maps.
            return Ok((WireType::Bool, WireType::Bool, 0));
        }
        let kv = self.read_byte()?;
        let key_type = wire_type(kv >> 4)
            .ok_or_else(|| ProtocolError::unexpected("a compact type", format!("nibble {}", kv >> 4)))?;
        let value_type = wire_type(kv & 0x0f).ok_or_else(|| {
            ProtocolError::unexpected("a compact type", format!("nibble {}", kv & 0x0f))
        })?;
        Ok((key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<(WireType, usize), ProtocolError> {
        let header = self.read_byte()?;
        let elem = wire_type(header & 0x0f).ok_or_else(|| {
            ProtocolError::unexpected("a compact type", format!("nibble {}", header & 0x0f))
        })?;
        let short_size = u64::from(header >> 4);
        let size = if short_size == 15 {
            self.read_varint()?
        } else {
            short_size
        };
        let size = self.checked_size(size, self.limits.container_length)?;
        Ok((elem, size))
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
        if let Some(v) = self.pending_read_bool.take() {
            return Ok(v);
        }
        match self.read_byte()? {
            CT_BOOL_TRUE => Ok(true),
            CT_BOOL_FALSE => Ok(false),
            other => Err(ProtocolError::unexpected(
                "a bool byte",
                format!("byte {other}"),
            )),
        }
    }

    fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(self.read_byte()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        Ok(unzigzag_i32(self.read_varint()?) as i16)
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(unzigzag_i32(self.read_varint()?))
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(unzigzag_i64(self.read_varint()?))
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        let mut buf = [0u8; 8];
        self.trans.read_exact(&mut buf)?;
        Ok(f64::from_bits(u64::from_le_bytes(buf)))
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|_| ProtocolError::BadUtf8)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError> {
        let len = self.read_varint()?;
        let len = self.checked_size(len, self.limits.string_length)?;
        let mut buf = vec![0u8; len];
        self.trans.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn flush(&mut self) -> Result<(), ProtocolError> {
        Ok(self.trans.flush()?)
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }
}
