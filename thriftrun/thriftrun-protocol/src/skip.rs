//! Skipping values of unrecognized fields.

use crate::{Protocol, ProtocolError, WireType};

/// Consume exactly the bytes of one value of the given wire type.
///
/// Nested structs and containers are skipped recursively, bounded by the
/// protocol's recursion-depth limit.
pub fn skip<P: Protocol + ?Sized>(proto: &mut P, wire_type: WireType) -> Result<(), ProtocolError> {
    let depth = proto.limits().recursion_depth;
    skip_depth(proto, wire_type, depth)
}

pub(crate) fn skip_depth<P: Protocol + ?Sized>(
    proto: &mut P,
    wire_type: WireType,
    depth: usize,
) -> Result<(), ProtocolError> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit);
    }
    match wire_type {
        WireType::Bool => proto.read_bool().map(drop),
        WireType::I8 => proto.read_i8().map(drop),
        WireType::I16 => proto.read_i16().map(drop),
        WireType::I32 => proto.read_i32().map(drop),
        WireType::I64 => proto.read_i64().map(drop),
        WireType::Double => proto.read_double().map(drop),
        WireType::Binary => proto.read_binary().map(drop),
        WireType::Struct => {
            proto.read_struct_begin()?;
            while let Some((field_type, _)) = proto.read_field_begin()? {
                skip_depth(proto, field_type, depth - 1)?;
                proto.read_field_end()?;
            }
            proto.read_struct_end()
        }
        WireType::Map => {
            let (key_type, value_type, size) = proto.read_map_begin()?;
            for _ in 0..size {
                skip_depth(proto, key_type, depth - 1)?;
                skip_depth(proto, value_type, depth - 1)?;
            }
            proto.read_map_end()
        }
        WireType::Set => {
            let (elem_type, size) = proto.read_set_begin()?;
            for _ in 0..size {
                skip_depth(proto, elem_type, depth - 1)?;
            }
            proto.read_set_end()
        }
        WireType::List => {
            let (elem_type, size) = proto.read_list_begin()?;
            for _ in 0..size {
                skip_depth(proto, elem_type, depth - 1)?;
            }
            proto.read_list_end()
        }
    }
}
