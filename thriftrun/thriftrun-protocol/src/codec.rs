//! Schema-driven encoding and decoding of dynamic values.
//!
//! This is the bridge between the abstract [`Protocol`] operations and the
//! [`Schema`]: values are written field by field against their
//! [`StructDef`], and decoding walks the wire driven by the declared types,
//! skipping unknown field ids and enforcing requiredness.

use std::sync::Arc;

use thriftrun_core::{Requiredness, Schema, StructDef, StructKind, TypeRef, Value};

use crate::{Protocol, ProtocolError, WireType, skip::skip_depth};

/// The wire type a logical type travels as. Typedefs are invisible and
/// enums travel as `i32`.
pub fn wire_type_of(schema: &Schema, ty: &TypeRef) -> WireType {
    match schema.true_type(ty) {
        TypeRef::Bool => WireType::Bool,
        TypeRef::I8 => WireType::I8,
        TypeRef::I16 => WireType::I16,
        TypeRef::I32 | TypeRef::Enum(_) => WireType::I32,
        TypeRef::I64 => WireType::I64,
        TypeRef::Double => WireType::Double,
        TypeRef::String | TypeRef::Binary => WireType::Binary,
        TypeRef::List(_) => WireType::List,
        TypeRef::Set(_) => WireType::Set,
        TypeRef::Map { .. } => WireType::Map,
        TypeRef::Struct(_) => WireType::Struct,
        // The resolver rejects dangling aliases before a schema exists.
        TypeRef::Typedef(name) => panic!("unresolved typedef '{name}' in schema"),
    }
}

/// Encode a struct value. Required-but-unset fields fall back to their
/// declared default, or fail; unset optional fields are not encoded.
pub fn write_struct<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    value: &thriftrun_core::StructValue,
) -> Result<(), ProtocolError> {
    let depth = proto.limits().recursion_depth;
    write_struct_depth(proto, schema, value, depth)
}

fn write_struct_depth<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    value: &thriftrun_core::StructValue,
    depth: usize,
) -> Result<(), ProtocolError> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit);
    }
    let def = value.def();
    if def.kind == StructKind::Union && value.set_field_count() > 1 {
        return Err(ProtocolError::UnionCardinality {
            strukt: def.name.clone(),
            count: value.set_field_count(),
        });
    }

    proto.write_struct_begin(def.short_name())?;
    for field in &def.fields {
        let present = value.get(field.id);
        let to_write = match (present, field.requiredness) {
            (Some(v), _) => Some(v),
            (None, Requiredness::Required) => match &field.default {
                Some(default) => Some(default),
                None => {
                    return Err(ProtocolError::RequiredFieldMissing {
                        strukt: def.name.clone(),
                        field_id: field.id,
                    });
                }
            },
            (None, _) => None,
        };
        let Some(v) = to_write else { continue };

        let wire = wire_type_of(schema, &field.ty);
        proto.write_field_begin(&field.name, wire, field.id)?;
        write_value_depth(proto, schema, &field.ty, v, depth - 1)?;
        proto.write_field_end()?;
    }
    proto.write_field_stop()?;
    proto.write_struct_end()
}

/// Encode one value against its declared type.
pub fn write_value<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    ty: &TypeRef,
    value: &Value,
) -> Result<(), ProtocolError> {
    let depth = proto.limits().recursion_depth;
    write_value_depth(proto, schema, ty, value, depth)
}

fn write_value_depth<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    ty: &TypeRef,
    value: &Value,
    depth: usize,
) -> Result<(), ProtocolError> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit);
    }
    let ty = schema.true_type(ty);
    let mismatch = || ProtocolError::unexpected(ty.type_name(), value_kind(value));

    match (ty, value) {
        (TypeRef::Bool, Value::Bool(v)) => proto.write_bool(*v),
        (TypeRef::I8, Value::I8(v)) => proto.write_i8(*v),
        (TypeRef::I16, Value::I16(v)) => proto.write_i16(*v),
        (TypeRef::I32 | TypeRef::Enum(_), Value::I32(v)) => proto.write_i32(*v),
        (TypeRef::I64, Value::I64(v)) => proto.write_i64(*v),
        (TypeRef::Double, Value::Double(v)) => proto.write_double(*v),
        (TypeRef::String, Value::String(v)) => proto.write_string(v),
        (TypeRef::Binary, Value::Binary(v)) => proto.write_binary(v),
        (TypeRef::List(elem), Value::List(items)) => {
            proto.write_list_begin(wire_type_of(schema, elem), items.len())?;
            for item in items {
                write_value_depth(proto, schema, elem, item, depth - 1)?;
            }
            proto.write_list_end()
        }
        (TypeRef::Set(elem), Value::Set(items)) => {
            proto.write_set_begin(wire_type_of(schema, elem), items.len())?;
            for item in items {
                write_value_depth(proto, schema, elem, item, depth - 1)?;
            }
            proto.write_set_end()
        }
        (TypeRef::Map { key, value: val }, Value::Map(entries)) => {
            proto.write_map_begin(
                wire_type_of(schema, key),
                wire_type_of(schema, val),
                entries.len(),
            )?;
            for (k, v) in entries {
                write_value_depth(proto, schema, key, k, depth - 1)?;
                write_value_depth(proto, schema, val, v, depth - 1)?;
            }
            proto.write_map_end()
        }
        (TypeRef::Struct(name), Value::Struct(sv)) => {
            if sv.def().name != *name {
                return Err(mismatch());
            }
            write_struct_depth(proto, schema, sv, depth)
        }
        _ => Err(mismatch()),
    }
}

/// Decode one struct against its definition.
///
/// Fields may arrive in any order; unknown ids (and known ids carrying an
/// unexpected wire type) are skipped. Missing required fields fail after
/// the stop marker is seen.
pub fn read_struct<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    def: &Arc<StructDef>,
) -> Result<thriftrun_core::StructValue, ProtocolError> {
    let depth = proto.limits().recursion_depth;
    read_struct_depth(proto, schema, def, depth)
}

fn read_struct_depth<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    def: &Arc<StructDef>,
    depth: usize,
) -> Result<thriftrun_core::StructValue, ProtocolError> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit);
    }
    proto.read_struct_begin()?;
    let mut out = thriftrun_core::StructValue::new(Arc::clone(def));

    while let Some((wire, id)) = proto.read_field_begin()? {
        match def.field_by_id(id) {
            Some(field) if wire_type_of(schema, &field.ty) == wire => {
                let value = read_value_depth(proto, schema, &field.ty, depth - 1)?;
                out.set(id, value);
            }
            _ => skip_depth(proto, wire, depth - 1)?,
        }
        proto.read_field_end()?;
    }
    proto.read_struct_end()?;

    for field in &def.fields {
        if field.requiredness == Requiredness::Required && !out.is_set(field.id) {
            return Err(ProtocolError::RequiredFieldMissing {
                strukt: def.name.clone(),
                field_id: field.id,
            });
        }
    }
    Ok(out)
}

/// Decode one value of the declared type.
pub fn read_value<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    ty: &TypeRef,
) -> Result<Value, ProtocolError> {
    let depth = proto.limits().recursion_depth;
    read_value_depth(proto, schema, ty, depth)
}

fn read_value_depth<P: Protocol + ?Sized>(
    proto: &mut P,
    schema: &Schema,
    ty: &TypeRef,
    depth: usize,
) -> Result<Value, ProtocolError> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit);
    }
    match schema.true_type(ty) {
        TypeRef::Bool => proto.read_bool().map(Value::Bool),
        TypeRef::I8 => proto.read_i8().map(Value::I8),
        TypeRef::I16 => proto.read_i16().map(Value::I16),
        // Unknown enum numbers round-trip untouched.
        TypeRef::I32 | TypeRef::Enum(_) => proto.read_i32().map(Value::I32),
        TypeRef::I64 => proto.read_i64().map(Value::I64),
        TypeRef::Double => proto.read_double().map(Value::Double),
        TypeRef::String => proto.read_string().map(Value::string),
        TypeRef::Binary => proto.read_binary().map(|b| Value::binary(&b)),
        TypeRef::List(elem) => {
            let (wire, size) = proto.read_list_begin()?;
            check_elem_type(schema, elem, wire)?;
            let mut items = Vec::with_capacity(size.min(1024));
            for _ in 0..size {
                items.push(read_value_depth(proto, schema, elem, depth - 1)?);
            }
            proto.read_list_end()?;
            Ok(Value::List(items))
        }
        TypeRef::Set(elem) => {
            let (wire, size) = proto.read_set_begin()?;
            check_elem_type(schema, elem, wire)?;
            let mut items = Vec::with_capacity(size.min(1024));
            for _ in 0..size {
                items.push(read_value_depth(proto, schema, elem, depth - 1)?);
            }
            proto.read_set_end()?;
            Ok(Value::Set(items))
        }
        TypeRef::Map { key, value } => {
            let (key_wire, value_wire, size) = proto.read_map_begin()?;
            if size > 0 {
                check_elem_type(schema, key, key_wire)?;
                check_elem_type(schema, value, value_wire)?;
            }
            let mut entries = Vec::with_capacity(size.min(1024));
            for _ in 0..size {
                let k = read_value_depth(proto, schema, key, depth - 1)?;
                let v = read_value_depth(proto, schema, value, depth - 1)?;
                entries.push((k, v));
            }
            proto.read_map_end()?;
            Ok(Value::Map(entries))
        }
        TypeRef::Struct(name) => {
            let def = schema
                .struct_def(name)
                .unwrap_or_else(|| panic!("struct '{name}' missing from schema"));
            let def = Arc::clone(def);
            read_struct_depth(proto, schema, &def, depth).map(Value::Struct)
        }
        TypeRef::Typedef(name) => panic!("unresolved typedef '{name}' in schema"),
    }
}

fn check_elem_type(
    schema: &Schema,
    declared: &TypeRef,
    found: WireType,
) -> Result<(), ProtocolError> {
    let expected = wire_type_of(schema, declared);
    if expected == found {
        return Ok(());
    }
    Err(ProtocolError::unexpected(
        expected.describe(),
        found.describe(),
    ))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::I8(_) => "i8",
        Value::I16(_) => "i16",
        Value::I32(_) => "i32",
        Value::I64(_) => "i64",
        Value::Double(_) => "double",
        Value::String(_) => "string",
        Value::Binary(_) => "binary",
        Value::List(_) => "list",
        Value::Set(_) => "set",
        Value::Map(_) => "map",
        Value::Struct(_) => "struct",
    }
}
