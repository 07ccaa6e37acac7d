use std::sync::Arc;

use thriftrun_core::{Schema, StructValue, Value};
use thriftrun_protocol::{CompactProtocol, Protocol, WireType, codec};
use thriftrun_transport::MemoryTransport;

// ── helpers ──────────────────────────────────────────────────────────────────

fn addressbook() -> Schema {
    thriftrun_idl::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../thriftrun-idl/tests/fixtures/addressbook.thrift"
    ))
    .expect("fixture should load")
}

fn phone(schema: &Schema, ty: i32, number: &str) -> StructValue {
    let def = schema.struct_def("addressbook.PhoneNumber").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::I32(ty));
    v.set(2, Value::string(number));
    v
}

fn encode(schema: &Schema, value: &StructValue) -> Vec<u8> {
    let mut proto = CompactProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, schema, value).expect("encode should succeed");
    proto.into_inner().take_bytes()
}

fn decode(schema: &Schema, def_name: &str, bytes: &[u8]) -> StructValue {
    let mut proto = CompactProtocol::new(MemoryTransport::from_bytes(bytes));
    let def = schema.struct_def(def_name).expect("def");
    codec::read_struct(&mut proto, schema, def).expect("decode should succeed")
}

// ── behavior ─────────────────────────────────────────────────────────────────

#[test]
fn phone_number_round_trips() {
    let schema = addressbook();
    let original = phone(&schema, 2, "555");
    let decoded = decode(&schema, "addressbook.PhoneNumber", &encode(&schema, &original));
    assert_eq!(decoded, original);
}

#[test]
fn skips_unknown_field_99() {
    let schema = addressbook();

    let mut proto = CompactProtocol::new(MemoryTransport::new());
    proto.write_struct_begin("PhoneNumber").expect("ok");
    proto.write_field_begin("type", WireType::I32, 1).expect("ok");
    proto.write_i32(2).expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_begin("number", WireType::Binary, 2).expect("ok");
    proto.write_string("555").expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_begin("surprise", WireType::I64, 99).expect("ok");
    proto.write_i64(0x0102_0304_0506).expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_stop().expect("ok");
    proto.write_struct_end().expect("ok");
    let with_extra = proto.into_inner().take_bytes();

    let decoded = decode(&schema, "addressbook.PhoneNumber", &with_extra);
    assert_eq!(decoded, phone(&schema, 2, "555"));
}

#[test]
fn integers_use_zigzag_varints() {
    let schema = thriftrun_idl::load_str(
        "n",
        "struct Nums { 1: i16 a, 2: i32 b, 3: i64 c }",
    )
    .expect("load should succeed");
    let def = schema.struct_def("n.Nums").expect("def");

    for (a, b, c) in [
        (0i16, 0i32, 0i64),
        (-1, -1, -1),
        (i16::MAX, i32::MAX, i64::MAX),
        (i16::MIN, i32::MIN, i64::MIN),
        (63, -64, 1 << 40),
    ] {
        let mut v = StructValue::new(Arc::clone(def));
        v.set(1, Value::I16(a));
        v.set(2, Value::I32(b));
        v.set(3, Value::I64(c));
        let decoded = decode(&schema, "n.Nums", &encode(&schema, &v));
        assert_eq!(decoded, v, "values ({a}, {b}, {c})");
    }
}

#[test]
fn bools_inline_into_the_field_type_nibble() {
    let schema = thriftrun_idl::load_str("b", "struct Flags { 1: bool a, 2: bool b }")
        .expect("load should succeed");
    let def = schema.struct_def("b.Flags").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::Bool(true));
    v.set(2, Value::Bool(false));

    let bytes = encode(&schema, &v);
    // delta-1 | BOOL_TRUE, delta-1 | BOOL_FALSE, stop.
    assert_eq!(bytes, vec![0x11, 0x12, 0x00]);
    assert_eq!(decode(&schema, "b.Flags", &bytes), v);
}

#[test]
fn empty_maps_elide_the_type_byte() {
    let schema = thriftrun_idl::load_str("m", "struct Holder { 1: map<string, i32> m }")
        .expect("load should succeed");
    let def = schema.struct_def("m.Holder").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::Map(vec![]));

    let bytes = encode(&schema, &v);
    // field header (delta 1, MAP), varint size 0, stop.
    assert_eq!(bytes, vec![0x1b, 0x00, 0x00]);
    assert_eq!(decode(&schema, "m.Holder", &bytes), v);
}

#[test]
fn long_lists_overflow_to_varint_sizes() {
    let schema = thriftrun_idl::load_str("l", "struct Holder { 1: list<i32> xs }")
        .expect("load should succeed");
    let def = schema.struct_def("l.Holder").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::List((0..40).map(Value::I32).collect()));

    let bytes = encode(&schema, &v);
    // Header nibble saturates at 15, then the true size follows as a varint.
    assert_eq!(bytes[1], 0xf5);
    assert_eq!(bytes[2], 40);
    assert_eq!(decode(&schema, "l.Holder", &bytes), v);
}

#[test]
fn wide_field_id_gaps_use_explicit_ids() {
    let schema = thriftrun_idl::load_str("g", "struct Gappy { 1: i32 a, 300: i32 b }")
        .expect("load should succeed");
    let def = schema.struct_def("g.Gappy").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::I32(7));
    v.set(300, Value::I32(8));

    assert_eq!(decode(&schema, "g.Gappy", &encode(&schema, &v)), v);
}

#[test]
fn message_header_round_trips() {
    let mut proto = CompactProtocol::new(MemoryTransport::new());
    proto
        .write_message_begin("sleep", thriftrun_protocol::MessageType::Oneway, 9)
        .expect("write should succeed");
    let bytes = proto.into_inner().take_bytes();
    assert_eq!(bytes[0], 0x82);
    assert_eq!(bytes[1], (4 << 5) | 1);

    let mut proto = CompactProtocol::new(MemoryTransport::from_bytes(&bytes));
    let (name, message_type, seqid) = proto.read_message_begin().expect("read should succeed");
    assert_eq!(name, "sleep");
    assert_eq!(message_type, thriftrun_protocol::MessageType::Oneway);
    assert_eq!(seqid, 9);
}

#[test]
fn rejects_wrong_protocol_id() {
    let mut proto = CompactProtocol::new(MemoryTransport::from_bytes(&[0x80, 0x21]));
    assert!(matches!(
        proto.read_message_begin(),
        Err(thriftrun_protocol::ProtocolError::BadVersion)
    ));
}
