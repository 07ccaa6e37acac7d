use std::sync::Arc;

use thriftrun_core::{Limits, Schema, StructValue, Value};
use thriftrun_protocol::{BinaryProtocol, Protocol, ProtocolError, WireType, codec};
use thriftrun_transport::MemoryTransport;

// ── helpers ──────────────────────────────────────────────────────────────────

fn addressbook() -> Schema {
    thriftrun_idl::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../thriftrun-idl/tests/fixtures/addressbook.thrift"
    ))
    .expect("fixture should load")
}

/// The Person from the wire-format example: one WORK phone, a created_at.
fn alice(schema: &Schema) -> StructValue {
    let phone_def = schema.struct_def("addressbook.PhoneNumber").expect("def");
    let mut phone = StructValue::new(Arc::clone(phone_def));
    phone.set(1, Value::I32(2)); // WORK
    phone.set(2, Value::string("555"));

    let person_def = schema.struct_def("addressbook.Person").expect("def");
    let mut person = StructValue::new(Arc::clone(person_def));
    person.set(1, Value::string("Alice"));
    person.set(2, Value::List(vec![Value::Struct(phone)]));
    person.set(3, Value::I32(1_700_000_000));
    person
}

fn encode(schema: &Schema, value: &StructValue) -> Vec<u8> {
    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, schema, value).expect("encode should succeed");
    proto.into_inner().take_bytes()
}

// ── wire format ──────────────────────────────────────────────────────────────

#[test]
fn person_encoding_starts_with_name_field() {
    let schema = addressbook();
    let bytes = encode(&schema, &alice(&schema));
    // Field 1, string wire type, length 5, "Alice".
    assert_eq!(
        &bytes[..12],
        &[0x0b, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05, b'A', b'l', b'i', b'c', b'e']
    );
    assert_eq!(*bytes.last().expect("nonempty"), 0x00); // field stop
}

#[test]
fn person_round_trips() {
    let schema = addressbook();
    let original = alice(&schema);
    let bytes = encode(&schema, &original);

    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let def = schema.struct_def("addressbook.Person").expect("def");
    let decoded = codec::read_struct(&mut proto, &schema, def).expect("decode should succeed");
    assert_eq!(decoded, original);
}

#[test]
fn absent_optional_fields_stay_absent() {
    let schema = addressbook();
    let def = schema.struct_def("addressbook.Person").expect("def");
    let mut person = StructValue::new(Arc::clone(def));
    person.set(1, Value::string("Bob"));

    let bytes = encode(&schema, &person);
    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let decoded = codec::read_struct(&mut proto, &schema, def).expect("decode should succeed");
    assert!(decoded.get(2).is_none());
    assert!(decoded.get(3).is_none());
    assert_eq!(decoded, person);
}

#[test]
fn unknown_fields_are_skipped() {
    let schema = addressbook();
    let def = schema.struct_def("addressbook.PhoneNumber").expect("def");

    // A PhoneNumber payload with an interloping field 99 (i64) and a nested
    // unknown struct at field 100.
    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    proto.write_struct_begin("PhoneNumber").expect("ok");
    proto.write_field_begin("type", WireType::I32, 1).expect("ok");
    proto.write_i32(2).expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_begin("extra", WireType::I64, 99).expect("ok");
    proto.write_i64(123_456).expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_begin("nested", WireType::Struct, 100).expect("ok");
    proto.write_struct_begin("Mystery").expect("ok");
    proto.write_field_begin("s", WireType::Binary, 1).expect("ok");
    proto.write_string("ignored").expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_stop().expect("ok");
    proto.write_struct_end().expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_begin("number", WireType::Binary, 2).expect("ok");
    proto.write_string("555").expect("ok");
    proto.write_field_end().expect("ok");
    proto.write_field_stop().expect("ok");
    proto.write_struct_end().expect("ok");
    let bytes = proto.into_inner().take_bytes();

    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let decoded = codec::read_struct(&mut proto, &schema, def).expect("decode should succeed");

    let mut expected = StructValue::new(Arc::clone(def));
    expected.set(1, Value::I32(2));
    expected.set(2, Value::string("555"));
    assert_eq!(decoded, expected);
}

#[test]
fn missing_required_field_is_an_error() {
    let schema = thriftrun_idl::load_str("req", "struct S { 1: required i32 x }")
        .expect("load should succeed");
    let def = schema.struct_def("req.S").expect("def");

    // An empty struct payload: just the stop byte.
    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&[0x00]));
    let err = codec::read_struct(&mut proto, &schema, def).expect_err("decode should fail");
    assert!(matches!(
        err,
        ProtocolError::RequiredFieldMissing { field_id: 1, .. }
    ));
}

#[test]
fn encoding_unset_required_field_is_an_error() {
    let schema = thriftrun_idl::load_str("req", "struct S { 1: required i32 x }")
        .expect("load should succeed");
    let def = schema.struct_def("req.S").expect("def");
    let value = StructValue::new(Arc::clone(def));

    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    let err = codec::write_struct(&mut proto, &schema, &value).expect_err("encode should fail");
    assert!(matches!(
        err,
        ProtocolError::RequiredFieldMissing { field_id: 1, .. }
    ));
}

// ── messages and limits ──────────────────────────────────────────────────────

#[test]
fn strict_message_header_round_trips() {
    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    proto
        .write_message_begin("ping", thriftrun_protocol::MessageType::Call, 42)
        .expect("write should succeed");
    proto.write_message_end().expect("write should succeed");
    let bytes = proto.into_inner().take_bytes();
    assert_eq!(&bytes[..4], &[0x80, 0x01, 0x00, 0x01]);

    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let (name, message_type, seqid) = proto.read_message_begin().expect("read should succeed");
    assert_eq!(name, "ping");
    assert_eq!(message_type, thriftrun_protocol::MessageType::Call);
    assert_eq!(seqid, 42);
}

#[test]
fn strict_read_rejects_unversioned_messages() {
    let limits = Limits {
        strict_write: false,
        ..Limits::default()
    };
    let mut proto = BinaryProtocol::with_limits(MemoryTransport::new(), limits);
    proto
        .write_message_begin("ping", thriftrun_protocol::MessageType::Call, 1)
        .expect("write should succeed");
    let bytes = proto.into_inner().take_bytes();

    let mut strict = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    assert!(matches!(
        strict.read_message_begin(),
        Err(ProtocolError::BadVersion)
    ));

    let lenient = Limits {
        strict_read: false,
        ..Limits::default()
    };
    let mut proto = BinaryProtocol::with_limits(MemoryTransport::from_bytes(&bytes), lenient);
    let (name, _, seqid) = proto.read_message_begin().expect("read should succeed");
    assert_eq!((name.as_str(), seqid), ("ping", 1));
}

#[test]
fn negative_sizes_are_rejected() {
    let bytes = (-1i32).to_be_bytes();
    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    assert!(matches!(
        proto.read_binary(),
        Err(ProtocolError::SizeLimit { size: -1, .. })
    ));
}

#[test]
fn oversized_containers_are_rejected() {
    let limits = Limits {
        container_length: 8,
        ..Limits::default()
    };
    let mut bytes = vec![WireType::I32.as_u8()];
    bytes.extend_from_slice(&100i32.to_be_bytes());
    let mut proto = BinaryProtocol::with_limits(MemoryTransport::from_bytes(&bytes), limits);
    assert!(matches!(
        proto.read_list_begin(),
        Err(ProtocolError::SizeLimit { size: 100, .. })
    ));
}

#[test]
fn deep_nesting_hits_the_depth_limit() {
    let schema = thriftrun_idl::load_str("deep", "struct Node { 1: optional Node next }")
        .expect("load should succeed");
    let def = schema.struct_def("deep.Node").expect("def");

    let mut value = StructValue::new(Arc::clone(def));
    for _ in 0..10 {
        let mut outer = StructValue::new(Arc::clone(def));
        outer.set(1, Value::Struct(value));
        value = outer;
    }

    let limits = Limits {
        recursion_depth: 4,
        ..Limits::default()
    };
    let mut proto = BinaryProtocol::with_limits(MemoryTransport::new(), limits);
    let err = codec::write_struct(&mut proto, &schema, &value).expect_err("encode should fail");
    assert!(matches!(err, ProtocolError::DepthLimit));
}
