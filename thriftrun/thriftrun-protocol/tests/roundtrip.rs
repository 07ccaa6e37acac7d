//! Cross-protocol properties: every protocol round-trips the same logical
//! value, and the three byte encodings decode to the same thing.

use std::sync::Arc;

use thriftrun_core::{Schema, StructValue, Value};
use thriftrun_protocol::{BinaryProtocol, CompactProtocol, JsonProtocol, codec};
use thriftrun_transport::MemoryTransport;

// ── helpers ──────────────────────────────────────────────────────────────────

const KITCHEN_SINK: &str = "
enum Mood { GOOD = 1, BAD = 2 }
union Shape {
    1: i32 circle_radius,
    2: string label,
}
struct Everything {
    1: bool flag,
    2: byte tiny,
    3: i16 small,
    4: i32 medium,
    5: i64 large,
    6: double ratio,
    7: string text,
    8: binary blob,
    9: list<i32> numbers,
    10: set<string> tags,
    11: map<string, list<i32>> index,
    12: Mood mood,
    13: optional Shape shape,
    14: list<Everything> children,
}
";

fn kitchen_sink_schema() -> Schema {
    thriftrun_idl::load_str("sink", KITCHEN_SINK).expect("schema should load")
}

fn sample(schema: &Schema, with_child: bool) -> StructValue {
    let def = schema.struct_def("sink.Everything").expect("def");
    let mut v = StructValue::new(Arc::clone(def));
    v.set(1, Value::Bool(true));
    v.set(2, Value::I8(-7));
    v.set(3, Value::I16(-3000));
    v.set(4, Value::I32(123_456));
    v.set(5, Value::I64(-9_876_543_210));
    v.set(6, Value::Double(0.25));
    v.set(7, Value::string("héllo"));
    v.set(8, Value::binary([0u8, 159, 146, 150]));
    v.set(9, Value::List(vec![Value::I32(1), Value::I32(-2), Value::I32(3)]));
    v.set(
        10,
        Value::Set(vec![Value::string("a"), Value::string("b")]),
    );
    v.set(
        11,
        Value::Map(vec![(
            Value::string("k"),
            Value::List(vec![Value::I32(9)]),
        )]),
    );
    v.set(12, Value::I32(2));

    let shape_def = schema.struct_def("sink.Shape").expect("def");
    let mut shape = StructValue::new(Arc::clone(shape_def));
    shape.set(2, Value::string("square"));
    v.set(13, Value::Struct(shape));

    let children = if with_child {
        vec![Value::Struct(sample(schema, false))]
    } else {
        Vec::new()
    };
    v.set(14, Value::List(children));
    v
}

fn roundtrip_binary(schema: &Schema, value: &StructValue) -> StructValue {
    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, schema, value).expect("encode should succeed");
    let bytes = proto.into_inner().take_bytes();
    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    codec::read_struct(&mut proto, schema, value.def()).expect("decode should succeed")
}

fn roundtrip_compact(schema: &Schema, value: &StructValue) -> StructValue {
    let mut proto = CompactProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, schema, value).expect("encode should succeed");
    let bytes = proto.into_inner().take_bytes();
    let mut proto = CompactProtocol::new(MemoryTransport::from_bytes(&bytes));
    codec::read_struct(&mut proto, schema, value.def()).expect("decode should succeed")
}

fn roundtrip_json(schema: &Schema, value: &StructValue) -> StructValue {
    let mut proto = JsonProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, schema, value).expect("encode should succeed");
    let bytes = proto.into_inner().take_bytes();
    let mut proto = JsonProtocol::new(MemoryTransport::from_bytes(&bytes));
    codec::read_struct(&mut proto, schema, value.def()).expect("decode should succeed")
}

// ── properties ───────────────────────────────────────────────────────────────

#[test]
fn every_protocol_round_trips_the_kitchen_sink() {
    let schema = kitchen_sink_schema();
    let value = sample(&schema, true);

    assert_eq!(roundtrip_binary(&schema, &value), value);
    assert_eq!(roundtrip_compact(&schema, &value), value);
    assert_eq!(roundtrip_json(&schema, &value), value);
}

#[test]
fn protocols_agree_on_the_logical_value() {
    let schema = kitchen_sink_schema();
    let value = sample(&schema, true);

    let via_binary = roundtrip_binary(&schema, &value);
    let via_compact = roundtrip_compact(&schema, &value);
    let via_json = roundtrip_json(&schema, &value);
    assert_eq!(via_binary, via_compact);
    assert_eq!(via_compact, via_json);
}

#[test]
fn unions_carry_at_most_one_field() {
    let schema = kitchen_sink_schema();
    let shape_def = schema.struct_def("sink.Shape").expect("def");
    let mut shape = StructValue::new(Arc::clone(shape_def));
    shape.set(1, Value::I32(10));
    // Setting the second arm displaces the first.
    shape.set(2, Value::string("circle"));
    assert_eq!(shape.set_field_count(), 1);

    let decoded = roundtrip_compact(&schema, &shape);
    assert!(decoded.get(1).is_none());
    assert_eq!(decoded.get(2), Some(&Value::string("circle")));
}

#[test]
fn empty_struct_round_trips_everywhere() {
    let schema = thriftrun_idl::load_str("e", "struct Empty {}").expect("load should succeed");
    let def = schema.struct_def("e.Empty").expect("def");
    let value = StructValue::new(Arc::clone(def));

    assert_eq!(roundtrip_binary(&schema, &value), value);
    assert_eq!(roundtrip_compact(&schema, &value), value);
    assert_eq!(roundtrip_json(&schema, &value), value);
}
