use std::sync::{Arc, Mutex};

use thriftrun_core::{Schema, StructValue, Value};
use thriftrun_protocol::{BinaryProtocol, MessageType, Protocol, codec};
use thriftrun_rpc::{
    ApplicationErrorKind, Client, HandlerError, Processor, RpcError,
};
use thriftrun_transport::MemoryTransport;

// ── helpers ──────────────────────────────────────────────────────────────────

const SERVICE: &str = "addressbook.AddressBookService";

fn addressbook() -> Arc<Schema> {
    Arc::new(
        thriftrun_idl::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../thriftrun-idl/tests/fixtures/addressbook.thrift"
        ))
        .expect("fixture should load"),
    )
}

fn make_processor(schema: &Arc<Schema>) -> Processor {
    let mut processor = Processor::new(Arc::clone(schema), SERVICE).expect("service should exist");
    processor
        .handle("ping", |_| Ok(Value::Bool(true)))
        .expect("ping should register");

    processor
        .handle("hello", |args| {
            let name = args.get_by_name("name").and_then(Value::as_str).unwrap_or("");
            Ok(Value::string(format!("hello {name}")))
        })
        .expect("hello should register");

    let remove_schema = Arc::clone(schema);
    processor
        .handle("remove", move |_| {
            let def = remove_schema
                .struct_def("addressbook.PersonNotExistsError")
                .expect("exception def");
            let mut error = StructValue::new(Arc::clone(def));
            error.set(1, Value::string("Person Not Exists!"));
            Err(HandlerError::Declared(error))
        })
        .expect("remove should register");

    processor
        .handle("book", |_| Err(HandlerError::Internal("store offline".to_string())))
        .expect("book should register");

    processor
}

/// Encode one client call, run it through the processor, and return the
/// reply bytes plus the seqid the client chose.
fn run_call(
    schema: &Arc<Schema>,
    processor: &Processor,
    method: &str,
    fill: impl FnOnce(&mut StructValue),
) -> (Vec<u8>, i32) {
    let mut client = Client::new(
        Arc::clone(schema),
        SERVICE,
        BinaryProtocol::new(MemoryTransport::new()),
    )
    .expect("client should build");
    let mut args = client.args(method).expect("args should build");
    fill(&mut args);
    let seqid = client.send(method, args).expect("send should succeed");
    let call_bytes = client.into_protocol().into_inner().take_bytes();

    let mut input = BinaryProtocol::new(MemoryTransport::from_bytes(&call_bytes));
    let mut output = BinaryProtocol::new(MemoryTransport::new());
    let more = processor
        .process(&mut input, &mut output)
        .expect("process should succeed");
    assert!(more);
    (output.into_inner().take_bytes(), seqid)
}

fn recv(
    schema: &Arc<Schema>,
    method: &str,
    seqid: i32,
    reply_bytes: &[u8],
) -> Result<Option<Value>, RpcError> {
    let mut client = Client::new(
        Arc::clone(schema),
        SERVICE,
        BinaryProtocol::new(MemoryTransport::from_bytes(reply_bytes)),
    )
    .expect("client should build");
    client.recv(method, seqid)
}

// ── scenarios ────────────────────────────────────────────────────────────────

#[test]
fn ping_returns_success_value() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let (reply, seqid) = run_call(&schema, &processor, "ping", |_| {});
    let value = recv(&schema, "ping", seqid, &reply).expect("recv should succeed");
    assert_eq!(value, Some(Value::Bool(true)));
}

#[test]
fn hello_echoes_its_argument() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let (reply, seqid) = run_call(&schema, &processor, "hello", |args| {
        args.set_by_name("name", Value::string("ada"));
    });
    let value = recv(&schema, "hello", seqid, &reply).expect("recv should succeed");
    assert_eq!(value, Some(Value::string("hello ada")));
}

#[test]
fn declared_exception_reaches_the_client_typed() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let (reply, seqid) = run_call(&schema, &processor, "remove", |args| {
        args.set_by_name("name", Value::string("bob"));
    });

    let err = recv(&schema, "remove", seqid, &reply).expect_err("recv should fail");
    let RpcError::Declared(thrown) = err else {
        panic!("expected a declared exception, got {err:?}");
    };
    assert_eq!(thrown.def().name, "addressbook.PersonNotExistsError");
    assert_eq!(
        thrown.get_by_name("message"),
        Some(&Value::string("Person Not Exists!"))
    );
}

#[test]
fn internal_failures_become_application_errors() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let (reply, seqid) = run_call(&schema, &processor, "book", |_| {});

    let err = recv(&schema, "book", seqid, &reply).expect_err("recv should fail");
    let RpcError::Application(app) = err else {
        panic!("expected an application error, got {err:?}");
    };
    assert_eq!(app.kind, ApplicationErrorKind::InternalError);
    assert!(app.message.contains("store offline"));
}

#[test]
fn unknown_method_gets_unknown_method_error_and_connection_survives() {
    let schema = addressbook();
    let processor = make_processor(&schema);

    // A call for a method no schema declares, followed by a valid ping.
    let mut raw = BinaryProtocol::new(MemoryTransport::new());
    raw.write_message_begin("frobnicate", MessageType::Call, 7)
        .expect("ok");
    raw.write_struct_begin("frobnicate_args").expect("ok");
    raw.write_field_stop().expect("ok");
    raw.write_struct_end().expect("ok");
    raw.write_message_end().expect("ok");

    let mut client = Client::new(
        Arc::clone(&schema),
        SERVICE,
        BinaryProtocol::new(MemoryTransport::new()),
    )
    .expect("client should build");
    let ping_seqid = client.send("ping", client.args("ping").expect("args")).expect("send");
    let mut call_bytes = raw.into_inner().take_bytes();
    call_bytes.extend(client.into_protocol().into_inner().take_bytes());

    let mut input = BinaryProtocol::new(MemoryTransport::from_bytes(&call_bytes));
    let mut output = BinaryProtocol::new(MemoryTransport::new());
    assert!(processor.process(&mut input, &mut output).expect("process"));
    assert!(processor.process(&mut input, &mut output).expect("process"));
    let reply_bytes = output.into_inner().take_bytes();

    // First reply: REPLY carrying UNKNOWN_METHOD, echoing seqid 7.
    let mut reply = BinaryProtocol::new(MemoryTransport::from_bytes(&reply_bytes));
    let (name, message_type, seqid) = reply.read_message_begin().expect("read");
    assert_eq!(name, "frobnicate");
    assert_eq!(message_type, MessageType::Reply);
    assert_eq!(seqid, 7);
    let app = thriftrun_rpc::ApplicationError::read(&mut reply).expect("app error should decode");
    assert_eq!(app.kind, ApplicationErrorKind::UnknownMethod);
    reply.read_message_end().expect("ok");

    // Second reply: the ping still succeeded on the same connection.
    let (name, message_type, seqid) = reply.read_message_begin().expect("read");
    assert_eq!((name.as_str(), message_type), ("ping", MessageType::Reply));
    assert_eq!(seqid, ping_seqid);
}

#[test]
fn oneway_methods_send_no_reply() {
    let schema = Arc::new(
        thriftrun_idl::load_str(
            "notify",
            "service Notifier { oneway void poke(1: string who) }",
        )
        .expect("load should succeed"),
    );
    let mut processor =
        Processor::new(Arc::clone(&schema), "notify.Notifier").expect("service should exist");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    processor
        .handle("poke", move |args| {
            let who = args.get_by_name("who").and_then(Value::as_str).unwrap_or("").to_string();
            sink.lock().expect("lock").push(who);
            Err(HandlerError::Internal("logged, not returned".to_string()))
        })
        .expect("poke should register");

    let mut client = Client::new(
        Arc::clone(&schema),
        "notify.Notifier",
        BinaryProtocol::new(MemoryTransport::new()),
    )
    .expect("client should build");
    let mut args = client.args("poke").expect("args");
    args.set_by_name("who", Value::string("pat"));
    assert_eq!(client.call("poke", args).expect("call should succeed"), None);
    let call_bytes = client.into_protocol().into_inner().take_bytes();

    let mut input = BinaryProtocol::new(MemoryTransport::from_bytes(&call_bytes));
    let mut output = BinaryProtocol::new(MemoryTransport::new());
    assert!(processor.process(&mut input, &mut output).expect("process"));

    // Handler ran, its failure was swallowed, and nothing was written back.
    assert_eq!(seen.lock().expect("lock").as_slice(), ["pat"]);
    assert!(output.into_inner().take_bytes().is_empty());
}

#[test]
fn serve_drains_the_connection_until_eof() {
    let schema = addressbook();
    let processor = make_processor(&schema);

    let mut client = Client::new(
        Arc::clone(&schema),
        SERVICE,
        BinaryProtocol::new(MemoryTransport::new()),
    )
    .expect("client should build");
    client.send("ping", client.args("ping").expect("args")).expect("send");
    client.send("ping", client.args("ping").expect("args")).expect("send");
    let call_bytes = client.into_protocol().into_inner().take_bytes();

    let mut input = BinaryProtocol::new(MemoryTransport::from_bytes(&call_bytes));
    let mut output = BinaryProtocol::new(MemoryTransport::new());
    processor.serve(&mut input, &mut output).expect("serve should succeed");

    let mut reply = BinaryProtocol::new(MemoryTransport::from_bytes(
        &output.into_inner().take_bytes(),
    ));
    for _ in 0..2 {
        let (_, message_type, _) = reply.read_message_begin().expect("read");
        assert_eq!(message_type, MessageType::Reply);
        thriftrun_protocol::skip(&mut reply, thriftrun_protocol::WireType::Struct).expect("skip");
        reply.read_message_end().expect("ok");
    }
}

#[test]
fn non_call_messages_are_rejected_as_invalid() {
    let schema = addressbook();
    let processor = make_processor(&schema);

    let mut raw = BinaryProtocol::new(MemoryTransport::new());
    raw.write_message_begin("ping", MessageType::Reply, 3).expect("ok");
    raw.write_struct_begin("ping_result").expect("ok");
    raw.write_field_stop().expect("ok");
    raw.write_struct_end().expect("ok");
    raw.write_message_end().expect("ok");
    let bytes = raw.into_inner().take_bytes();

    let mut input = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let mut output = BinaryProtocol::new(MemoryTransport::new());
    assert!(processor.process(&mut input, &mut output).expect("process"));

    let mut reply = BinaryProtocol::new(MemoryTransport::from_bytes(
        &output.into_inner().take_bytes(),
    ));
    let (_, message_type, seqid) = reply.read_message_begin().expect("read");
    assert_eq!(message_type, MessageType::Reply);
    assert_eq!(seqid, 3);
    let app = thriftrun_rpc::ApplicationError::read(&mut reply).expect("decode");
    assert_eq!(app.kind, ApplicationErrorKind::InvalidMessageType);
}

#[test]
fn client_rejects_mismatched_seqid() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let (reply, seqid) = run_call(&schema, &processor, "ping", |_| {});

    let err = recv(&schema, "ping", seqid + 1, &reply).expect_err("recv should fail");
    let RpcError::Application(app) = err else {
        panic!("expected an application error, got {err:?}");
    };
    assert_eq!(app.kind, ApplicationErrorKind::BadSequenceId);
}

#[test]
fn args_struct_exposes_declared_fields() {
    let schema = addressbook();
    let processor = make_processor(&schema);
    let args = processor.args_for("get_phonenumbers").expect("args should build");
    assert!(args.def().field_by_name("name").is_some());
    assert!(args.def().field_by_name("count").is_some());

    // codec sanity: args encode and decode like any struct.
    let mut filled = args;
    filled.set_by_name("name", Value::string("x"));
    filled.set_by_name("count", Value::I32(3));
    let mut proto = BinaryProtocol::new(MemoryTransport::new());
    codec::write_struct(&mut proto, &schema, &filled).expect("encode");
    let bytes = proto.into_inner().take_bytes();
    let mut proto = BinaryProtocol::new(MemoryTransport::from_bytes(&bytes));
    let decoded = codec::read_struct(&mut proto, &schema, filled.def()).expect("decode");
    assert_eq!(decoded, filled);
}
