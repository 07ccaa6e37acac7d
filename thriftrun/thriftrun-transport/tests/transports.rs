use thriftrun_transport::{
    BufferedTransport, FramedTransport, MemoryTransport, Transport, TransportError,
};

// ── helpers ──────────────────────────────────────────────────────────────────

/// Frame `payload` the way FramedTransport emits it on flush.
fn framed_bytes(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

fn read_to_end(t: &mut impl Transport) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chunk = [0u8; 16];
    loop {
        let n = t.read(&mut chunk).expect("read should succeed");
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
    }
    out
}

// ── memory ───────────────────────────────────────────────────────────────────

#[test]
fn memory_transport_acts_as_tape() {
    let mut t = MemoryTransport::new();
    t.write(b"hello ").expect("write should succeed");
    t.write(b"world").expect("write should succeed");
    t.flush().expect("flush should succeed");

    assert_eq!(read_to_end(&mut t), b"hello world");

    // Tape is consumed; further reads see EOF until new writes arrive.
    let mut buf = [0u8; 4];
    assert_eq!(t.read(&mut buf).expect("read should succeed"), 0);
    t.write(b"more").expect("write should succeed");
    assert_eq!(read_to_end(&mut t), b"more");
}

#[test]
fn memory_transport_rejects_use_after_close() {
    let mut t = MemoryTransport::new();
    t.close().expect("close should succeed");
    assert!(!t.is_open());
    let err = t.write(b"x").expect_err("write after close should fail");
    assert!(matches!(err, TransportError::Closed));
}

// ── buffered ─────────────────────────────────────────────────────────────────

#[test]
fn buffered_transport_holds_writes_until_flush() {
    let mut t = BufferedTransport::with_capacity(MemoryTransport::new(), 64);
    t.write(b"abc").expect("write should succeed");

    // Nothing reaches the inner transport before flush.
    let inner_before = t.into_inner();
    assert!(inner_before.pending().is_empty());

    let mut t = BufferedTransport::with_capacity(MemoryTransport::new(), 64);
    t.write(b"abc").expect("write should succeed");
    t.flush().expect("flush should succeed");
    assert_eq!(t.into_inner().take_bytes(), b"abc");
}

#[test]
fn buffered_transport_flushes_on_overflow() {
    let mut t = BufferedTransport::with_capacity(MemoryTransport::new(), 4);
    t.write(b"abcdef").expect("write should succeed");
    // Capacity 4 exceeded, so the write buffer drained without an explicit flush.
    assert_eq!(t.into_inner().take_bytes(), b"abcdef");
}

#[test]
fn buffered_transport_reads_through_small_buffer() {
    let inner = MemoryTransport::from_bytes(b"the quick brown fox");
    let mut t = BufferedTransport::with_capacity(inner, 4);
    assert_eq!(read_to_end(&mut t), b"the quick brown fox");
}

// ── framed ───────────────────────────────────────────────────────────────────

#[test]
fn framed_transport_round_trips_a_payload() {
    let mut t = FramedTransport::new(MemoryTransport::new());
    t.write(b"payload").expect("write should succeed");
    t.flush().expect("flush should succeed");

    assert_eq!(read_to_end(&mut t), b"payload");
}

#[test]
fn framed_transport_emits_length_prefix_on_flush() {
    let mut t = FramedTransport::new(MemoryTransport::new());
    t.write(b"abc").expect("write should succeed");
    t.flush().expect("flush should succeed");
    assert_eq!(t.into_inner().take_bytes(), framed_bytes(b"abc"));
}

#[test]
fn framed_transport_flush_is_idempotent() {
    let mut t = FramedTransport::new(MemoryTransport::new());
    t.write(b"x").expect("write should succeed");
    t.flush().expect("flush should succeed");
    t.flush().expect("second flush should succeed");
    // The empty second flush must not emit a zero-length frame.
    assert_eq!(t.into_inner().take_bytes(), framed_bytes(b"x"));
}

#[test]
fn framed_transport_rejects_oversized_frame() {
    let inner = MemoryTransport::from_bytes(&framed_bytes(&[0u8; 32]));
    let mut t = FramedTransport::with_max_frame_size(inner, 16);
    let mut buf = [0u8; 1];
    let err = t.read(&mut buf).expect_err("read should fail");
    assert!(matches!(
        err,
        TransportError::FrameTooLarge {
            length: 32,
            limit: 16
        }
    ));
}

#[test]
fn framed_transport_reports_truncated_frame() {
    let mut bytes = framed_bytes(b"full payload");
    bytes.truncate(bytes.len() - 4);
    let mut t = FramedTransport::new(MemoryTransport::from_bytes(&bytes));
    let mut buf = [0u8; 1];
    let err = t.read(&mut buf).expect_err("read should fail");
    assert!(matches!(err, TransportError::FrameTruncated { .. }));
}

#[test]
fn framed_transport_reads_multiple_frames_in_order() {
    let mut bytes = framed_bytes(b"one");
    bytes.extend_from_slice(&framed_bytes(b"two"));
    let mut t = FramedTransport::new(MemoryTransport::from_bytes(&bytes));
    assert_eq!(read_to_end(&mut t), b"onetwo");
}
