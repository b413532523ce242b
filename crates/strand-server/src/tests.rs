//! Unit tests for strand-server
//!
//! Handler dispatch tests against a real log, plus a full client↔server
//! round trip over TCP.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use strand_client::{Client, ClientConfig};
use strand_log::{CommitLog, Log, LogConfig, LogError, LogResult};
use strand_types::Record;
use strand_wire::{
    ConsumeRequest, ErrorCode, ProduceRequest, Request, RequestId, RequestPayload, ResponsePayload,
};

use crate::{RequestHandler, Server, ServerConfig};

fn test_handler() -> (RequestHandler, TempDir) {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(Log::open(dir.path(), LogConfig::default()).unwrap());
    (RequestHandler::new(log), dir)
}

fn produce(value: &[u8]) -> Request {
    Request::new(
        RequestId::new(1),
        RequestPayload::Produce(ProduceRequest {
            value: value.to_vec(),
        }),
    )
}

fn consume(offset: u64) -> Request {
    Request::new(
        RequestId::new(2),
        RequestPayload::Consume(ConsumeRequest { offset }),
    )
}

// ============================================================================
// Handler Tests
// ============================================================================

#[test]
fn handler_produces_then_consumes() {
    let (handler, _dir) = test_handler();

    let response = handler.dispatch(produce(b"hello world"));
    let offset = match response.payload {
        ResponsePayload::Produce(p) => p.offset,
        other => panic!("expected produce response, got {other:?}"),
    };
    assert_eq!(offset, 0);

    let response = handler.dispatch(consume(offset));
    match response.payload {
        ResponsePayload::Consume(c) => {
            assert_eq!(c.offset, 0);
            assert_eq!(c.value, b"hello world");
        }
        other => panic!("expected consume response, got {other:?}"),
    }
}

#[test]
fn handler_maps_out_of_range_to_its_own_code() {
    let (handler, _dir) = test_handler();

    let response = handler.dispatch(consume(1));
    match response.payload {
        ResponsePayload::Error(e) => assert_eq!(e.code, ErrorCode::OffsetOutOfRange),
        other => panic!("expected error response, got {other:?}"),
    }
}

#[test]
fn handler_echoes_request_id() {
    let (handler, _dir) = test_handler();

    let request = Request::new(
        RequestId::new(99),
        RequestPayload::Produce(ProduceRequest {
            value: b"x".to_vec(),
        }),
    );
    let response = handler.dispatch(request);
    assert_eq!(response.request_id, RequestId::new(99));
}

/// A log whose appends always fail; exercises the injection seam.
#[derive(Debug)]
struct FailingLog;

impl CommitLog for FailingLog {
    fn append(&self, _record: Record) -> LogResult<u64> {
        Err(LogError::Io(io::Error::other("disk unavailable")))
    }

    fn read(&self, offset: u64) -> LogResult<Record> {
        Err(LogError::OffsetOutOfRange { offset })
    }
}

#[test]
fn handler_maps_io_failures_to_storage_code() {
    let handler = RequestHandler::new(Arc::new(FailingLog));

    let response = handler.dispatch(produce(b"hello"));
    match response.payload {
        ResponsePayload::Error(e) => assert_eq!(e.code, ErrorCode::Storage),
        other => panic!("expected error response, got {other:?}"),
    }
}

// ============================================================================
// End-to-End Tests
// ============================================================================

fn spawn_server(dir: &TempDir) -> SocketAddr {
    let log = Arc::new(Log::open(dir.path(), LogConfig::default()).unwrap());
    let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let config = ServerConfig::new(bind, dir.path());

    let mut server = Server::new(config, log).unwrap();
    let addr = server.local_addr();
    thread::spawn(move || {
        let _ = server.run();
    });

    addr
}

#[test]
fn produce_and_consume_over_tcp() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(&dir);

    let mut client = Client::connect(addr, ClientConfig::default()).unwrap();

    for i in 0..3u64 {
        let offset = client.produce(format!("record-{i}").into_bytes()).unwrap();
        assert_eq!(offset, i);
    }

    for i in 0..3u64 {
        let record = client.consume(i).unwrap();
        assert_eq!(record.offset, i);
        assert_eq!(record.value, format!("record-{i}").into_bytes());
    }
}

#[test]
fn consume_past_tail_is_pollable() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(&dir);

    let mut client = Client::connect(addr, ClientConfig::default()).unwrap();

    let err = client.consume(0).unwrap_err();
    assert!(err.is_offset_out_of_range());

    // A tail consumer retries after the producer catches up.
    client.produce(b"caught up".to_vec()).unwrap();
    let record = client.consume(0).unwrap();
    assert_eq!(record.value, b"caught up");
}

#[test]
fn two_clients_share_one_log() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(&dir);

    let mut producer = Client::connect(addr, ClientConfig::default()).unwrap();
    let mut consumer = Client::connect(addr, ClientConfig::default()).unwrap();

    let offset = producer.produce(b"shared".to_vec()).unwrap();
    let record = consumer.consume(offset).unwrap();
    assert_eq!(record.value, b"shared");
}
