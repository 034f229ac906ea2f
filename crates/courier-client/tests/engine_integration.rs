//! Integration tests for the protocol engine.
//!
//! These drive real TCP exchanges against an in-process scripted server
//! that records the bytes it received and replies with a fixed status
//! byte (or stalls, or closes silently) per accepted connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use courier_client::{ConnectionEndpoint, Engine, Outcome, Registration, TransportConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the scripted server does after reading one full request.
#[derive(Clone, Copy)]
enum Reply {
    /// Write this byte, then close.
    Byte(u8),
    /// Keep the connection open without answering.
    Stall,
    /// Close without writing anything.
    Silence,
}

/// One scripted exchange: the number of NUL-terminated fields to expect,
/// then the reply behavior.
struct Exchange {
    fields: usize,
    reply: Reply,
}

impl Exchange {
    fn reply(fields: usize, byte: u8) -> Self {
        Self { fields, reply: Reply::Byte(byte) }
    }
}

/// Start a scripted server handling the given exchanges sequentially.
///
/// Returns the engine pointed at it and a handle yielding the raw bytes
/// received per exchange.
async fn scripted_engine(script: Vec<Exchange>) -> (Engine, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut received = Vec::new();
        for exchange in script {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut chunk = [0u8; 256];
            while request.iter().filter(|b| **b == 0).count() < exchange.fields {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            received.push(request);

            match exchange.reply {
                Reply::Byte(byte) => stream.write_all(&[byte]).await.unwrap(),
                Reply::Stall => {
                    // Hold the socket until the client gives up.
                    let mut probe = [0u8; 1];
                    let _ = stream.read(&mut probe).await;
                },
                Reply::Silence => {},
            }
        }
        received
    });

    let endpoint = ConnectionEndpoint::new("127.0.0.1", port, "localhost", 8080).unwrap();
    let transport = TransportConfig {
        connect_timeout: Duration::from_secs(1),
        response_timeout: Duration::from_millis(200),
    };
    (Engine::with_transport(endpoint, transport), handle)
}

fn bob() -> Registration {
    Registration {
        username: "Bob Smith".to_owned(),
        alias: "bob".to_owned(),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
    }
}

#[tokio::test]
async fn register_sends_documented_frame_and_sets_identity() {
    let (mut engine, server) = scripted_engine(vec![Exchange::reply(4, b'0')]).await;

    let report = engine.register(bob()).await;

    assert_eq!(report.outcome, Outcome::Ok);
    assert_eq!(report.line, "REGISTER OK");
    assert!(!report.timed_out);
    assert_eq!(engine.identity().map(|i| i.alias.as_str()), Some("bob"));

    let received = server.await.unwrap();
    assert_eq!(received[0], b"REGISTER\0Bob Smith\0bob\001/01/2000\0");
}

#[tokio::test]
async fn register_with_taken_alias_leaves_identity_unset() {
    let (mut engine, server) = scripted_engine(vec![Exchange::reply(4, b'1')]).await;

    let report = engine.register(bob()).await;

    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "USERNAME IN USE");
    assert!(engine.identity().is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn undocumented_register_code_is_a_plain_failure() {
    let (mut engine, server) = scripted_engine(vec![Exchange::reply(4, b'7')]).await;

    let report = engine.register(bob()).await;

    assert_eq!(report.outcome, Outcome::Error);
    assert_eq!(report.line, "REGISTER FAIL");
    assert!(engine.identity().is_none());
    server.await.unwrap();
}

#[tokio::test]
async fn invalid_form_is_rejected_without_any_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let touched = Arc::new(AtomicBool::new(false));
    let watcher = Arc::clone(&touched);
    let guard = tokio::spawn(async move {
        if listener.accept().await.is_ok() {
            watcher.store(true, Ordering::SeqCst);
        }
    });

    let endpoint = ConnectionEndpoint::new("127.0.0.1", port, "localhost", 8080).unwrap();
    let mut engine = Engine::new(endpoint);

    let mut form = bob();
    form.alias = String::new();
    let report = engine.register(form).await;

    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "please fill in the fields to register");
    assert!(engine.identity().is_none());
    assert!(!touched.load(Ordering::SeqCst), "local rejection must not open a connection");
    guard.abort();
}

#[tokio::test]
async fn connect_reports_unknown_user_for_code_one() {
    let (mut engine, server) =
        scripted_engine(vec![Exchange::reply(4, b'0'), Exchange::reply(3, b'1')]).await;

    engine.register(bob()).await;
    let report = engine.connect().await;

    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "CONNECT FAIL, USER DOES NOT EXIST");

    let received = server.await.unwrap();
    assert_eq!(received[1], b"CONNECT\0bob\08080\0");
}

#[tokio::test]
async fn stalled_response_times_out_with_one_notice() {
    let (mut engine, server) = scripted_engine(vec![
        Exchange::reply(4, b'0'),
        Exchange { fields: 3, reply: Reply::Stall },
    ])
    .await;

    engine.register(bob()).await;
    let report = engine.connect().await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(report.timed_out, "expired response wait must be flagged");
    assert!(report.line.contains("no data received"), "line was: {}", report.line);
    // The line states the configured bound, not a truncated second count.
    assert!(report.line.contains("200ms"), "line was: {}", report.line);
    server.await.unwrap();
}

#[tokio::test]
async fn silent_close_is_an_error_but_not_a_timeout() {
    let (mut engine, server) = scripted_engine(vec![
        Exchange::reply(4, b'0'),
        Exchange { fields: 2, reply: Reply::Silence },
    ])
    .await;

    engine.register(bob()).await;
    let report = engine.disconnect().await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(!report.timed_out);
    server.await.unwrap();
}

#[tokio::test]
async fn non_digit_status_byte_is_an_error() {
    let (mut engine, server) = scripted_engine(vec![
        Exchange::reply(4, b'0'),
        Exchange::reply(2, b'X'),
    ])
    .await;

    engine.register(bob()).await;
    let report = engine.disconnect().await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(!report.timed_out);
    server.await.unwrap();
}

#[tokio::test]
async fn unregister_clears_identity_and_later_operations_fail_fast() {
    let (mut engine, server) =
        scripted_engine(vec![Exchange::reply(4, b'0'), Exchange::reply(2, b'0')]).await;

    engine.register(bob()).await;
    let report = engine.unregister().await;

    assert_eq!(report.outcome, Outcome::Ok);
    assert_eq!(report.line, "UNREGISTER OK");
    assert!(engine.identity().is_none());

    // Script is exhausted: any network attempt now would surface a
    // transport error, not this precondition rejection.
    let report = engine.connect().await;
    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "NOT REGISTERED");

    let received = server.await.unwrap();
    assert_eq!(received[1], b"UNREGISTER\0bob\0");
}

#[tokio::test]
async fn second_disconnect_surfaces_not_connected() {
    let (mut engine, server) = scripted_engine(vec![
        Exchange::reply(4, b'0'),
        Exchange::reply(2, b'0'),
        Exchange::reply(2, b'2'),
    ])
    .await;

    engine.register(bob()).await;
    assert_eq!(engine.disconnect().await.outcome, Outcome::Ok);

    let report = engine.disconnect().await;
    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "DISCONNECT FAIL / USER NOT CONNECTED");
    server.await.unwrap();
}

#[tokio::test]
async fn register_twice_is_rejected_locally() {
    let (mut engine, server) = scripted_engine(vec![Exchange::reply(4, b'0')]).await;

    engine.register(bob()).await;
    let report = engine.register(bob()).await;

    assert_eq!(report.outcome, Outcome::UserError);
    assert_eq!(report.line, "ALREADY REGISTERED AS bob");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_an_error_without_timeout_notice() {
    // Bind then drop the listener so the port is known-dead.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let endpoint = ConnectionEndpoint::new("127.0.0.1", port, "localhost", 8080).unwrap();
    let mut engine = Engine::new(endpoint);

    let report = engine.register(bob()).await;

    assert_eq!(report.outcome, Outcome::Error);
    assert!(!report.timed_out);
    assert!(report.line.starts_with("REGISTER FAIL"), "line was: {}", report.line);
}

#[tokio::test]
async fn stubbed_operations_report_error_without_network() {
    let (mut engine, server) = scripted_engine(vec![Exchange::reply(4, b'0')]).await;

    engine.register(bob()).await;

    let report = engine.send_message("alice", "hi").await;
    assert_eq!(report.outcome, Outcome::Error);

    let report = engine.send_attachment("alice", "hi", "/tmp/cat.png").await;
    assert_eq!(report.outcome, Outcome::Error);

    let report = engine.connected_users().await;
    assert_eq!(report.outcome, Outcome::Error);

    // Only the register exchange ever reached the server.
    let received = server.await.unwrap();
    assert_eq!(received.len(), 1);
}
