//! Integration tests for the control channel: real TCP connections against a
//! server bound to an ephemeral loopback port.
//!
//! These tests exercise the full path the deployed binary runs — accept loop,
//! session task, handshake, command loop, dispatch — through the same public
//! API `main.rs` uses.  They verify:
//!
//! - The happy path: a wrong credential, then the right one, then a command
//!   frame acknowledged with `OK`.
//! - The refusal path: three wrong credentials, the refusal bytes, and a
//!   server-side close observed as end-of-stream.
//! - Containment: a malformed payload burns an attempt; a dispatch failure
//!   still acks; a peer disconnect dispatches nothing and leaves the server
//!   accepting new connections.
//! - Ordering: two interleaved clients each observe their own frames
//!   dispatched strictly in arrival order.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use panel_core::{ACK_AUTH_FAILED, ACK_AUTH_OK, ACK_FRAME, REFUSAL};
use panel_server::application::dispatch::{CommandDispatch, DispatchError};
use panel_server::domain::config::ServerConfig;
use panel_server::infrastructure::control_server::ControlServer;

const SECRET: &str = "s3cr3t";

// ── Test doubles ──────────────────────────────────────────────────────────────

/// Records every dispatched frame in arrival order across all sessions.
#[derive(Default)]
struct RecordingDispatch {
    frames: Mutex<Vec<Vec<u8>>>,
}

impl RecordingDispatch {
    fn recorded(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }
}

impl CommandDispatch for RecordingDispatch {
    fn dispatch(&self, frame: &[u8]) -> Result<(), DispatchError> {
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}

/// Fails every frame, to prove dispatch errors never kill a session.
struct FailingDispatch;

impl CommandDispatch for FailingDispatch {
    fn dispatch(&self, _frame: &[u8]) -> Result<(), DispatchError> {
        Err(DispatchError("simulated handler failure".to_string()))
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct TestServer {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn spawn(dispatch: Arc<dyn CommandDispatch>) -> Self {
        let mut config = ServerConfig::default();
        config.network.interface = "127.0.0.1".to_string();
        config.network.control_port = 0;
        config.network.stream_port = 0;
        config.server.authentication = SECRET.to_string();

        let server = ControlServer::start(config, dispatch).expect("bind ephemeral port");
        let addr = server.local_addr().expect("local addr");

        let running = Arc::new(AtomicBool::new(true));
        let running_loop = Arc::clone(&running);
        let handle = tokio::spawn(async move {
            server.serve(running_loop).await;
        });

        Self {
            addr,
            running,
            handle,
        }
    }

    async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.expect("connect")
    }

    async fn stop(self) {
        self.running.store(false, Ordering::Relaxed);
        tokio::time::timeout(Duration::from_secs(2), self.handle)
            .await
            .expect("serve loop exits after shutdown flag")
            .expect("serve task join");
    }
}

/// Reads and asserts an exact byte response from the server.
async fn expect_bytes(stream: &mut TcpStream, expected: &[u8]) {
    let mut buf = vec![0u8; expected.len()];
    stream.read_exact(&mut buf).await.expect("read response");
    assert_eq!(buf, expected, "unexpected server response");
}

/// Authenticates a client in one attempt.
async fn authenticate(stream: &mut TcpStream) {
    stream
        .write_all(format!(r#"{{"authentication":"{SECRET}"}}"#).as_bytes())
        .await
        .expect("send credentials");
    expect_bytes(stream, ACK_AUTH_OK).await;
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

/// The canonical session: wrong credential, right credential, one command,
/// then the client hangs up and the server carries on.
#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_then_right_credential_then_command() {
    let dispatch = Arc::new(RecordingDispatch::default());
    let server = TestServer::spawn(dispatch.clone()).await;

    let mut client = server.connect().await;

    // Attempt 1: wrong secret.
    client
        .write_all(br#"{"authentication":"wrong"}"#)
        .await
        .expect("send wrong credentials");
    expect_bytes(&mut client, ACK_AUTH_FAILED).await;

    // Attempt 2: right secret.
    client
        .write_all(br#"{"authentication":"s3cr3t"}"#)
        .await
        .expect("send right credentials");
    expect_bytes(&mut client, ACK_AUTH_OK).await;

    // One command frame, acked with OK.
    client
        .write_all(br#"{"cmd":"ping"}"#)
        .await
        .expect("send command");
    expect_bytes(&mut client, ACK_FRAME).await;

    // Client closes; the server must survive and must have dispatched
    // exactly the one frame.
    drop(client);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(dispatch.recorded(), vec![br#"{"cmd":"ping"}"#.to_vec()]);

    // The server still accepts connections after the disconnect.
    let mut second = server.connect().await;
    authenticate(&mut second).await;

    server.stop().await;
}

/// Three wrong credentials exhaust the budget: three failure acks, the
/// refusal bytes, then the server closes its side of the connection.
#[tokio::test(flavor = "multi_thread")]
async fn test_three_failures_refuse_and_close() {
    let dispatch = Arc::new(RecordingDispatch::default());
    let server = TestServer::spawn(dispatch.clone()).await;

    let mut client = server.connect().await;

    for _ in 0..2 {
        client
            .write_all(br#"{"authentication":"nope"}"#)
            .await
            .expect("send wrong credentials");
        expect_bytes(&mut client, ACK_AUTH_FAILED).await;
    }

    // Final attempt: failure ack followed by the refusal bytes.
    client
        .write_all(br#"{"authentication":"nope"}"#)
        .await
        .expect("send wrong credentials");
    expect_bytes(&mut client, ACK_AUTH_FAILED).await;
    expect_bytes(&mut client, REFUSAL).await;

    // A subsequent read sees end-of-stream: the server closed the socket.
    let mut buf = [0u8; 16];
    let n = client.read(&mut buf).await.expect("read after refusal");
    assert_eq!(n, 0, "server must close the connection after refusal");

    // Nothing was ever dispatched.
    assert!(dispatch.recorded().is_empty());

    server.stop().await;
}

/// A payload that is not JSON consumes an attempt identically to a
/// structurally valid but wrong credential.
#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_payload_consumes_an_attempt() {
    let dispatch = Arc::new(RecordingDispatch::default());
    let server = TestServer::spawn(dispatch.clone()).await;

    let mut client = server.connect().await;

    client
        .write_all(b"\x00\xfe garbage bytes")
        .await
        .expect("send garbage");
    expect_bytes(&mut client, ACK_AUTH_FAILED).await;

    // The budget allows recovery: the right secret still authenticates.
    client
        .write_all(format!(r#"{{"authentication":"{SECRET}"}}"#).as_bytes())
        .await
        .expect("send credentials");
    expect_bytes(&mut client, ACK_AUTH_OK).await;

    server.stop().await;
}

/// A peer that authenticates and immediately hangs up must terminate its
/// session cleanly without the dispatch point ever firing.
#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_after_auth_dispatches_nothing() {
    let dispatch = Arc::new(RecordingDispatch::default());
    let server = TestServer::spawn(dispatch.clone()).await;

    let mut client = server.connect().await;
    authenticate(&mut client).await;
    drop(client);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(dispatch.recorded().is_empty());

    // The disconnect was contained: new sessions still work.
    let mut second = server.connect().await;
    authenticate(&mut second).await;

    server.stop().await;
}

/// A failing dispatch implementation must not break the session: every frame
/// is still acknowledged and later frames still reach the dispatch point.
#[tokio::test(flavor = "multi_thread")]
async fn test_dispatch_failure_still_acks_every_frame() {
    let server = TestServer::spawn(Arc::new(FailingDispatch)).await;

    let mut client = server.connect().await;
    authenticate(&mut client).await;

    for frame in [&b"first"[..], b"second", b"third"] {
        client.write_all(frame).await.expect("send frame");
        expect_bytes(&mut client, ACK_FRAME).await;
    }

    server.stop().await;
}

/// Two concurrent clients send distinguishable sequences; each client's
/// frames must appear in the global dispatch record in its own arrival
/// order, independent of how the two sessions interleave.
#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_sessions_preserve_per_connection_order() {
    let dispatch = Arc::new(RecordingDispatch::default());
    let server = TestServer::spawn(dispatch.clone()).await;

    async fn run_client(addr: SocketAddr, tag: &str) {
        let mut client = TcpStream::connect(addr).await.expect("connect");
        client
            .write_all(format!(r#"{{"authentication":"{SECRET}"}}"#).as_bytes())
            .await
            .expect("send credentials");
        let mut ack = vec![0u8; ACK_AUTH_OK.len()];
        client.read_exact(&mut ack).await.expect("auth ack");
        assert_eq!(ack, ACK_AUTH_OK);

        for i in 1..=3 {
            client
                .write_all(format!("{tag}-{i}").as_bytes())
                .await
                .expect("send frame");
            let mut ok = vec![0u8; ACK_FRAME.len()];
            client.read_exact(&mut ok).await.expect("frame ack");
            assert_eq!(ok, ACK_FRAME);
        }
    }

    let addr = server.addr;
    tokio::join!(run_client(addr, "alpha"), run_client(addr, "beta"));

    let recorded = dispatch.recorded();
    assert_eq!(recorded.len(), 6, "each client dispatched three frames");

    // Per-connection order: within the global record, alpha-1 < alpha-2 <
    // alpha-3 and likewise for beta, whatever the interleaving.
    for tag in ["alpha", "beta"] {
        let positions: Vec<usize> = (1..=3)
            .map(|i| {
                let needle = format!("{tag}-{i}").into_bytes();
                recorded
                    .iter()
                    .position(|f| *f == needle)
                    .unwrap_or_else(|| panic!("frame {tag}-{i} was not dispatched"))
            })
            .collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "frames for {tag} dispatched out of order: {positions:?}"
        );
    }

    server.stop().await;
}

/// Clearing the shutdown flag stops the accept loop promptly.
#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_flag_stops_the_accept_loop() {
    let server = TestServer::spawn(Arc::new(RecordingDispatch::default())).await;
    // `stop` asserts the serve task joins within its timeout.
    server.stop().await;
}
