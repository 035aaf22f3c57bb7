//! Per-connection session: the authentication handshake followed by the
//! command-receive loop.
//!
//! Each accepted connection is handed off exclusively to one session task;
//! no other component retains a reference to the stream.  The session owns
//! its [`Handshake`] counter, reads frames into a fixed 1024-byte buffer, and
//! shares only the read-only configuration and the dispatch handle.
//!
//! Lifecycle:
//!
//! 1. **Handshake** — bounded-retry credential exchange (see
//!    [`panel_core::Handshake`]).  Exhausting the attempt budget sends the
//!    refusal bytes and closes the connection.
//! 2. **Command loop** — reads a frame, hands it to the dispatch point, acks
//!    with `OK`.  An empty read means the peer closed: the session ends
//!    cleanly *before* any dispatch is attempted for that read.
//!
//! All failures are contained here: an I/O error ends this session with a
//! warning and never propagates to the accept loop or to other sessions.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use panel_core::{
    AuthVerdict, DenialReason, Handshake, ACK_AUTH_FAILED, ACK_AUTH_OK, ACK_FRAME,
    READ_BUFFER_SIZE, REFUSAL,
};

use crate::application::dispatch::CommandDispatch;
use crate::domain::config::ServerConfig;

/// Top-level handler for a single client connection.
///
/// Wraps [`run_session`] and logs the outcome.  This function is the entry
/// point for each per-connection task spawned by the accept loop.
///
/// Using a separate outer/inner function pair lets `run_session` use `?` for
/// clean error propagation while the outcome is logged in one place here.
pub async fn handle_session(
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    dispatch: Arc<dyn CommandDispatch>,
) {
    info!("client {peer} is connected");
    match run_session(stream, peer, &config, dispatch.as_ref()).await {
        Ok(()) => debug!("session {peer} ended"),
        Err(e) => warn!("session {peer} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one client session.
///
/// Generic over the stream type so tests can drive it with an in-memory
/// mock transport instead of a real socket.
///
/// # Errors
///
/// Returns an error only for unrecoverable I/O failures (e.g. broken pipe);
/// refused authentication and peer disconnects are normal terminations.
pub async fn run_session<S>(
    mut stream: S,
    peer: SocketAddr,
    config: &ServerConfig,
    dispatch: &dyn CommandDispatch,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let mut handshake = Handshake::new();

    // ── Phase 1: bounded-retry handshake ──────────────────────────────────────
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .with_context(|| format!("read from {peer} during handshake"))?;

        // An empty read (peer closed before authenticating) flows into
        // `submit` like any other payload: it parses as malformed and burns
        // an attempt, so a dead peer can never loop here forever.
        match handshake.submit(&buf[..n], &config.server.authentication) {
            AuthVerdict::Granted => {
                stream
                    .write_all(ACK_AUTH_OK)
                    .await
                    .with_context(|| format!("send auth success to {peer}"))?;
                info!("client {peer} authenticated");
                break;
            }
            AuthVerdict::Denied {
                attempts_remaining,
                reason,
            } => {
                stream
                    .write_all(ACK_AUTH_FAILED)
                    .await
                    .with_context(|| format!("send auth failure to {peer}"))?;
                let reason = match reason {
                    DenialReason::WrongCredential => "wrong credential",
                    DenialReason::MalformedPayload => "malformed payload",
                };
                warn!(
                    "client {peer} authentication failed ({reason}); \
                     {attempts_remaining} attempt(s) remaining"
                );
                if attempts_remaining == 0 {
                    stream
                        .write_all(REFUSAL)
                        .await
                        .with_context(|| format!("send refusal to {peer}"))?;
                    stream.shutdown().await.ok();
                    info!("client {peer} refused: attempt budget exhausted");
                    return Ok(());
                }
            }
            AuthVerdict::Refused => {
                // Unreachable in practice: the Denied arm above tears the
                // session down as soon as the budget hits zero.
                return Ok(());
            }
        }
    }

    // ── Phase 2: command loop ─────────────────────────────────────────────────
    loop {
        let n = stream
            .read(&mut buf)
            .await
            .with_context(|| format!("read frame from {peer}"))?;

        // The closed-connection check must precede dispatch: an empty read is
        // the peer hanging up, not a command.
        if n == 0 {
            info!("client {peer} disconnected");
            return Ok(());
        }

        let frame = &buf[..n];
        debug!("recv {n} byte frame from {peer}");

        // Dispatch failures are per-frame: log and keep serving.
        if let Err(e) = dispatch.dispatch(frame) {
            warn!("client {peer}: {e}");
        }

        stream
            .write_all(ACK_FRAME)
            .await
            .with_context(|| format!("ack frame to {peer}"))?;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
