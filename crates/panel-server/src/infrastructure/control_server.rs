//! The connection acceptor: binds the control-channel listener and spawns one
//! session task per accepted connection.
//!
//! # Scalability
//!
//! The accept loop never blocks on a client: it accepts a connection and
//! immediately spawns a dedicated Tokio task for it before accepting the
//! next one.  There is no explicit cap on concurrent sessions — the listen
//! backlog (`server.max_clients` from the configuration) is the only
//! admission control, which bounds *pending* connections, not established
//! ones.  This is a known limitation, not a resource guarantee.
//!
//! # Shutdown
//!
//! The loop polls a shared `AtomicBool` between accepts (using a short accept
//! timeout) so a Ctrl-C handler can stop the server without a dedicated
//! signalling channel.  Running sessions are not interrupted; they end when
//! their peer disconnects.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};
use tokio::time::timeout;
use tracing::{error, info};

use crate::application::dispatch::CommandDispatch;
use crate::domain::config::{ConfigError, ServerConfig};
use crate::infrastructure::session::handle_session;

/// Error type for server startup.  Bind-time failures are fatal: the process
/// cannot proceed without its listening sockets.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound (address in use, no permission, ...).
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The configured bind interface could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The control-plane server: owns the listeners, the shared configuration,
/// and the injected dispatch handle.
pub struct ControlServer {
    config: Arc<ServerConfig>,
    dispatch: Arc<dyn CommandDispatch>,
    control_listener: TcpListener,
    /// Reserved for a future stream channel.  Bound so the port is claimed at
    /// startup, but no accept loop runs on it.
    _stream_listener: TcpListener,
}

impl ControlServer {
    /// Binds the control-channel and reserved stream-channel listeners.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::BindFailed`] when either address is in use or
    /// invalid.  Callers should treat this as fatal — there is no retry.
    pub fn start(
        config: ServerConfig,
        dispatch: Arc<dyn CommandDispatch>,
    ) -> Result<Self, ServerError> {
        let backlog = config.server.max_clients;
        let control_listener = bind_listener(config.control_addr()?, backlog)?;
        let stream_listener = bind_listener(config.stream_addr()?, backlog)?;

        Ok(Self {
            config: Arc::new(config),
            dispatch,
            control_listener,
            _stream_listener: stream_listener,
        })
    }

    /// The address the control listener actually bound to.
    ///
    /// Useful when the configured port is `0` (tests bind an ephemeral port).
    ///
    /// # Errors
    ///
    /// Propagates the OS error if the local address cannot be queried.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.control_listener.local_addr()
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Each accepted connection is handed off to a freshly spawned session
    /// task.  Accept failures on an individual connection (e.g. the peer
    /// reset before handoff) are logged and do not terminate the loop.
    pub async fn serve(&self, running: Arc<AtomicBool>) {
        info!(
            "control channel listening on {}",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".to_string())
        );

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // A short accept timeout lets the loop re-check the shutdown flag
            // even when no clients are connecting.
            let accepted = timeout(Duration::from_millis(200), self.control_listener.accept());
            match accepted.await {
                Ok(Ok((stream, peer))) => {
                    let config = Arc::clone(&self.config);
                    let dispatch = Arc::clone(&self.dispatch);
                    // Hand the stream off exclusively to the session task; the
                    // accept loop keeps no reference to it.
                    tokio::spawn(async move {
                        handle_session(stream, peer, config, dispatch).await;
                    });
                }
                Ok(Err(e)) => {
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // Timeout: no connection in the last 200 ms.
                }
            }
        }
    }
}

/// Binds a TCP listener with an explicit listen backlog.
///
/// `tokio::net::TcpListener::bind` does not expose the backlog, so the
/// listener is assembled from a [`TcpSocket`] instead.
fn bind_listener(addr: SocketAddr, backlog: u32) -> Result<TcpListener, ServerError> {
    let bind = |addr: SocketAddr, backlog: u32| -> std::io::Result<TcpListener> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(backlog)
    };
    bind(addr, backlog).map_err(|source| ServerError::BindFailed { addr, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
