//! Panel-Over-IP server entry point.
//!
//! Wires configuration, logging, the dispatch handle, and the accept loop
//! together and runs until a shutdown signal arrives.
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML file, defaults when absent
//!  └─ ControlServer::start() -- binds control + reserved stream listeners
//!  └─ serve(running)         -- accept loop; one task per session
//!       └─ Ctrl-C handler clears `running`
//! ```
//!
//! The dispatch point is wired to [`NoopDispatch`]; an integration that
//! drives the remote panel would substitute an implementation that interprets
//! frames and calls into `panel-display`.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::info;
use tracing_subscriber::EnvFilter;

use panel_server::application::dispatch::NoopDispatch;
use panel_server::domain::config::load_config;
use panel_server::infrastructure::control_server::ControlServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config path comes from the first CLI argument; defaults to ./config.toml.
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = load_config(&config_path)?;

    // Initialise structured logging.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!("Panel-Over-IP server starting (config: {})", config_path.display());

    let server = ControlServer::start(config, Arc::new(NoopDispatch))?;

    // Shutdown flag shared with the accept loop.
    let running = Arc::new(AtomicBool::new(true));
    let running_signal = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_signal.store(false, Ordering::Relaxed);
        }
    });

    info!("Panel-Over-IP server ready.  Press Ctrl-C to exit.");
    server.serve(running).await;

    info!("Panel-Over-IP server stopped");
    Ok(())
}
