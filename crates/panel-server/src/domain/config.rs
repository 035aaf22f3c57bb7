//! TOML-based configuration for the control-plane server.
//!
//! The configuration is loaded once at startup and is read-only for the
//! process lifetime; the server wraps it in an `Arc` and shares it with every
//! session, so no locking is ever needed around the shared secret.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This lets the
//! server start with a partial file (or none at all) and keeps older config
//! files working when new fields are added.
//!
//! Example file:
//!
//! ```toml
//! [network]
//! interface = "0.0.0.0"
//! control_port = 7600
//!
//! [server]
//! max_clients = 16
//! authentication = "s3cr3t"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured bind interface is not a valid IP address.
    #[error("invalid bind interface {value:?}: {source}")]
    InvalidInterface {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration, immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub network: NetworkSettings,
    pub server: ServerSettings,
}

/// Bind interface and port settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSettings {
    /// IP address to bind all listeners to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_interface")]
    pub interface: String,
    /// TCP port for the authenticated control channel.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// TCP port reserved for a future stream channel.  Bound at startup but
    /// never served.
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,
}

/// Admission and authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Listen backlog passed to the OS.  This is the only admission control
    /// the server applies; it bounds pending connections, not established
    /// sessions (known limitation).
    #[serde(default = "default_max_clients")]
    pub max_clients: u32,
    /// Shared secret clients must present during the handshake.
    #[serde(default = "default_authentication")]
    pub authentication: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ServerConfig {
    /// Resolves the control-channel bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterface`] when the configured interface
    /// string is not a parseable IP address.
    pub fn control_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.parse_interface()?, self.network.control_port))
    }

    /// Resolves the reserved stream-channel bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterface`] when the configured interface
    /// string is not a parseable IP address.
    pub fn stream_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.parse_interface()?, self.network.stream_port))
    }

    fn parse_interface(&self) -> Result<IpAddr, ConfigError> {
        self.network
            .interface
            .parse()
            .map_err(|source| ConfigError::InvalidInterface {
                value: self.network.interface.clone(),
                source,
            })
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_interface() -> String {
    "0.0.0.0".to_string()
}
fn default_control_port() -> u16 {
    7600
}
fn default_stream_port() -> u16 {
    7601
}
fn default_max_clients() -> u32 {
    16
}
fn default_authentication() -> String {
    // Placeholder that deployments are expected to override in config.toml.
    "changeme".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            control_port: default_control_port(),
            stream_port: default_stream_port(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_clients: default_max_clients(),
            authentication: default_authentication(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads [`ServerConfig`] from `path`, returning `ServerConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: ServerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
