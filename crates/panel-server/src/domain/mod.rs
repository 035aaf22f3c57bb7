//! Domain types for the server: the runtime configuration schema.

pub mod config;

pub use config::{load_config, ConfigError, ServerConfig};
