//! Infrastructure layer: the TCP listeners and the per-connection session task.

pub mod control_server;
pub mod session;

pub use control_server::{ControlServer, ServerError};
