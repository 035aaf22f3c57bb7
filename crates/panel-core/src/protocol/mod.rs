//! Control-channel protocol: wire constants, credential parsing, and the
//! handshake state machine.

pub mod auth;
pub mod frames;

pub use auth::{AuthState, AuthVerdict, DenialReason, Handshake};
pub use frames::*;
