//! Application layer: the command-dispatch extension point.
//!
//! The session loop in `infrastructure` depends on the [`CommandDispatch`]
//! trait rather than on any concrete command handler, so the authentication
//! and session-loop core stays testable independently of device integration.

pub mod dispatch;

pub use dispatch::{CommandDispatch, DispatchError, NoopDispatch};
