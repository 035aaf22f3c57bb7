//! The command-dispatch extension point.
//!
//! The server defines no command language of its own: a frame is an opaque
//! byte payload, and interpreting it is the integrator's job.  The contract
//! the session loop guarantees is narrow:
//!
//! - dispatch is invoked exactly once per non-empty frame,
//! - in arrival order for that connection,
//! - strictly after the handshake has succeeded,
//! - and a dispatch failure is caught and logged, never fatal to the session.
//!
//! An integrator wiring the panel would implement [`CommandDispatch`] to
//! interpret frames and call `DisplayDriver::render` from the
//! `panel-display` crate.

use thiserror::Error;
use tracing::debug;

/// Error surfaced by a dispatch implementation.
///
/// The session logs it and keeps serving subsequent frames; the client still
/// receives the frame acknowledgment.
#[derive(Debug, Error)]
#[error("command dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Receives authenticated command frames from session tasks.
///
/// Implementations are shared across all sessions, so they must be
/// `Send + Sync` and serialize their own interior state if any.
#[cfg_attr(test, mockall::automock)]
pub trait CommandDispatch: Send + Sync {
    /// Handles one raw command frame.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the frame cannot be processed; the
    /// caller treats this as a no-op for that frame.
    fn dispatch(&self, frame: &[u8]) -> Result<(), DispatchError>;
}

/// Default dispatch implementation: logs the frame and does nothing.
#[derive(Debug, Default)]
pub struct NoopDispatch;

impl CommandDispatch for NoopDispatch {
    fn dispatch(&self, frame: &[u8]) -> Result<(), DispatchError> {
        debug!("noop dispatch: {} byte frame ignored", frame.len());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
