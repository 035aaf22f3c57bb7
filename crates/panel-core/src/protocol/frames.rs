//! Wire constants and credential-payload parsing for the control channel.
//!
//! The control channel is plain TCP and newline-insensitive: one read is one
//! frame, bounded by [`READ_BUFFER_SIZE`].  Before authentication a frame is
//! expected to be a JSON object carrying an `authentication` field; after
//! authentication frames are opaque bytes handed to the dispatch point.
//!
//! The acknowledgment byte strings below are part of the wire contract and
//! must be sent verbatim.

use serde::Deserialize;
use thiserror::Error;

// ── Wire constants ────────────────────────────────────────────────────────────

/// Maximum bytes read from the socket per frame.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Number of credential submissions a client is allowed before refusal.
pub const MAX_AUTH_ATTEMPTS: u8 = 3;

/// Sent once when a credential payload matches the shared secret.
pub const ACK_AUTH_OK: &[u8] = b"Authentication Successful\n";

/// Sent after each failed credential submission.
pub const ACK_AUTH_FAILED: &[u8] = b"Authentication Failed\n";

/// Sent after the final failed attempt, immediately before the server closes
/// the connection.
pub const REFUSAL: &[u8] = b"Connection Refused By Server";

/// Sent after every post-authentication frame, regardless of dispatch outcome.
pub const ACK_FRAME: &[u8] = b"OK";

// ── Credential payload ────────────────────────────────────────────────────────

/// Error returned when a pre-authentication payload cannot be parsed.
///
/// Carries the underlying `serde_json` message for logging; callers treat a
/// malformed frame identically to a wrong credential.
#[derive(Debug, Error)]
#[error("malformed credential frame: {0}")]
pub struct MalformedFrame(String);

/// The typed shape of a pre-authentication frame.
///
/// Only the `authentication` field is inspected; any other fields the client
/// includes are ignored.  The field value may be any JSON type — a non-string
/// value simply never matches the configured (string) secret.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialPayload {
    pub authentication: serde_json::Value,
}

impl CredentialPayload {
    /// Compares the submitted credential against the shared secret using
    /// exact equality.
    pub fn matches(&self, secret: &str) -> bool {
        self.authentication.as_str() == Some(secret)
    }
}

/// Parses an untrusted pre-authentication frame into a [`CredentialPayload`].
///
/// # Errors
///
/// Returns [`MalformedFrame`] when the bytes are not a JSON object with an
/// `authentication` field.  An empty frame (peer closed before writing) is
/// malformed like any other unparseable payload.
pub fn parse_credentials(payload: &[u8]) -> Result<CredentialPayload, MalformedFrame> {
    serde_json::from_slice(payload).map_err(|e| MalformedFrame(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
