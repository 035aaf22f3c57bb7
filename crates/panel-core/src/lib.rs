//! # panel-core
//!
//! Shared library for Panel-Over-IP containing the control-channel wire
//! constants, the authentication handshake state machine, and the fixed-width
//! display slot encoding.
//!
//! This crate is used by both the server and the display driver.  It has zero
//! dependencies on OS APIs, sockets, or serial hardware — everything here is
//! pure logic that can be unit-tested on any platform.
//!
//! # Architecture overview
//!
//! Panel-Over-IP lets an operator station drive a remote character display
//! panel over the network.  A TCP control channel carries authenticated
//! command frames from clients to the server; the server hands each frame to
//! a dispatch point which may ultimately render text on the panel.
//!
//! This crate defines:
//!
//! - **`protocol`** – The control-channel contract: literal acknowledgment
//!   bytes, the JSON credential payload, and the bounded-retry [`Handshake`]
//!   state machine every session runs before it may submit commands.
//!
//! - **`domain`** – Pure business logic with no I/O.  The main piece is the
//!   display slot encoding: turning a text string into the fixed sequence of
//!   16-bit register values the panel hardware latches on strobe.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `panel_core::Handshake` instead of `panel_core::protocol::auth::Handshake`.
pub use domain::display::{encode_display_text, DisplayEncodeError, DISPLAY_WIDTH};
pub use protocol::auth::{AuthState, AuthVerdict, DenialReason, Handshake};
pub use protocol::frames::{
    parse_credentials, CredentialPayload, MalformedFrame, ACK_AUTH_FAILED, ACK_AUTH_OK,
    ACK_FRAME, MAX_AUTH_ATTEMPTS, READ_BUFFER_SIZE, REFUSAL,
};
