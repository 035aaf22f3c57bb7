//! The abstract register bus the driver writes through.

use thiserror::Error;

/// Error type for register bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// The underlying link rejected or failed the write.
    #[error("register write failed at address {address}: {message}")]
    WriteFailed { address: u16, message: String },

    /// The link itself is gone (device unplugged, port closed).
    #[error("bus disconnected: {0}")]
    Disconnected(String),
}

/// A write-only view of the panel's holding registers.
///
/// Implementations wrap the actual serial client.  The driver only ever
/// issues single-register writes, in staging order followed by the strobe,
/// so implementations need no batching support.
pub trait RegisterBus {
    /// Writes one 16-bit value to one register address.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] when the write does not reach the device.
    fn write_register(&mut self, address: u16, value: u16) -> Result<(), BusError>;
}
