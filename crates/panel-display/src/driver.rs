//! The display driver: stages a row of character codes, then strobes.
//!
//! Render sequence for one update:
//!
//! 1. Encode the text into 16 slot values (left-justified, space-padded;
//!    see [`panel_core::encode_display_text`]).
//! 2. Write each slot value to its register, addresses 0 through 15.
//! 3. Write `1` to the strobe register to latch the staged row.
//!
//! Until the strobe write lands, the panel keeps showing its previous
//! contents — a partially staged row is never visible.

use thiserror::Error;
use tracing::debug;

use panel_core::{encode_display_text, DisplayEncodeError, DISPLAY_WIDTH};

use crate::bus::{BusError, RegisterBus};

/// Register address of the commit strobe.
pub const STROBE_REGISTER: u16 = 20;

/// Errors surfaced by a render operation.
///
/// Reported to the caller (typically a dispatch implementation) and logged
/// there; a failed render never panics.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The text could not be encoded into slot values.
    #[error(transparent)]
    Encode(#[from] DisplayEncodeError),

    /// A register write failed; the panel may hold a partially staged row
    /// that will be overwritten by the next successful render.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Drives one panel through a [`RegisterBus`].
pub struct DisplayDriver<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> DisplayDriver<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Renders `text` on the panel: stages all 16 slots, then strobes.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Encode`] for text that does not fit the panel
    /// and [`DisplayError::Bus`] when a write fails; in the latter case the
    /// strobe is not issued, so the visible row is unchanged.
    pub fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        let slots = encode_display_text(text)?;

        for (i, value) in slots.iter().enumerate() {
            self.bus.write_register(i as u16, *value)?;
        }
        self.bus.write_register(STROBE_REGISTER, 1)?;

        debug!("rendered {:?} across {DISPLAY_WIDTH} slots", text);
        Ok(())
    }

    /// Consumes the driver and returns the underlying bus.
    pub fn into_bus(self) -> B {
        self.bus
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
