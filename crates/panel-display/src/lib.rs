//! # panel-display
//!
//! Driver for the remote character panel.  The panel exposes a row of
//! 16-bit registers over a serial link: slots 0 through 15 hold one staged
//! character code each, and writing `1` to the strobe register latches the
//! staged row onto the physical display in one step.
//!
//! The serial transport itself sits behind the [`RegisterBus`] trait, so the
//! driver's staging-then-strobe sequence can be tested without hardware and
//! the link technology (RTU serial adapter, test double, ...) can be swapped
//! freely.

pub mod bus;
pub mod driver;

pub use bus::{BusError, RegisterBus};
pub use driver::{DisplayDriver, DisplayError, STROBE_REGISTER};
