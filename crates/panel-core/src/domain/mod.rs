//! Domain logic for Panel-Over-IP.
//!
//! Pure business rules with no infrastructure dependencies: nothing in this
//! module touches sockets, serial ports, or the file system, so it can be
//! compiled and unit-tested anywhere.

pub mod display;
