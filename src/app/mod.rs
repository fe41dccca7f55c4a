//! Application core — behaviour logic, zero I/O.
//!
//! The [`arbiter`] decides what the toy does from one moment to the next:
//! which timers run, when the laser is lit, how fast the dot moves.  All
//! interaction with hardware happens through the **port traits** defined
//! in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod arbiter;
pub mod events;
pub mod ports;
