//! Sensor subsystem.
//!
//! The only sensor on the head is the mode dial; see [`dial`].

pub mod dial;
