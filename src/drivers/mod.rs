//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod laser;
pub mod pan_tilt;
pub mod pin;
pub mod servo;
pub mod switch;
