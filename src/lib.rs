//! LaserChase firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod motion;
pub mod scheduler;

// Driver-level modules; the ESP-IDF implementations are cfg-gated inside
// and fall back to host simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod pins;
pub mod sensors;
