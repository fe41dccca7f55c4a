//! Laser diode driver.
//!
//! A single GPIO switches the diode through a logic-level MOSFET.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real enable pin via hw_init.
//! On host/test: writes the simulated pin level.

use log::debug;

use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserState {
    Off,
    On,
}

pub struct LaserDriver {
    gpio: i32,
    state: LaserState,
}

impl LaserDriver {
    /// Drives the pin LOW immediately so the diode starts dark.
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self {
            gpio,
            state: LaserState::Off,
        }
    }

    pub fn set(&mut self, on: bool) {
        let next = if on { LaserState::On } else { LaserState::Off };
        if next != self.state {
            debug!("Laser {:?}", next);
        }
        hw_init::gpio_write(self.gpio, on);
        self.state = next;
    }

    pub fn state(&self) -> LaserState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == LaserState::On
    }
}
