//! Two-servo pan/tilt head.
//!
//! The arbiter thinks in relative steps (`speed` along a [`Heading`]);
//! this driver turns each step into absolute servo angles.  A step that
//! would cross a travel limit stops at the limit, and that axis of the
//! heading is reversed so the dot bounces back into the play area.

use log::trace;

use crate::drivers::hw_init;
use crate::drivers::servo::{ServoDriver, Travel};
use crate::motion::Heading;

/// Pan travel, tenths of a degree.
pub const PAN_TRAVEL: Travel = Travel { min: 300, max: 1_500 };
/// Tilt travel, tenths of a degree.  Kept narrow so the dot stays on the floor.
pub const TILT_TRAVEL: Travel = Travel { min: 600, max: 1_200 };

pub struct PanTiltHead {
    pan: ServoDriver,
    tilt: ServoDriver,
}

impl Default for PanTiltHead {
    fn default() -> Self {
        Self::new()
    }
}

impl PanTiltHead {
    pub fn new() -> Self {
        Self {
            pan: ServoDriver::new(hw_init::LEDC_CH_PAN, PAN_TRAVEL),
            tilt: ServoDriver::new(hw_init::LEDC_CH_TILT, TILT_TRAVEL),
        }
    }

    /// Move `speed` tenths of a degree on each axis in the heading's
    /// direction.  Returns the heading for the next step: an axis whose
    /// step was clamped at a travel limit comes back reversed.
    pub fn step(&mut self, speed: u16, heading: Heading) -> Heading {
        let speed = i32::from(speed);
        let pan = i32::from(self.pan.angle()) + speed * i32::from(heading.pan.signum());
        let tilt = i32::from(self.tilt.angle()) + speed * i32::from(heading.tilt.signum());

        let pan_at = self.pan.set_angle(pan);
        let tilt_at = self.tilt.set_angle(tilt);
        trace!("Head: pan={} tilt={}", pan_at, tilt_at);

        Heading {
            pan: bounce(heading.pan, pan, pan_at),
            tilt: bounce(heading.tilt, tilt, tilt_at),
        }
    }

    pub fn centre(&mut self) {
        self.pan.centre();
        self.tilt.centre();
    }

    pub fn position(&self) -> (u16, u16) {
        (self.pan.angle(), self.tilt.angle())
    }
}

fn bounce(direction: i8, wanted: i32, reached: u16) -> i8 {
    if wanted == i32::from(reached) { direction } else { -direction }
}
