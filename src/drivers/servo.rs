//! Hobby servo driver (50 Hz, 0.5 – 2.5 ms pulse).
//!
//! Angles are in tenths of a degree.  Every write is clamped to the
//! servo's configured travel so the head cannot be driven into its stops.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty via hw_init helpers.
//! On host/test: the simulated LEDC channel records the duty.

use crate::drivers::hw_init;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const MIN_PULSE_US: u32 = 500;
const MAX_PULSE_US: u32 = 2_500;
/// Full mechanical range, tenths of a degree.
const FULL_SWING: u32 = 1_800;

/// Allowed travel, tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Travel {
    pub min: u16,
    pub max: u16,
}

impl Travel {
    pub fn centre(&self) -> u16 {
        self.min + (self.max - self.min) / 2
    }

    fn clamp(&self, angle: i32) -> u16 {
        angle.clamp(i32::from(self.min), i32::from(self.max)) as u16
    }
}

/// Pulse width in µs for an angle in tenths of a degree.
pub fn pulse_us(angle: u16) -> u32 {
    let angle = u32::from(angle).min(FULL_SWING);
    MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / FULL_SWING
}

/// LEDC duty count for a pulse width at the configured resolution.
pub fn duty_for_pulse(pulse_us: u32) -> u32 {
    let full = 1u32 << pins::SERVO_PWM_RESOLUTION_BITS;
    pulse_us * full / FRAME_US
}

pub struct ServoDriver {
    channel: u32,
    travel: Travel,
    angle: u16,
}

impl ServoDriver {
    /// Does not move the servo; call [`set_angle`](Self::set_angle) or
    /// [`centre`](Self::centre) to start driving it.
    pub fn new(channel: u32, travel: Travel) -> Self {
        Self {
            channel,
            travel,
            angle: travel.centre(),
        }
    }

    /// Move to `angle` (clamped).  Returns the angle actually written.
    pub fn set_angle(&mut self, angle: i32) -> u16 {
        let angle = self.travel.clamp(angle);
        hw_init::ledc_set(self.channel, duty_for_pulse(pulse_us(angle)));
        self.angle = angle;
        angle
    }

    pub fn centre(&mut self) {
        self.set_angle(i32::from(self.travel.centre()));
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    pub fn travel(&self) -> Travel {
        self.travel
    }
}
