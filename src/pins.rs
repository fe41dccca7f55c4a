//! GPIO / peripheral pin assignments for the LaserChase head board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Pan/tilt servos (hobby servos, 50 Hz PWM)
// ---------------------------------------------------------------------------

/// LEDC output for the horizontal (pan) servo.
pub const PAN_SERVO_GPIO: i32 = 1;
/// LEDC output for the vertical (tilt) servo.
pub const TILT_SERVO_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Laser diode (driven through a logic-level MOSFET)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = laser on.
pub const LASER_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Mode dial (three-position resistor ladder)
// ---------------------------------------------------------------------------

/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const DIAL_ADC_GPIO: i32 = 5;
pub const DIAL_ADC_CHANNEL: u32 = 4;

// ---------------------------------------------------------------------------
// Missile switch (sleep-timer arm) and its indicator
// ---------------------------------------------------------------------------

/// Digital input with internal pull-up.  LOW = switch flipped on.
pub const SWITCH_GPIO: i32 = 6;
/// Indicator LED in the switch cover.  Active-low.
pub const SWITCH_LED_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits).  14 bits gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
