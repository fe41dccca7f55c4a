//! System configuration parameters
//!
//! All tunable parameters for the LaserChase toy.  Values are fixed at
//! build time: `SystemConfig::default()` is the device's configuration and
//! is validated once at start-up.  There is no runtime reconfiguration and
//! nothing is persisted.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Intermittent / sleep ---
    /// Minutes the laser stays ON in each intermittent cycle.
    pub intermittent_on_minutes: u16,
    /// Mean minutes the laser stays OFF in each intermittent cycle.
    pub intermittent_off_minutes: u16,
    /// Variance (minutes²) of the intermittent OFF phase.
    pub intermittent_off_variance: f64,
    /// Minutes the laser runs once the sleep timer is armed, before it
    /// turns off until the dial is moved.
    pub minutes_before_sleep: u16,

    // --- Pause (laser holds still) ---
    /// Mean seconds between pauses.
    pub pause_mean_secs: u16,
    /// Variance (s²) of the time between pauses.
    pub pause_variance: f64,
    /// Mean seconds a pause lasts.
    pub pause_hold_mean_secs: u16,
    /// Variance (s²) of a pause's length.
    pub pause_hold_variance: f64,

    // --- Rest (laser off) ---
    /// Mean seconds between rests.
    pub rest_mean_secs: u16,
    /// Variance (s²) of the time between rests.
    pub rest_variance: f64,
    /// Mean seconds a rest lasts.
    pub rest_hold_mean_secs: u16,
    /// Variance (s²) of a rest's length.
    pub rest_hold_variance: f64,

    // --- Motion ---
    /// Milliseconds between pan/tilt steps.
    pub move_interval_ms: u32,
    /// Chance (0-100 %) that a step flips one axis of the heading.
    pub direction_change_percent: u8,

    // --- Inputs ---
    /// Milliseconds between dial reads.
    pub dial_poll_interval_ms: u32,
    /// Milliseconds between sleep-switch reads.
    pub switch_poll_interval_ms: u32,
    pub dial: DialConfig,
    pub switch: SwitchConfig,

    // --- Loop ---
    /// Idle time yielded to the RTOS per control-loop pass (milliseconds).
    pub loop_period_ms: u32,
    /// Fixed PRNG seed.  `None` seeds from hardware entropy at boot.
    pub rng_seed: Option<u64>,
}

/// Mode dial filtering and classification parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DialConfig {
    /// Approximate sub-sampling rate in Hz.
    pub sample_rate_hz: u32,
    /// Sub-samples blended per update.
    pub samples: u16,
    /// Low-pass smoothing factor (0 < alpha <= 1).
    pub alpha: f32,
    /// Full-scale voltage of the internal reference (mV).
    pub reference_mv: u32,
    /// ADC resolution in bits.
    pub adc_bits: u8,
    pub bands: DialBands,
}

/// Band centres and shared tolerance, in millivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialBands {
    pub off_mv: i32,
    pub continuous_mv: i32,
    pub intermittent_mv: i32,
    pub tolerance_mv: i32,
}

/// Sleep-switch debounce parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// A level must be stable for longer than this to be accepted.
    pub debounce_ms: u32,
    /// Give up and keep the last stable level after this long.
    pub timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Intermittent / sleep
            intermittent_on_minutes: 15,
            intermittent_off_minutes: 60,
            intermittent_off_variance: 3.0,
            minutes_before_sleep: 30,

            // Pause
            pause_mean_secs: 10,
            pause_variance: 6.0,
            pause_hold_mean_secs: 3,
            pause_hold_variance: 2.0,

            // Rest
            rest_mean_secs: 360,
            rest_variance: 60.0,
            rest_hold_mean_secs: 30,
            rest_hold_variance: 10.0,

            // Motion
            move_interval_ms: 20, // 50 Hz, one servo frame
            direction_change_percent: 15,

            // Inputs
            dial_poll_interval_ms: 2000,
            switch_poll_interval_ms: 250,
            dial: DialConfig::default(),
            switch: SwitchConfig::default(),

            // Loop
            loop_period_ms: 1,
            rng_seed: None,
        }
    }
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000,
            samples: 300,
            alpha: 0.015,
            reference_mv: 1100,
            adc_bits: 12,
            bands: DialBands::default(),
        }
    }
}

impl Default for DialBands {
    fn default() -> Self {
        // Three-position resistor ladder on the dial.
        Self {
            off_mv: 100,
            continuous_mv: 550,
            intermittent_mv: 1000,
            tolerance_mv: 100,
        }
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            timeout_ms: 500,
        }
    }
}

impl SystemConfig {
    /// Reject configurations that would produce a degenerate behaviour
    /// model.  Called once at boot; a failure aborts start-up.
    pub fn validate(&self) -> Result<()> {
        if self.direction_change_percent > 100 {
            return Err(Error::Config("direction_change_percent above 100"));
        }
        if self.move_interval_ms == 0
            || self.dial_poll_interval_ms == 0
            || self.switch_poll_interval_ms == 0
        {
            return Err(Error::Config("poll intervals must be non-zero"));
        }
        if self.intermittent_on_minutes == 0 || self.minutes_before_sleep == 0 {
            return Err(Error::Config("on/sleep minutes must be non-zero"));
        }
        let variances = [
            self.intermittent_off_variance,
            self.pause_variance,
            self.pause_hold_variance,
            self.rest_variance,
            self.rest_hold_variance,
        ];
        if variances.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::Config("variances must be finite and >= 0"));
        }
        if !(self.dial.alpha > 0.0 && self.dial.alpha <= 1.0) {
            return Err(Error::Config("dial alpha outside (0, 1]"));
        }
        if self.dial.samples == 0 || self.dial.sample_rate_hz == 0 {
            return Err(Error::Config("dial needs a sample count and rate"));
        }
        if self.dial.adc_bits == 0 || self.dial.adc_bits > 16 {
            return Err(Error::Config("dial adc_bits outside 1..=16"));
        }
        if self.dial.bands.tolerance_mv < 0 {
            return Err(Error::Config("dial tolerance must be >= 0"));
        }
        if self.switch.debounce_ms >= self.switch.timeout_ms {
            return Err(Error::Config("switch debounce must be shorter than timeout"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Speed ladder
// ---------------------------------------------------------------------------

/// One rung of the compile-time speed ladder:
/// `(speed, previous %, next %)`.
pub type SpeedRung = (u16, u8, u8);

/// Ordered slow → fast speeds (tenths of a degree per step).  The ends
/// never wrap around: the slowest rung has no backward probability and the
/// fastest no forward one.
pub const SPEED_LADDER: [SpeedRung; 8] = [
    (2, 0, 40),
    (4, 30, 30),
    (6, 30, 30),
    (8, 30, 30),
    (12, 35, 25),
    (16, 35, 25),
    (24, 40, 20),
    (32, 50, 0),
];
