//! Missile switch: the guarded toggle that arms the sleep timer.
//!
//! ## Hardware
//!
//! Toggle to ground with a pull-up: LOW = flipped on.  An LED under the
//! cover (also active-low) shows the armed state.
//!
//! ## Debounce
//!
//! [`MissileSwitch::read`] polls the pin in a tight loop, tracking a
//! candidate level.  Any change restarts the stability window; once the
//! candidate has held for longer than `debounce_ms` it becomes the stable
//! state.  If the contact is still chattering after `timeout_ms` the last
//! stable state is returned instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::Clock;
use crate::config::SwitchConfig;

const HEARTBEAT_STEP_MS: u32 = 100;

pub struct MissileSwitch<P, L> {
    pin: P,
    led: L,
    config: SwitchConfig,
    state: bool,
    led_on: bool,
}

impl<P: InputPin, L: OutputPin> MissileSwitch<P, L> {
    /// Starts disarmed until the first [`read`](Self::read).
    pub fn new(pin: P, led: L, config: SwitchConfig) -> Self {
        Self {
            pin,
            led,
            config,
            state: false,
            led_on: false,
        }
    }

    /// Debounced level (`true` = on).  Blocks for at most `timeout_ms`.
    pub fn read(&mut self, clock: &impl Clock) -> bool {
        let started = clock.now_ms();
        let Some(mut candidate) = self.sample() else {
            return self.state;
        };
        let mut since = started;

        loop {
            let now = clock.now_ms();
            if now.wrapping_sub(started) >= self.config.timeout_ms {
                warn!(
                    "Switch did not settle within {} ms, keeping {}",
                    self.config.timeout_ms,
                    if self.state { "on" } else { "off" }
                );
                return self.state;
            }

            let Some(level) = self.sample() else {
                return self.state;
            };
            if level != candidate {
                candidate = level;
                since = now;
            } else if now.wrapping_sub(since) > self.config.debounce_ms {
                self.state = candidate;
                return candidate;
            }
        }
    }

    /// Last debounced state.
    pub fn state(&self) -> bool {
        self.state
    }

    pub fn set_led(&mut self, on: bool) {
        self.led_on = on;
        // Active-low.
        if self.led.set_state(PinState::from(!on)).is_err() {
            warn!("Switch LED write failed");
        }
    }

    /// Toggle the LED `2 * count` times, 100 ms apart.  Ends in the state
    /// it started in.
    pub fn heart_beat(&mut self, count: u8, delay: &mut impl DelayNs) {
        for _ in 0..u16::from(count) * 2 {
            self.set_led(!self.led_on);
            delay.delay_ms(HEARTBEAT_STEP_MS);
        }
    }

    fn sample(&mut self) -> Option<bool> {
        match self.pin.is_low() {
            Ok(on) => Some(on),
            Err(_) => {
                warn!("Switch read failed, keeping last state");
                None
            }
        }
    }
}
