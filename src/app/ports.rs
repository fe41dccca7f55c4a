//! Port traits — the hexagonal boundary between behaviour logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BehaviorArbiter (domain)
//! ```
//!
//! Driven adapters (pan/tilt head, laser, dial, switch, clock, log output)
//! implement these traits.  The [`BehaviorArbiter`](super::arbiter::BehaviorArbiter)
//! consumes them via generics, so the behaviour core never touches
//! hardware directly and runs unchanged against the mocks in
//! `tests/integration/`.

use crate::motion::Heading;
use crate::sensors::dial::Mode;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: pan/tilt head, laser and the sleep-switch LED.
///
/// The toy is open-loop: the only thing that comes back is the heading,
/// bounced off any travel limit the step ran into.
pub trait ActuatorPort {
    /// Step the head by `speed` along `heading`.  Returns the heading for
    /// the next step, with every axis that hit a travel limit reversed.
    fn move_by(&mut self, speed: u16, heading: Heading) -> Heading;

    /// Switch the laser diode on or off.
    fn set_laser(&mut self, on: bool);

    /// Light the LED that shows the sleep timer is armed.
    fn set_sleep_indicator(&mut self, on: bool);

    /// Laser off and head centred.
    fn park(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two user controls.
///
/// Both reads may block for a bounded time (dial sub-sampling, switch
/// debounce) and never fail: a bad read degrades to a safe value.
pub trait InputPort {
    /// Re-sample the mode dial and return its classification.
    fn read_mode(&mut self) -> Mode;

    /// Debounced sleep-switch level (`true` = armed).
    fn read_sleep_switch(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.  Wraps at `u32::MAX`; callers use
/// `wrapping_sub` for every interval comparison.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
