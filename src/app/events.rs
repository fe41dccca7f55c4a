//! Outbound application events.
//!
//! The [`BehaviorArbiter`](super::arbiter::BehaviorArbiter) emits these
//! through the [`EventSink`](super::ports::EventSink) port on every
//! state change.  Per-step movement is deliberately not an event; it is
//! traced through `log` instead.

use crate::scheduler::TaskId;
use crate::sensors::dial::Mode;

/// What the toy is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Dial set to OFF.
    Idle,
    /// Laser on and moving.
    Chasing,
    /// Laser on, holding still.
    Paused,
    /// Laser off for a short break.
    Resting,
    /// Off-phase of an intermittent cycle.
    CycledOff,
    /// Sleep timer expired; stays here until the dial is moved.
    Asleep,
}

impl Activity {
    /// Whether the laser is lit in this activity.
    pub fn laser_on(self) -> bool {
        matches!(self, Self::Chasing | Self::Paused)
    }
}

/// Structured events emitted by the behaviour core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The arbiter has started (carries the initial mode).
    Started(Mode),

    /// The dial moved to a different mode.
    ModeChanged { from: Mode, to: Mode },

    /// The arbiter switched activity.
    ActivityChanged { from: Activity, to: Activity },

    /// A timer was re-randomised.
    IntervalResampled { task: TaskId, interval_ms: u32 },

    /// The sleep switch was armed (`true`) or disarmed.
    SleepTimerArmed(bool),
}
