//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.  The dial and the
//! switch are plain fields the test flips between ticks.

use laserchase::app::events::AppEvent;
use laserchase::app::ports::{ActuatorPort, EventSink, InputPort};
use laserchase::motion::Heading;
use laserchase::sensors::dial::Mode;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    MoveBy { speed: u16, heading: Heading },
    Laser(bool),
    Indicator(bool),
    Park,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub mode: Mode,
    pub switch_on: bool,
    pub mode_reads: u32,
    pub switch_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(mode: Mode, switch_on: bool) -> Self {
        Self {
            calls: Vec::new(),
            mode,
            switch_on,
            mode_reads: 0,
            switch_reads: 0,
        }
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    pub fn moves(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::MoveBy { .. }))
            .count()
    }

    pub fn speeds(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::MoveBy { speed, .. } => Some(*speed),
                _ => None,
            })
            .collect()
    }

    pub fn laser_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Laser(on) => Some(*on),
                ActuatorCall::Park => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn indicator_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Indicator(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl ActuatorPort for MockHardware {
    fn move_by(&mut self, speed: u16, heading: Heading) -> Heading {
        self.calls.push(ActuatorCall::MoveBy { speed, heading });
        heading
    }

    fn set_laser(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Laser(on));
    }

    fn set_sleep_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Indicator(on));
    }

    fn park(&mut self) {
        self.calls.push(ActuatorCall::Park);
    }
}

impl InputPort for MockHardware {
    fn read_mode(&mut self) -> Mode {
        self.mode_reads += 1;
        self.mode
    }

    fn read_sleep_switch(&mut self) -> bool {
        self.switch_reads += 1;
        self.switch_on
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Collects every emitted event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    /// Interval of the most recent re-sample of `task`.
    pub fn last_interval(&self, task: laserchase::scheduler::TaskId) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::IntervalResampled { task: t, interval_ms } if *t == task => Some(*interval_ms),
            _ => None,
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
