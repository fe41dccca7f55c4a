//! Cooperative task scheduler.
//!
//! Every behaviour timer in the toy is a [`Task`]: an interval, a
//! last-fired timestamp and an enabled flag.  The [`Scheduler`] owns a
//! fixed registry of them and is polled once per control-loop pass.  It
//! never blocks and never calls back into the caller; instead
//! [`Scheduler::tick`] returns the ids that came due, in registration
//! order, and the arbiter dispatches them.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  main loop ── now_ms ──▶ Scheduler.tick(now)                 │
//! │                            │                                 │
//! │           ┌────────────────┼────────────────┐                │
//! │           ▼                ▼                ▼                │
//! │       Task(Move)      Task(Pause)   ...  Task(DialPoll)      │
//! │           │ due?           │ due?           │ due?           │
//! │           └──────────▶  Fired [ids] ◀───────┘                │
//! │                            │                                 │
//! │                            ▼                                 │
//! │                  BehaviorArbiter::dispatch                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelling a task means disabling it; nothing is torn down.  All time
//! arithmetic is wrapping `u32` milliseconds, so the ~49 day rollover of
//! the uptime counter is harmless.

use heapless::Vec;
use log::debug;

use crate::error::SchedulerError;

// ═══════════════════════════════════════════════════════════════
//  Task types
// ═══════════════════════════════════════════════════════════════

/// Identity of every schedulable behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Step the pan/tilt head.
    Move,
    /// Freeze the dot in place for a moment.
    Pause,
    /// End of a pause or rest.
    Resume,
    /// Switch the laser off for a while.
    Rest,
    /// Intermittent on/off phase boundary.
    Cycle,
    /// Sleep timer expiry.
    Bedtime,
    /// Re-read the mode dial.
    DialPoll,
    /// Re-read the sleep switch.
    SwitchPoll,
}

/// A single periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    interval_ms: u32,
    last_fired_ms: u32,
    enabled: bool,
}

impl Task {
    /// A disabled task whose countdown starts at `now_ms`.
    pub fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fired_ms: now_ms,
            enabled: false,
        }
    }

    /// Change the firing period.  Takes effect from the next tick and is
    /// measured from the last firing; it never fires immediately.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_fired_ms(&self) -> u32 {
        self.last_fired_ms
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable the task.  A disabled task restarts its countdown from
    /// `now_ms`; an already-enabled task keeps its phase.
    pub fn enable(&mut self, now_ms: u32) {
        if !self.enabled {
            self.enabled = true;
            self.last_fired_ms = now_ms;
        }
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Poll the task.  Returns `true` (and records `now_ms`) when it is
    /// enabled and at least one interval has elapsed since it last fired.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        if !self.enabled {
            return false;
        }
        if now_ms.wrapping_sub(self.last_fired_ms) >= self.interval_ms {
            self.last_fired_ms = now_ms;
            return true;
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of registered tasks (stack-allocated).
pub const MAX_TASKS: usize = 8;

/// Ids that came due during one [`Scheduler::tick`].
pub type Fired = Vec<TaskId, MAX_TASKS>;

/// The scheduler engine.
pub struct Scheduler {
    tasks: Vec<(TaskId, Task), MAX_TASKS>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task, initially disabled.
    pub fn register(
        &mut self,
        id: TaskId,
        interval_ms: u32,
        now_ms: u32,
    ) -> Result<(), SchedulerError> {
        if self.find(id).is_some() {
            return Err(SchedulerError::Duplicate);
        }
        self.tasks
            .push((id, Task::new(interval_ms, now_ms)))
            .map_err(|_| SchedulerError::Full)?;
        debug!("Scheduler: registered {:?} ({} ms)", id, interval_ms);
        Ok(())
    }

    /// Enable a task (see [`Task::enable`]).  Unknown ids are ignored.
    pub fn enable(&mut self, id: TaskId, now_ms: u32) {
        if let Some(task) = self.find_mut(id) {
            task.enable(now_ms);
        }
    }

    pub fn disable(&mut self, id: TaskId) {
        if let Some(task) = self.find_mut(id) {
            task.disable();
        }
    }

    pub fn set_interval(&mut self, id: TaskId, interval_ms: u32) {
        if let Some(task) = self.find_mut(id) {
            task.set_interval(interval_ms);
        }
    }

    pub fn is_enabled(&self, id: TaskId) -> bool {
        self.find(id).is_some_and(Task::is_enabled)
    }

    pub fn interval_ms(&self, id: TaskId) -> Option<u32> {
        self.find(id).map(Task::interval_ms)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.find(id)
    }

    /// Poll every task once against `now_ms`.  Call once per loop pass.
    pub fn tick(&mut self, now_ms: u32) -> Fired {
        let mut fired = Fired::new();
        for (id, task) in &mut self.tasks {
            if task.tick(now_ms) {
                // Capacity matches the registry, so this cannot overflow.
                let _ = fired.push(*id);
            }
        }
        fired
    }

    /// Number of enabled tasks.
    pub fn enabled_count(&self) -> usize {
        self.tasks.iter().filter(|(_, t)| t.is_enabled()).count()
    }

    fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|(i, _)| *i == id).map(|(_, t)| t)
    }

    fn find_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|(i, _)| *i == id).map(|(_, t)| t)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
