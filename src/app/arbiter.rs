//! Behaviour arbiter: decides what the toy does from moment to moment.
//!
//! [`BehaviorArbiter`] owns the scheduler, the speed chain and the PRNG.
//! The dial decides which timers are armed; each timer firing re-samples
//! its own next interval (Gaussian) and, for movement, the next speed
//! (Markov).  The result is handed to the [`ActuatorPort`].
//!
//! ```text
//!                DialPoll ─▶ mode ─┐
//!              SwitchPoll ─▶ arm ──┤
//!                                  ▼
//!   OFF ──▶ Idle          CONTINUOUS / INTERMITTENT ──▶ Chasing
//!
//!   Chasing ──[Pause]──▶ Paused  ──[Resume]──▶ Chasing
//!   Chasing ──[Rest]───▶ Resting ──[Resume]──▶ Chasing
//!   Paused  ──[Rest]───▶ Resting
//!   Chasing/Paused/Resting ──[Cycle]──▶ CycledOff ──[Cycle]──▶ Chasing
//!                                       (INTERMITTENT only)
//!   any but Idle ──[Bedtime]──▶ Asleep ──[dial moved]──▶ (mode entry)
//! ```
//!
//! Only one behaviour transition is taken per control pass: once a
//! handler changes activity, the remaining behaviour timers that came due
//! in the same pass are dropped.  The transition has already re-armed
//! whichever of them still matter.

use log::{debug, info, trace};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::SystemConfig;
use crate::error::Result;
use crate::motion::Heading;
use crate::motion::gauss;
use crate::motion::markov::SpeedChain;
use crate::scheduler::{Scheduler, TaskId};
use crate::sensors::dial::Mode;

use super::events::{Activity, AppEvent};
use super::ports::{ActuatorPort, EventSink, InputPort};

const MS_PER_SEC: u32 = 1_000;
const MS_PER_MIN: u32 = 60_000;

/// Registration (and therefore dispatch) order.  Inputs first, so a dial
/// change is seen before any behaviour timer that fired in the same pass.
const TASK_ORDER: [TaskId; 8] = [
    TaskId::DialPoll,
    TaskId::SwitchPoll,
    TaskId::Bedtime,
    TaskId::Cycle,
    TaskId::Rest,
    TaskId::Pause,
    TaskId::Resume,
    TaskId::Move,
];

/// Timers that only run while the toy is doing something.
const BEHAVIOUR_TASKS: [TaskId; 6] = [
    TaskId::Bedtime,
    TaskId::Cycle,
    TaskId::Rest,
    TaskId::Pause,
    TaskId::Resume,
    TaskId::Move,
];

/// Point-in-time view for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterStatus {
    pub mode: Mode,
    pub activity: Activity,
    pub speed: u16,
    pub heading: Heading,
    pub sleep_armed: bool,
}

/// Seed the behaviour PRNG from the configured seed, or from system
/// entropy when none is set.
pub fn rng_from_config(config: &SystemConfig) -> SmallRng {
    match config.rng_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

pub struct BehaviorArbiter {
    config: SystemConfig,
    scheduler: Scheduler,
    chain: SpeedChain,
    rng: SmallRng,
    mode: Mode,
    activity: Activity,
    heading: Heading,
    speed: u16,
    sleep_armed: bool,
}

impl BehaviorArbiter {
    /// Validate the configuration and register every timer (all disabled).
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, chain: SpeedChain, rng: SmallRng) -> Result<Self> {
        config.validate()?;

        let mut scheduler = Scheduler::new();
        for id in TASK_ORDER {
            let interval = match id {
                TaskId::DialPoll => config.dial_poll_interval_ms,
                TaskId::SwitchPoll => config.switch_poll_interval_ms,
                TaskId::Move => config.move_interval_ms,
                // Re-sampled whenever they are armed.
                _ => u32::MAX,
            };
            scheduler.register(id, interval, 0)?;
        }

        let speed = chain.current_speed();
        Ok(Self {
            config,
            scheduler,
            chain,
            rng,
            mode: Mode::Off,
            activity: Activity::Idle,
            heading: Heading::default(),
            speed,
            sleep_armed: false,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Read both controls, enter the dialled mode and start polling.
    pub fn start<H, S>(&mut self, now_ms: u32, hw: &mut H, sink: &mut S)
    where
        H: ActuatorPort + InputPort,
        S: EventSink,
    {
        self.sleep_armed = hw.read_sleep_switch();
        hw.set_sleep_indicator(self.sleep_armed);

        let mode = hw.read_mode();
        self.apply_mode(mode, now_ms, hw, sink);

        self.scheduler.enable(TaskId::DialPoll, now_ms);
        self.scheduler.enable(TaskId::SwitchPoll, now_ms);

        sink.emit(&AppEvent::Started(mode));
        info!(
            "Arbiter started: mode={:?} activity={:?} sleep_armed={}",
            mode, self.activity, self.sleep_armed
        );
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Poll every timer once and act on the ones that came due.
    pub fn tick<H, S>(&mut self, now_ms: u32, hw: &mut H, sink: &mut S)
    where
        H: ActuatorPort + InputPort,
        S: EventSink,
    {
        let fired = self.scheduler.tick(now_ms);
        let mut transitioned = false;

        for id in fired {
            let is_input = matches!(id, TaskId::DialPoll | TaskId::SwitchPoll);
            if transitioned && !is_input {
                trace!("Arbiter: dropping {:?} after transition", id);
                continue;
            }
            transitioned |= self.dispatch(id, now_ms, hw, sink);
        }
    }

    /// Run one timer's handler.  Returns `true` if the activity changed.
    fn dispatch<H, S>(&mut self, id: TaskId, now_ms: u32, hw: &mut H, sink: &mut S) -> bool
    where
        H: ActuatorPort + InputPort,
        S: EventSink,
    {
        match id {
            TaskId::Move => {
                self.on_move(hw);
                false
            }
            TaskId::Pause => self.on_pause(now_ms, sink),
            TaskId::Resume => self.on_resume(now_ms, hw, sink),
            TaskId::Rest => self.on_rest(now_ms, hw, sink),
            TaskId::Cycle => self.on_cycle(now_ms, hw, sink),
            TaskId::Bedtime => self.on_bedtime(hw, sink),
            TaskId::DialPoll => self.on_dial_poll(now_ms, hw, sink),
            TaskId::SwitchPoll => {
                self.on_switch_poll(now_ms, hw, sink);
                false
            }
        }
    }

    // ── Timer handlers ────────────────────────────────────────

    fn on_move(&mut self, hw: &mut impl ActuatorPort) {
        if self.activity != Activity::Chasing {
            return;
        }
        self.speed = self.chain.next_speed(&mut self.rng);
        let turned = self
            .heading
            .maybe_turn(&mut self.rng, self.config.direction_change_percent);
        let heading = self.heading;
        self.heading = hw.move_by(self.speed, heading);
        trace!(
            "Move: speed={} heading=({}, {}){}{}",
            self.speed,
            heading.pan,
            heading.tilt,
            if turned { " turned" } else { "" },
            if self.heading != heading { " bounced" } else { "" }
        );
    }

    fn on_pause(&mut self, now_ms: u32, sink: &mut impl EventSink) -> bool {
        if self.activity != Activity::Chasing {
            return false;
        }
        self.scheduler.disable(TaskId::Move);
        self.scheduler.disable(TaskId::Pause);

        let hold = gauss::sample_ms(
            &mut self.rng,
            f64::from(self.config.pause_hold_mean_secs),
            self.config.pause_hold_variance,
            MS_PER_SEC,
        );
        self.arm_fresh(TaskId::Resume, hold, now_ms);
        self.resample_pause(sink);

        // Laser stays lit, so no actuator call is needed.
        self.activity_to(Activity::Paused, sink);
        debug!("Pause: holding for {} ms", hold);
        true
    }

    fn on_rest(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !matches!(self.activity, Activity::Chasing | Activity::Paused) {
            return false;
        }
        self.scheduler.disable(TaskId::Move);
        self.scheduler.disable(TaskId::Pause);
        self.scheduler.disable(TaskId::Rest);

        let hold = gauss::sample_ms(
            &mut self.rng,
            f64::from(self.config.rest_hold_mean_secs),
            self.config.rest_hold_variance,
            MS_PER_SEC,
        );
        self.arm_fresh(TaskId::Resume, hold, now_ms);
        self.resample_rest(sink);

        self.enter(Activity::Resting, hw, sink);
        debug!("Rest: laser off for {} ms", hold);
        true
    }

    fn on_resume(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if !matches!(self.activity, Activity::Paused | Activity::Resting) {
            return false;
        }
        self.scheduler.disable(TaskId::Resume);
        // Rest keeps its phase if it was still counting down through a pause.
        self.scheduler.enable(TaskId::Move, now_ms);
        self.scheduler.enable(TaskId::Pause, now_ms);
        self.scheduler.enable(TaskId::Rest, now_ms);

        self.enter(Activity::Chasing, hw, sink);
        true
    }

    fn on_cycle(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if self.mode != Mode::Intermittent {
            return false;
        }
        match self.activity {
            Activity::CycledOff => {
                let on = self.on_phase_ms();
                self.scheduler.set_interval(TaskId::Cycle, on);
                self.arm_chase(now_ms, sink);
                self.enter(Activity::Chasing, hw, sink);
                true
            }
            Activity::Chasing | Activity::Paused | Activity::Resting => {
                for id in [TaskId::Move, TaskId::Pause, TaskId::Rest, TaskId::Resume] {
                    self.scheduler.disable(id);
                }
                let off = gauss::sample_ms(
                    &mut self.rng,
                    f64::from(self.config.intermittent_off_minutes),
                    self.config.intermittent_off_variance,
                    MS_PER_MIN,
                );
                self.scheduler.set_interval(TaskId::Cycle, off);
                sink.emit(&AppEvent::IntervalResampled {
                    task: TaskId::Cycle,
                    interval_ms: off,
                });
                info!("Cycle: laser off for {} s", off / MS_PER_SEC);

                self.enter(Activity::CycledOff, hw, sink);
                true
            }
            Activity::Idle | Activity::Asleep => false,
        }
    }

    fn on_bedtime(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) -> bool {
        if matches!(self.activity, Activity::Idle | Activity::Asleep) {
            return false;
        }
        self.disable_behaviour();
        info!("Bedtime: laser off until the dial is moved");
        self.enter(Activity::Asleep, hw, sink);
        true
    }

    fn on_dial_poll<H, S>(&mut self, now_ms: u32, hw: &mut H, sink: &mut S) -> bool
    where
        H: ActuatorPort + InputPort,
        S: EventSink,
    {
        let mode = hw.read_mode();
        if mode == self.mode {
            return false;
        }
        sink.emit(&AppEvent::ModeChanged {
            from: self.mode,
            to: mode,
        });
        info!("Dial: {:?} -> {:?}", self.mode, mode);
        self.apply_mode(mode, now_ms, hw, sink);
        true
    }

    fn on_switch_poll<H, S>(&mut self, now_ms: u32, hw: &mut H, sink: &mut S)
    where
        H: ActuatorPort + InputPort,
        S: EventSink,
    {
        let armed = hw.read_sleep_switch();
        if armed == self.sleep_armed {
            return;
        }
        self.sleep_armed = armed;
        hw.set_sleep_indicator(armed);
        sink.emit(&AppEvent::SleepTimerArmed(armed));

        if !armed {
            self.scheduler.disable(TaskId::Bedtime);
            info!("Sleep timer disarmed");
        } else if !matches!(self.activity, Activity::Idle | Activity::Asleep) {
            self.arm_bedtime(now_ms);
        }
    }

    // ── Mode entry ────────────────────────────────────────────

    fn apply_mode(
        &mut self,
        mode: Mode,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.mode = mode;
        self.disable_behaviour();

        if mode == Mode::Off {
            self.enter(Activity::Idle, hw, sink);
            return;
        }

        self.arm_chase(now_ms, sink);
        if mode == Mode::Intermittent {
            let on = self.on_phase_ms();
            self.arm_fresh(TaskId::Cycle, on, now_ms);
        }
        if self.sleep_armed {
            self.arm_bedtime(now_ms);
        }
        self.enter(Activity::Chasing, hw, sink);
    }

    /// Fresh pause/rest countdowns plus movement.
    fn arm_chase(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.resample_pause(sink);
        self.resample_rest(sink);
        self.scheduler.enable(TaskId::Pause, now_ms);
        self.scheduler.enable(TaskId::Rest, now_ms);
        self.scheduler.enable(TaskId::Move, now_ms);
    }

    fn arm_bedtime(&mut self, now_ms: u32) {
        let ms = u32::from(self.config.minutes_before_sleep).saturating_mul(MS_PER_MIN);
        self.arm_fresh(TaskId::Bedtime, ms, now_ms);
        info!("Sleep timer armed: {} min", self.config.minutes_before_sleep);
    }

    // ── Helpers ───────────────────────────────────────────────

    /// Set an interval and restart the countdown from `now_ms`, even if
    /// the task was already running.
    fn arm_fresh(&mut self, id: TaskId, interval_ms: u32, now_ms: u32) {
        self.scheduler.disable(id);
        self.scheduler.set_interval(id, interval_ms);
        self.scheduler.enable(id, now_ms);
    }

    fn disable_behaviour(&mut self) {
        for id in BEHAVIOUR_TASKS {
            self.scheduler.disable(id);
        }
    }

    fn on_phase_ms(&self) -> u32 {
        u32::from(self.config.intermittent_on_minutes).saturating_mul(MS_PER_MIN)
    }

    fn resample_pause(&mut self, sink: &mut impl EventSink) {
        let ms = gauss::sample_ms(
            &mut self.rng,
            f64::from(self.config.pause_mean_secs),
            self.config.pause_variance,
            MS_PER_SEC,
        );
        self.resampled(TaskId::Pause, ms, sink);
        debug!("Next pause in {} s", ms / MS_PER_SEC);
    }

    fn resample_rest(&mut self, sink: &mut impl EventSink) {
        let ms = gauss::sample_ms(
            &mut self.rng,
            f64::from(self.config.rest_mean_secs),
            self.config.rest_variance,
            MS_PER_SEC,
        );
        self.resampled(TaskId::Rest, ms, sink);
        debug!("Next rest in {} s", ms / MS_PER_SEC);
    }

    fn resampled(&mut self, task: TaskId, interval_ms: u32, sink: &mut impl EventSink) {
        self.scheduler.set_interval(task, interval_ms);
        sink.emit(&AppEvent::IntervalResampled { task, interval_ms });
    }

    /// Switch activity and drive the laser to match.
    fn enter(&mut self, to: Activity, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if matches!(to, Activity::Idle | Activity::Asleep) {
            hw.park();
        } else {
            hw.set_laser(to.laser_on());
        }
        self.activity_to(to, sink);
    }

    fn activity_to(&mut self, to: Activity, sink: &mut impl EventSink) {
        let from = self.activity;
        if from != to {
            self.activity = to;
            sink.emit(&AppEvent::ActivityChanged { from, to });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn sleep_armed(&self) -> bool {
        self.sleep_armed
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn chain(&self) -> &SpeedChain {
        &self.chain
    }

    pub fn status(&self) -> ArbiterStatus {
        ArbiterStatus {
            mode: self.mode,
            activity: self.activity,
            speed: self.speed,
            heading: self.heading,
            sleep_armed: self.sleep_armed,
        }
    }
}
