//! Integration tests for the dial → scheduler → arbiter → actuators pipeline.
//!
//! Every test drives the arbiter with a synthetic millisecond clock in
//! 10 ms steps, so hours of behaviour run in well under a second.

use crate::mock_hw::{ActuatorCall, MockHardware, RecordingSink};

use laserchase::app::arbiter::{BehaviorArbiter, rng_from_config};
use laserchase::app::events::{Activity, AppEvent};
use laserchase::config::{SPEED_LADDER, SystemConfig};
use laserchase::motion::markov::default_speed_chain;
use laserchase::scheduler::TaskId;
use laserchase::sensors::dial::Mode;

const STEP: usize = 10;
const MIN: u32 = 60_000;

fn make_arbiter(seed: u64) -> BehaviorArbiter {
    let config = SystemConfig {
        rng_seed: Some(seed),
        ..SystemConfig::default()
    };
    let rng = rng_from_config(&config);
    BehaviorArbiter::new(config, default_speed_chain().unwrap(), rng).unwrap()
}

fn started(mode: Mode, switch_on: bool) -> (BehaviorArbiter, MockHardware, RecordingSink) {
    let mut arb = make_arbiter(7);
    let mut hw = MockHardware::new(mode, switch_on);
    let mut sink = RecordingSink::new();
    arb.start(0, &mut hw, &mut sink);
    (arb, hw, sink)
}

/// Tick every 10 ms over `(from, to]`.
fn run(arb: &mut BehaviorArbiter, hw: &mut MockHardware, sink: &mut RecordingSink, from: u32, to: u32) {
    for now in (from + STEP as u32..=to).step_by(STEP) {
        arb.tick(now, hw, sink);
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn off_dial_idles_with_laser_dark() {
    let (mut arb, mut hw, mut sink) = started(Mode::Off, false);

    assert_eq!(arb.activity(), Activity::Idle);
    assert_eq!(sink.events, vec![AppEvent::Started(Mode::Off)]);

    run(&mut arb, &mut hw, &mut sink, 0, 10 * MIN);
    assert_eq!(hw.moves(), 0);
    assert!(!hw.laser_on());
    assert_eq!(arb.activity(), Activity::Idle);
    // Dial still polled every 2 s.
    assert_eq!(hw.mode_reads, 1 + 300);
}

#[test]
fn continuous_dial_starts_chasing() {
    let (arb, hw, sink) = started(Mode::Continuous, false);

    assert_eq!(arb.mode(), Mode::Continuous);
    assert_eq!(arb.activity(), Activity::Chasing);
    assert!(hw.laser_on());
    assert!(sink.contains(&AppEvent::ActivityChanged {
        from: Activity::Idle,
        to: Activity::Chasing,
    }));
    assert!(sink.last_interval(TaskId::Pause).is_some());
    assert!(sink.last_interval(TaskId::Rest).is_some());
    assert!(!arb.scheduler().is_enabled(TaskId::Cycle));
    assert!(!arb.scheduler().is_enabled(TaskId::Bedtime));
}

// ── Movement, pauses, rests ───────────────────────────────────

#[test]
fn moves_use_ladder_speeds() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    run(&mut arb, &mut hw, &mut sink, 0, 1_000);

    let ladder: Vec<u16> = SPEED_LADDER.iter().map(|r| r.0).collect();
    assert!(hw.moves() > 0);
    for speed in hw.speeds() {
        assert!(ladder.contains(&speed), "speed {speed} not on the ladder");
    }
    assert_eq!(arb.status().speed, *hw.speeds().last().unwrap());
}

#[test]
fn pauses_hold_still_with_laser_on() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    let mut paused_ticks = 0;

    for now in (STEP..=2 * MIN as usize).step_by(STEP) {
        let before = arb.activity();
        let moves = hw.moves();
        arb.tick(now as u32, &mut hw, &mut sink);

        if before == Activity::Paused && arb.activity() == Activity::Paused {
            paused_ticks += 1;
            assert_eq!(hw.moves(), moves, "moved while paused at {now} ms");
            assert!(hw.laser_on(), "laser dark while paused at {now} ms");
        }
    }

    assert!(paused_ticks > 0);
    assert!(sink.contains(&AppEvent::ActivityChanged {
        from: Activity::Paused,
        to: Activity::Chasing,
    }));
}

#[test]
fn rests_turn_the_laser_off() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    let mut rest_ticks = 0;

    for now in (STEP..=30 * MIN as usize).step_by(STEP) {
        let moves = hw.moves();
        arb.tick(now as u32, &mut hw, &mut sink);

        if arb.activity() == Activity::Resting {
            rest_ticks += 1;
            assert!(!hw.laser_on(), "laser lit while resting at {now} ms");
            assert_eq!(hw.moves(), moves);
        }
    }

    assert!(rest_ticks > 0);
    assert!(sink.contains(&AppEvent::ActivityChanged {
        from: Activity::Resting,
        to: Activity::Chasing,
    }));
}

#[test]
fn resampled_intervals_respect_the_floor() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    run(&mut arb, &mut hw, &mut sink, 0, 20 * MIN);

    let pauses: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::IntervalResampled { task: TaskId::Pause, interval_ms } => Some(*interval_ms),
            _ => None,
        })
        .collect();
    assert!(pauses.len() > 10);
    assert!(pauses.iter().all(|&ms| ms >= 2_000 && ms % 1_000 == 0));
}

// ── Intermittent cycling ──────────────────────────────────────

#[test]
fn intermittent_cycles_off_then_back_on() {
    let (mut arb, mut hw, mut sink) = started(Mode::Intermittent, false);
    assert!(arb.scheduler().is_enabled(TaskId::Cycle));

    let on_phase = 15 * MIN;
    run(&mut arb, &mut hw, &mut sink, 0, on_phase - 10);
    assert_ne!(arb.activity(), Activity::CycledOff);

    run(&mut arb, &mut hw, &mut sink, on_phase - 10, on_phase);
    assert_eq!(arb.activity(), Activity::CycledOff);
    assert!(!hw.laser_on());

    let off_phase = sink.last_interval(TaskId::Cycle).unwrap();
    assert!((50 * MIN..=70 * MIN).contains(&off_phase), "off phase {off_phase} ms");

    let moves = hw.moves();
    run(&mut arb, &mut hw, &mut sink, on_phase, on_phase + off_phase - 10);
    assert_eq!(arb.activity(), Activity::CycledOff);
    assert_eq!(hw.moves(), moves, "no movement while cycled off");

    // The tick that lands on or after the deadline turns it back on.
    run(&mut arb, &mut hw, &mut sink, on_phase + off_phase - 10, on_phase + off_phase + 10);
    assert_eq!(arb.activity(), Activity::Chasing);
    assert!(hw.laser_on());
}

#[test]
fn continuous_never_cycles() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    run(&mut arb, &mut hw, &mut sink, 0, 90 * MIN);
    assert!(!sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ActivityChanged { to: Activity::CycledOff, .. }
    )));
}

// ── Sleep timer ───────────────────────────────────────────────

#[test]
fn armed_switch_puts_toy_to_sleep_until_dial_moves() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, true);
    assert!(arb.sleep_armed());
    assert_eq!(hw.calls.first(), Some(&ActuatorCall::Indicator(true)));

    let bedtime = 30 * MIN;
    run(&mut arb, &mut hw, &mut sink, 0, bedtime - 10);
    assert_ne!(arb.activity(), Activity::Asleep);

    run(&mut arb, &mut hw, &mut sink, bedtime - 10, bedtime);
    assert_eq!(arb.activity(), Activity::Asleep);
    assert_eq!(hw.last_call(), Some(&ActuatorCall::Park));

    // Same dial position: stays asleep.
    let moves = hw.moves();
    run(&mut arb, &mut hw, &mut sink, bedtime, 2 * bedtime);
    assert_eq!(arb.activity(), Activity::Asleep);
    assert_eq!(hw.moves(), moves);
    assert_eq!(arb.scheduler().enabled_count(), 2, "only input polling runs");

    // Moving the dial wakes it.
    hw.mode = Mode::Intermittent;
    run(&mut arb, &mut hw, &mut sink, 2 * bedtime, 2 * bedtime + 2_000);
    assert!(sink.contains(&AppEvent::ModeChanged {
        from: Mode::Continuous,
        to: Mode::Intermittent,
    }));
    assert_eq!(arb.activity(), Activity::Chasing);
    assert!(arb.scheduler().is_enabled(TaskId::Bedtime), "still armed");
}

#[test]
fn arming_mid_run_starts_the_countdown() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    run(&mut arb, &mut hw, &mut sink, 0, 10_000);

    hw.switch_on = true;
    run(&mut arb, &mut hw, &mut sink, 10_000, 10_250);
    assert!(sink.contains(&AppEvent::SleepTimerArmed(true)));
    assert!(hw.indicator_on());

    let bedtime = 10_250 + 30 * MIN;
    run(&mut arb, &mut hw, &mut sink, 10_250, bedtime - 10);
    assert_ne!(arb.activity(), Activity::Asleep);
    run(&mut arb, &mut hw, &mut sink, bedtime - 10, bedtime);
    assert_eq!(arb.activity(), Activity::Asleep);
}

#[test]
fn disarming_cancels_bedtime() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, true);
    run(&mut arb, &mut hw, &mut sink, 0, MIN);

    hw.switch_on = false;
    run(&mut arb, &mut hw, &mut sink, MIN, 90 * MIN);

    assert!(sink.contains(&AppEvent::SleepTimerArmed(false)));
    assert!(!hw.indicator_on());
    assert!(!arb.sleep_armed());
    assert_ne!(arb.activity(), Activity::Asleep);
}

// ── Dial changes ──────────────────────────────────────────────

#[test]
fn turning_dial_off_parks_the_head() {
    let (mut arb, mut hw, mut sink) = started(Mode::Continuous, false);
    run(&mut arb, &mut hw, &mut sink, 0, 5_000);

    hw.mode = Mode::Off;
    run(&mut arb, &mut hw, &mut sink, 5_000, 6_000);
    assert_eq!(arb.activity(), Activity::Idle);
    assert_eq!(hw.last_call(), Some(&ActuatorCall::Park));

    let moves = hw.moves();
    run(&mut arb, &mut hw, &mut sink, 6_000, 60_000);
    assert_eq!(hw.moves(), moves);
}

#[test]
fn same_seed_same_behaviour() {
    let mut runs = Vec::new();
    for _ in 0..2 {
        let (mut arb, mut hw, mut sink) = started(Mode::Intermittent, true);
        run(&mut arb, &mut hw, &mut sink, 0, 20 * MIN);
        runs.push((hw.calls, sink.events));
    }
    assert_eq!(runs[0], runs[1]);
}
