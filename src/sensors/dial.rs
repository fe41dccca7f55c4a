//! Mode dial driver.
//!
//! The dial is a three-position resistor ladder read through the ADC.  A
//! single conversion is too noisy to trust, so every [`ModeDial::update`]
//! takes a burst of sub-samples through an exponential low-pass filter,
//! rescales the result to millivolts and classifies it against three
//! bands.
//!
//! ## Band priority
//!
//! OFF is checked first, then CONTINUOUS.  Anything else, including a
//! reading that matches no band at all, is INTERMITTENT: an unreadable
//! dial keeps the toy cycling rather than idling or running unattended
//! forever.
//!
//! ## Blocking
//!
//! An update blocks for roughly `samples / sample_rate_hz` seconds (300 ms
//! with the defaults).  The arbiter only calls it from the dial-poll task.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::config::{DialBands, DialConfig};

/// Operating mode selected on the dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Off,
    Continuous,
    Intermittent,
}

/// ADC reference selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcReference {
    /// Board default (full supply range).
    Default,
    /// Low-voltage internal reference, `DialConfig::reference_mv` full scale.
    Internal,
}

/// Raw analog input the dial is wired to.
pub trait AnalogInput {
    fn read_raw(&mut self) -> u16;
    fn set_reference(&mut self, reference: AdcReference);
}

// ---------------------------------------------------------------------------
// Low-pass filter
// ---------------------------------------------------------------------------

/// Single-pole exponential smoothing filter.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    alpha: f32,
    output: f32,
    last_input: u16,
}

impl LowPassFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            output: 0.0,
            last_input: 0,
        }
    }

    /// Restart the filter from a real reading instead of its old output.
    pub fn prime(&mut self, raw: u16) {
        self.last_input = raw;
        self.output = f32::from(raw);
    }

    /// Blend one sample in and return the new output.
    pub fn feed(&mut self, raw: u16) -> f32 {
        self.last_input = raw;
        self.output = self.alpha * f32::from(raw) + (1.0 - self.alpha) * self.output;
        self.output
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn last_input(&self) -> u16 {
        self.last_input
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Pause between sub-samples, in µs.  160 µs is the estimated cost of one
/// conversion plus loop overhead; never shorter than 100 µs.
pub fn sub_sample_delay_us(sample_rate_hz: u32) -> u32 {
    (1_000_000 / sample_rate_hz.max(1))
        .saturating_sub(160)
        .max(100)
}

/// Rescale a filtered count to millivolts against the internal reference,
/// rounding half up.
pub fn to_millivolts(filtered: f32, reference_mv: u32, adc_bits: u8) -> i32 {
    let counts = filtered.max(0.0) as u64;
    let full_scale = 1u64 << adc_bits;
    ((counts * u64::from(reference_mv) + full_scale / 2) >> adc_bits) as i32
}

/// Map a millivolt reading onto a mode.  First match wins: OFF, then
/// CONTINUOUS; everything else is INTERMITTENT.
pub fn classify(millivolts: i32, bands: &DialBands) -> Mode {
    let within = |centre: i32| (millivolts - centre).abs() <= bands.tolerance_mv;

    if within(bands.off_mv) {
        Mode::Off
    } else if within(bands.continuous_mv) {
        Mode::Continuous
    } else {
        // Matching the INTERMITTENT band and matching nothing end the same.
        Mode::Intermittent
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct ModeDial<A, D> {
    adc: A,
    delay: D,
    config: DialConfig,
    filter: LowPassFilter,
    mode: Mode,
    last_mv: i32,
}

impl<A: AnalogInput, D: DelayNs> ModeDial<A, D> {
    /// Reports INTERMITTENT until the first [`update`](Self::update).
    pub fn new(adc: A, delay: D, config: DialConfig) -> Self {
        Self {
            adc,
            delay,
            filter: LowPassFilter::new(config.alpha),
            config,
            mode: Mode::Intermittent,
            last_mv: 0,
        }
    }

    /// Sample, filter and classify the dial.
    pub fn update(&mut self) -> Mode {
        self.adc.set_reference(AdcReference::Internal);

        let raw = self.adc.read_raw();
        self.filter.prime(raw);

        let pause_us = sub_sample_delay_us(self.config.sample_rate_hz);
        for _ in 0..self.config.samples {
            self.delay.delay_us(pause_us);
            let raw = self.adc.read_raw();
            self.filter.feed(raw);
        }

        self.adc.set_reference(AdcReference::Default);

        // Integer truncation of the filter output happens before scaling.
        let filtered = self.filter.output().trunc();
        self.last_mv = to_millivolts(filtered, self.config.reference_mv, self.config.adc_bits);
        self.mode = classify(self.last_mv, &self.config.bands);

        debug!("Dial: {} mV -> {:?}", self.last_mv, self.mode);
        self.mode
    }

    /// Result of the last update.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last_millivolts(&self) -> i32 {
        self.last_mv
    }

    pub fn filter(&self) -> &LowPassFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedAdc {
        values: Vec<u16>,
        pos: usize,
        references: Vec<AdcReference>,
    }

    impl ScriptedAdc {
        fn constant(raw: u16) -> Self {
            Self::script(vec![raw])
        }

        fn script(values: Vec<u16>) -> Self {
            Self {
                values,
                pos: 0,
                references: Vec::new(),
            }
        }
    }

    impl AnalogInput for ScriptedAdc {
        fn read_raw(&mut self) -> u16 {
            let v = self.values[self.pos % self.values.len()];
            self.pos += 1;
            v
        }

        fn set_reference(&mut self, reference: AdcReference) {
            self.references.push(reference);
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_us: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += u64::from(ns) / 1000;
        }

        fn delay_us(&mut self, us: u32) {
            self.total_us += u64::from(us);
        }
    }

    fn dial(adc: ScriptedAdc) -> ModeDial<ScriptedAdc, CountingDelay> {
        ModeDial::new(adc, CountingDelay::default(), DialConfig::default())
    }

    #[test]
    fn continuous_centre_classifies_continuous() {
        let bands = DialBands::default();
        assert_eq!(classify(bands.continuous_mv, &bands), Mode::Continuous);
    }

    #[test]
    fn between_bands_falls_back_to_intermittent() {
        let bands = DialBands::default();
        let off_cont = (bands.off_mv + bands.continuous_mv) / 2;
        let cont_int = (bands.continuous_mv + bands.intermittent_mv) / 2;
        assert_eq!(classify(off_cont, &bands), Mode::Intermittent);
        assert_eq!(classify(cont_int, &bands), Mode::Intermittent);
        assert_eq!(classify(-5_000, &bands), Mode::Intermittent);
        assert_eq!(classify(50_000, &bands), Mode::Intermittent);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let bands = DialBands::default();
        assert_eq!(classify(bands.off_mv + bands.tolerance_mv, &bands), Mode::Off);
        assert_eq!(
            classify(bands.continuous_mv - bands.tolerance_mv, &bands),
            Mode::Continuous
        );
        assert_eq!(
            classify(bands.continuous_mv + bands.tolerance_mv + 1, &bands),
            Mode::Intermittent
        );
    }

    #[test]
    fn overlapping_bands_prefer_off_then_continuous() {
        let bands = DialBands {
            off_mv: 100,
            continuous_mv: 200,
            intermittent_mv: 300,
            tolerance_mv: 100,
        };
        assert_eq!(classify(150, &bands), Mode::Off);
        assert_eq!(classify(250, &bands), Mode::Continuous);
    }

    #[test]
    fn millivolt_rescale_rounds_half_up() {
        assert_eq!(to_millivolts(2048.0, 1100, 12), 550);
        assert_eq!(to_millivolts(4095.0, 1100, 12), 1100);
        assert_eq!(to_millivolts(0.0, 1100, 12), 0);
        // Ten-bit converter: 512 counts is half scale.
        assert_eq!(to_millivolts(512.0, 1100, 10), 550);
    }

    #[test]
    fn sub_sample_delay_has_a_floor() {
        assert_eq!(sub_sample_delay_us(1000), 840);
        assert_eq!(sub_sample_delay_us(9000), 100);
        assert_eq!(sub_sample_delay_us(0), 999_840);
    }

    #[test]
    fn filter_blends_towards_input() {
        let mut f = LowPassFilter::new(0.5);
        f.prime(0);
        assert!((f.feed(100) - 50.0).abs() < 1e-4);
        assert!((f.feed(100) - 75.0).abs() < 1e-4);
        assert_eq!(f.last_input(), 100);
        f.prime(10);
        assert!((f.output() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn update_classifies_steady_dial() {
        let mut d = dial(ScriptedAdc::constant(2048));
        assert_eq!(d.mode(), Mode::Intermittent, "default before first update");
        assert_eq!(d.update(), Mode::Continuous);
        assert_eq!(d.last_millivolts(), 550);
        assert_eq!(d.mode(), Mode::Continuous);
    }

    #[test]
    fn update_smooths_noise() {
        // ±300 counts of alternating noise around the continuous centre.
        let mut d = dial(ScriptedAdc::script(vec![2048, 2348, 1748]));
        assert_eq!(d.update(), Mode::Continuous);
    }

    #[test]
    fn update_switches_reference_and_restores_it() {
        let mut d = dial(ScriptedAdc::constant(100));
        d.update();
        assert_eq!(
            d.adc.references,
            vec![AdcReference::Internal, AdcReference::Default]
        );
        assert_eq!(d.adc.pos, 1 + usize::from(DialConfig::default().samples));
        assert_eq!(d.delay.total_us, 300 * 840);
    }

    #[test]
    fn update_reprimes_every_call() {
        let mut d = dial(ScriptedAdc::constant(0));
        assert_eq!(d.update(), Mode::Off);
        d.adc = ScriptedAdc::constant(3724); // ~1000 mV
        assert_eq!(d.update(), Mode::Intermittent);
        assert_eq!(d.last_millivolts(), 1000);
    }
}
