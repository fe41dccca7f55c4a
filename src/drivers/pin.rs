//! `embedded-hal` wrappers over the raw `hw_init` accessors.
//!
//! The switch and dial drivers are generic over `embedded-hal` traits so
//! they can be tested with scripted pins.  These are the concrete types
//! used on the board (and, on the host, against the `hw_init` simulation).

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::drivers::hw_init;
use crate::sensors::dial::{AdcReference, AnalogInput};

// ── Digital ───────────────────────────────────────────────────

/// A GPIO configured as input by `hw_init`.
#[derive(Debug, Clone, Copy)]
pub struct HwInputPin {
    gpio: i32,
}

impl HwInputPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for HwInputPin {
    type Error = Infallible;
}

impl InputPin for HwInputPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}

/// A GPIO configured as output by `hw_init`.
#[derive(Debug, Clone, Copy)]
pub struct HwOutputPin {
    gpio: i32,
}

impl HwOutputPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for HwOutputPin {
    type Error = Infallible;
}

impl OutputPin for HwOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Busy-wait for microsecond delays, FreeRTOS sleep for milliseconds.
/// A no-op on the host so dial updates in tests are instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct HwDelay;

impl DelayNs for HwDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // SAFETY: ROM busy-wait; no preconditions.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1_000)) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, _ns: u32) {}

    #[cfg(target_os = "espidf")]
    fn delay_us(&mut self, us: u32) {
        // SAFETY: as above.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(us) };
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_us(&mut self, _us: u32) {}

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, _ms: u32) {}
}

// ── Analog ────────────────────────────────────────────────────

/// One ADC1 channel with a switchable input range.
#[derive(Debug, Clone, Copy)]
pub struct HwAdc {
    channel: u32,
}

impl HwAdc {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AnalogInput for HwAdc {
    fn read_raw(&mut self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    fn set_reference(&mut self, reference: AdcReference) {
        hw_init::adc1_set_low_range(self.channel, reference == AdcReference::Internal);
    }
}
