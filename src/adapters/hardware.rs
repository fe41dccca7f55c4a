//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the pan/tilt head, laser, mode dial and missile switch, exposing
//! them through [`ActuatorPort`] and [`InputPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying drivers use the `hw_init` simulation.

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{ActuatorPort, InputPort};
use crate::config::SystemConfig;
use crate::drivers::laser::LaserDriver;
use crate::drivers::pan_tilt::PanTiltHead;
use crate::drivers::pin::{HwAdc, HwDelay, HwInputPin, HwOutputPin};
use crate::drivers::switch::MissileSwitch;
use crate::motion::Heading;
use crate::pins;
use crate::sensors::dial::{Mode, ModeDial};

pub type BoardDial = ModeDial<HwAdc, HwDelay>;
pub type BoardSwitch = MissileSwitch<HwInputPin, HwOutputPin>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    head: PanTiltHead,
    laser: LaserDriver,
    dial: BoardDial,
    switch: BoardSwitch,
    clock: Esp32TimeAdapter,
}

impl HardwareAdapter {
    pub fn new(
        head: PanTiltHead,
        laser: LaserDriver,
        dial: BoardDial,
        switch: BoardSwitch,
        clock: Esp32TimeAdapter,
    ) -> Self {
        Self {
            head,
            laser,
            dial,
            switch,
            clock,
        }
    }

    /// Wire every driver to its pin from [`pins`].
    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            PanTiltHead::new(),
            LaserDriver::new(pins::LASER_GPIO),
            ModeDial::new(HwAdc::new(pins::DIAL_ADC_CHANNEL), HwDelay, config.dial),
            MissileSwitch::new(
                HwInputPin::new(pins::SWITCH_GPIO),
                HwOutputPin::new(pins::SWITCH_LED_GPIO),
                config.switch,
            ),
            Esp32TimeAdapter::new(),
        )
    }

    pub fn clock(&self) -> &Esp32TimeAdapter {
        &self.clock
    }

    pub fn switch_mut(&mut self) -> &mut BoardSwitch {
        &mut self.switch
    }

    pub fn head(&self) -> &PanTiltHead {
        &self.head
    }

    pub fn laser(&self) -> &LaserDriver {
        &self.laser
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn move_by(&mut self, speed: u16, heading: Heading) -> Heading {
        self.head.step(speed, heading)
    }

    fn set_laser(&mut self, on: bool) {
        self.laser.set(on);
    }

    fn set_sleep_indicator(&mut self, on: bool) {
        self.switch.set_led(on);
    }

    fn park(&mut self) {
        self.laser.set(false);
        self.head.centre();
    }
}

// ── InputPort implementation ──────────────────────────────────

impl InputPort for HardwareAdapter {
    fn read_mode(&mut self) -> Mode {
        self.dial.update()
    }

    fn read_sleep_switch(&mut self) -> bool {
        self.switch.read(&self.clock)
    }
}
