//! One-shot hardware peripheral initialization.
//!
//! Configures the dial ADC channel, GPIO directions, and the servo LEDC
//! timer/channels using raw ESP-IDF sys calls. Called once from `main()`
//! before the control loop starts.
//!
//! On the host every accessor is backed by atomics so drivers and tests
//! can run without a board: `sim_set_gpio` / `sim_set_adc` inject input
//! levels, and outputs written through `gpio_write` / `ledc_set` can be
//! read back.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

pub const LEDC_CH_PAN: u32 = 0;
pub const LEDC_CH_TILT: u32 = 1;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop ADC path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    unsafe { adc1_configure(pins::DIAL_ADC_CHANNEL, false) }?;

    info!("hw_init: ADC1 configured (CH{}=dial)", pins::DIAL_ADC_CHANNEL);
    Ok(())
}

/// (Re)configure a channel.  `low_range` selects 0 dB attenuation, the
/// closest the S3 has to a low internal reference; otherwise full range.
#[cfg(target_os = "espidf")]
unsafe fn adc1_configure(channel: u32, low_range: bool) -> Result<(), HwInitError> {
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: if low_range { adc_atten_t_ADC_ATTEN_DB_0 } else { adc_atten_t_ADC_ATTEN_DB_12 },
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_set_low_range(channel: u32, low_range: bool) {
    // SAFETY: adc1_handle() contract — single-threaded control-loop access only.
    if let Err(e) = unsafe { adc1_configure(channel, low_range) } {
        log::warn!("hw_init: ADC range switch failed: {}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_set_low_range(_channel: u32, low_range: bool) {
    sim::ADC_LOW_RANGE.store(low_range, core::sync::atomic::Ordering::Relaxed);
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    sim::ADC_RAW.load(core::sync::atomic::Ordering::Relaxed)
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::SWITCH_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    // Laser starts dark (LOW), switch LED starts dark (HIGH, active-low).
    let outputs = [(pins::LASER_GPIO, 0), (pins::SWITCH_LED_GPIO, 1)];

    for &(pin, level) in &outputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, level) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Control-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

// ── LEDC PWM (servos) ────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    let channels = [
        (LEDC_CH_PAN, pins::PAN_SERVO_GPIO),
        (LEDC_CH_TILT, pins::TILT_SERVO_GPIO),
    ];
    for &(channel, gpio) in &channels {
        let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        }) };
        if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }
    }

    info!("hw_init: LEDC configured (pan=CH0, tilt=CH1, {} Hz)", pins::SERVO_PWM_FREQ_HZ);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) {
    // SAFETY: LEDC channels were configured in init_ledc(); duty register
    // writes are race-free since only the control loop calls this.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(channel: u32, duty: u32) {
    sim::set_duty(channel, duty);
}

// ── Host simulation ──────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub use sim::{sim_duty, sim_set_adc, sim_set_gpio};

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU64, Ordering};

    /// One bit per GPIO.  Everything idles HIGH, as if pulled up.
    static LEVELS: AtomicU64 = AtomicU64::new(u64::MAX);
    pub(super) static ADC_RAW: AtomicU16 = AtomicU16::new(0);
    pub(super) static ADC_LOW_RANGE: AtomicBool = AtomicBool::new(false);
    static DUTY: [AtomicU32; 2] = [AtomicU32::new(0), AtomicU32::new(0)];

    pub(super) fn level(pin: i32) -> bool {
        LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
    }

    pub(super) fn set_level(pin: i32, high: bool) {
        if high {
            LEVELS.fetch_or(1u64 << pin, Ordering::Relaxed);
        } else {
            LEVELS.fetch_and(!(1u64 << pin), Ordering::Relaxed);
        }
    }

    pub(super) fn set_duty(channel: u32, duty: u32) {
        if let Some(slot) = DUTY.get(channel as usize) {
            slot.store(duty, Ordering::Relaxed);
        }
    }

    /// Drive a simulated input pin.
    pub fn sim_set_gpio(pin: i32, high: bool) {
        set_level(pin, high);
    }

    /// Set the raw count the simulated ADC returns.
    pub fn sim_set_adc(raw: u16) {
        ADC_RAW.store(raw, Ordering::Relaxed);
    }

    /// Last duty written to a simulated LEDC channel.
    pub fn sim_duty(channel: u32) -> u32 {
        DUTY.get(channel as usize)
            .map_or(0, |slot| slot.load(Ordering::Relaxed))
    }
}
