//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            AppEvent::ActivityChanged { from, to } => {
                info!(
                    "STATE | {:?} -> {:?} | laser={}",
                    from,
                    to,
                    if to.laser_on() { "ON" } else { "OFF" }
                );
            }
            AppEvent::IntervalResampled { task, interval_ms } => {
                debug!("TIMER | {:?} next in {} ms", task, interval_ms);
            }
            AppEvent::SleepTimerArmed(armed) => {
                info!("SLEEP | timer {}", if *armed { "armed" } else { "disarmed" });
            }
        }
    }
}
