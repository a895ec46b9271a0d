//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the host binary routes them through
//! `tracing-subscriber`).  A dashboard or MQTT adapter would implement
//! the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
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
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C | H={:.1}% | gas={}ppm | status={}",
                    t.temperature, t.humidity, t.gas, t.status,
                );
            }
            AppEvent::TierChanged { from, to, reasons } => {
                info!("TIER  | {} -> {} | reasons={:?}", from, to, reasons);
            }
            AppEvent::Heartbeat { at_ms } => {
                warn!("ALERT | still critical at {} ms", at_ms);
            }
            AppEvent::AlertReset { tier, was_active } => {
                info!("ALERT | reset in {} (was_active={})", tier, was_active);
            }
            AppEvent::ReadFailure { channel } => {
                warn!("READ  | no data on {} channel, holding previous", channel);
            }
            AppEvent::ActuatorChanged { actuator, enabled } => {
                info!(
                    "ACT   | {} {}",
                    actuator,
                    if *enabled { "ON" } else { "OFF" }
                );
            }
            AppEvent::ActuatorCompleted { actuator, value } => {
                info!("ACT   | {} reached {:.1}, auto-off", actuator, value);
            }
            AppEvent::GasOverride { ppm: Some(ppm) } => {
                info!("GAS   | manual override {:.0} ppm", ppm);
            }
            AppEvent::GasOverride { ppm: None } => {
                info!("GAS   | live sensor");
            }
            AppEvent::Started { tier } => {
                info!("START | initial_tier={}", tier);
            }
        }
    }
}
