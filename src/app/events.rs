//! Outbound application events.
//!
//! The [`GuardService`](super::service::GuardService) emits these through
//! the [`EventSink`](super::ports::EventSink) port once a tick has
//! finished.  Adapters on the other side decide what to do with them:
//! log them, print telemetry as JSON, publish to a dashboard.

use serde::Serialize;

use crate::classifier::{Reasons, SeverityTier};
use crate::control::ActuatorKind;
use crate::sensors::{Channel, EnvironmentSample};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// The service has started (carries the initial tier).
    Started { tier: SeverityTier },

    /// Per-sensor-tick record for transport collaborators.
    Telemetry(TelemetryRecord),

    /// The tier changed.  `reasons` are the classifier's reasons for `to`.
    TierChanged {
        from: SeverityTier,
        to: SeverityTier,
        reasons: Reasons,
    },

    /// Still Critical and not silenced.
    Heartbeat { at_ms: u64 },

    /// Manual reset.  `was_active` is false when nothing was sounding.
    AlertReset { tier: SeverityTier, was_active: bool },

    /// A channel produced no usable reading; the previous estimate is kept.
    ReadFailure { channel: Channel },

    /// An actuator was switched by a manual override.
    ActuatorChanged { actuator: ActuatorKind, enabled: bool },

    /// An actuator reached its setpoint and switched itself off.
    ActuatorCompleted { actuator: ActuatorKind, value: f32 },

    /// The manual gas override moved (`None`: back to the live sensor).
    GasOverride { ppm: Option<f32> },
}

/// Transport payload, one per sensor tick.  Field names match the
/// dashboard's MQTT message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(rename = "temp")]
    pub temperature: f32,
    #[serde(rename = "humi")]
    pub humidity: f32,
    /// Whole ppm.
    pub gas: u32,
    pub status: SeverityTier,
}

impl TelemetryRecord {
    pub fn new(sample: &EnvironmentSample, status: SeverityTier) -> Self {
        Self {
            temperature: sample.temperature,
            humidity: sample.humidity,
            gas: sample.gas.round().max(0.0) as u32,
            status,
        }
    }
}
