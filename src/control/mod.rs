//! Actuator simulator: the fan and dehumidifier channels.
//!
//! Each [`ActuatorChannel`] owns the simulated value of the quantity its
//! actuator drives.  While the actuator is on, or while the value is still
//! relaxing back toward the real reading after it was switched off, the
//! channel "drives" its quantity and the estimator reports the simulated
//! value instead of the raw reading.

pub mod actuator;

use core::fmt;

use heapless::Vec;
use log::{debug, info};
use serde::Serialize;

use crate::config::GuardConfig;
use crate::sensors::Channel;
use actuator::ActuatorState;

/// Which actuator a command or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    Fan,
    Dehumidifier,
}

impl ActuatorKind {
    /// The environmental quantity this actuator drives.
    pub fn channel(self) -> Channel {
        match self {
            Self::Fan => Channel::Temperature,
            Self::Dehumidifier => Channel::Humidity,
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fan => write!(f, "fan"),
            Self::Dehumidifier => write!(f, "dehumidifier"),
        }
    }
}

/// One actuator together with the value it simulates.
#[derive(Debug, Clone)]
pub struct ActuatorChannel {
    kind: ActuatorKind,
    state: ActuatorState,
    /// Simulated value; `None` when raw readings pass through.
    driven: Option<f32>,
    /// Last real reading taken while the actuator was off.
    base: f32,
    /// While drifting back: whether the base was above the driven value.
    drift_up: Option<bool>,
}

impl ActuatorChannel {
    pub fn new(kind: ActuatorKind, state: ActuatorState, base: f32) -> Self {
        Self {
            kind,
            state,
            driven: None,
            base,
            drift_up: None,
        }
    }

    pub fn kind(&self) -> ActuatorKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn state(&self) -> &ActuatorState {
        &self.state
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    /// Simulated value, if the channel currently overrides its quantity.
    pub fn driven_value(&self) -> Option<f32> {
        self.driven
    }

    /// Switch the actuator on or off.  `current` is the present estimate
    /// of the driven quantity; it seeds the simulation unless a value is
    /// already being driven.  Returns `true` when the state changed.
    pub fn set(&mut self, on: bool, current: f32) -> bool {
        if self.state.enabled == on {
            return false;
        }
        self.state.enabled = on;
        if on {
            self.driven = Some(self.driven.unwrap_or(current));
            self.drift_up = None;
        }
        info!("{} {}", self.kind, if on { "ON" } else { "OFF" });
        true
    }

    /// Flip the actuator.  Returns the new on/off state.
    pub fn toggle(&mut self, current: f32) -> bool {
        self.set(!self.state.enabled, current);
        self.state.enabled
    }

    /// Record a valid raw reading.  The base only follows the sensor while
    /// the actuator is off.
    pub fn observe_base(&mut self, raw: f32) {
        if !self.state.enabled {
            self.base = raw;
        }
    }

    /// Advance the simulation by one control tick.  Returns `true` on the
    /// tick the actuator reaches its setpoint and switches itself off.
    ///
    /// A disabled channel is released, and raw readings pass through
    /// again, on the first step where the base is within `step_size` of
    /// the simulated value or has crossed to its other side.  The base
    /// follows the live sensor, so the two never have to meet exactly.
    pub fn tick(&mut self) -> bool {
        let Some(current) = self.driven else {
            return false;
        };
        if !self.state.enabled {
            let gap = self.base - current;
            let crossed = self.drift_up.is_some_and(|up| up != (gap > 0.0));
            if crossed || gap.abs() <= self.state.step_size {
                debug!("{} rejoined sensor at {:.1}, releasing", self.kind, self.base);
                self.driven = None;
                self.drift_up = None;
                return false;
            }
            self.drift_up = Some(gap > 0.0);
        }
        let step = self.state.step(current, self.base);
        if step.just_completed {
            info!("{} reached setpoint {:.1}", self.kind, self.state.setpoint);
        }
        self.driven = Some(step.value);
        step.just_completed
    }
}

/// Both simulated actuators.
#[derive(Debug, Clone)]
pub struct ActuatorBank {
    pub fan: ActuatorChannel,
    pub dehumidifier: ActuatorChannel,
}

impl ActuatorBank {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            fan: ActuatorChannel::new(
                ActuatorKind::Fan,
                ActuatorState::from_config(&config.fan),
                config.estimator.temperature_seed_c,
            ),
            dehumidifier: ActuatorChannel::new(
                ActuatorKind::Dehumidifier,
                ActuatorState::from_config(&config.dehumidifier),
                config.estimator.humidity_seed_pct,
            ),
        }
    }

    pub fn get(&self, kind: ActuatorKind) -> &ActuatorChannel {
        match kind {
            ActuatorKind::Fan => &self.fan,
            ActuatorKind::Dehumidifier => &self.dehumidifier,
        }
    }

    pub fn get_mut(&mut self, kind: ActuatorKind) -> &mut ActuatorChannel {
        match kind {
            ActuatorKind::Fan => &mut self.fan,
            ActuatorKind::Dehumidifier => &mut self.dehumidifier,
        }
    }

    /// Step both actuators; returns the ones that completed on this tick.
    pub fn tick(&mut self) -> Vec<ActuatorKind, 2> {
        let mut completed = Vec::new();
        for channel in [&mut self.fan, &mut self.dehumidifier] {
            if channel.tick() {
                // Capacity matches the number of channels.
                let _ = completed.push(channel.kind());
            }
        }
        completed
    }
}
