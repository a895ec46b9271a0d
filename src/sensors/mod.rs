//! Sensor subsystem: per-channel estimators and the aggregating
//! [`SignalEstimator`].
//!
//! The estimator turns one [`RawSample`] per tick into an
//! [`EnvironmentSample`] that is safe to classify.  Individual read
//! failures are reported and the previous good value is retained, so a
//! single flaky sensor never reaches the classifier as NaN.

pub mod climate;
pub mod gas;

use core::fmt;

use heapless::Vec;
use log::debug;
use serde::Serialize;

use crate::config::EstimatorConfig;
use crate::control::{ActuatorBank, ActuatorChannel};
use crate::error::SensorError;
use climate::ClimateChannel;
use gas::GasSmoother;

/// The three measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Humidity,
    Gas,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Humidity => write!(f, "humidity"),
            Self::Gas => write!(f, "gas"),
        }
    }
}

/// One acquisition from the sensor port.  `NaN` marks a failed read.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub temperature: f32,
    pub humidity: f32,
    pub gas: f32,
}

impl RawSample {
    pub fn new(temperature: f32, humidity: f32, gas: f32) -> Self {
        Self {
            temperature,
            humidity,
            gas,
        }
    }

    /// Every channel failed.
    pub fn missing() -> Self {
        Self::new(f32::NAN, f32::NAN, f32::NAN)
    }
}

/// Estimated environment for one tick (°C, %RH, ppm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentSample {
    pub temperature: f32,
    pub humidity: f32,
    pub gas: f32,
}

/// Output of [`SignalEstimator::estimate`].
#[derive(Debug, Clone)]
pub struct Estimate {
    pub sample: EnvironmentSample,
    /// Channels whose raw reading was unusable this tick.
    pub failures: Vec<SensorError, 3>,
}

pub struct SignalEstimator {
    temperature: ClimateChannel,
    humidity: ClimateChannel,
    gas: GasSmoother,
    last: EnvironmentSample,
}

impl SignalEstimator {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            temperature: ClimateChannel::new(config.temperature_seed_c),
            humidity: ClimateChannel::new(config.humidity_seed_pct),
            gas: GasSmoother::new(config.gas_smoothing, config.gas_seed_ppm),
            last: EnvironmentSample {
                temperature: config.temperature_seed_c,
                humidity: config.humidity_seed_pct,
                gas: config.gas_seed_ppm,
            },
        }
    }

    /// Fold one raw sample into the estimate.
    ///
    /// Valid temperature/humidity readings refresh the base of a disabled
    /// actuator.  While an actuator drives its quantity the simulated value
    /// is reported instead of the raw reading.
    pub fn estimate(&mut self, raw: &RawSample, actuators: &mut ActuatorBank) -> Estimate {
        let mut failures = Vec::new();

        let temperature = estimate_climate(
            &mut self.temperature,
            Channel::Temperature,
            raw.temperature,
            &mut actuators.fan,
            &mut failures,
        );
        let humidity = estimate_climate(
            &mut self.humidity,
            Channel::Humidity,
            raw.humidity,
            &mut actuators.dehumidifier,
            &mut failures,
        );
        let gas = if let Some(g) = self.gas.update(raw.gas) {
            g
        } else {
            let _ = failures.push(SensorError::NoData(Channel::Gas));
            self.gas.estimate()
        };

        self.last = EnvironmentSample {
            temperature,
            humidity,
            gas,
        };
        debug!(
            "estimate T={:.1} H={:.1} G={:.0} ({} failures)",
            temperature,
            humidity,
            gas,
            failures.len()
        );
        Estimate {
            sample: self.last,
            failures,
        }
    }

    /// Re-apply actuator values after a control step so the estimate
    /// reflects the simulator's latest output.  A channel released on
    /// this step reports the sensor again straight away.
    pub fn apply_actuators(&mut self, actuators: &ActuatorBank) -> EnvironmentSample {
        self.last.temperature = follow_actuator(&mut self.temperature, &actuators.fan);
        self.last.humidity = follow_actuator(&mut self.humidity, &actuators.dehumidifier);
        self.last
    }

    /// Most recent estimate (the seeds before the first tick).
    pub fn last(&self) -> EnvironmentSample {
        self.last
    }

    pub fn gas_override(&self) -> Option<f32> {
        self.gas.override_ppm()
    }

    /// Nudge the manual gas override; see [`GasSmoother::adjust_override`].
    pub fn adjust_gas_override(&mut self, delta_ppm: f32) -> Option<f32> {
        self.gas.adjust_override(delta_ppm)
    }

    pub fn clear_gas_override(&mut self) {
        self.gas.clear_override();
    }
}

fn estimate_climate(
    channel: &mut ClimateChannel,
    which: Channel,
    raw: f32,
    actuator: &mut ActuatorChannel,
    failures: &mut Vec<SensorError, 3>,
) -> f32 {
    match channel.update(raw) {
        Some(valid) => actuator.observe_base(valid),
        None => {
            let _ = failures.push(SensorError::NoData(which));
        }
    }
    if let Some(driven) = actuator.driven_value() {
        channel.hold(driven);
    }
    channel.last()
}

fn follow_actuator(channel: &mut ClimateChannel, actuator: &ActuatorChannel) -> f32 {
    match actuator.driven_value() {
        Some(driven) => channel.hold(driven),
        None => channel.pass_through(),
    }
    channel.last()
}
