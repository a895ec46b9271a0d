//! System configuration parameters
//!
//! All tunable parameters for the RoomGuard engine.  Thresholds are
//! deployment inputs, never hard-coded in the classifier.  Values can be
//! overridden from a JSON document; every section falls back to the
//! server-room defaults below for missing fields.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Severity classification thresholds.
    pub thresholds: Thresholds,
    /// Cooling fan (drives temperature).
    #[serde(deserialize_with = "fan_section")]
    pub fan: ActuatorConfig,
    /// Dehumidifier (drives humidity).
    #[serde(deserialize_with = "dehumidifier_section")]
    pub dehumidifier: ActuatorConfig,
    /// Signal estimator tuning.
    pub estimator: EstimatorConfig,
    /// Cadences.
    pub timing: TimingConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            fan: ActuatorConfig::fan(),
            dehumidifier: ActuatorConfig::dehumidifier(),
            estimator: EstimatorConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Severity thresholds.  Every comparison is strict (`>` / `<`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Temperature (°C) above which the tier is at least Warning.
    pub temp_warning_c: f32,
    /// Temperature (°C) above which the tier is Critical.
    pub temp_critical_c: f32,
    /// Gas (ppm) above which the tier is at least Warning.
    pub gas_warning_ppm: f32,
    /// Gas (ppm) above which the tier is Critical.
    pub gas_critical_ppm: f32,
    /// Comfortable humidity band; outside it the tier is at least Warning.
    pub humidity: HumidityBand,
    /// Optional hard humidity band; outside it the tier is Critical.
    pub critical_humidity: Option<HumidityBand>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_warning_c: 35.0,
            temp_critical_c: 40.0,
            gas_warning_ppm: 2000.0,
            gas_critical_ppm: 3000.0,
            humidity: HumidityBand {
                low: 30.0,
                high: 70.0,
            },
            critical_humidity: None,
        }
    }
}

impl Thresholds {
    /// Ordering checks that keep the tier total: warning strictly below
    /// critical on every channel, and the hard humidity band (if any)
    /// strictly outside the comfortable one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.temp_warning_c,
            self.temp_critical_c,
            self.gas_warning_ppm,
            self.gas_critical_ppm,
            self.humidity.low,
            self.humidity.high,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("thresholds must be finite"));
        }
        if self.temp_warning_c >= self.temp_critical_c {
            return Err(ConfigError::ValidationFailed(
                "thresholds.temp_warning_c must be below temp_critical_c",
            ));
        }
        if self.gas_warning_ppm >= self.gas_critical_ppm {
            return Err(ConfigError::ValidationFailed(
                "thresholds.gas_warning_ppm must be below gas_critical_ppm",
            ));
        }
        if self.humidity.low >= self.humidity.high {
            return Err(ConfigError::ValidationFailed(
                "thresholds.humidity.low must be below humidity.high",
            ));
        }
        if let Some(crit) = self.critical_humidity {
            if !(crit.low.is_finite() && crit.high.is_finite()) {
                return Err(ConfigError::ValidationFailed(
                    "thresholds.critical_humidity must be finite",
                ));
            }
            if !(crit.low < self.humidity.low && self.humidity.high < crit.high) {
                return Err(ConfigError::ValidationFailed(
                    "thresholds.critical_humidity must enclose the warning band",
                ));
            }
        }
        Ok(())
    }
}

/// Relative humidity interval (%RH).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumidityBand {
    pub low: f32,
    pub high: f32,
}

/// Static parameters of one simulated actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Value the actuator drives its quantity toward.
    pub setpoint: f32,
    /// Maximum change per control tick.  Must be > 0.
    pub step_size: f32,
    /// Half-width of the "reached" interval around the setpoint.  Must be >= 0.
    pub tolerance_band: f32,
}

impl ActuatorConfig {
    /// Cooling fan: 22 °C at 0.3 °C per control tick.
    pub fn fan() -> Self {
        Self {
            setpoint: 22.0,
            step_size: 0.3,
            tolerance_band: 0.0,
        }
    }

    /// Dehumidifier: 50 %RH ± 0.5 at 1 %RH per control tick.
    pub fn dehumidifier() -> Self {
        Self {
            setpoint: 50.0,
            step_size: 1.0,
            tolerance_band: 0.5,
        }
    }
}

/// An actuator section as written in a config file.  Missing fields keep
/// the actuator's own defaults, which differ between fan and dehumidifier.
#[derive(Deserialize)]
struct ActuatorSection {
    setpoint: Option<f32>,
    step_size: Option<f32>,
    tolerance_band: Option<f32>,
}

impl ActuatorSection {
    fn over(self, defaults: ActuatorConfig) -> ActuatorConfig {
        ActuatorConfig {
            setpoint: self.setpoint.unwrap_or(defaults.setpoint),
            step_size: self.step_size.unwrap_or(defaults.step_size),
            tolerance_band: self.tolerance_band.unwrap_or(defaults.tolerance_band),
        }
    }
}

fn fan_section<'de, D: Deserializer<'de>>(d: D) -> Result<ActuatorConfig, D::Error> {
    Ok(ActuatorSection::deserialize(d)?.over(ActuatorConfig::fan()))
}

fn dehumidifier_section<'de, D: Deserializer<'de>>(d: D) -> Result<ActuatorConfig, D::Error> {
    Ok(ActuatorSection::deserialize(d)?.over(ActuatorConfig::dehumidifier()))
}

/// Signal estimator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// EMA weight of the previous gas estimate (0 ≤ α < 1).
    pub gas_smoothing: f32,
    /// Gas estimate before the first reading (ppm).
    pub gas_seed_ppm: f32,
    /// Temperature estimate before the first valid reading (°C).
    pub temperature_seed_c: f32,
    /// Humidity estimate before the first valid reading (%RH).
    pub humidity_seed_pct: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            gas_smoothing: 0.95,
            gas_seed_ppm: 500.0,
            temperature_seed_c: 25.0,
            humidity_seed_pct: 50.0,
        }
    }
}

/// Cadences, all in milliseconds of monotonic time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Sensor read + classification tick.
    pub sensor_interval_ms: u32,
    /// Actuator simulator step interval.
    pub control_interval_ms: u32,
    /// Manual-input polling interval.
    pub input_poll_ms: u32,
    /// A "still critical" heartbeat fires once more than this has elapsed
    /// since the previous one.
    pub heartbeat_interval_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sensor_interval_ms: 2000,  // DHT22 needs ~2 s between reads
            control_interval_ms: 2000,
            input_poll_ms: 50,         // 20 Hz
            heartbeat_interval_ms: 3000,
        }
    }
}

impl GuardConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("Config parse error: {e}");
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every cross-field invariant.  The engine refuses to start
    /// when this fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        t.validate()?;

        let target = self.dehumidifier.setpoint;
        if !(t.humidity.low < target && target < t.humidity.high) {
            return Err(ConfigError::ValidationFailed(
                "humidity band must satisfy low < dehumidifier.setpoint < high",
            ));
        }

        validate_actuator(&self.fan, FAN_MESSAGES)?;
        validate_actuator(&self.dehumidifier, DEHUMIDIFIER_MESSAGES)?;

        let e = &self.estimator;
        if !(0.0..1.0).contains(&e.gas_smoothing) {
            return Err(ConfigError::ValidationFailed(
                "estimator.gas_smoothing must be in [0, 1)",
            ));
        }
        if ![e.gas_seed_ppm, e.temperature_seed_c, e.humidity_seed_pct]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::ValidationFailed("estimator seeds must be finite"));
        }

        let timing = &self.timing;
        if timing.sensor_interval_ms == 0
            || timing.control_interval_ms == 0
            || timing.input_poll_ms == 0
            || timing.heartbeat_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("timing intervals must be > 0"));
        }

        Ok(())
    }
}

/// Messages reported for a non-finite parameter, a non-positive step and
/// a negative tolerance, in that order.
type ActuatorMessages = [&'static str; 3];

const FAN_MESSAGES: ActuatorMessages = [
    "fan parameters must be finite",
    "fan.step_size must be > 0",
    "fan.tolerance_band must be >= 0",
];

const DEHUMIDIFIER_MESSAGES: ActuatorMessages = [
    "dehumidifier parameters must be finite",
    "dehumidifier.step_size must be > 0",
    "dehumidifier.tolerance_band must be >= 0",
];

fn validate_actuator(cfg: &ActuatorConfig, msgs: ActuatorMessages) -> Result<(), ConfigError> {
    let [not_finite, bad_step, bad_tolerance] = msgs;
    if !(cfg.setpoint.is_finite() && cfg.step_size.is_finite() && cfg.tolerance_band.is_finite())
    {
        return Err(ConfigError::ValidationFailed(not_finite));
    }
    if cfg.step_size <= 0.0 {
        return Err(ConfigError::ValidationFailed(bad_step));
    }
    if cfg.tolerance_band < 0.0 {
        return Err(ConfigError::ValidationFailed(bad_tolerance));
    }
    Ok(())
}
