//! Simulated climate actuator.
//!
//! An enabled actuator moves its quantity toward the setpoint by at most
//! `step_size` per control tick and disables itself once the value is
//! inside `setpoint ± tolerance_band`.  A disabled actuator lets the value
//! relax toward the base (the last real reading) at the same rate.

use crate::config::ActuatorConfig;

/// Mutable actuator parameters plus the on/off flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorState {
    pub enabled: bool,
    pub setpoint: f32,
    pub step_size: f32,
    pub tolerance_band: f32,
}

/// Result of one control step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub value: f32,
    /// `true` only on the step where the setpoint band was reached.
    pub just_completed: bool,
}

impl ActuatorState {
    /// Disabled actuator with the configured parameters.  The config has
    /// already been validated (`step_size > 0`, `tolerance_band >= 0`).
    pub fn from_config(cfg: &ActuatorConfig) -> Self {
        Self {
            enabled: false,
            setpoint: cfg.setpoint,
            step_size: cfg.step_size,
            tolerance_band: cfg.tolerance_band,
        }
    }

    pub fn in_band(&self, value: f32) -> bool {
        (value - self.setpoint).abs() <= self.tolerance_band
    }

    /// Advance the simulated value by one control tick.
    pub fn step(&mut self, current: f32, base: f32) -> Step {
        if !self.enabled {
            return Step {
                value: approach(current, base, self.step_size),
                just_completed: false,
            };
        }

        let next = if self.in_band(current) {
            current
        } else {
            approach(current, self.setpoint, self.step_size)
        };

        if self.in_band(next) {
            self.enabled = false;
            Step {
                value: self.setpoint,
                just_completed: true,
            }
        } else {
            Step {
                value: next,
                just_completed: false,
            }
        }
    }
}

/// Move `current` toward `target` by at most `step`, never overshooting.
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current > target {
        (current - step).max(target)
    } else {
        (current + step).min(target)
    }
}
