//! Gas channel: exponential moving average with an optional manual override.
//!
//! The MQ-series ADC (or the simulated potentiometer) is noisy enough that
//! a single reading must never drive the tier.  Each tick folds the new
//! input into the estimate:
//!
//! ```text
//! g' = g' * α + x * (1 - α)
//! ```
//!
//! Deployments without a live gas sensor steer the channel with the
//! override instead; when it is set, `x` is the override and the raw
//! reading is ignored.

use log::info;

/// Lowest value the manual override can reach (ppm).
pub const GAS_OVERRIDE_MIN_PPM: f32 = 0.0;
/// Highest value the manual override can reach (ppm).
pub const GAS_OVERRIDE_MAX_PPM: f32 = 5000.0;

pub struct GasSmoother {
    alpha: f32,
    estimate: f32,
    override_ppm: Option<f32>,
}

impl GasSmoother {
    pub fn new(alpha: f32, seed_ppm: f32) -> Self {
        Self {
            alpha,
            estimate: seed_ppm,
            override_ppm: None,
        }
    }

    /// Fold one reading into the estimate.
    ///
    /// Returns `None` when the input is not a number; the estimate is
    /// left untouched in that case.
    pub fn update(&mut self, raw: f32) -> Option<f32> {
        let input = self.override_ppm.unwrap_or(raw);
        if !input.is_finite() {
            return None;
        }
        self.estimate = self.estimate * self.alpha + input * (1.0 - self.alpha);
        Some(self.estimate)
    }

    pub fn estimate(&self) -> f32 {
        self.estimate
    }

    /// Current override, if any.
    pub fn override_ppm(&self) -> Option<f32> {
        self.override_ppm
    }

    /// Nudge the override by `delta_ppm`, starting from the current
    /// estimate when no override is active yet.  Returns the new override.
    pub fn adjust_override(&mut self, delta_ppm: f32) -> Option<f32> {
        if !delta_ppm.is_finite() {
            return self.override_ppm;
        }
        let from = self.override_ppm.unwrap_or(self.estimate);
        let next = (from + delta_ppm).clamp(GAS_OVERRIDE_MIN_PPM, GAS_OVERRIDE_MAX_PPM);
        info!("Gas override {:.0} -> {:.0} ppm", from, next);
        self.override_ppm = Some(next);
        self.override_ppm
    }

    /// Return the channel to the live sensor.
    pub fn clear_override(&mut self) {
        self.override_ppm = None;
    }
}
