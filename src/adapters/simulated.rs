//! Simulated server room.
//!
//! Implements [`SensorPort`] with the same model the monitoring dashboard
//! uses for its demo mode:
//!
//! - temperature: a 24-step sinusoid `25 ± 5 °C`, a 10 % chance of a spike
//!   up to +15 °C, and ±1 °C noise, clamped to 20–50 °C;
//! - humidity: `70 − 2·(T − 25) ± 5 %RH`, clamped to 20–90 %RH;
//! - gas: `500 + U(0, 1000)` with a 5 % chance of up to +2000, clamped to
//!   the 12-bit ADC range.
//!
//! Each channel additionally drops out (reads `NaN`) with a small
//! probability, like a DHT22 checksum failure.

use core::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::SensorPort;
use crate::sensors::RawSample;

/// Samples per simulated "day".
const CYCLE_STEPS: u64 = 24;
/// Highest value of the gas ADC.
const GAS_ADC_MAX: f32 = 4095.0;

pub struct SimulatedRoom {
    rng: StdRng,
    step: u64,
    /// Per-channel probability of a failed read.
    dropout: f64,
    /// `false` models a deployment without a gas sensor (gas reads NaN).
    gas_sensor: bool,
}

impl SimulatedRoom {
    /// Deterministic room for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Room seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            step: 0,
            dropout: 0.02,
            gas_sensor: true,
        }
    }

    #[must_use]
    pub fn with_dropout(mut self, probability: f64) -> Self {
        self.dropout = probability.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn without_gas_sensor(mut self) -> Self {
        self.gas_sensor = false;
        self
    }

    fn drop_out(&mut self, value: f32) -> f32 {
        if self.rng.random_bool(self.dropout) {
            f32::NAN
        } else {
            value
        }
    }
}

impl SensorPort for SimulatedRoom {
    fn read_raw(&mut self) -> RawSample {
        let phase = (self.step % CYCLE_STEPS) as f32 / CYCLE_STEPS as f32;
        self.step += 1;

        let base_temp = 25.0 + (phase * 2.0 * PI).sin() * 5.0;
        let spike: f32 = if self.rng.random_bool(0.1) {
            self.rng.random_range(0.0f32..15.0)
        } else {
            0.0
        };
        let temp = base_temp + spike + self.rng.random_range(-1.0f32..1.0);
        let humi = 70.0 - (temp - 25.0) * 2.0 + self.rng.random_range(-5.0f32..5.0);

        let gas_spike: f32 = if self.rng.random_bool(0.05) {
            self.rng.random_range(0.0f32..2000.0)
        } else {
            0.0
        };
        let gas = (500.0 + self.rng.random_range(0.0f32..1000.0) + gas_spike).floor();

        let temperature = self.drop_out(temp.clamp(20.0, 50.0));
        let humidity = self.drop_out(humi.clamp(20.0, 90.0));
        let gas = if self.gas_sensor {
            self.drop_out(gas.clamp(0.0, GAS_ADC_MAX))
        } else {
            f32::NAN
        };

        RawSample::new(temperature, humidity, gas)
    }
}
