//! Severity classifier.
//!
//! Maps one [`EnvironmentSample`] to exactly one [`SeverityTier`] plus the
//! list of breached limits that produced it.
//!
//! ## Evaluation order
//!
//! 1. Critical predicates: temperature, gas, then the optional hard
//!    humidity band (low, high).  Any hit makes the tier `Critical`.
//! 2. Only if nothing critical fired: warning predicates in the same
//!    order against the comfortable limits.
//! 3. Otherwise `Normal` with no reasons.
//!
//! The order fixes the order of the reason list; it never changes the
//! tier.  Every comparison is strict.

use core::fmt;

use heapless::Vec;
use serde::Serialize;

use crate::config::{HumidityBand, Thresholds};
use crate::error::ConfigError;
use crate::sensors::EnvironmentSample;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Ordered severity.  Also the state identity of the alert sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SeverityTier {
    Normal = 0,
    Warning = 1,
    Critical = 2,
}

impl SeverityTier {
    /// Total number of tiers.  Sizes the sequencer's state table.
    pub const COUNT: usize = 3;

    /// Wire name, as published in telemetry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// A breached limit.  Variant order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reason {
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "gas")]
    Gas,
    #[serde(rename = "humidity-low")]
    HumidityLow,
    #[serde(rename = "humidity-high")]
    HumidityHigh,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Gas => "gas",
            Self::HumidityLow => "humidity-low",
            Self::HumidityHigh => "humidity-high",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At most one reason per predicate.
pub type Reasons = Vec<Reason, 4>;

/// Classifier output for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: SeverityTier,
    pub reasons: Reasons,
}

impl Classification {
    pub fn normal() -> Self {
        Self {
            tier: SeverityTier::Normal,
            reasons: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct SeverityClassifier {
    thresholds: Thresholds,
}

impl SeverityClassifier {
    /// Refuses thresholds whose ordering would make the tier ambiguous.
    pub fn new(thresholds: Thresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Pure: identical samples always produce identical classifications.
    pub fn classify(&self, sample: &EnvironmentSample) -> Classification {
        let t = &self.thresholds;

        let critical = breaches(
            sample,
            t.temp_critical_c,
            t.gas_critical_ppm,
            t.critical_humidity,
        );
        if !critical.is_empty() {
            return Classification {
                tier: SeverityTier::Critical,
                reasons: critical,
            };
        }

        let warning = breaches(sample, t.temp_warning_c, t.gas_warning_ppm, Some(t.humidity));
        if !warning.is_empty() {
            return Classification {
                tier: SeverityTier::Warning,
                reasons: warning,
            };
        }

        Classification::normal()
    }
}

/// Collect the limits `sample` exceeds, in reporting order.
fn breaches(
    sample: &EnvironmentSample,
    temp_limit: f32,
    gas_limit: f32,
    humidity: Option<HumidityBand>,
) -> Reasons {
    let mut reasons = Reasons::new();
    let mut hit = |fired: bool, reason: Reason| {
        if fired {
            // One slot per predicate; cannot overflow.
            let _ = reasons.push(reason);
        }
    };

    hit(sample.temperature > temp_limit, Reason::Temperature);
    hit(sample.gas > gas_limit, Reason::Gas);
    if let Some(band) = humidity {
        hit(sample.humidity < band.low, Reason::HumidityLow);
        hit(sample.humidity > band.high, Reason::HumidityHigh);
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab_thresholds() -> Thresholds {
        Thresholds {
            temp_warning_c: 28.0,
            temp_critical_c: 32.0,
            gas_warning_ppm: 400.0,
            gas_critical_ppm: 800.0,
            humidity: HumidityBand {
                low: 40.0,
                high: 60.0,
            },
            critical_humidity: None,
        }
    }

    fn sample(temperature: f32, humidity: f32, gas: f32) -> EnvironmentSample {
        EnvironmentSample {
            temperature,
            humidity,
            gas,
        }
    }

    fn classifier() -> SeverityClassifier {
        SeverityClassifier::new(lab_thresholds()).unwrap()
    }

    #[test]
    fn hot_room_is_critical_for_temperature_only() {
        let c = classifier().classify(&sample(33.0, 50.0, 100.0));
        assert_eq!(c.tier, SeverityTier::Critical);
        assert_eq!(c.reasons.as_slice(), &[Reason::Temperature]);
    }

    #[test]
    fn quiet_room_is_normal() {
        let c = classifier().classify(&sample(27.9, 50.0, 399.0));
        assert_eq!(c, Classification::normal());
    }

    #[test]
    fn comparisons_are_strict() {
        let c = classifier().classify(&sample(28.0, 40.0, 400.0));
        assert_eq!(c.tier, SeverityTier::Normal);
        let c = classifier().classify(&sample(32.0, 60.0, 800.0));
        assert_eq!(c.tier, SeverityTier::Warning);
        assert_eq!(
            c.reasons.as_slice(),
            &[Reason::Temperature, Reason::Gas]
        );
    }

    #[test]
    fn critical_reasons_exclude_warning_breaches() {
        // Gas critical, temperature and humidity only at warning level.
        let c = classifier().classify(&sample(30.0, 70.0, 900.0));
        assert_eq!(c.tier, SeverityTier::Critical);
        assert_eq!(c.reasons.as_slice(), &[Reason::Gas]);
    }

    #[test]
    fn warning_reasons_follow_fixed_order() {
        let c = classifier().classify(&sample(29.0, 35.0, 500.0));
        assert_eq!(c.tier, SeverityTier::Warning);
        assert_eq!(
            c.reasons.as_slice(),
            &[Reason::Temperature, Reason::Gas, Reason::HumidityLow]
        );

        let c = classifier().classify(&sample(20.0, 65.0, 100.0));
        assert_eq!(c.reasons.as_slice(), &[Reason::HumidityHigh]);
    }

    #[test]
    fn humidity_alone_never_critical_without_hard_band() {
        let c = classifier().classify(&sample(20.0, 99.0, 100.0));
        assert_eq!(c.tier, SeverityTier::Warning);
    }

    #[test]
    fn hard_humidity_band_escalates() {
        let mut t = lab_thresholds();
        t.critical_humidity = Some(HumidityBand {
            low: 20.0,
            high: 80.0,
        });
        let c = SeverityClassifier::new(t).unwrap();
        let r = c.classify(&sample(33.0, 85.0, 100.0));
        assert_eq!(r.tier, SeverityTier::Critical);
        assert_eq!(
            r.reasons.as_slice(),
            &[Reason::Temperature, Reason::HumidityHigh]
        );
        let r = c.classify(&sample(20.0, 15.0, 100.0));
        assert_eq!(r.reasons.as_slice(), &[Reason::HumidityLow]);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut t = lab_thresholds();
        t.temp_critical_c = 20.0;
        assert!(SeverityClassifier::new(t).is_err());
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(SeverityTier::Normal < SeverityTier::Warning);
        assert!(SeverityTier::Warning < SeverityTier::Critical);
        assert_eq!(SeverityTier::Critical as usize + 1, SeverityTier::COUNT);
    }

    #[test]
    fn serialises_as_wire_strings() {
        let c = classifier().classify(&sample(29.0, 65.0, 100.0));
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(
            json,
            r#"{"tier":"warning","reasons":["temperature","humidity-high"]}"#
        );
    }
}
