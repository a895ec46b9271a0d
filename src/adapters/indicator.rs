//! Console indicator.
//!
//! Stands in for the tier-coded LED and the buzzer: tier changes and
//! pulses are written to the log, and the adapter remembers what it is
//! showing so the binary can print a status line on exit.

use log::{debug, info};

use crate::app::ports::IndicatorPort;
use crate::classifier::SeverityTier;
use crate::fsm::context::PulseKind;

#[derive(Debug, Default)]
pub struct LogIndicator {
    shown: Option<SeverityTier>,
    pulses: u32,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Option<SeverityTier> {
        self.shown
    }

    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}

impl IndicatorPort for LogIndicator {
    fn show_tier(&mut self, tier: SeverityTier) {
        let led = match tier {
            SeverityTier::Normal => "green",
            SeverityTier::Warning => "amber",
            SeverityTier::Critical => "red",
        };
        info!("LED   | {} ({})", led, tier);
        self.shown = Some(tier);
    }

    fn pulse(&mut self, kind: PulseKind) {
        debug!("BUZZ  | {:?} {} ms", kind, kind.nominal_ms());
        self.pulses = self.pulses.saturating_add(1);
    }
}
