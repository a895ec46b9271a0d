//! Shared mutable context threaded through every sequencer handler.
//!
//! `AlertContext` is the blackboard the state handlers read from and
//! write to: the classifier's verdict for this tick goes in, alert
//! bookkeeping lives here, and the requested side effects come out as
//! [`AlertSignal`]s that the service dispatches after the tick.

use heapless::Vec;
use log::warn;
use serde::Serialize;

use crate::classifier::{Classification, SeverityTier};

// ---------------------------------------------------------------------------
// Outputs (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Indicator pulse lengths.  The engine only distinguishes the kinds; the
/// nominal durations are for indicator adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseKind {
    /// Entered Warning.
    Short,
    /// Entered Critical.
    Long,
    /// Still Critical.
    Heartbeat,
}

impl PulseKind {
    pub fn nominal_ms(self) -> u32 {
        match self {
            Self::Short => 150,
            Self::Long => 500,
            Self::Heartbeat => 100,
        }
    }
}

/// Side-effect request raised during one sequencer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSignal {
    /// The tier changed.
    Transition { from: SeverityTier, to: SeverityTier },
    /// Drive the indicator.
    Pulse(PulseKind),
}

/// Signals per tick: a transition plus its entry pulse, with headroom.
pub const MAX_SIGNALS: usize = 4;

// ---------------------------------------------------------------------------
// Alert state
// ---------------------------------------------------------------------------

/// Persistent alert bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertState {
    pub current_tier: SeverityTier,
    /// Set on entering a non-Normal tier; cleared by a manual reset.
    pub active: bool,
    /// Monotonic time of the last Critical entry or heartbeat.
    pub last_heartbeat_ms: u64,
}

impl Default for AlertState {
    fn default() -> Self {
        Self {
            current_tier: SeverityTier::Normal,
            active: false,
            last_heartbeat_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// AlertContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct AlertContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    /// Monotonic time of the current tick (ms).  Set before each tick.
    pub now_ms: u64,
    /// Minimum spacing of heartbeat pulses (ms).
    pub heartbeat_interval_ms: u64,

    // -- Input --
    /// Classifier verdict for this tick.  Set before each tick.
    pub classification: Classification,

    // -- State --
    pub alert: AlertState,

    // -- Outputs --
    /// Side effects requested during the current tick.
    pub signals: Vec<AlertSignal, MAX_SIGNALS>,
}

impl AlertContext {
    pub fn new(heartbeat_interval_ms: u32) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            now_ms: 0,
            heartbeat_interval_ms: u64::from(heartbeat_interval_ms),
            classification: Classification::normal(),
            alert: AlertState::default(),
            signals: Vec::new(),
        }
    }

    /// Queue a side-effect request.
    pub fn emit(&mut self, signal: AlertSignal) {
        if self.signals.push(signal).is_err() {
            warn!("Alert signal dropped (buffer full): {:?}", signal);
        }
    }

    /// Drain the signals raised since the last call.
    pub fn take_signals(&mut self) -> Vec<AlertSignal, MAX_SIGNALS> {
        core::mem::take(&mut self.signals)
    }

    /// Manual reset: clear `active` without touching the tier.  Returns
    /// `true` if an active alert was silenced.
    pub fn silence(&mut self) -> bool {
        let was_active = self.alert.active;
        self.alert.active = false;
        was_active
    }

    /// Time since the last Critical entry or heartbeat.
    pub fn ms_since_heartbeat(&self) -> u64 {
        self.now_ms.saturating_sub(self.alert.last_heartbeat_ms)
    }
}
