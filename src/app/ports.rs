//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GuardService (domain)
//! ```
//!
//! Driven adapters (sensors, indicators, event sinks) implement these
//! traits.  The [`GuardService`](super::service::GuardService) consumes
//! them via generics, so the domain core never touches hardware directly.
//! Every port call is synchronous and must return promptly; the service
//! only calls them after a tick has finished computing.

use crate::classifier::SeverityTier;
use crate::fsm::context::PulseKind;
use crate::sensors::RawSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per sensor tick.
pub trait SensorPort {
    /// Acquire one sample.  A channel that failed to read is `NaN`.
    fn read_raw(&mut self) -> RawSample;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED / buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the tier-coded LED and the buzzer.
pub trait IndicatorPort {
    /// Select the steady indicator for a tier.
    fn show_tier(&mut self, tier: SeverityTier);

    /// Fire one pulse.  Durations are the adapter's concern
    /// (see [`PulseKind::nominal_ms`]).
    fn pulse(&mut self, kind: PulseKind);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, stdout JSON,
/// a message bus, a dashboard).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the control loop)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a task is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) knows nothing about the
/// service; the main loop implements this to run a sensor tick or drain
/// manual input.
pub trait SchedulerDelegate {
    /// Called when `task` is due at monotonic time `now_ms`.
    fn on_task_due(&mut self, task: TaskId, now_ms: u64);
}

/// Periodic tasks of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    /// Read → estimate → (actuate) → classify → sequence.
    SensorTick,
    /// Drain queued manual overrides.
    InputPoll,
}
