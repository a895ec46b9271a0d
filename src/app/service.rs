//! Application service, the hexagonal core.
//!
//! [`GuardService`] owns the estimator, the actuator simulator, the
//! classifier, the alert sequencer and the override queue.  It is the
//! explicit engine context: nothing lives in statics, and all I/O flows
//! through port traits injected at call sites.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         GuardService          │
//!  overrides  ──▶ │ Estimator · Actuators ·       │ ──▶ IndicatorPort
//!                 │ Classifier · Sequencer        │
//!                 └──────────────────────────────┘
//! ```
//!
//! Side effects are buffered while a tick computes and dispatched to the
//! ports only after it completes.

use heapless::Vec;
use log::{debug, info, warn};
use serde::Serialize;

use crate::classifier::{Classification, SeverityClassifier, SeverityTier};
use crate::config::GuardConfig;
use crate::control::{ActuatorBank, ActuatorKind};
use crate::error::Result;
use crate::fsm::Fsm;
use crate::fsm::context::{AlertContext, AlertSignal, AlertState, PulseKind};
use crate::sensors::{EnvironmentSample, SignalEstimator};

use super::commands::{CommandQueue, OverrideCommand};
use super::events::{AppEvent, TelemetryRecord};
use super::ports::{EventSink, IndicatorPort, SensorPort};

/// Side effects buffered per tick.
const MAX_EFFECTS: usize = 32;

/// A deferred port call.
#[derive(Debug, Clone)]
enum Effect {
    Event(AppEvent),
    ShowTier(SeverityTier),
    Pulse(PulseKind),
}

/// Read-only view of the engine after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub sample: EnvironmentSample,
    pub classification: Classification,
    pub alert: AlertState,
    pub fan_enabled: bool,
    pub dehumidifier_enabled: bool,
    pub gas_override_ppm: Option<f32>,
    pub tick_count: u64,
}

// ───────────────────────────────────────────────────────────────
// GuardService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct GuardService {
    config: GuardConfig,
    estimator: SignalEstimator,
    actuators: ActuatorBank,
    classifier: SeverityClassifier,
    fsm: Fsm,
    ctx: AlertContext,
    commands: CommandQueue,
    effects: Vec<Effect, MAX_EFFECTS>,
    /// Monotonic time of the last actuator step.
    last_control_ms: Option<u64>,
    tick_count: u64,
}

impl GuardService {
    /// Construct the service from configuration.
    ///
    /// Fails when the configuration violates an invariant.  Does **not**
    /// start the sequencer; call [`start`](Self::start) next.
    pub fn new(config: GuardConfig) -> Result<Self> {
        config.validate()?;
        let classifier = SeverityClassifier::new(config.thresholds)?;

        Ok(Self {
            estimator: SignalEstimator::new(&config.estimator),
            actuators: ActuatorBank::new(&config),
            classifier,
            fsm: Fsm::alert_sequencer(),
            ctx: AlertContext::new(config.timing.heartbeat_interval_ms),
            commands: CommandQueue::new(),
            effects: Vec::new(),
            last_control_ms: None,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial tier (Normal) and announce it.
    pub fn start(&mut self, indicator: &mut impl IndicatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        let tier = self.fsm.current_state();
        indicator.show_tier(tier);
        sink.emit(&AppEvent::Started { tier });
        info!("GuardService started in {}", tier);
    }

    // ── Manual overrides ──────────────────────────────────────

    /// Queue an override for the next tick boundary.  Returns `false` if
    /// the queue is full and the command was dropped.
    pub fn submit(&mut self, cmd: OverrideCommand) -> bool {
        self.commands.push(cmd)
    }

    /// Drain queued overrides now (input-poll cadence).  Returns how many
    /// were applied.
    pub fn apply_overrides(
        &mut self,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let applied = self.drain_commands();
        self.flush(indicator, sink);
        applied
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one sensor tick at monotonic time `now_ms`:
    /// overrides → estimate → actuator step (if due) → classify →
    /// sequence → dispatch side effects.
    pub fn tick(
        &mut self,
        now_ms: u64,
        sensors: &mut impl SensorPort,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Overrides queued since the last drain
        self.drain_commands();

        // 2. Estimate
        let raw = sensors.read_raw();
        let estimate = self.estimator.estimate(&raw, &mut self.actuators);
        for failure in &estimate.failures {
            warn!("Sensor read failed: {failure}");
            self.defer(Effect::Event(AppEvent::ReadFailure {
                channel: failure.channel(),
            }));
        }
        let mut sample = estimate.sample;

        // 3. Actuator simulator on its own cadence
        if self.control_due(now_ms) {
            self.last_control_ms = Some(now_ms);
            for kind in self.actuators.tick() {
                let value = self.actuators.get(kind).state().setpoint;
                self.defer(Effect::Event(AppEvent::ActuatorCompleted {
                    actuator: kind,
                    value,
                }));
            }
            sample = self.estimator.apply_actuators(&self.actuators);
        }

        // 4. Classify
        let classification = self.classifier.classify(&sample);
        debug!(
            "tick {} @{}ms: {} {:?}",
            self.tick_count, now_ms, classification.tier, classification.reasons
        );

        // 5. Sequence
        self.ctx.now_ms = now_ms;
        self.ctx.classification = classification;
        self.fsm.tick(&mut self.ctx);
        for signal in self.ctx.take_signals() {
            self.translate(signal, now_ms);
        }

        // 6. Telemetry
        let record = TelemetryRecord::new(&sample, self.fsm.current_state());
        self.defer(Effect::Event(AppEvent::Telemetry(record)));

        // 7. Side effects, after the tick has completed
        self.flush(indicator, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            sample: self.estimator.last(),
            classification: self.ctx.classification.clone(),
            alert: self.ctx.alert,
            fan_enabled: self.actuators.fan.is_enabled(),
            dehumidifier_enabled: self.actuators.dehumidifier.is_enabled(),
            gas_override_ppm: self.estimator.gas_override(),
            tick_count: self.tick_count,
        }
    }

    /// Current tier.
    pub fn tier(&self) -> SeverityTier {
        self.fsm.current_state()
    }

    pub fn alert(&self) -> AlertState {
        self.ctx.alert
    }

    pub fn actuators(&self) -> &ActuatorBank {
        &self.actuators
    }

    /// Total sensor ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Overrides waiting for the next drain.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn control_due(&self, now_ms: u64) -> bool {
        let interval = u64::from(self.config.timing.control_interval_ms);
        self.last_control_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= interval)
    }

    fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        while let Some(cmd) = self.commands.pop() {
            self.apply_command(cmd);
            applied += 1;
        }
        applied
    }

    fn apply_command(&mut self, cmd: OverrideCommand) {
        debug!("Applying override {:?}", cmd);
        match cmd {
            OverrideCommand::ToggleFan => self.switch(ActuatorKind::Fan, None),
            OverrideCommand::ToggleDehumidifier => self.switch(ActuatorKind::Dehumidifier, None),
            OverrideCommand::SetFan(on) => self.switch(ActuatorKind::Fan, Some(on)),
            OverrideCommand::SetDehumidifier(on) => {
                self.switch(ActuatorKind::Dehumidifier, Some(on));
            }
            OverrideCommand::ResetAlert => {
                let was_active = self.ctx.silence();
                let tier = self.fsm.current_state();
                info!("Alert reset in {} (was_active={})", tier, was_active);
                self.defer(Effect::Event(AppEvent::AlertReset { tier, was_active }));
            }
            OverrideCommand::AdjustGas(delta) => {
                let before = self.estimator.gas_override();
                let ppm = self.estimator.adjust_gas_override(delta);
                if ppm != before {
                    self.defer(Effect::Event(AppEvent::GasOverride { ppm }));
                }
            }
            OverrideCommand::ClearGasOverride => {
                if self.estimator.gas_override().is_some() {
                    self.estimator.clear_gas_override();
                    info!("Gas channel back on live sensor");
                    self.defer(Effect::Event(AppEvent::GasOverride { ppm: None }));
                }
            }
        }
    }

    /// Switch an actuator on/off (`Some`) or flip it (`None`).
    fn switch(&mut self, kind: ActuatorKind, on: Option<bool>) {
        let last = self.estimator.last();
        let current = match kind {
            ActuatorKind::Fan => last.temperature,
            ActuatorKind::Dehumidifier => last.humidity,
        };
        let channel = self.actuators.get_mut(kind);
        let target = on.unwrap_or(!channel.is_enabled());
        if channel.set(target, current) {
            self.defer(Effect::Event(AppEvent::ActuatorChanged {
                actuator: kind,
                enabled: target,
            }));
        }
    }

    fn translate(&mut self, signal: AlertSignal, now_ms: u64) {
        match signal {
            AlertSignal::Transition { from, to } => {
                self.defer(Effect::ShowTier(to));
                self.defer(Effect::Event(AppEvent::TierChanged {
                    from,
                    to,
                    reasons: self.ctx.classification.reasons.clone(),
                }));
            }
            AlertSignal::Pulse(PulseKind::Heartbeat) => {
                self.defer(Effect::Pulse(PulseKind::Heartbeat));
                self.defer(Effect::Event(AppEvent::Heartbeat { at_ms: now_ms }));
            }
            AlertSignal::Pulse(kind) => self.defer(Effect::Pulse(kind)),
        }
    }

    fn defer(&mut self, effect: Effect) {
        if let Err(effect) = self.effects.push(effect) {
            warn!("Effect buffer full, dropping {:?}", effect);
        }
    }

    fn flush(&mut self, indicator: &mut impl IndicatorPort, sink: &mut impl EventSink) {
        for effect in core::mem::take(&mut self.effects) {
            match effect {
                Effect::Event(event) => sink.emit(&event),
                Effect::ShowTier(tier) => indicator.show_tier(tier),
                Effect::Pulse(kind) => indicator.pulse(kind),
            }
        }
    }
}
