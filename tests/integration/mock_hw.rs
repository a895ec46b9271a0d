//! Mock adapters for integration tests.
//!
//! `ScriptedRoom` replays a list of raw samples (repeating the last one),
//! and `Recorder` captures every indicator call and event so tests can
//! assert on the full history.

use std::collections::VecDeque;

use roomguard::app::commands::OverrideCommand;
use roomguard::app::events::AppEvent;
use roomguard::app::ports::{EventSink, IndicatorPort, SensorPort};
use roomguard::app::service::GuardService;
use roomguard::classifier::SeverityTier;
use roomguard::config::GuardConfig;
use roomguard::fsm::context::PulseKind;
use roomguard::sensors::RawSample;

/// Sensor tick period used by every harness.
pub const TICK_MS: u64 = 2000;

// ── Sensors ───────────────────────────────────────────────────

pub struct ScriptedRoom {
    script: VecDeque<RawSample>,
    last: RawSample,
}

impl ScriptedRoom {
    pub fn constant(sample: RawSample) -> Self {
        Self {
            script: VecDeque::new(),
            last: sample,
        }
    }

    /// Queue samples to be read before falling back to the last one.
    pub fn then(&mut self, samples: impl IntoIterator<Item = RawSample>) {
        self.script.extend(samples);
    }

    /// Replace the steady-state sample.
    pub fn hold(&mut self, sample: RawSample) {
        self.script.clear();
        self.last = sample;
    }
}

impl SensorPort for ScriptedRoom {
    fn read_raw(&mut self) -> RawSample {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

// ── Indicator + sink ──────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Recorder {
    pub tiers: Vec<SeverityTier>,
    pub pulses: Vec<PulseKind>,
    pub events: Vec<AppEvent>,
}

impl Recorder {
    pub fn heartbeats(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Heartbeat { at_ms } => Some(*at_ms),
                _ => None,
            })
            .collect()
    }

    pub fn transitions(&self) -> Vec<(SeverityTier, SeverityTier)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::TierChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
        self.pulses.clear();
        self.events.clear();
    }
}

impl IndicatorPort for Recorder {
    fn show_tier(&mut self, tier: SeverityTier) {
        self.tiers.push(tier);
    }

    fn pulse(&mut self, kind: PulseKind) {
        self.pulses.push(kind);
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Service wired to a scripted room and one recorder that plays both
/// the indicator and the event sink.  `now_ms` advances by [`TICK_MS`]
/// per step, starting at 0.
pub struct Harness {
    pub service: GuardService,
    pub room: ScriptedRoom,
    pub indicator: Recorder,
    pub sink: Recorder,
    pub now_ms: u64,
}

impl Harness {
    pub fn new(sample: RawSample) -> Self {
        Self::with_config(GuardConfig::default(), sample)
    }

    pub fn with_config(config: GuardConfig, sample: RawSample) -> Self {
        let mut service = GuardService::new(config).expect("valid config");
        let mut indicator = Recorder::default();
        let mut sink = Recorder::default();
        service.start(&mut indicator, &mut sink);
        Self {
            service,
            room: ScriptedRoom::constant(sample),
            indicator,
            sink,
            now_ms: 0,
        }
    }

    /// Run one sensor tick at the current time, then advance the clock.
    pub fn step(&mut self) {
        self.service.tick(
            self.now_ms,
            &mut self.room,
            &mut self.indicator,
            &mut self.sink,
        );
        self.now_ms += TICK_MS;
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn command(&mut self, cmd: OverrideCommand) {
        assert!(self.service.submit(cmd), "command queue full");
    }

    /// Submit and apply immediately, as the input-poll task does.
    pub fn command_now(&mut self, cmd: OverrideCommand) {
        self.command(cmd);
        self.service
            .apply_overrides(&mut self.indicator, &mut self.sink);
    }

    pub fn temperature(&self) -> f32 {
        self.service.snapshot().sample.temperature
    }
}

pub fn sample(temperature: f32, humidity: f32, gas: f32) -> RawSample {
    RawSample::new(temperature, humidity, gas)
}
