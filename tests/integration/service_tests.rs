//! Integration tests for the sensor → classifier → sequencer pipeline.
//!
//! Drives `GuardService` with scripted readings and checks the tier
//! history, indicator pulses and emitted events end to end.

use crate::mock_hw::{Harness, sample};

use roomguard::app::events::AppEvent;
use roomguard::classifier::{Reason, SeverityTier};
use roomguard::fsm::context::PulseKind;
use roomguard::sensors::Channel;

use SeverityTier::{Critical, Normal, Warning};

#[test]
fn start_announces_normal() {
    let h = Harness::new(sample(24.0, 50.0, 500.0));
    assert_eq!(h.indicator.tiers, vec![Normal]);
    assert_eq!(h.sink.events, vec![AppEvent::Started { tier: Normal }]);
}

#[test]
fn escalation_and_recovery_emit_one_transition_each() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.room.then([
        sample(24.0, 50.0, 500.0),
        sample(36.0, 50.0, 500.0),
        sample(36.0, 50.0, 500.0),
        sample(41.0, 50.0, 500.0),
        sample(41.0, 50.0, 500.0),
        sample(24.0, 50.0, 500.0),
    ]);
    h.run(6);

    assert_eq!(
        h.sink.transitions(),
        vec![(Normal, Warning), (Warning, Critical), (Critical, Normal)]
    );
    assert_eq!(h.indicator.tiers, vec![Normal, Warning, Critical, Normal]);
    assert_eq!(h.indicator.pulses, vec![PulseKind::Short, PulseKind::Long]);
    // Two seconds in Critical is shorter than the heartbeat interval.
    assert!(h.sink.heartbeats().is_empty());
}

#[test]
fn sustained_critical_repeats_heartbeat() {
    let mut h = Harness::new(sample(45.0, 50.0, 500.0));
    h.run(5); // 0, 2000, 4000, 6000, 8000 ms

    assert_eq!(h.service.tier(), Critical);
    assert_eq!(h.sink.heartbeats(), vec![4000, 8000]);
    assert_eq!(
        h.indicator.pulses,
        vec![PulseKind::Long, PulseKind::Heartbeat, PulseKind::Heartbeat]
    );
}

#[test]
fn transition_carries_reasons_in_fixed_order() {
    let mut h = Harness::new(sample(36.0, 75.0, 500.0));
    h.step();

    let reasons = h.sink.events.iter().find_map(|e| match e {
        AppEvent::TierChanged { reasons, .. } => Some(reasons.clone()),
        _ => None,
    });
    let reasons = reasons.expect("tier changed");
    assert_eq!(reasons.as_slice(), &[Reason::Temperature, Reason::HumidityHigh]);
}

#[test]
fn missing_gas_sensor_holds_seed_and_reports_each_tick() {
    let mut h = Harness::new(sample(24.0, 50.0, f32::NAN));
    h.run(3);

    let snap = h.service.snapshot();
    assert!((snap.sample.gas - 500.0).abs() < f32::EPSILON);
    assert_eq!(snap.classification.tier, Normal);
    let failures = h
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::ReadFailure { channel: Channel::Gas }))
        .count();
    assert_eq!(failures, 3);
}

#[test]
fn temperature_dropout_keeps_previous_value() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.room.then([sample(27.0, 50.0, 500.0), sample(f32::NAN, 50.0, 500.0)]);
    h.run(2);

    assert!((h.temperature() - 27.0).abs() < f32::EPSILON);
    assert!(h.sink.events.contains(&AppEvent::ReadFailure {
        channel: Channel::Temperature
    }));
}

#[test]
fn gas_estimate_escalates_gradually() {
    // Raw gas jumps from the 500 ppm seed to 4000 and stays there.  With
    // 0.95 smoothing the estimate is 4000 - 3500 * 0.95^n after n ticks.
    let mut h = Harness::new(sample(24.0, 50.0, 4000.0));
    for n in 1..=30 {
        h.step();
        let expected = match n {
            ..=10 => Normal,
            11..=24 => Warning,
            _ => Critical,
        };
        assert_eq!(h.service.tier(), expected, "tick {n}");
    }
}

#[test]
fn one_telemetry_record_per_tick() {
    let mut h = Harness::new(sample(36.0, 50.0, 500.0));
    h.run(4);

    let records: Vec<_> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.status == Warning));
    assert_eq!(records[0].gas, 500);
    assert_eq!(h.service.tick_count(), 4);
}
