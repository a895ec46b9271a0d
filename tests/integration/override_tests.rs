//! Integration tests for manual overrides: actuators, alert reset and
//! the gas override, applied through the service's command queue.

use crate::mock_hw::{Harness, sample};

use roomguard::app::commands::{COMMAND_QUEUE_DEPTH, OverrideCommand, parse_wire_command};
use roomguard::app::events::AppEvent;
use roomguard::classifier::SeverityTier;
use roomguard::control::ActuatorKind;
use roomguard::fsm::context::PulseKind;

#[test]
fn fan_cools_to_setpoint_then_drifts_back() {
    let mut h = Harness::new(sample(30.0, 50.0, 500.0));
    h.step();
    h.command(OverrideCommand::SetFan(true));

    // 0.3 °C per control tick from 30 °C: 26 ticks leave it at ~22.2.
    h.run(26);
    assert!(h.service.actuators().fan.is_enabled());
    assert!(h.temperature() > 22.0 && h.temperature() < 22.5);

    h.step();
    assert!(!h.service.actuators().fan.is_enabled(), "fan switches itself off");
    assert!((h.temperature() - 22.0).abs() < f32::EPSILON);
    let completed: Vec<_> = h
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::ActuatorCompleted { .. }))
        .collect();
    assert_eq!(
        completed,
        vec![&AppEvent::ActuatorCompleted {
            actuator: ActuatorKind::Fan,
            value: 22.0
        }]
    );

    // Room is still at 30 °C: the simulated value relaxes back, then the
    // channel returns to raw pass-through.
    h.run(40);
    assert_eq!(h.service.actuators().fan.driven_value(), None);
    assert!((h.temperature() - 30.0).abs() < f32::EPSILON);
}

#[test]
fn dashboard_command_drives_dehumidifier_out_of_warning() {
    let mut h = Harness::new(sample(24.0, 75.0, 500.0));
    h.step();
    assert_eq!(h.service.tier(), SeverityTier::Warning);

    let cmd = parse_wire_command(r#"{"command":"DEHUMIDIFIER_CONTROL","value":1}"#)
        .expect("known command");
    h.command(cmd);
    // 1 %RH per tick: 70 %RH after five ticks, which is no longer above the band.
    h.run(6);

    assert_eq!(h.service.tier(), SeverityTier::Normal);
    assert!(h.sink.events.contains(&AppEvent::ActuatorChanged {
        actuator: ActuatorKind::Dehumidifier,
        enabled: true
    }));
    assert_eq!(
        h.sink.transitions(),
        vec![
            (SeverityTier::Normal, SeverityTier::Warning),
            (SeverityTier::Warning, SeverityTier::Normal)
        ]
    );
}

#[test]
fn toggle_twice_is_a_no_op_on_state() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.step();
    h.command_now(OverrideCommand::ToggleFan);
    assert!(h.service.actuators().fan.is_enabled());
    h.command_now(OverrideCommand::ToggleFan);
    assert!(!h.service.actuators().fan.is_enabled());
}

#[test]
fn fan_switched_off_early_drifts_back_without_a_jump() {
    let mut h = Harness::new(sample(30.0, 50.0, 500.0));
    h.step();
    h.command(OverrideCommand::SetFan(true));

    let mut cooling = Vec::new();
    for _ in 0..4 {
        h.step();
        cooling.push(h.temperature());
    }
    for (got, want) in cooling.iter().zip([29.7, 29.4, 29.1, 28.8]) {
        assert!((got - want).abs() < 1e-3, "cooling {cooling:?}");
    }

    // Off before the setpoint: relax back toward 30 °C one step at a time.
    h.command(OverrideCommand::SetFan(false));
    let mut previous = 28.8f32;
    let mut drift = Vec::new();
    for _ in 0..6 {
        h.step();
        let t = h.temperature();
        assert!(t >= previous, "drift reversed: {drift:?} then {t}");
        assert!(t - previous <= 0.3 + 1e-3, "jump: {drift:?} then {t}");
        assert!(t <= 30.0);
        drift.push(t);
        previous = t;
    }
    assert!((drift[0] - 29.1).abs() < 1e-3, "drift {drift:?}");

    // Back on the sensor.
    assert!(!h.service.actuators().fan.is_enabled());
    assert_eq!(h.service.actuators().fan.driven_value(), None);
    assert!((h.temperature() - 30.0).abs() < f32::EPSILON);
    assert!(
        !h.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::ActuatorCompleted { .. })),
        "never reached the setpoint"
    );
}

#[test]
fn noisy_sensor_after_a_fan_cycle_passes_through_again() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.step();
    h.command(OverrideCommand::SetFan(true));
    for _ in 0..20 {
        h.step();
        if !h.service.actuators().fan.is_enabled() {
            break;
        }
    }
    assert!(!h.service.actuators().fan.is_enabled(), "cycle finished");

    // Raw alternates 24.0 / 24.1 °C and never repeats the driven value.
    let jitter = |i: usize| if i % 2 == 0 { 24.0 } else { 24.1 };
    h.room.then((0..200).map(|i| sample(jitter(i), 50.0, 500.0)));
    h.run(200);
    assert_eq!(h.service.actuators().fan.driven_value(), None);
    assert!((h.temperature() - jitter(199)).abs() < f32::EPSILON);

    // A real heat spike is seen at once.
    h.room.hold(sample(45.0, 50.0, 500.0));
    h.step();
    assert!((h.temperature() - 45.0).abs() < f32::EPSILON);
    assert_eq!(h.service.tier(), SeverityTier::Critical);
}

#[test]
fn reset_silences_until_the_tier_changes() {
    let mut h = Harness::new(sample(45.0, 50.0, 500.0));
    h.run(2); // Critical since 0 ms
    h.command_now(OverrideCommand::ResetAlert);

    assert!(h.sink.events.contains(&AppEvent::AlertReset {
        tier: SeverityTier::Critical,
        was_active: true
    }));
    assert!(!h.service.alert().active);

    h.sink.clear();
    h.indicator.clear();
    h.run(4); // 4000..10000 ms
    assert_eq!(h.service.tier(), SeverityTier::Critical);
    assert!(h.sink.heartbeats().is_empty(), "silenced");
    assert!(h.indicator.pulses.is_empty());

    // Dip to Warning and back: the new Critical episode sounds again.
    h.room.hold(sample(36.0, 50.0, 500.0));
    h.step(); // 12000
    h.room.hold(sample(45.0, 50.0, 500.0));
    h.run(3); // 14000, 16000, 18000
    assert!(h.service.alert().active);
    assert_eq!(
        h.indicator.pulses,
        vec![PulseKind::Short, PulseKind::Long, PulseKind::Heartbeat]
    );
    assert_eq!(h.sink.heartbeats(), vec![18000]);
}

#[test]
fn reset_with_nothing_sounding_is_reported_inactive() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.step();
    h.command_now(OverrideCommand::ResetAlert);
    assert!(h.sink.events.contains(&AppEvent::AlertReset {
        tier: SeverityTier::Normal,
        was_active: false
    }));
}

#[test]
fn gas_override_nudges_clamps_and_clears() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.step();

    h.command_now("gas+".parse().unwrap());
    assert_eq!(h.service.snapshot().gas_override_ppm, Some(1000.0));
    assert!(h.sink.events.contains(&AppEvent::GasOverride { ppm: Some(1000.0) }));

    for _ in 0..12 {
        h.command(OverrideCommand::AdjustGas(500.0));
    }
    h.step();
    assert_eq!(h.service.snapshot().gas_override_ppm, Some(5000.0));

    h.command_now(OverrideCommand::ClearGasOverride);
    assert_eq!(h.service.snapshot().gas_override_ppm, None);
    assert_eq!(
        h.sink.events.last(),
        Some(&AppEvent::GasOverride { ppm: None })
    );
}

#[test]
fn held_gas_override_drives_the_estimate_critical() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    h.step();
    for _ in 0..9 {
        h.command(OverrideCommand::AdjustGas(500.0));
    }
    // Override sits at 5000 ppm; the smoothed estimate follows it up.
    h.run(30);
    assert_eq!(h.service.tier(), SeverityTier::Critical);
}

#[test]
fn queue_rejects_commands_beyond_capacity() {
    let mut h = Harness::new(sample(24.0, 50.0, 500.0));
    for _ in 0..COMMAND_QUEUE_DEPTH {
        assert!(h.service.submit(OverrideCommand::ToggleFan));
    }
    assert!(!h.service.submit(OverrideCommand::ResetAlert));
    assert_eq!(h.service.pending_commands(), COMMAND_QUEUE_DEPTH);
}
