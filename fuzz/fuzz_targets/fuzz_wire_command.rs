//! Fuzz target: console and dashboard command parsing
//!
//! Drives arbitrary text through `OverrideCommand::from_str` (which also
//! covers the JSON path) and asserts that every accepted command can be
//! applied to a running service without panicking.
//!
//! cargo fuzz run fuzz_wire_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomguard::app::commands::{parse_wire_command, OverrideCommand};
use roomguard::app::events::AppEvent;
use roomguard::app::ports::{EventSink, IndicatorPort};
use roomguard::app::service::GuardService;
use roomguard::classifier::SeverityTier;
use roomguard::config::GuardConfig;
use roomguard::fsm::context::PulseKind;

struct Null;

impl EventSink for Null {
    fn emit(&mut self, _: &AppEvent) {}
}

impl IndicatorPort for Null {
    fn show_tier(&mut self, _: SeverityTier) {}
    fn pulse(&mut self, _: PulseKind) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let _ = parse_wire_command(text);

    if let Ok(cmd) = text.parse::<OverrideCommand>() {
        let mut service = GuardService::new(GuardConfig::default()).unwrap();
        service.start(&mut Null, &mut Null);
        assert!(service.submit(cmd));
        assert_eq!(service.apply_overrides(&mut Null, &mut Null), 1);

        if let Some(ppm) = service.snapshot().gas_override_ppm {
            assert!((0.0..=5000.0).contains(&ppm), "override out of range");
        }
    }
});
