//! Fuzz target: `GuardConfig::from_json`
//!
//! Any document the loader accepts must build a service: validation is
//! the only gate between a config file and a running engine.
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomguard::app::service::GuardService;
use roomguard::config::GuardConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = GuardConfig::from_json(text) {
        assert!(GuardService::new(config).is_ok(), "validated config rejected");
    }
});
