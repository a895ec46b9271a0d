//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with a scripted
//! room and a fake clock; nothing sleeps.

mod mock_hw;
mod override_tests;
mod service_tests;
