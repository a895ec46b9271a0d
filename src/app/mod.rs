//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the guardian: the
//! per-tick orchestration of estimator, actuator simulator, classifier
//! and alert sequencer, plus the manual-override command surface.
//! All interaction with the outside world happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
