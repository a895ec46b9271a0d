//! RoomGuard engine library.
//!
//! Environmental guardian for a small server room: smooths temperature,
//! humidity and gas readings, simulates the cooling fan and dehumidifier,
//! classifies severity and sequences the audible alert.  Everything the
//! host binary does goes through the modules exported here, so the
//! integration tests drive the same code with mock adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod classifier;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod scheduler;
pub mod sensors;
