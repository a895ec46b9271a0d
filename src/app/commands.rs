//! Manual override commands.
//!
//! Overrides arrive asynchronously (console, dashboard, a button) and are
//! queued in a [`CommandQueue`].  The [`GuardService`](super::service::GuardService)
//! drains the queue between ticks so actuator state is never torn
//! mid-computation.
//!
//! Two text forms are accepted:
//!
//! - the dashboard's JSON, `{"command": "FAN_CONTROL", "value": 1}`;
//! - console keywords: `fan`, `fan=on`, `dehum`, `dehum=off`, `reset`,
//!   `gas+`, `gas-`, `gas=auto`.
//!
//! Anything else is not a command and is ignored.

use core::fmt;
use core::str::FromStr;

use heapless::Deque;
use log::{debug, warn};
use serde::Deserialize;

/// Step of one `gas+` / `gas-` nudge (ppm).
pub const GAS_NUDGE_PPM: f32 = 500.0;

/// Queue depth between two drains.
pub const COMMAND_QUEUE_DEPTH: usize = 16;

/// An override the service applies at the next tick boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideCommand {
    ToggleFan,
    ToggleDehumidifier,
    SetFan(bool),
    SetDehumidifier(bool),
    /// Silence the active alert without changing the tier.
    ResetAlert,
    /// Move the manual gas override by this many ppm.
    AdjustGas(f32),
    /// Hand the gas channel back to the live sensor.
    ClearGasOverride,
}

// ───────────────────────────────────────────────────────────────
// Console keywords
// ───────────────────────────────────────────────────────────────

/// Returned by [`OverrideCommand::from_str`] for unrecognised input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand;

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command")
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for OverrideCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        if text.starts_with('{') {
            return parse_wire_command(&text).ok_or(UnknownCommand);
        }
        match text.as_str() {
            "fan" => return Ok(Self::ToggleFan),
            "dehum" | "dehumidifier" => return Ok(Self::ToggleDehumidifier),
            "reset" => return Ok(Self::ResetAlert),
            "gas+" => return Ok(Self::AdjustGas(GAS_NUDGE_PPM)),
            "gas-" => return Ok(Self::AdjustGas(-GAS_NUDGE_PPM)),
            "gas=auto" => return Ok(Self::ClearGasOverride),
            _ => {}
        }
        if let Some(value) = text.strip_prefix("fan=") {
            return parse_on_off(value).map(Self::SetFan).ok_or(UnknownCommand);
        }
        if let Some(value) = text
            .strip_prefix("dehum=")
            .or_else(|| text.strip_prefix("dehumidifier="))
        {
            return parse_on_off(value)
                .map(Self::SetDehumidifier)
                .ok_or(UnknownCommand);
        }
        Err(UnknownCommand)
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "on" | "true" => Some(true),
        "0" | "off" | "false" => Some(false),
        _ => None,
    }
}

// ───────────────────────────────────────────────────────────────
// Dashboard JSON
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireCommand {
    command: String,
    #[serde(default)]
    value: Option<f64>,
}

/// Parse one dashboard command.  Returns `None` (and logs at debug) for
/// malformed JSON and unknown command names.
pub fn parse_wire_command(json: &str) -> Option<OverrideCommand> {
    let wire: WireCommand = match serde_json::from_str(json) {
        Ok(w) => w,
        Err(e) => {
            debug!("Ignoring malformed command: {e}");
            return None;
        }
    };

    let cmd = match wire.command.to_ascii_uppercase().as_str() {
        "RESET_ALARM" => OverrideCommand::ResetAlert,
        "FAN_CONTROL" => wire
            .value
            .map_or(OverrideCommand::ToggleFan, |v| OverrideCommand::SetFan(v != 0.0)),
        "DEHUMIDIFIER_CONTROL" => wire
            .value
            .map_or(OverrideCommand::ToggleDehumidifier, |v| {
                OverrideCommand::SetDehumidifier(v != 0.0)
            }),
        "GAS_ADJUST" => match wire.value {
            Some(v) if v.is_finite() => OverrideCommand::AdjustGas(v as f32),
            _ => {
                debug!("GAS_ADJUST without a finite value ignored");
                return None;
            }
        },
        other => {
            debug!("Ignoring unknown command {other:?}");
            return None;
        }
    };
    Some(cmd)
}

// ───────────────────────────────────────────────────────────────
// Queue
// ───────────────────────────────────────────────────────────────

/// Bounded FIFO of pending overrides.  When full, the newest command is
/// dropped with a warning.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Deque<OverrideCommand, COMMAND_QUEUE_DEPTH>,
    dropped: u32,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `cmd`.  Returns `false` if the queue was full.
    pub fn push(&mut self, cmd: OverrideCommand) -> bool {
        if self.pending.push_back(cmd).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            warn!("Command queue full, dropping {:?}", cmd);
            return false;
        }
        true
    }

    pub fn pop(&mut self) -> Option<OverrideCommand> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Commands dropped since startup.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
