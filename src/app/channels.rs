//! Override channel between input threads and the control loop.
//!
//! Uses an `embassy-sync` bounded MPMC channel so any number of input
//! sources (console reader, a future MQTT bridge) can post overrides
//! without holding a reference to the service.  The control loop forwards
//! whatever is waiting into the service's own queue at each scheduler
//! poll.
//!
//! ```text
//! ┌──────────────┐ OverrideCommand ┌──────────────┐
//! │ Input thread │────────────────▶│ Control loop │
//! └──────────────┘                 └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use super::commands::{COMMAND_QUEUE_DEPTH, OverrideCommand};
use super::service::GuardService;

pub type OverrideChannel = Channel<CriticalSectionRawMutex, OverrideCommand, COMMAND_QUEUE_DEPTH>;

/// Process-wide channel used by the host binary.
pub static OVERRIDE_CHANNEL: OverrideChannel = Channel::new();

/// Post without blocking.  Returns `false` (and logs) when the channel is
/// full; the command is dropped.
pub fn post(channel: &OverrideChannel, cmd: OverrideCommand) -> bool {
    if channel.try_send(cmd).is_err() {
        warn!("Override channel full, dropping {:?}", cmd);
        return false;
    }
    true
}

/// Parse one line of console input (a keyword or dashboard JSON) and post
/// it.  Unrecognised input is a no-op, logged at debug.  Returns `true`
/// when a command was posted.
pub fn post_line(channel: &OverrideChannel, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return false;
    }
    match line.parse::<OverrideCommand>() {
        Ok(cmd) => post(channel, cmd),
        Err(e) => {
            debug!("{}: {:?}", e, line);
            false
        }
    }
}

/// Move everything waiting on `channel` into the service queue.  Returns
/// how many commands were forwarded.
pub fn forward(channel: &OverrideChannel, service: &mut GuardService) -> usize {
    let mut n = 0;
    while let Ok(cmd) = channel.try_receive() {
        service.submit(cmd);
        n += 1;
    }
    n
}
