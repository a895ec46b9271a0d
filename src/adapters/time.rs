//! Host time adapter.
//!
//! Monotonic milliseconds since the adapter was created, backed by
//! `std::time::Instant`.  An optional speed-up factor compresses time for
//! demos: with `speedup = 10` a 2 s sensor interval passes in 200 ms of
//! wall time.

use std::time::{Duration, Instant};

pub struct HostClock {
    start: Instant,
    speedup: u32,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new(1)
    }
}

impl HostClock {
    /// `speedup` of 0 is treated as 1.
    pub fn new(speedup: u32) -> Self {
        Self {
            start: Instant::now(),
            speedup: speedup.max(1),
        }
    }

    /// Simulated milliseconds since start (monotonic).
    pub fn now_ms(&self) -> u64 {
        let wall = self.start.elapsed().as_millis() as u64;
        wall.saturating_mul(u64::from(self.speedup))
    }

    /// Wall-clock time until simulated time `due_ms`, zero if already due.
    pub fn until(&self, due_ms: u64) -> Duration {
        let remaining = due_ms.saturating_sub(self.now_ms());
        Duration::from_millis(remaining.div_ceil(u64::from(self.speedup)))
    }
}
