//! Cadence scheduler driven by a monotonic clock.
//!
//! The control loop never sleeps a fixed amount.  It asks the scheduler
//! which task is due next, waits at most that long for input, and then
//! calls [`Scheduler::poll`] with the current monotonic time.  Due tasks
//! are reported to a [`SchedulerDelegate`]; the main loop implements the
//! delegate and runs the sensor tick or drains manual input.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Periodic tasks                           │
//! │                                                              │
//! │  ┌─────────────────────┐        ┌─────────────────────┐      │
//! │  │ SensorTick (2000 ms)│        │ InputPoll (50 ms)   │      │
//! │  └──────────┬──────────┘        └──────────┬──────────┘      │
//! │             │                              │                 │
//! │             ▼                              ▼                 │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                 GuardService.tick()                          │
//! │                 GuardService.apply_overrides()               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{SchedulerDelegate, TaskId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Task types
// ═══════════════════════════════════════════════════════════════

/// A periodic task.
#[derive(Debug, Clone)]
pub struct Task {
    /// Human-readable label for logs.
    pub label: &'static str,
    pub id: TaskId,
    /// Period in milliseconds of monotonic time.  Must be > 0.
    pub interval_ms: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent tasks (stack-allocated).
const MAX_TASKS: usize = 4;

/// The scheduler engine.
///
/// Decoupled from the service: when a task is due it invokes the
/// [`SchedulerDelegate`] callback, which keeps the scheduler testable
/// with a recording delegate and a fake clock.
pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
}

/// Internal bookkeeping for a live task.
#[derive(Debug, Clone)]
struct TaskEntry {
    task: Task,
    next_due_ms: u64,
    /// Periods skipped because the loop fell behind.
    missed: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None, None, None, None],
        }
    }

    /// Add a task, first due at `now_ms`.  Returns the slot index, or
    /// `None` if full or the interval is zero.
    pub fn add(&mut self, task: Task, now_ms: u64) -> Option<usize> {
        if task.interval_ms == 0 {
            return None;
        }
        for (i, slot) in self.tasks.iter_mut().enumerate() {
            if slot.is_none() {
                info!(
                    "Scheduler: added '{}' every {} ms at slot {}",
                    task.label, task.interval_ms, i
                );
                *slot = Some(TaskEntry {
                    task,
                    next_due_ms: now_ms,
                    missed: 0,
                });
                return Some(i);
            }
        }
        None // All slots full.
    }

    /// Report every task due at `now_ms` to `delegate`, in slot order.
    /// Returns how many fired.
    ///
    /// A task that fell more than one period behind fires once and its
    /// schedule is re-anchored to `now_ms`; missed periods are not
    /// replayed.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) -> usize {
        let mut fired = 0;
        for entry in self.tasks.iter_mut().flatten() {
            if now_ms < entry.next_due_ms {
                continue;
            }

            delegate.on_task_due(entry.task.id, now_ms);
            fired += 1;

            let interval = u64::from(entry.task.interval_ms);
            entry.next_due_ms += interval;
            if entry.next_due_ms <= now_ms {
                let behind = (now_ms - entry.next_due_ms) / interval + 1;
                entry.missed += behind;
                debug!(
                    "Scheduler: '{}' skipped {} period(s)",
                    entry.task.label, behind
                );
                entry.next_due_ms = now_ms + interval;
            }
        }
        fired
    }

    /// Earliest due time among all tasks.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks
            .iter()
            .flatten()
            .map(|e| e.next_due_ms)
            .min()
    }

    /// Total periods skipped across all tasks.
    pub fn missed(&self) -> u64 {
        self.tasks.iter().flatten().map(|e| e.missed).sum()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
