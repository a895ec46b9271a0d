//! Function-pointer finite state machine engine (alert sequencer).
//!
//! Classic embedded FSM pattern, one row per severity tier:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐    │
//! │  │ Tier     │ on_enter  │ on_exit  │ on_update         │    │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤    │
//! │  │ Normal   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  │ Warning  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  │ Critical │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │    │
//! │  └──────────┴───────────┴──────────┴───────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** tier.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current tier, records the transition in the context, then runs
//! `on_enter` for the next.  All functions receive `&mut AlertContext`.

pub mod context;
pub mod states;

use context::{AlertContext, AlertSignal};
use log::info;

use crate::classifier::SeverityTier;

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn = fn(&mut AlertContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut AlertContext) -> Option<SeverityTier>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single sequencer state.
/// Stored in a fixed-size array, so no heap and no `dyn`.
pub struct StateDescriptor {
    pub id: SeverityTier,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `SeverityTier as usize`.
    table: [StateDescriptor; SeverityTier::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; SeverityTier::COUNT], initial: SeverityTier) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Sequencer over the standard tier table, starting in `Normal`.
    pub fn alert_sequencer() -> Self {
        Self::new(states::build_state_table(), SeverityTier::Normal)
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut AlertContext) {
        info!("Sequencer starting in tier: {}", self.table[self.current].name);
        ctx.alert.current_tier = self.current_state();
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → record → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut AlertContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> SeverityTier {
        self.table[self.current].id
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: SeverityTier, ctx: &mut AlertContext) {
        let from = self.current_state();
        let next_idx = next_id as usize;

        info!(
            "Tier transition: {} -> {} {:?}",
            self.table[self.current].name,
            self.table[next_idx].name,
            ctx.classification.reasons
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        // Any genuine tier change re-arms the alert.
        ctx.alert.current_tier = next_id;
        ctx.alert.active = next_id != SeverityTier::Normal;
        ctx.emit(AlertSignal::Transition { from, to: next_id });

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
