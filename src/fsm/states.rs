//! Concrete state handler functions and table builder.
//!
//! Each tier is defined by plain `fn` pointers without closures or
//! dynamic dispatch.
//!
//! ```text
//!  NORMAL ◀────▶ WARNING ◀────▶ CRITICAL ──[active, beat due]──▶ heartbeat
//!    ▲                              │
//!    └──────────────────────────────┘
//! ```
//!
//! Transitions follow the classifier verbatim; any tier can reach any
//! other in one tick.  Reset (`AlertContext::silence`) is applied by the
//! service between ticks and never changes the tier.

use super::StateDescriptor;
use super::context::{AlertContext, AlertSignal, PulseKind};
use crate::classifier::SeverityTier;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; SeverityTier::COUNT] {
    [
        // Index 0: Normal
        StateDescriptor {
            id: SeverityTier::Normal,
            name: "Normal",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 1: Warning
        StateDescriptor {
            id: SeverityTier::Warning,
            name: "Warning",
            on_enter: Some(warning_enter),
            on_exit: None,
            on_update: warning_update,
        },
        // Index 2: Critical
        StateDescriptor {
            id: SeverityTier::Critical,
            name: "Critical",
            on_enter: Some(critical_enter),
            on_exit: Some(critical_exit),
            on_update: critical_update,
        },
    ]
}

/// `Some(tier)` when the classifier disagrees with `current`.
fn follow(ctx: &AlertContext, current: SeverityTier) -> Option<SeverityTier> {
    let tier = ctx.classification.tier;
    (tier != current).then_some(tier)
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL
// ═══════════════════════════════════════════════════════════════════════════

fn normal_enter(ctx: &mut AlertContext) {
    if ctx.total_ticks > 0 {
        info!("NORMAL: all channels within limits");
    }
}

fn normal_update(ctx: &mut AlertContext) -> Option<SeverityTier> {
    follow(ctx, SeverityTier::Normal)
}

// ═══════════════════════════════════════════════════════════════════════════
//  WARNING
// ═══════════════════════════════════════════════════════════════════════════

fn warning_enter(ctx: &mut AlertContext) {
    warn!("WARNING: {:?}", ctx.classification.reasons);
    ctx.emit(AlertSignal::Pulse(PulseKind::Short));
}

fn warning_update(ctx: &mut AlertContext) -> Option<SeverityTier> {
    follow(ctx, SeverityTier::Warning)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CRITICAL
// ═══════════════════════════════════════════════════════════════════════════

fn critical_enter(ctx: &mut AlertContext) {
    warn!("CRITICAL: {:?}", ctx.classification.reasons);
    ctx.emit(AlertSignal::Pulse(PulseKind::Long));
    // Entry counts as the first beat.
    ctx.alert.last_heartbeat_ms = ctx.now_ms;
}

fn critical_exit(ctx: &mut AlertContext) {
    debug!(
        "CRITICAL: left after {} ticks ({} ms since last beat)",
        ctx.ticks_in_state,
        ctx.ms_since_heartbeat()
    );
}

/// Beats once strictly more than the interval has passed since the last
/// beat or the Critical entry.
fn critical_update(ctx: &mut AlertContext) -> Option<SeverityTier> {
    if let Some(next) = follow(ctx, SeverityTier::Critical) {
        return Some(next);
    }

    if ctx.alert.active && ctx.ms_since_heartbeat() > ctx.heartbeat_interval_ms {
        debug!("CRITICAL: heartbeat");
        ctx.emit(AlertSignal::Pulse(PulseKind::Heartbeat));
        ctx.alert.last_heartbeat_ms = ctx.now_ms;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_indices() {
        let table = build_state_table();
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row.id as usize, i);
        }
    }

    #[test]
    fn critical_enter_stamps_heartbeat() {
        let mut ctx = AlertContext::new(3000);
        ctx.now_ms = 42_000;
        critical_enter(&mut ctx);
        assert_eq!(ctx.alert.last_heartbeat_ms, 42_000);
        assert_eq!(
            ctx.signals.as_slice(),
            &[AlertSignal::Pulse(PulseKind::Long)]
        );
    }

    #[test]
    fn inactive_critical_stays_quiet() {
        let mut ctx = AlertContext::new(3000);
        ctx.classification.tier = SeverityTier::Critical;
        ctx.now_ms = 60_000;
        assert_eq!(critical_update(&mut ctx), None);
        assert!(ctx.signals.is_empty());

        ctx.alert.active = true;
        assert_eq!(critical_update(&mut ctx), None);
        assert_eq!(
            ctx.signals.as_slice(),
            &[AlertSignal::Pulse(PulseKind::Heartbeat)]
        );
    }
}
